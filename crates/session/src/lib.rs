//! gamesync-session – Session-Synchronisation
//!
//! Verwaltet Sessions mit bis zu vier Teilnehmern, gibt sie frei sobald alle
//! bereit sind und verteilt periodisch den aggregierten Eingabevektor.
//!
//! ## Module
//! - [`registry`] – Session- und Teilnehmerzustand hinter einem einzigen Lock
//! - [`router`] – Verteilt dekodierte Anfragen an die Registry
//! - [`broadcaster`] – Periodischer Update-Versand an bereite Sessions
//! - [`udp`] – UDP-Listener, Empfangs-Loop und Sende-Queue
//! - [`telemetry`] – Zaehler fuer empfangene, verworfene und gesendete Datagramme
//! - [`error`] – Fehlertypen
//!
//! ## Datenfluss
//!
//! ```text
//! UDP recv_from -> DatagrammCodec -> AnfrageRouter -> SessionRegistry
//!                                         |
//!                                         +--> DatagrammSender (Started/End)
//!
//! Broadcaster (Intervall) -> SessionRegistry::bereite_sessions()
//!                         -> DatagrammSender (Update)
//! ```

pub mod broadcaster;
pub mod error;
pub mod registry;
pub mod router;
pub mod telemetry;
pub mod udp;

pub use broadcaster::Broadcaster;
pub use error::{RegistryFehler, RegistryResult, RouterFehler, RouterResult};
pub use registry::SessionRegistry;
pub use router::AnfrageRouter;
pub use telemetry::ServerStatistik;
pub use udp::{DatagrammSender, SyncServer, SyncServerConfig, UdpSender};
