//! gamesync-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert die Nachrichtentypen die zwischen Client und
//! Server als UDP-Datagramme (JSON) ausgetauscht werden.
//!
//! ## Module
//! - [`control`] – Anfrage- und Benachrichtigungsformate, Ereignis-Codes
//! - [`wire`] – Datagramm-Codec mit Groessenlimit
//! - [`error`] – Protokollfehler

pub mod control;
pub mod error;
pub mod wire;

pub use control::{Befehl, ClientAnfrage, EreignisCode, ServerNachricht};
pub use error::{ProtokollFehler, ProtokollResult};
pub use wire::{DatagrammCodec, MAX_DATAGRAMM_GROESSE};
