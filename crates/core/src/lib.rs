//! gamesync-core – Gemeinsame Typen
//!
//! Dieses Crate stellt die Identifikations- und Rollentypen bereit, die von
//! Protokoll, Session-Registry und Server gemeinsam genutzt werden.

pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use types::{MAX_TEILNEHMER, Rolle, SessionId};
