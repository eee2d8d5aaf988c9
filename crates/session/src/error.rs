//! Fehlertypen fuer Registry und Router

use gamesync_core::SessionId;
use gamesync_protocol::ProtokollFehler;
use thiserror::Error;

/// Fehler einer Registry-Operation
///
/// Alle Lookups die fehlschlagen koennen liefern einen dieser Fehler statt
/// zu paniken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryFehler {
    /// Spielerliste leer oder laenger als vier
    #[error("Ungueltige Sessiongroesse: {anzahl} Spieler (erlaubt: 1 bis 4)")]
    UngueltigeGroesse { anzahl: usize },

    /// Kennung ist bereits an einen lebenden Teilnehmer gebunden
    #[error("Teilnehmer '{0}' ist bereits in einer Session")]
    DoppelterTeilnehmer(String),

    /// Leere Teilnehmer-Kennung
    #[error("Leere Teilnehmer-Kennung")]
    LeereKennung,

    /// Kennung ist keinem Teilnehmer zugeordnet
    #[error("Unbekannter Teilnehmer: '{0}'")]
    UnbekannterTeilnehmer(String),

    /// Session existiert nicht (mehr)
    #[error("Session nicht gefunden: {0}")]
    SessionNichtGefunden(SessionId),
}

/// Result-Typ fuer die Registry
pub type RegistryResult<T> = Result<T, RegistryFehler>;

/// Fehler beim Verarbeiten einer eingehenden Anfrage
#[derive(Debug, Error)]
pub enum RouterFehler {
    /// Anfrage ist syntaktisch korrekt, aber kein gueltiger Befehl
    #[error("Protokollfehler: {0}")]
    Protokoll(#[from] ProtokollFehler),

    /// Registry hat die Operation abgelehnt
    #[error("Registry-Fehler: {0}")]
    Registry(#[from] RegistryFehler),
}

/// Result-Typ fuer den Router
pub type RouterResult<T> = Result<T, RouterFehler>;
