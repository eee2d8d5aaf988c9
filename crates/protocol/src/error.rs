//! Fehlertypen fuer das Gamesync-Protokoll

use thiserror::Error;

/// Fehler beim Kodieren, Dekodieren oder Interpretieren einer Nachricht
#[derive(Debug, Error)]
pub enum ProtokollFehler {
    /// Payload ist kein gueltiges JSON oder passt nicht zur Nachrichtenform
    #[error("JSON-Fehler: {0}")]
    Json(#[from] serde_json::Error),

    /// Datagramm ueberschreitet das Groessenlimit
    #[error("Datagramm zu gross: {laenge} Bytes (Maximum: {maximum} Bytes)")]
    ZuGross { laenge: usize, maximum: usize },

    /// Ereignis-Code ist unbekannt oder in dieser Richtung nicht erlaubt
    #[error("Unerwarteter Ereignis-Code: {0}")]
    UnerwartetesEreignis(i64),

    /// Pflichtfeld fuer das Ereignis fehlt
    #[error("Feld '{feld}' fehlt fuer Ereignis {ereignis}")]
    FeldFehlt { ereignis: i64, feld: &'static str },
}

/// Result-Typ fuer das Protokoll
pub type ProtokollResult<T> = Result<T, ProtokollFehler>;
