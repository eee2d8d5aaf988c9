//! Structured Logging Setup via tracing-subscriber
//!
//! Umgebungsvariablen haben Vorrang vor dem Abschnitt `[logging]`:
//! - `GS_LOG_LEVEL`: Log-Level oder Filter-Ausdruck
//! - `GS_LOG_FORMAT`: `text` oder `json`

use crate::config::LoggingEinstellungen;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialisiert das globale Logging aus Konfiguration und Umgebung
pub fn logging_initialisieren(einstellungen: &LoggingEinstellungen) {
    let level = std::env::var("GS_LOG_LEVEL").unwrap_or_else(|_| einstellungen.level.clone());
    let format = std::env::var("GS_LOG_FORMAT").unwrap_or_else(|_| einstellungen.format.clone());

    let builder = fmt().with_env_filter(filter_bauen(&level)).with_target(true);
    if format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Baut den Filter, ein ungueltiger Ausdruck faellt auf `info` zurueck
fn filter_bauen(ausdruck: &str) -> EnvFilter {
    EnvFilter::try_new(ausdruck).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
