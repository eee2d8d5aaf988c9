//! Gamesync Server – Einstiegspunkt
//!
//! Liest die Kommandozeile, laedt die Konfiguration, initialisiert das
//! Logging und startet den Server.

use anyhow::Result;
use clap::Parser;
use gamesync_server::{Server, cli::Cli, config::ServerConfig, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Fehlende Datei ist kein Fehler, wird aber nach dem Logging-Setup gemeldet
    let geladen = ServerConfig::laden(&cli.config)?;
    let datei_fehlt = geladen.is_none();
    let mut config = geladen.unwrap_or_default();
    config.port_ueberschreiben(cli.port);
    config.validieren()?;

    logging::logging_initialisieren(&config.logging);

    if datei_fehlt {
        tracing::warn!(
            pfad = %cli.config,
            "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
        );
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config,
        "Gamesync Server wird initialisiert"
    );

    let server = Server::neu(config);
    server.starten().await?;

    Ok(())
}
