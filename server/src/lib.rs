//! gamesync-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod cli;
pub mod config;
pub mod logging;

use anyhow::{Context, Result};
use config::ServerConfig;
use gamesync_session::{SessionRegistry, SyncServer};
use tokio::sync::watch;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet den UDP-Server und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. UDP-Socket binden (Fehler sind fatal)
    /// 2. Broadcaster und Empfangs-Loop starten
    /// 3. Auf Ctrl-C warten, dann beide Tasks beenden
    pub async fn starten(self) -> Result<()> {
        let sync_config = self.config.sync_server_config()?;

        tracing::info!(
            udp = %sync_config.bind_addr,
            tick_ms = self.config.session.tick_intervall_ms,
            "Server startet"
        );

        let server = SyncServer::binden(sync_config, SessionRegistry::neu())
            .await
            .with_context(|| {
                format!("UDP-Socket {} nicht bindbar", self.config.udp_bind_adresse())
            })?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server_task = tokio::spawn(server.starten(shutdown_rx));

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");

        let _ = shutdown_tx.send(true);
        server_task.await?;

        Ok(())
    }
}
