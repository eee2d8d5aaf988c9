//! Kommandozeile des Servers
//!
//! `gamesync-server [PORT] [--config PFAD]`

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "gamesync-server", version, about = "Gamesync Session-Synchronisations-Server")]
pub struct Cli {
    /// UDP-Port, ueberschreibt `netzwerk.udp_port` aus der Konfiguration
    pub port: Option<u16>,

    /// Pfad der TOML-Konfigurationsdatei
    #[arg(long, env = "GAMESYNC_CONFIG", default_value = "config.toml")]
    pub config: String,
}
