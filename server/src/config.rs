//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use anyhow::{Context, bail};
use gamesync_session::SyncServerConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Session- und Broadcast-Einstellungen
    pub session: SessionEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer den UDP-Socket
    pub bind_adresse: String,
    /// UDP-Port
    pub udp_port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            udp_port: 7000,
        }
    }
}

/// Session- und Broadcast-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionEinstellungen {
    /// Abstand zwischen zwei Broadcast-Ticks in Millisekunden
    pub tick_intervall_ms: u64,
    /// Groesse der gemeinsamen Sende-Queue (Datagramme)
    pub sende_queue_groesse: usize,
}

impl Default for SessionEinstellungen {
    fn default() -> Self {
        Self {
            tick_intervall_ms: 100,
            sende_queue_groesse: 1024,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    ///
    /// Gibt `None` zurueck wenn die Datei nicht existiert. Der Aufrufer
    /// faellt dann auf die Standardwerte zurueck und meldet das, sobald
    /// das Logging steht.
    pub fn laden(pfad: &str) -> anyhow::Result<Option<Self>> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .with_context(|| format!("Konfigurationsfehler in '{pfad}'"))?;
                Ok(Some(config))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Konfigurationsdatei '{pfad}' nicht lesbar"))
            }
        }
    }

    /// Ueberschreibt den UDP-Port, z.B. mit dem Port von der Kommandozeile
    pub fn port_ueberschreiben(&mut self, port: Option<u16>) {
        if let Some(port) = port {
            self.netzwerk.udp_port = port;
        }
    }

    /// Prueft Werte die zur Laufzeit nicht 0 sein duerfen und das Log-Format
    pub fn validieren(&self) -> anyhow::Result<()> {
        if self.session.tick_intervall_ms == 0 {
            bail!("session.tick_intervall_ms muss groesser als 0 sein");
        }
        if self.session.sende_queue_groesse == 0 {
            bail!("session.sende_queue_groesse muss groesser als 0 sein");
        }
        if !crate::logging::log_format_gueltig(&self.logging.format) {
            bail!("logging.format '{}' unbekannt (text/json)", self.logging.format);
        }
        Ok(())
    }

    /// Gibt die vollstaendige Bind-Adresse fuer UDP zurueck
    pub fn udp_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.udp_port)
    }

    /// Baut die Konfiguration fuer den `SyncServer`
    pub fn sync_server_config(&self) -> anyhow::Result<SyncServerConfig> {
        self.validieren()?;

        let ip: IpAddr = self
            .netzwerk
            .bind_adresse
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse '{}'", self.netzwerk.bind_adresse))?;
        let bind_addr = SocketAddr::new(ip, self.netzwerk.udp_port);

        let mut config = SyncServerConfig::neu(bind_addr);
        config.tick_intervall = Duration::from_millis(self.session.tick_intervall_ms);
        config.sende_queue_groesse = self.session.sende_queue_groesse;
        Ok(config)
    }
}
