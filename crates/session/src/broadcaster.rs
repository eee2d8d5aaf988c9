//! Broadcaster – Periodischer Versand des aggregierten Eingabevektors
//!
//! Pro Tick:
//! 1. Snapshot aller vollstaendig bereiten Sessions aus der Registry
//! 2. Achsen aus dem Tasten-Array berechnen
//! 3. Update-Nachricht einmal kodieren und an jede Teilnehmeradresse senden
//!
//! Sessions die noch nicht bereit sind werden still uebersprungen. Es gibt
//! keinen Rueckstau: ein langsamer Client verpasst einfach Ticks.

use gamesync_core::{MAX_TEILNEHMER, Rolle};
use gamesync_protocol::{DatagrammCodec, ServerNachricht};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::registry::SessionRegistry;
use crate::telemetry::ServerStatistik;
use crate::udp::{DatagrammSender, rundsenden};

/// Berechnet den 2-Achsen-Vektor aus dem Tasten-Array
///
/// `achse_x = rechts - links`, `achse_y = hoch - runter`.
pub fn achsen_berechnen(tasten: &[i64; MAX_TEILNEHMER]) -> (i64, i64) {
    let wert = |rolle: Rolle| tasten[rolle.index()];
    (
        wert(Rolle::Rechts).saturating_sub(wert(Rolle::Links)),
        wert(Rolle::Hoch).saturating_sub(wert(Rolle::Runter)),
    )
}

/// Periodischer Broadcaster fuer alle bereiten Sessions
pub struct Broadcaster<S: DatagrammSender> {
    registry: SessionRegistry,
    sender: Arc<S>,
    codec: DatagrammCodec,
    statistik: Arc<ServerStatistik>,
}

impl<S: DatagrammSender> Broadcaster<S> {
    /// Erstellt einen neuen Broadcaster
    pub fn neu(
        registry: SessionRegistry,
        sender: Arc<S>,
        codec: DatagrammCodec,
        statistik: Arc<ServerStatistik>,
    ) -> Self {
        Self {
            registry,
            sender,
            codec,
            statistik,
        }
    }

    /// Fuehrt einen einzelnen Broadcast-Tick aus
    ///
    /// Gibt die Anzahl der Sessions zurueck, an die ein Update ging.
    pub fn tick(&self) -> usize {
        self.statistik.tick();

        // Snapshot: Registry-Lock ist danach bereits wieder frei
        let sessions = self.registry.bereite_sessions();

        for session in &sessions {
            let (achse_x, achse_y) = achsen_berechnen(&session.tasten);
            let nachricht = ServerNachricht::Update { achse_x, achse_y };
            let empfaenger = rundsenden(
                self.sender.as_ref(),
                &self.codec,
                &nachricht,
                session.adressen.iter().copied(),
            );

            tracing::trace!(
                session = %session.session_id,
                achse_x,
                achse_y,
                empfaenger,
                "Update gesendet"
            );
        }

        sessions.len()
    }

    /// Startet die Tick-Schleife (laeuft bis `shutdown_rx` eine Aenderung meldet)
    pub async fn starten(self, intervall: Duration, mut shutdown_rx: watch::Receiver<bool>) {
        let mut takt = tokio::time::interval(intervall);
        takt.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(intervall_ms = intervall.as_millis() as u64, "Broadcaster gestartet");

        loop {
            tokio::select! {
                _ = takt.tick() => {
                    self.tick();
                }

                _ = shutdown_rx.changed() => {
                    break;
                }
            }
        }

        tracing::info!("Broadcaster beendet");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
