//! Anfrage-Router – Verteilt dekodierte Client-Anfragen an die Registry
//!
//! Der Router ist zustandslos: aller Zustand liegt in der `SessionRegistry`.
//!
//! | Ereignis | Aktion                                                        |
//! |----------|---------------------------------------------------------------|
//! | Create   | `session_erstellen` mit der Spielerliste                      |
//! | Check    | `einchecken` mit Absenderadresse, ggf. Started an alle        |
//! | Move     | `bewegung_aktualisieren` am Rollen-Index des Spielers         |
//! | End      | `beenden_markieren`, ggf. End an alle und `session_loeschen`  |
//!
//! Fehler werden nie an den Absender gemeldet. Das Protokoll hat keinen
//! Fehlerkanal, die Anfrage wird geloggt und verworfen.

use gamesync_protocol::{Befehl, ClientAnfrage, DatagrammCodec, ServerNachricht};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::error::RouterResult;
use crate::registry::{Mitglied, SessionRegistry};
use crate::telemetry::ServerStatistik;
use crate::udp::{DatagrammSender, rundsenden};

/// Zentraler Anfrage-Router
pub struct AnfrageRouter<S: DatagrammSender> {
    registry: SessionRegistry,
    sender: Arc<S>,
    codec: DatagrammCodec,
    statistik: Arc<ServerStatistik>,
}

impl<S: DatagrammSender> AnfrageRouter<S> {
    /// Erstellt einen neuen Router
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

    /// Verarbeitet eine Anfrage und verwirft sie still bei Fehlern
    pub fn verarbeiten(&self, anfrage: ClientAnfrage, absender: SocketAddr) {
        let event = anfrage.event;
        if let Err(e) = self.bearbeiten(anfrage, absender) {
            self.statistik.anfrage_abgelehnt();
            tracing::debug!(
                fehler = %e,
                event,
                absender = %absender,
                "Anfrage verworfen"
            );
        }
    }

    /// Verarbeitet eine Anfrage und gibt Fehler an den Aufrufer zurueck
    pub fn bearbeiten(&self, anfrage: ClientAnfrage, absender: SocketAddr) -> RouterResult<()> {
        match Befehl::try_from(anfrage)? {
            Befehl::Erstellen { spieler } => {
                let anzahl = spieler.len();
                let session_id = self.registry.session_erstellen(spieler)?;
                tracing::debug!(session = %session_id, anzahl, "Create verarbeitet");
            }

            Befehl::Einchecken { spieler } => {
                let ergebnis = self.registry.einchecken(&spieler, absender)?;
                if ergebnis.alle_bereit {
                    let empfaenger =
                        self.an_mitglieder_senden(&ServerNachricht::Gestartet, &ergebnis.mitglieder);
                    tracing::info!(
                        session = %ergebnis.session_id,
                        empfaenger,
                        "Session gestartet"
                    );
                }
            }

            Befehl::Bewegen { spieler, wert } => {
                self.registry.bewegung_aktualisieren(&spieler, wert)?;
            }

            Befehl::Beenden { spieler } => {
                let ergebnis = self.registry.beenden_markieren(&spieler)?;
                if ergebnis.alle_beendet {
                    let nachricht = ServerNachricht::Ende {
                        spieler: ergebnis
                            .mitglieder
                            .iter()
                            .map(|m| m.kennung.clone())
                            .collect(),
                    };
                    let empfaenger = self.an_mitglieder_senden(&nachricht, &ergebnis.mitglieder);
                    self.registry.session_loeschen(ergebnis.session_id)?;
                    tracing::info!(
                        session = %ergebnis.session_id,
                        empfaenger,
                        "Session beendet"
                    );
                }
            }
        }

        Ok(())
    }

    /// Sendet an jedes Mitglied mit bekannter Adresse
    fn an_mitglieder_senden(&self, nachricht: &ServerNachricht, mitglieder: &[Mitglied]) -> usize {
        rundsenden(
            self.sender.as_ref(),
            &self.codec,
            nachricht,
            mitglieder.iter().filter_map(|m| m.adresse),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
