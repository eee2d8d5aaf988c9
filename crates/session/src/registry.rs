//! Session-Registry – In-Memory Zustand aller Sessions und Teilnehmer
//!
//! Verwaltet pro Session:
//! - Spielerliste (Reihenfolge = Rollen)
//! - Tasten-Array mit dem letzten Wert pro Rolle
//!
//! Verwaltet pro Teilnehmer:
//! - Rueckverweis auf die Session und die Rolle
//! - Zuletzt bekannte UDP-Adresse (erst nach dem Check-in gesetzt)
//! - Bereit- und Beendet-Flag (beide nur false -> true)
//!
//! ## Synchronisation
//! Beide Maps liegen hinter einem einzigen `parking_lot::Mutex`. Jede
//! oeffentliche Operation nimmt den Lock genau einmal, kopiert die benoetigten
//! Daten heraus und gibt ihn wieder frei. Netzwerk-I/O passiert ausschliesslich
//! beim Aufrufer, nie unter dem Lock.

use gamesync_core::{MAX_TEILNEHMER, Rolle, SessionId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::error::{RegistryFehler, RegistryResult};

// ---------------------------------------------------------------------------
// Ergebnis-Typen
// ---------------------------------------------------------------------------

/// Ein Session-Mitglied mit seiner zuletzt bekannten Adresse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mitglied {
    pub kennung: String,
    /// None solange der Teilnehmer nicht eingecheckt hat
    pub adresse: Option<SocketAddr>,
}

/// Ergebnis eines Check-ins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInErgebnis {
    pub session_id: SessionId,
    /// Sind jetzt alle Teilnehmer der Session bereit?
    pub alle_bereit: bool,
    /// Alle Mitglieder in Rollenreihenfolge, leer wenn `alle_bereit == false`
    pub mitglieder: Vec<Mitglied>,
}

/// Ergebnis einer End-Markierung
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndeErgebnis {
    pub session_id: SessionId,
    /// True genau fuer den Aufruf, der den letzten Teilnehmer beendet hat
    pub alle_beendet: bool,
    /// Alle Mitglieder in Rollenreihenfolge, leer wenn `alle_beendet == false`
    pub mitglieder: Vec<Mitglied>,
}

/// Kopie einer bereiten Session fuer den Broadcaster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub adressen: Vec<SocketAddr>,
    pub tasten: [i64; MAX_TEILNEHMER],
}

/// Lesbare Sicht auf einen Teilnehmer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeilnehmerInfo {
    pub session_id: SessionId,
    pub rolle: Rolle,
    pub adresse: Option<SocketAddr>,
    pub bereit: bool,
    pub beendet: bool,
}

// ---------------------------------------------------------------------------
// Interner Zustand
// ---------------------------------------------------------------------------

struct Session {
    /// Teilnehmer-Kennungen, Index = Rolle
    spieler: Vec<String>,
    tasten: [i64; MAX_TEILNEHMER],
}

struct Teilnehmer {
    session_id: SessionId,
    rolle: Rolle,
    adresse: Option<SocketAddr>,
    bereit: bool,
    beendet: bool,
}

#[derive(Default)]
struct RegistryInner {
    sessions: HashMap<SessionId, Session>,
    teilnehmer: HashMap<String, Teilnehmer>,
}

impl RegistryInner {
    fn teilnehmer_mut(&mut self, kennung: &str) -> RegistryResult<&mut Teilnehmer> {
        self.teilnehmer
            .get_mut(kennung)
            .ok_or_else(|| RegistryFehler::UnbekannterTeilnehmer(kennung.to_string()))
    }

    fn session(&self, session_id: &SessionId) -> RegistryResult<&Session> {
        self.sessions
            .get(session_id)
            .ok_or(RegistryFehler::SessionNichtGefunden(*session_id))
    }

    /// Prueft ein Flag fuer alle Teilnehmer einer Session
    ///
    /// Ein fehlender Teilnehmer-Eintrag zaehlt als nicht erfuellt.
    fn alle<F>(&self, session: &Session, bedingung: F) -> bool
    where
        F: Fn(&Teilnehmer) -> bool,
    {
        session
            .spieler
            .iter()
            .all(|kennung| self.teilnehmer.get(kennung).is_some_and(&bedingung))
    }

    fn mitglieder(&self, session: &Session) -> Vec<Mitglied> {
        session
            .spieler
            .iter()
            .map(|kennung| Mitglied {
                kennung: kennung.clone(),
                adresse: self.teilnehmer.get(kennung).and_then(|t| t.adresse),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// SessionRegistry
// ---------------------------------------------------------------------------

/// Zentrale Registry aller Sessions und Teilnehmer
///
/// Thread-safe und `Clone`-faehig (innerer Arc). Die Container sind nicht
/// oeffentlich, aller Zugriff laeuft ueber die atomaren Operationen.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl SessionRegistry {
    /// Erstellt eine neue leere Registry
    pub fn neu() -> Self {
        Self::default()
    }

    /// Erstellt eine Session aus einer geordneten Spielerliste
    ///
    /// Die Position in der Liste bestimmt die Rolle. Kennungen die bereits an
    /// einen lebenden Teilnehmer gebunden sind werden abgelehnt, die Session
    /// wird dann nicht angelegt.
    pub fn session_erstellen(&self, spieler: Vec<String>) -> RegistryResult<SessionId> {
        if spieler.is_empty() || spieler.len() > MAX_TEILNEHMER {
            return Err(RegistryFehler::UngueltigeGroesse {
                anzahl: spieler.len(),
            });
        }

        let mut inner = self.inner.lock();

        let mut gesehen = HashSet::with_capacity(spieler.len());
        for kennung in &spieler {
            if kennung.is_empty() {
                return Err(RegistryFehler::LeereKennung);
            }
            if !gesehen.insert(kennung.as_str()) || inner.teilnehmer.contains_key(kennung) {
                return Err(RegistryFehler::DoppelterTeilnehmer(kennung.clone()));
            }
        }

        let session_id = SessionId::new();
        for (rolle, kennung) in Rolle::ALLE.iter().zip(&spieler) {
            inner.teilnehmer.insert(
                kennung.clone(),
                Teilnehmer {
                    session_id,
                    rolle: *rolle,
                    adresse: None,
                    bereit: false,
                    beendet: false,
                },
            );
        }
        inner.sessions.insert(
            session_id,
            Session {
                spieler,
                tasten: [0; MAX_TEILNEHMER],
            },
        );

        tracing::info!(session = %session_id, "Session erstellt");
        Ok(session_id)
    }

    /// Markiert einen Teilnehmer als bereit und hinterlegt seine Adresse
    ///
    /// Wiederholte Check-ins aktualisieren nur die Adresse.
    pub fn einchecken(
        &self,
        kennung: &str,
        adresse: SocketAddr,
    ) -> RegistryResult<CheckInErgebnis> {
        let mut inner = self.inner.lock();

        let teilnehmer = inner.teilnehmer_mut(kennung)?;
        teilnehmer.adresse = Some(adresse);
        teilnehmer.bereit = true;
        let session_id = teilnehmer.session_id;

        let session = inner.session(&session_id)?;
        let alle_bereit = inner.alle(session, |t| t.bereit);
        let mitglieder = if alle_bereit {
            inner.mitglieder(session)
        } else {
            Vec::new()
        };

        tracing::debug!(
            teilnehmer = kennung,
            session = %session_id,
            adresse = %adresse,
            alle_bereit,
            "Teilnehmer eingecheckt"
        );

        Ok(CheckInErgebnis {
            session_id,
            alle_bereit,
            mitglieder,
        })
    }

    /// Schreibt einen Tastenwert an den Rollen-Index des Teilnehmers
    pub fn bewegung_aktualisieren(&self, kennung: &str, wert: i64) -> RegistryResult<()> {
        let mut inner = self.inner.lock();

        let teilnehmer = inner.teilnehmer_mut(kennung)?;
        let (session_id, rolle) = (teilnehmer.session_id, teilnehmer.rolle);

        let session = inner
            .sessions
            .get_mut(&session_id)
            .ok_or(RegistryFehler::SessionNichtGefunden(session_id))?;
        session.tasten[rolle.index()] = wert;

        tracing::trace!(teilnehmer = kennung, %rolle, wert, "Tastenwert gesetzt");
        Ok(())
    }

    /// Markiert einen Teilnehmer als beendet
    ///
    /// `alle_beendet` ist nur fuer den Aufruf true, der den letzten noch
    /// laufenden Teilnehmer beendet. Ein zweites End desselben Teilnehmers
    /// aendert nichts und loest keinen weiteren Abbau aus.
    pub fn beenden_markieren(&self, kennung: &str) -> RegistryResult<EndeErgebnis> {
        let mut inner = self.inner.lock();

        let teilnehmer = inner.teilnehmer_mut(kennung)?;
        let schon_beendet = teilnehmer.beendet;
        teilnehmer.beendet = true;
        let session_id = teilnehmer.session_id;

        let session = inner.session(&session_id)?;
        let alle_beendet = !schon_beendet && inner.alle(session, |t| t.beendet);
        let mitglieder = if alle_beendet {
            inner.mitglieder(session)
        } else {
            Vec::new()
        };

        tracing::debug!(
            teilnehmer = kennung,
            session = %session_id,
            schon_beendet,
            alle_beendet,
            "Teilnehmer beendet"
        );

        Ok(EndeErgebnis {
            session_id,
            alle_beendet,
            mitglieder,
        })
    }

    /// Entfernt eine Session und alle ihre Teilnehmer-Bindungen
    pub fn session_loeschen(&self, session_id: SessionId) -> RegistryResult<()> {
        let mut inner = self.inner.lock();

        let session = inner
            .sessions
            .remove(&session_id)
            .ok_or(RegistryFehler::SessionNichtGefunden(session_id))?;

        for kennung in &session.spieler {
            // Nur Bindungen an genau diese Session entfernen
            if inner
                .teilnehmer
                .get(kennung)
                .is_some_and(|t| t.session_id == session_id)
            {
                inner.teilnehmer.remove(kennung);
            }
        }

        tracing::info!(
            session = %session_id,
            teilnehmer = session.spieler.len(),
            "Session entfernt"
        );
        Ok(())
    }

    /// Kopiert alle Sessions deren Teilnehmer vollstaendig bereit sind
    ///
    /// Der Lock wird nur fuer die Dauer der Kopie gehalten.
    pub fn bereite_sessions(&self) -> Vec<SessionSnapshot> {
        let inner = self.inner.lock();

        inner
            .sessions
            .iter()
            .filter(|(_, session)| inner.alle(session, |t| t.bereit))
            .map(|(session_id, session)| SessionSnapshot {
                session_id: *session_id,
                adressen: inner
                    .mitglieder(session)
                    .into_iter()
                    .filter_map(|m| m.adresse)
                    .collect(),
                tasten: session.tasten,
            })
            .collect()
    }

    /// Sind alle Teilnehmer der Session bereit?
    pub fn alle_bereit(&self, session_id: SessionId) -> RegistryResult<bool> {
        let inner = self.inner.lock();
        let session = inner.session(&session_id)?;
        Ok(inner.alle(session, |t| t.bereit))
    }

    /// Gibt eine Kopie des Teilnehmerzustands zurueck
    pub fn teilnehmer_info(&self, kennung: &str) -> Option<TeilnehmerInfo> {
        self.inner.lock().teilnehmer.get(kennung).map(|t| TeilnehmerInfo {
            session_id: t.session_id,
            rolle: t.rolle,
            adresse: t.adresse,
            bereit: t.bereit,
            beendet: t.beendet,
        })
    }

    /// Gibt die Anzahl der lebenden Sessions zurueck
    pub fn session_anzahl(&self) -> usize {
        self.inner.lock().sessions.len()
    }

    /// Gibt die Anzahl der gebundenen Teilnehmer zurueck
    pub fn teilnehmer_anzahl(&self) -> usize {
        self.inner.lock().teilnehmer.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
