//! Gemeinsame Identifikationstypen fuer Gamesync
//!
//! Session-IDs verwenden das Newtype-Pattern, Rollen sind ein geschlossener
//! Enum. Die Rolle eines Teilnehmers ist gleichzeitig sein Index im
//! Tasten-Array der Session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximale Anzahl Teilnehmer pro Session (eine Rolle pro Richtung)
pub const MAX_TEILNEHMER: usize = 4;

/// Eindeutige Session-ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Erstellt eine neue zufaellige SessionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Rolle eines Teilnehmers innerhalb seiner Session
///
/// Die Rolle wird bei der Erstellung aus der Position in der Spielerliste
/// abgeleitet und ist danach unveraenderlich:
///
/// | Index | Rolle    | Achse         |
/// |-------|----------|---------------|
/// | 0     | `Hoch`   | +Y            |
/// | 1     | `Runter` | -Y            |
/// | 2     | `Rechts` | +X            |
/// | 3     | `Links`  | -X            |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rolle {
    Hoch = 0,
    Runter = 1,
    Rechts = 2,
    Links = 3,
}

impl Rolle {
    /// Alle Rollen in Zuweisungsreihenfolge
    pub const ALLE: [Rolle; MAX_TEILNEHMER] =
        [Rolle::Hoch, Rolle::Runter, Rolle::Rechts, Rolle::Links];

    /// Rolle fuer eine Position in der Spielerliste (None ab Index 4)
    pub fn aus_index(index: usize) -> Option<Self> {
        Self::ALLE.get(index).copied()
    }

    /// Index im Tasten-Array der Session
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Rolle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Rolle::Hoch => "hoch",
            Rolle::Runter => "runter",
            Rolle::Rechts => "rechts",
            Rolle::Links => "links",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_eindeutig() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b, "Zwei neue SessionIds muessen verschieden sein");
    }

    #[test]
    fn session_id_display() {
        let id = SessionId(Uuid::nil());
        assert!(id.to_string().starts_with("session:"));
    }

    #[test]
    fn rollen_folgen_der_listenposition() {
        for (index, rolle) in Rolle::ALLE.iter().enumerate() {
            assert_eq!(Rolle::aus_index(index), Some(*rolle));
            assert_eq!(rolle.index(), index);
        }
        assert_eq!(Rolle::aus_index(MAX_TEILNEHMER), None);
    }

    #[test]
    fn ids_sind_serde_kompatibel() {
        let id = SessionId::new();
        let json = serde_json::to_string(&id).unwrap();
        let id2: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, id2);
    }
}
