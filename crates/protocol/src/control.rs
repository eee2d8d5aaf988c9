//! Control-Protokoll (UDP/JSON)
//!
//! Definiert alle Nachrichten die zwischen Client und Server ausgetauscht
//! werden.
//!
//! ## Design
//! - Jede Nachricht traegt ein numerisches `event`-Feld
//! - Client -> Server: [`ClientAnfrage`] (alle Felder ausser `event` optional),
//!   wird vor dem Routing in einen typisierten [`Befehl`] uebersetzt
//! - Server -> Client: [`ServerNachricht`] (Started, Update, End)
//!
//! ## Ereignis-Codes
//!
//! | Code | Ereignis  | Richtung         |
//! |------|-----------|------------------|
//! | 3    | Create    | Client -> Server |
//! | 4    | Move      | Client -> Server |
//! | 5    | End       | beide            |
//! | 6    | Check     | Client -> Server |
//! | 7    | Started   | Server -> Client |
//! | 8    | Update    | Server -> Client |

use serde::{Deserialize, Serialize};

use crate::error::ProtokollFehler;

// ---------------------------------------------------------------------------
// Ereignis-Codes
// ---------------------------------------------------------------------------

/// Numerische Ereignis-Codes des Protokolls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EreignisCode {
    Create = 3,
    Move = 4,
    End = 5,
    Check = 6,
    Started = 7,
    Update = 8,
}

impl EreignisCode {
    /// Bildet einen rohen Code auf ein Ereignis ab
    pub fn aus_code(code: i64) -> Option<Self> {
        match code {
            3 => Some(Self::Create),
            4 => Some(Self::Move),
            5 => Some(Self::End),
            6 => Some(Self::Check),
            7 => Some(Self::Started),
            8 => Some(Self::Update),
            _ => None,
        }
    }

    /// Gibt den numerischen Code zurueck
    pub fn code(self) -> i64 {
        self as i64
    }
}

// ---------------------------------------------------------------------------
// Client -> Server
// ---------------------------------------------------------------------------

/// Eingehende Anfrage wie sie auf dem Draht steht
///
/// Aeltere Clients senden den Ereignis-Code unter dem Schluessel `type`,
/// daher der Alias.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientAnfrage {
    #[serde(alias = "type")]
    pub event: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub players: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_pressed: Option<i64>,
}

impl ClientAnfrage {
    /// Create-Anfrage mit der Spielerliste (Reihenfolge = Rollen)
    pub fn erstellen(spieler: Vec<String>) -> Self {
        Self {
            event: EreignisCode::Create.code(),
            players: Some(spieler),
            ..Self::default()
        }
    }

    /// Check-Anfrage eines Spielers
    pub fn einchecken(spieler: impl Into<String>) -> Self {
        Self {
            event: EreignisCode::Check.code(),
            player: Some(spieler.into()),
            ..Self::default()
        }
    }

    /// Move-Anfrage mit dem aktuellen Tastenwert
    pub fn bewegen(spieler: impl Into<String>, wert: i64) -> Self {
        Self {
            event: EreignisCode::Move.code(),
            player: Some(spieler.into()),
            button_pressed: Some(wert),
            ..Self::default()
        }
    }

    /// End-Anfrage eines Spielers
    pub fn beenden(spieler: impl Into<String>) -> Self {
        Self {
            event: EreignisCode::End.code(),
            player: Some(spieler.into()),
            ..Self::default()
        }
    }

    fn spieler_pflicht(self) -> Result<String, ProtokollFehler> {
        let ereignis = self.event;
        self.player.ok_or(ProtokollFehler::FeldFehlt {
            ereignis,
            feld: "player",
        })
    }
}

/// Typisierter Befehl nach der Validierung einer [`ClientAnfrage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Befehl {
    /// Neue Session aus der Spielerliste erstellen
    Erstellen { spieler: Vec<String> },
    /// Spieler meldet sich bereit und hinterlegt seine Adresse
    Einchecken { spieler: String },
    /// Tastenwert des Spielers setzen
    Bewegen { spieler: String, wert: i64 },
    /// Spieler hat das Spiel beendet
    Beenden { spieler: String },
}

impl TryFrom<ClientAnfrage> for Befehl {
    type Error = ProtokollFehler;

    fn try_from(anfrage: ClientAnfrage) -> Result<Self, Self::Error> {
        match EreignisCode::aus_code(anfrage.event) {
            Some(EreignisCode::Create) => {
                let ereignis = anfrage.event;
                let spieler = anfrage.players.ok_or(ProtokollFehler::FeldFehlt {
                    ereignis,
                    feld: "players",
                })?;
                Ok(Befehl::Erstellen { spieler })
            }
            Some(EreignisCode::Check) => Ok(Befehl::Einchecken {
                spieler: anfrage.spieler_pflicht()?,
            }),
            Some(EreignisCode::Move) => {
                // Fehlender Wert zaehlt als "keine Taste gedrueckt"
                let wert = anfrage.button_pressed.unwrap_or(0);
                Ok(Befehl::Bewegen {
                    spieler: anfrage.spieler_pflicht()?,
                    wert,
                })
            }
            Some(EreignisCode::End) => Ok(Befehl::Beenden {
                spieler: anfrage.spieler_pflicht()?,
            }),
            Some(EreignisCode::Started) | Some(EreignisCode::Update) | None => {
                Err(ProtokollFehler::UnerwartetesEreignis(anfrage.event))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Server -> Client
// ---------------------------------------------------------------------------

/// Benachrichtigung vom Server an einen Teilnehmer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ServerFrame", try_from = "ServerFrame")]
pub enum ServerNachricht {
    /// Alle Teilnehmer der Session sind bereit (`event=7`)
    Gestartet,
    /// Aggregierter Eingabevektor eines Broadcast-Ticks (`event=8`)
    Update { achse_x: i64, achse_y: i64 },
    /// Alle Teilnehmer haben beendet (`event=5`)
    Ende { spieler: Vec<String> },
}

impl ServerNachricht {
    /// Gibt den Ereignis-Code der Nachricht zurueck
    pub fn ereignis(&self) -> EreignisCode {
        match self {
            ServerNachricht::Gestartet => EreignisCode::Started,
            ServerNachricht::Update { .. } => EreignisCode::Update,
            ServerNachricht::Ende { .. } => EreignisCode::End,
        }
    }
}

/// Flache Draht-Darstellung aller Server-Nachrichten
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServerFrame {
    event: i64,
    #[serde(rename = "axisX", default, skip_serializing_if = "Option::is_none")]
    axis_x: Option<i64>,
    #[serde(rename = "axisY", default, skip_serializing_if = "Option::is_none")]
    axis_y: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    players: Option<Vec<String>>,
}

impl From<ServerNachricht> for ServerFrame {
    fn from(nachricht: ServerNachricht) -> Self {
        let event = nachricht.ereignis().code();
        match nachricht {
            ServerNachricht::Gestartet => Self {
                event,
                axis_x: None,
                axis_y: None,
                players: None,
            },
            ServerNachricht::Update { achse_x, achse_y } => Self {
                event,
                axis_x: Some(achse_x),
                axis_y: Some(achse_y),
                players: None,
            },
            ServerNachricht::Ende { spieler } => Self {
                event,
                axis_x: None,
                axis_y: None,
                players: Some(spieler),
            },
        }
    }
}

impl TryFrom<ServerFrame> for ServerNachricht {
    type Error = ProtokollFehler;

    fn try_from(frame: ServerFrame) -> Result<Self, Self::Error> {
        match EreignisCode::aus_code(frame.event) {
            Some(EreignisCode::Started) => Ok(ServerNachricht::Gestartet),
            Some(EreignisCode::Update) => Ok(ServerNachricht::Update {
                achse_x: frame.axis_x.ok_or(ProtokollFehler::FeldFehlt {
                    ereignis: frame.event,
                    feld: "axisX",
                })?,
                achse_y: frame.axis_y.ok_or(ProtokollFehler::FeldFehlt {
                    ereignis: frame.event,
                    feld: "axisY",
                })?,
            }),
            Some(EreignisCode::End) => Ok(ServerNachricht::Ende {
                spieler: frame.players.unwrap_or_default(),
            }),
            _ => Err(ProtokollFehler::UnerwartetesEreignis(frame.event)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
