//! Wire-Format fuer UDP-Datagramme
//!
//! Ein Datagramm enthaelt genau eine JSON-Nachricht ohne Laengenpraefix.
//! Die maximale Datagramm-Groesse ist konfigurierbar (Standard: 1024 Bytes)
//! und gilt in beide Richtungen.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::control::{ClientAnfrage, ServerNachricht};
use crate::error::{ProtokollFehler, ProtokollResult};

/// Standard-maximale Datagramm-Groesse
pub const MAX_DATAGRAMM_GROESSE: usize = 1024;

// ---------------------------------------------------------------------------
// DatagrammCodec
// ---------------------------------------------------------------------------

/// Codec fuer einzelne UDP-Datagramme
#[derive(Debug, Clone, Copy)]
pub struct DatagrammCodec {
    /// Maximale erlaubte Datagramm-Groesse in Bytes
    max_groesse: usize,
}

impl DatagrammCodec {
    /// Erstellt einen Codec mit Standard-Limit
    pub fn new() -> Self {
        Self {
            max_groesse: MAX_DATAGRAMM_GROESSE,
        }
    }

    /// Erstellt einen Codec mit benutzerdefinierter maximaler Groesse
    pub fn with_max_size(max_groesse: usize) -> Self {
        Self { max_groesse }
    }

    /// Gibt die konfigurierte maximale Datagramm-Groesse zurueck
    pub fn max_groesse(&self) -> usize {
        self.max_groesse
    }

    /// Dekodiert eine eingehende Client-Anfrage
    pub fn anfrage_dekodieren(&self, daten: &[u8]) -> ProtokollResult<ClientAnfrage> {
        self.dekodieren(daten)
    }

    /// Kodiert eine Client-Anfrage (Client-Seite, Tests)
    pub fn anfrage_kodieren(&self, anfrage: &ClientAnfrage) -> ProtokollResult<Vec<u8>> {
        self.kodieren(anfrage)
    }

    /// Kodiert eine Server-Benachrichtigung
    pub fn nachricht_kodieren(&self, nachricht: &ServerNachricht) -> ProtokollResult<Vec<u8>> {
        self.kodieren(nachricht)
    }

    /// Dekodiert eine Server-Benachrichtigung (Client-Seite, Tests)
    pub fn nachricht_dekodieren(&self, daten: &[u8]) -> ProtokollResult<ServerNachricht> {
        self.dekodieren(daten)
    }

    fn groesse_pruefen(&self, laenge: usize) -> ProtokollResult<()> {
        if laenge > self.max_groesse {
            return Err(ProtokollFehler::ZuGross {
                laenge,
                maximum: self.max_groesse,
            });
        }
        Ok(())
    }

    fn kodieren<T: Serialize>(&self, wert: &T) -> ProtokollResult<Vec<u8>> {
        let json = serde_json::to_vec(wert)?;
        self.groesse_pruefen(json.len())?;
        Ok(json)
    }

    fn dekodieren<T: DeserializeOwned>(&self, daten: &[u8]) -> ProtokollResult<T> {
        self.groesse_pruefen(daten.len())?;
        Ok(serde_json::from_slice(daten)?)
    }
}

impl Default for DatagrammCodec {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anfrage_dekodieren_aus_rohen_bytes() {
        let codec = DatagrammCodec::new();
        let anfrage = codec
            .anfrage_dekodieren(br#"{"event":6,"player":"alice"}"#)
            .unwrap();
        assert_eq!(anfrage, ClientAnfrage::einchecken("alice"));
    }

    #[test]
    fn kaputtes_json_wird_abgelehnt() {
        let codec = DatagrammCodec::new();
        let result = codec.anfrage_dekodieren(b"{\"event\":");
        assert!(matches!(result, Err(ProtokollFehler::Json(_))));
    }

    #[test]
    fn zu_grosses_datagramm_wird_abgelehnt() {
        let codec = DatagrammCodec::new();
        let daten = vec![b' '; MAX_DATAGRAMM_GROESSE + 1];
        let result = codec.anfrage_dekodieren(&daten);
        assert!(matches!(
            result,
            Err(ProtokollFehler::ZuGross { laenge, .. }) if laenge == MAX_DATAGRAMM_GROESSE + 1
        ));
    }

    #[test]
    fn zu_grosse_nachricht_wird_nicht_kodiert() {
        let codec = DatagrammCodec::with_max_size(16);
        let nachricht = ServerNachricht::Ende {
            spieler: vec!["ein-sehr-langer-spielername".into()],
        };
        assert!(codec.nachricht_kodieren(&nachricht).is_err());
    }

    #[test]
    fn update_kodieren_und_dekodieren() {
        let codec = DatagrammCodec::new();
        let nachricht = ServerNachricht::Update {
            achse_x: 3,
            achse_y: 2,
        };
        let bytes = codec.nachricht_kodieren(&nachricht).unwrap();
        assert_eq!(codec.nachricht_dekodieren(&bytes).unwrap(), nachricht);
    }

    #[test]
    fn default_max_groesse() {
        assert_eq!(DatagrammCodec::default().max_groesse(), MAX_DATAGRAMM_GROESSE);
    }
}
