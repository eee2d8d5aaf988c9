//! Server-Telemetrie – Zaehler fuer den Datagramm-Verkehr
//!
//! Alle Zaehler sind `AtomicU64` mit `Relaxed`-Ordering. Sie werden vom
//! Empfangs-Pfad, vom Broadcaster und vom Sende-Task gleichzeitig erhoeht
//! und nur fuer Logging und Tests gelesen.

use std::sync::atomic::{AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Momentaufnahme aller Zaehler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatistikSnapshot {
    /// Empfangene Datagramme (inklusive verworfener)
    pub empfangen: u64,
    /// Verworfene Datagramme (zu gross, nicht dekodierbar)
    pub verworfen: u64,
    /// Vom Router abgelehnte Anfragen (Protokoll- oder Registry-Fehler)
    pub abgelehnt: u64,
    /// Vom Sende-Task erfolgreich versendete Datagramme
    pub gesendet: u64,
    /// Datagramme die verworfen wurden (Queue voll/geschlossen oder Sendefehler)
    pub sende_verworfen: u64,
    /// Ausgefuehrte Broadcast-Ticks
    pub ticks: u64,
}

impl StatistikSnapshot {
    /// Gibt eine lesbare Zusammenfassung zurueck
    pub fn zusammenfassung(&self) -> String {
        format!(
            "Empfangen={} Verworfen={} Abgelehnt={} Gesendet={} Sende-Verworfen={} Ticks={}",
            self.empfangen,
            self.verworfen,
            self.abgelehnt,
            self.gesendet,
            self.sende_verworfen,
            self.ticks,
        )
    }
}

// ---------------------------------------------------------------------------
// ServerStatistik
// ---------------------------------------------------------------------------

/// Gemeinsam genutzte Zaehler (typischerweise hinter einem `Arc`)
#[derive(Debug, Default)]
pub struct ServerStatistik {
    empfangen: AtomicU64,
    verworfen: AtomicU64,
    abgelehnt: AtomicU64,
    gesendet: AtomicU64,
    sende_verworfen: AtomicU64,
    ticks: AtomicU64,
}

impl ServerStatistik {
    /// Erstellt neue Zaehler (alle 0)
    pub fn neu() -> Self {
        Self::default()
    }

    pub fn datagramm_empfangen(&self) {
        self.empfangen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn datagramm_verworfen(&self) {
        self.verworfen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn anfrage_abgelehnt(&self) {
        self.abgelehnt.fetch_add(1, Ordering::Relaxed);
    }

    pub fn nachricht_gesendet(&self) {
        self.gesendet.fetch_add(1, Ordering::Relaxed);
    }

    pub fn nachricht_verworfen(&self) {
        self.sende_verworfen.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Liest alle Zaehler aus
    pub fn snapshot(&self) -> StatistikSnapshot {
        StatistikSnapshot {
            empfangen: self.empfangen.load(Ordering::Relaxed),
            verworfen: self.verworfen.load(Ordering::Relaxed),
            abgelehnt: self.abgelehnt.load(Ordering::Relaxed),
            gesendet: self.gesendet.load(Ordering::Relaxed),
            sende_verworfen: self.sende_verworfen.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
        }
    }
}
