//! UDP Sync Server – Listener, Empfangs-Loop und Sende-Queue
//!
//! Bindet einen UDP-Socket, empfaengt Client-Anfragen, dekodiert sie und
//! leitet sie ueber den `AnfrageRouter` an die Registry weiter. Parallel
//! laeuft der `Broadcaster` als eigener Task.
//!
//! ## Architektur
//!
//! ```text
//! UDP Socket (recv_from)
//!     |
//!     v
//! DatagrammCodec::anfrage_dekodieren()   <- Groesse + JSON
//!     |
//!     v
//! AnfrageRouter::verarbeiten()           <- Registry-Mutation
//!     |
//!     +--> UdpSender (mpsc) --> UDP send_to Task
//!                ^
//! Broadcaster ---+ (eigener Task, Intervall)
//! ```
//!
//! ## Senden
//! Router und Broadcaster schreiben nie direkt auf den Socket. Sie reihen
//! Datagramme nicht-blockierend in eine begrenzte Queue ein, ein einzelner
//! Sende-Task arbeitet sie ab. Bei voller Queue wird verworfen (UDP-Semantik).

use crate::broadcaster::Broadcaster;
use crate::registry::SessionRegistry;
use crate::router::AnfrageRouter;
use crate::telemetry::ServerStatistik;
use gamesync_protocol::wire::{DatagrammCodec, MAX_DATAGRAMM_GROESSE};
use gamesync_protocol::ServerNachricht;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, watch};

/// Empfangspuffer: ein Byte groesser als das Limit, um Uebergroesse zu erkennen
const UDP_BUFFER_SIZE: usize = MAX_DATAGRAMM_GROESSE + 1;

// ---------------------------------------------------------------------------
// DatagrammSender
// ---------------------------------------------------------------------------

/// Abstrakte Faehigkeit "Datagramm an Adresse senden"
///
/// Implementierungen duerfen nie blockieren. Ein nicht zustellbares
/// Datagramm wird verworfen, es gibt weder Bestaetigung noch Wiederholung.
pub trait DatagrammSender: Send + Sync + 'static {
    /// Reiht ein Datagramm ein. Gibt `false` zurueck wenn es verworfen wurde.
    fn senden(&self, daten: Arc<Vec<u8>>, ziel: SocketAddr) -> bool;
}

/// Kodiert eine Nachricht einmal und sendet sie an alle Adressen
///
/// Gibt die Anzahl der eingereihten Datagramme zurueck.
pub fn rundsenden<S, I>(
    sender: &S,
    codec: &DatagrammCodec,
    nachricht: &ServerNachricht,
    adressen: I,
) -> usize
where
    S: DatagrammSender + ?Sized,
    I: IntoIterator<Item = SocketAddr>,
{
    let daten = match codec.nachricht_kodieren(nachricht) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            tracing::warn!(
                fehler = %e,
                ereignis = nachricht.ereignis().code(),
                "Benachrichtigung nicht kodierbar"
            );
            return 0;
        }
    };

    adressen
        .into_iter()
        .filter(|ziel| sender.senden(Arc::clone(&daten), *ziel))
        .count()
}

// ---------------------------------------------------------------------------
// UdpSender – Sende-Queue + Sende-Task
// ---------------------------------------------------------------------------

/// Handle auf die Sende-Queue des Servers
///
/// Clone teilt die Queue. Der Sende-Task endet sobald alle Handles
/// gedroppt sind.
#[derive(Clone)]
pub struct UdpSender {
    tx: mpsc::Sender<(Arc<Vec<u8>>, SocketAddr)>,
    statistik: Arc<ServerStatistik>,
}

impl UdpSender {
    /// Startet den Sende-Task auf dem gemeinsamen Socket
    pub fn starten(
        socket: Arc<UdpSocket>,
        queue_groesse: usize,
        statistik: Arc<ServerStatistik>,
    ) -> (Self, tokio::task::JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<(Arc<Vec<u8>>, SocketAddr)>(queue_groesse);
        let task_statistik = Arc::clone(&statistik);

        let task = tokio::spawn(async move {
            while let Some((daten, ziel)) = rx.recv().await {
                match socket.send_to(&daten, ziel).await {
                    Ok(_) => {
                        task_statistik.nachricht_gesendet();
                        tracing::trace!(bytes = daten.len(), ziel = %ziel, "UDP-Paket gesendet");
                    }
                    Err(e) => {
                        task_statistik.nachricht_verworfen();
                        tracing::warn!(fehler = %e, ziel = %ziel, "UDP-Sendefehler");
                    }
                }
            }
            tracing::debug!("Sende-Task beendet");
        });

        (Self { tx, statistik }, task)
    }
}

impl DatagrammSender for UdpSender {
    fn senden(&self, daten: Arc<Vec<u8>>, ziel: SocketAddr) -> bool {
        match self.tx.try_send((daten, ziel)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.statistik.nachricht_verworfen();
                tracing::warn!(ziel = %ziel, "Send-Queue voll – Paket verworfen");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.statistik.nachricht_verworfen();
                tracing::debug!(ziel = %ziel, "Send-Queue geschlossen");
                false
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SyncServer-Konfiguration
// ---------------------------------------------------------------------------

/// Konfiguration fuer den UDP Sync Server
#[derive(Debug, Clone)]
pub struct SyncServerConfig {
    /// Bind-Adresse (z.B. "0.0.0.0:7000")
    pub bind_addr: SocketAddr,
    /// Groesse der gemeinsamen Sende-Queue
    pub sende_queue_groesse: usize,
    /// Abstand zwischen zwei Broadcast-Ticks
    pub tick_intervall: Duration,
}

impl SyncServerConfig {
    /// Erstellt eine Konfiguration mit Standard-Werten
    pub fn neu(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            sende_queue_groesse: 1024,
            tick_intervall: Duration::from_millis(100),
        }
    }
}

// ---------------------------------------------------------------------------
// SyncServer
// ---------------------------------------------------------------------------

/// UDP Sync Server
///
/// Haelt Socket, Registry, Router und Broadcaster zusammen.
pub struct SyncServer {
    config: SyncServerConfig,
    socket: Arc<UdpSocket>,
    codec: DatagrammCodec,
    registry: SessionRegistry,
    router: AnfrageRouter<UdpSender>,
    broadcaster: Broadcaster<UdpSender>,
    statistik: Arc<ServerStatistik>,
}

impl SyncServer {
    /// Bindet den UDP-Socket und startet den Sende-Task
    pub async fn binden(
        config: SyncServerConfig,
        registry: SessionRegistry,
    ) -> std::io::Result<Self> {
        let socket = Arc::new(UdpSocket::bind(config.bind_addr).await?);
        tracing::info!(addr = %socket.local_addr()?, "UDP Sync Server gebunden");

        let statistik = Arc::new(ServerStatistik::neu());
        let (sender, _sende_task) = UdpSender::starten(
            Arc::clone(&socket),
            config.sende_queue_groesse,
            Arc::clone(&statistik),
        );
        let sender = Arc::new(sender);
        let codec = DatagrammCodec::new();

        let router = AnfrageRouter::neu(
            registry.clone(),
            Arc::clone(&sender),
            codec,
            Arc::clone(&statistik),
        );
        let broadcaster = Broadcaster::neu(
            registry.clone(),
            sender,
            codec,
            Arc::clone(&statistik),
        );

        Ok(Self {
            config,
            socket,
            codec,
            registry,
            router,
            broadcaster,
            statistik,
        })
    }

    /// Gibt die lokale Bind-Adresse zurueck
    pub fn lokale_adresse(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Gibt die Registry zurueck (geteilter Zustand)
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Gibt die Zaehler des Servers zurueck
    pub fn statistik(&self) -> Arc<ServerStatistik> {
        Arc::clone(&self.statistik)
    }

    /// Startet Broadcaster und Empfangs-Loop
    ///
    /// Laeuft bis `shutdown_rx` eine Aenderung meldet oder der Sender
    /// gedroppt wird.
    pub async fn starten(self, shutdown_rx: watch::Receiver<bool>) {
        let SyncServer {
            config,
            socket,
            codec,
            registry: _,
            router,
            broadcaster,
            statistik,
        } = self;

        let broadcast_task = tokio::spawn(
            broadcaster.starten(config.tick_intervall, shutdown_rx.clone()),
        );

        empfangs_loop(&socket, &codec, &router, &statistik, shutdown_rx).await;

        if let Err(e) = broadcast_task.await {
            tracing::error!(fehler = %e, "Broadcast-Task abgebrochen");
        }

        tracing::info!(
            statistik = %statistik.snapshot().zusammenfassung(),
            "UDP Sync Server beendet"
        );
    }
}

// ---------------------------------------------------------------------------
// Empfangs-Loop
// ---------------------------------------------------------------------------

async fn empfangs_loop(
    socket: &UdpSocket,
    codec: &DatagrammCodec,
    router: &AnfrageRouter<UdpSender>,
    statistik: &ServerStatistik,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    // Stack-allokierter Empfangspuffer – wird wiederverwendet
    let mut buf = [0u8; UDP_BUFFER_SIZE];

    tracing::info!("Empfangs-Loop gestartet");

    loop {
        tokio::select! {
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((len, absender)) => {
                        paket_verarbeiten(&buf[..len], absender, codec, router, statistik);
                    }
                    Err(e) => {
                        tracing::error!(fehler = %e, "UDP-Empfangsfehler");
                        // Kurze Pause um Busy-Loop bei persistentem Fehler zu vermeiden
                        tokio::time::sleep(Duration::from_millis(1)).await;
                    }
                }
            }

            _ = shutdown_rx.changed() => {
                tracing::info!("Shutdown-Signal empfangen");
                break;
            }
        }
    }

    tracing::info!("Empfangs-Loop beendet");
}

/// Verarbeitet ein eingehendes Datagramm
///
/// Dekodierfehler werden geloggt und verworfen, sie erreichen den Router nie.
fn paket_verarbeiten(
    daten: &[u8],
    absender: SocketAddr,
    codec: &DatagrammCodec,
    router: &AnfrageRouter<UdpSender>,
    statistik: &ServerStatistik,
) {
    statistik.datagramm_empfangen();

    let anfrage = match codec.anfrage_dekodieren(daten) {
        Ok(a) => a,
        Err(e) => {
            statistik.datagramm_verworfen();
            tracing::debug!(
                fehler = %e,
                absender = %absender,
                bytes = daten.len(),
                "Ungueltiges Datagramm"
            );
            return;
        }
    };

    router.verarbeiten(anfrage, absender);
}

// ---------------------------------------------------------------------------
// Test-Hilfen
// ---------------------------------------------------------------------------

/// Sender der alle Datagramme aufzeichnet statt sie zu versenden
#[cfg(test)]
#[derive(Default)]
pub(crate) struct AufzeichnenderSender {
    pub gesendet: parking_lot::Mutex<Vec<(Vec<u8>, SocketAddr)>>,
}

#[cfg(test)]
impl AufzeichnenderSender {
    /// Entnimmt alle bisher gesendeten Nachrichten (dekodiert)
    pub fn entnehmen(&self) -> Vec<(ServerNachricht, SocketAddr)> {
        let codec = DatagrammCodec::new();
        self.gesendet
            .lock()
            .drain(..)
            .map(|(daten, ziel)| (codec.nachricht_dekodieren(&daten).unwrap(), ziel))
            .collect()
    }
}

#[cfg(test)]
impl DatagrammSender for AufzeichnenderSender {
    fn senden(&self, daten: Arc<Vec<u8>>, ziel: SocketAddr) -> bool {
        self.gesendet.lock().push((daten.as_ref().clone(), ziel));
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn localhost(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    #[test]
    fn udp_buffer_groesse_erkennt_uebergroesse() {
        assert!(UDP_BUFFER_SIZE > MAX_DATAGRAMM_GROESSE);
    }

    #[test]
    fn rundsenden_kodiert_einmal_fuer_alle() {
        let sender = AufzeichnenderSender::default();
        let codec = DatagrammCodec::new();
        let anzahl = rundsenden(
            &sender,
            &codec,
            &ServerNachricht::Gestartet,
            [localhost(1), localhost(2)],
        );

        assert_eq!(anzahl, 2);
        let gesendet = sender.entnehmen();
        assert_eq!(
            gesendet,
            vec![
                (ServerNachricht::Gestartet, localhost(1)),
                (ServerNachricht::Gestartet, localhost(2)),
            ]
        );
    }

    #[test]
    fn rundsenden_verwirft_zu_grosse_nachricht() {
        let sender = AufzeichnenderSender::default();
        let codec = DatagrammCodec::with_max_size(8);
        let nachricht = ServerNachricht::Ende {
            spieler: vec!["a".into()],
        };
        assert_eq!(rundsenden(&sender, &codec, &nachricht, [localhost(1)]), 0);
        assert!(sender.entnehmen().is_empty());
    }

    #[tokio::test]
    async fn server_binden() {
        let config = SyncServerConfig::neu(localhost(0)); // Port 0 = OS waehlt
        let server = SyncServer::binden(config, SessionRegistry::neu())
            .await
            .expect("Server muss binden koennen");

        let addr = server.lokale_adresse().expect("Adresse muss verfuegbar sein");
        assert_ne!(addr.port(), 0, "OS muss einen Port zuweisen");
    }

    #[tokio::test]
    async fn udp_sender_liefert_aus() {
        let server_sock = Arc::new(UdpSocket::bind(localhost(0)).await.unwrap());
        let client_sock = UdpSocket::bind(localhost(0)).await.unwrap();
        let client_addr = client_sock.local_addr().unwrap();
        let statistik = Arc::new(ServerStatistik::neu());

        let (sender, _task) = UdpSender::starten(server_sock, 8, Arc::clone(&statistik));
        assert!(sender.senden(Arc::new(b"{\"event\":7}".to_vec()), client_addr));

        let mut buf = [0u8; 64];
        let (len, _) = tokio::time::timeout(
            Duration::from_secs(2),
            client_sock.recv_from(&mut buf),
        )
        .await
        .expect("Datagramm muss ankommen")
        .unwrap();

        assert_eq!(&buf[..len], b"{\"event\":7}");

        // Gezaehlt wird erst nach send_to im Sende-Task
        for _ in 0..100 {
            if statistik.snapshot().gesendet == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(statistik.snapshot().gesendet, 1);
        assert_eq!(statistik.snapshot().sende_verworfen, 0);
    }

    #[tokio::test]
    async fn volle_queue_verwirft_und_zaehlt() {
        let server_sock = Arc::new(UdpSocket::bind(localhost(0)).await.unwrap());
        let statistik = Arc::new(ServerStatistik::neu());

        // Current-Thread-Runtime: der Sende-Task laeuft erst beim naechsten await
        let (sender, _task) = UdpSender::starten(server_sock, 1, Arc::clone(&statistik));
        let daten = Arc::new(b"{\"event\":7}".to_vec());

        assert!(sender.senden(Arc::clone(&daten), localhost(9)));
        assert!(!sender.senden(daten, localhost(9)));

        let snapshot = statistik.snapshot();
        assert_eq!(snapshot.sende_verworfen, 1);
        assert_eq!(snapshot.gesendet, 0);
    }

    #[tokio::test]
    async fn ungueltige_datagramme_werden_verworfen() {
        let config = SyncServerConfig::neu(localhost(0));
        let server = SyncServer::binden(config, SessionRegistry::neu())
            .await
            .unwrap();
        let server_addr = server.lokale_adresse().unwrap();
        let statistik = server.statistik();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(server.starten(shutdown_rx));

        let client = UdpSocket::bind(localhost(0)).await.unwrap();
        client.send_to(b"kein json", server_addr).await.unwrap();
        client
            .send_to(&vec![b' '; MAX_DATAGRAMM_GROESSE + 10], server_addr)
            .await
            .unwrap();

        // Warten bis beide verarbeitet sind
        for _ in 0..100 {
            if statistik.snapshot().empfangen >= 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let _ = shutdown_tx.send(true);
        task.await.unwrap();

        let snapshot = statistik.snapshot();
        assert_eq!(snapshot.empfangen, 2);
        assert_eq!(snapshot.verworfen, 2);
    }
}
