//! Ende-zu-Ende-Tests ueber echte UDP-Sockets auf localhost

use gamesync_protocol::{ClientAnfrage, DatagrammCodec, ServerNachricht};
use gamesync_session::{SessionRegistry, SyncServer, SyncServerConfig};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::watch;

fn localhost(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

struct LaufenderServer {
    addr: SocketAddr,
    registry: SessionRegistry,
    shutdown_tx: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl LaufenderServer {
    async fn starten() -> Self {
        let mut config = SyncServerConfig::neu(localhost(0));
        config.tick_intervall = Duration::from_millis(20);

        let registry = SessionRegistry::neu();
        let server = SyncServer::binden(config, registry.clone())
            .await
            .expect("Server muss binden koennen");
        let addr = server.lokale_adresse().unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(server.starten(shutdown_rx));

        Self {
            addr,
            registry,
            shutdown_tx,
            task,
        }
    }

    async fn stoppen(self) {
        let _ = self.shutdown_tx.send(true);
        self.task.await.unwrap();
    }
}

struct Client {
    socket: UdpSocket,
    server: SocketAddr,
    codec: DatagrammCodec,
}

impl Client {
    async fn neu(server: SocketAddr) -> Self {
        Self {
            socket: UdpSocket::bind(localhost(0)).await.unwrap(),
            server,
            codec: DatagrammCodec::new(),
        }
    }

    fn adresse(&self) -> SocketAddr {
        self.socket.local_addr().unwrap()
    }

    async fn senden(&self, anfrage: ClientAnfrage) {
        let daten = self.codec.anfrage_kodieren(&anfrage).unwrap();
        self.socket.send_to(&daten, self.server).await.unwrap();
    }

    /// Liest Nachrichten bis eine das Praedikat erfuellt (Timeout: 2 s)
    async fn warten_auf<F>(&self, praedikat: F) -> ServerNachricht
    where
        F: Fn(&ServerNachricht) -> bool,
    {
        let mut buf = [0u8; 2048];
        let frist = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let (len, _) = tokio::time::timeout_at(frist, self.socket.recv_from(&mut buf))
                .await
                .expect("Erwartete Nachricht kam nicht rechtzeitig")
                .unwrap();
            let nachricht = self.codec.nachricht_dekodieren(&buf[..len]).unwrap();
            if praedikat(&nachricht) {
                return nachricht;
            }
        }
    }

    /// Prueft dass innerhalb von `dauer` keine Nachricht ankommt
    async fn nichts_empfangen(&self, dauer: Duration) -> bool {
        let mut buf = [0u8; 2048];
        tokio::time::timeout(dauer, self.socket.recv_from(&mut buf))
            .await
            .is_err()
    }
}

async fn warten_bis<F: Fn() -> bool>(bedingung: F) {
    for _ in 0..200 {
        if bedingung() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("Bedingung wurde nicht rechtzeitig erfuellt");
}

#[tokio::test]
async fn kompletter_session_ablauf() {
    let server = LaufenderServer::starten().await;
    let a = Client::neu(server.addr).await;
    let b = Client::neu(server.addr).await;

    // Create
    a.senden(ClientAnfrage::erstellen(vec!["a".into(), "b".into()]))
        .await;
    let registry = server.registry.clone();
    warten_bis(|| registry.session_anzahl() == 1).await;

    // Erster Check-in: noch nicht alle bereit, also kein Started und keine Updates
    a.senden(ClientAnfrage::einchecken("a")).await;
    warten_bis(|| registry.teilnehmer_info("a").is_some_and(|t| t.bereit)).await;
    assert!(
        a.nichts_empfangen(Duration::from_millis(100)).await,
        "Vor dem letzten Check-in darf nichts gesendet werden"
    );

    // Zweiter Check-in: Started an beide
    b.senden(ClientAnfrage::einchecken("b")).await;
    a.warten_auf(|n| *n == ServerNachricht::Gestartet).await;
    b.warten_auf(|n| *n == ServerNachricht::Gestartet).await;

    assert_eq!(
        registry.teilnehmer_info("a").unwrap().adresse,
        Some(a.adresse())
    );

    // Updates laufen, Tastenwerte fliessen in die Achsen ein
    a.warten_auf(|n| matches!(n, ServerNachricht::Update { .. }))
        .await;
    a.senden(ClientAnfrage::bewegen("a", 3)).await; // Hoch
    b.senden(ClientAnfrage::bewegen("b", 1)).await; // Runter
    let erwartet = ServerNachricht::Update {
        achse_x: 0,
        achse_y: 2,
    };
    a.warten_auf(|n| *n == erwartet).await;
    b.warten_auf(|n| *n == erwartet).await;

    // End: erst nach dem letzten Teilnehmer
    a.senden(ClientAnfrage::beenden("a")).await;
    warten_bis(|| registry.teilnehmer_info("a").is_some_and(|t| t.beendet)).await;
    assert_eq!(registry.session_anzahl(), 1);

    b.senden(ClientAnfrage::beenden("b")).await;
    let ende = ServerNachricht::Ende {
        spieler: vec!["a".into(), "b".into()],
    };
    a.warten_auf(|n| *n == ende).await;
    b.warten_auf(|n| *n == ende).await;

    assert_eq!(registry.session_anzahl(), 0);
    assert_eq!(registry.teilnehmer_anzahl(), 0);

    server.stoppen().await;
}

#[tokio::test]
async fn fehlerhafte_anfragen_werden_still_verworfen() {
    let server = LaufenderServer::starten().await;
    let client = Client::neu(server.addr).await;
    let registry = server.registry.clone();

    // Zu viele Spieler, unbekannter Teilnehmer, kaputtes JSON
    client
        .senden(ClientAnfrage::erstellen(
            ["a", "b", "c", "d", "e"].iter().map(|s| s.to_string()).collect(),
        ))
        .await;
    client.senden(ClientAnfrage::einchecken("niemand")).await;
    client.socket.send_to(b"{kaputt", server.addr).await.unwrap();

    assert!(
        client.nichts_empfangen(Duration::from_millis(150)).await,
        "Fehler werden nie an den Absender gemeldet"
    );
    assert_eq!(registry.session_anzahl(), 0);

    // Server laeuft weiter und nimmt gueltige Anfragen an
    client
        .senden(ClientAnfrage::erstellen(vec!["solo".into()]))
        .await;
    warten_bis(|| registry.teilnehmer_info("solo").is_some()).await;
    client.senden(ClientAnfrage::einchecken("solo")).await;
    client
        .warten_auf(|n| *n == ServerNachricht::Gestartet)
        .await;

    server.stoppen().await;
}

#[tokio::test]
async fn legacy_type_feld_wird_akzeptiert() {
    let server = LaufenderServer::starten().await;
    let client = Client::neu(server.addr).await;
    let registry = server.registry.clone();

    client
        .socket
        .send_to(br#"{"type":3,"players":["x"]}"#, server.addr)
        .await
        .unwrap();
    warten_bis(|| registry.teilnehmer_info("x").is_some()).await;

    server.stoppen().await;
}
