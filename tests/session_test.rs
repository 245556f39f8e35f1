//! End-to-end session tests against a scripted in-memory server

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use realmlink::client::config::ClientConfig;
use realmlink::client::credentials::{Credentials, StaticCredentials};
use realmlink::client::transport::memory::{MemoryConnector, MemoryListener, MemoryPeer};
use realmlink::client::{Client, ClientError, ClientHandle};
use realmlink::client::services::{MemoryObjectDefinitions, ObjectDefinition};
use realmlink::protocol::messages::data::{Entity, Location, Status};
use realmlink::protocol::messages::incoming::{
    CreateSuccess, Failure, MapInfo, NewTick, Ping, Reconnect, Text, Update,
};
use realmlink::protocol::messages::outgoing::{
    Create, Hello, Load, Move, PlayerText, Pong, UpdateAck, GAME_ID_NEXUS,
};
use realmlink::protocol::{ConnectionState, Endpoint, Envelope, Record};
use tokio::task::JoinHandle;
use tokio::time::timeout;

const TIMEOUT: Duration = Duration::from_secs(5);

fn init_tracing() {
    tracing_subscriber::fmt().with_test_writer().try_init().ok();
}

fn config() -> ClientConfig {
    ClientConfig {
        build_version: "1.0.0".into(),
        reconnect_delay_ms: 200,
        ..ClientConfig::default()
    }
}

fn credentials(character_id: Option<i32>) -> StaticCredentials {
    StaticCredentials::new(Credentials {
        access_token: "access".into(),
        client_token: "client".into(),
        character_id,
        ..Credentials::default()
    })
}

fn map_info(name: &str) -> MapInfo {
    MapInfo {
        width: 256,
        height: 256,
        name: name.into(),
        display_name: name.into(),
        realm_name: String::new(),
        seed: 1,
        background: 0,
        difficulty: 0.0,
        allow_player_teleport: true,
        no_save: false,
        show_displays: true,
        max_players: 85,
        game_opened_time: 0,
        server_version: "1.0.0".into(),
        bg_color: None,
        view_radius: None,
        dungeon_modifiers: None,
        dungeon_modifiers2: None,
        dungeon_modifiers3: None,
        unknown: None,
        max_realm_score: None,
        current_realm_score: None,
    }
}

fn tick(tick_id: i32, statuses: Vec<Status>) -> NewTick {
    NewTick {
        tick_id,
        tick_time: 200,
        server_real_time_ms: tick_id * 200,
        server_last_rtt_ms: 0,
        statuses,
    }
}

fn own_status(object_id: i32, x: f32, y: f32) -> Status {
    Status {
        object_id,
        position: Location::new(x, y),
        stats: vec![],
    }
}

struct Harness {
    config: ClientConfig,
    listener: MemoryListener,
    handle: ClientHandle,
    task: JoinHandle<Result<(), ClientError>>,
}

impl Harness {
    fn start(config: ClientConfig, client: Client<MemoryConnector>, listener: MemoryListener) -> Self {
        let handle = client.handle();
        let task = tokio::spawn(client.run());
        Self {
            config,
            listener,
            handle,
            task,
        }
    }

    fn new(config: ClientConfig, character_id: Option<i32>) -> Self {
        let (connector, listener) = MemoryConnector::pair(64 * 1024);
        let client = Client::with_connector(config.clone(), credentials(character_id), connector).unwrap();
        Self::start(config, client, listener)
    }

    async fn accept(&mut self) -> MemoryPeer {
        let connection = timeout(TIMEOUT, self.listener.accept())
            .await
            .expect("no connection")
            .expect("listener closed");
        connection.into_peer(&self.config.inbound_key, &self.config.outbound_key)
    }

    async fn wait_for(&self, state: ConnectionState) {
        timeout(TIMEOUT, self.handle.wait_for_state(state))
            .await
            .unwrap_or_else(|_| panic!("never reached {state}"))
            .unwrap();
    }

    /// Accepts a connection and plays the login until the session is in game
    async fn login(&mut self, object_id: i32) -> (MemoryPeer, Hello) {
        let mut peer = self.accept().await;
        let hello = expect::<Hello>(&mut peer).await;
        peer.send_record(&map_info("Nexus")).await.unwrap();
        self.wait_for(ConnectionState::InGame).await;
        peer.send_record(&CreateSuccess {
            object_id,
            char_id: 3,
            stats: String::new(),
        })
        .await
        .unwrap();
        (peer, hello)
    }

    async fn finish(self) -> Result<(), ClientError> {
        timeout(TIMEOUT, self.task).await.expect("client did not stop").unwrap()
    }
}

async fn expect<R: Record>(peer: &mut MemoryPeer) -> R {
    timeout(TIMEOUT, peer.expect_record::<R>())
        .await
        .unwrap_or_else(|_| panic!("no {} from client", R::NAME))
        .unwrap()
}

#[tokio::test]
async fn test_handshake_tick_and_move() {
    init_tracing();
    let mut harness = Harness::new(config(), None);

    let mut peer = harness.accept().await;
    let hello = expect::<Hello>(&mut peer).await;
    assert_eq!(hello.build_version, "1.0.0");
    assert_eq!(hello.access_token, "access");
    assert_eq!(hello.client_token, "client");
    assert_eq!(hello.game_id, GAME_ID_NEXUS);
    assert_eq!(hello.key_time, -1);
    assert!(hello.key.is_empty());
    assert_eq!(harness.handle.state(), ConnectionState::Handshaking);

    peer.send_record(&map_info("Nexus")).await.unwrap();
    let create = expect::<Create>(&mut peer).await;
    assert_eq!(create.class_type, 768);
    assert_eq!(create.skin_type, 0);
    harness.wait_for(ConnectionState::InGame).await;

    peer.send_record(&CreateSuccess {
        object_id: 7,
        char_id: 3,
        stats: String::new(),
    })
    .await
    .unwrap();
    peer.send_record(&tick(1, vec![own_status(7, 12.5, 30.5)])).await.unwrap();

    let report = expect::<Move>(&mut peer).await;
    assert_eq!(report.tick_id, 1);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].position, Location::new(12.5, 30.5));
    assert_eq!(report.records[0].time, report.time);

    let snapshot = harness.handle.snapshot();
    assert_eq!(snapshot.object_id, 7);
    assert_eq!(snapshot.char_id, 3);
    assert_eq!(snapshot.map_name, "Nexus");
    assert_eq!(snapshot.position, Location::new(12.5, 30.5));

    peer.send_record(&Ping { serial: 77 }).await.unwrap();
    assert_eq!(expect::<Pong>(&mut peer).await.serial, 77);

    harness.handle.disconnect().await.unwrap();
    let handle = harness.handle.clone();
    assert!(harness.finish().await.is_ok());
    assert_eq!(handle.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_known_character_is_loaded() {
    init_tracing();
    let mut harness = Harness::new(config(), Some(5));

    let mut peer = harness.accept().await;
    expect::<Hello>(&mut peer).await;
    peer.send_record(&map_info("Nexus")).await.unwrap();

    let load = expect::<Load>(&mut peer).await;
    assert_eq!(load.character_id, 5);
    assert!(!load.first_session);

    harness.handle.disconnect().await.unwrap();
    assert!(harness.finish().await.is_ok());
}

#[tokio::test]
async fn test_stale_build_updates_hello() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let config = config();
    let (connector, listener) = MemoryConnector::pair(64 * 1024);
    let client = Client::with_connector(config.clone(), credentials(Some(3)), connector)
        .unwrap()
        .with_config_path(&path);
    let mut harness = Harness::start(config, client, listener);

    let (mut peer, hello) = harness.login(7).await;
    assert_eq!(hello.build_version, "1.0.0");

    peer.send_record(&Failure {
        error_id: 4,
        error_message: "2.0.0".into(),
    })
    .await
    .unwrap();
    harness.wait_for(ConnectionState::Reconnecting).await;

    let mut peer = harness.accept().await;
    let hello = expect::<Hello>(&mut peer).await;
    assert_eq!(hello.build_version, "2.0.0");

    let saved = ClientConfig::load(&path).unwrap();
    assert_eq!(saved.build_version, "2.0.0");

    harness.handle.disconnect().await.unwrap();
    assert!(harness.finish().await.is_ok());
}

#[tokio::test]
async fn test_reconnect_directive_and_bad_key() {
    init_tracing();
    let mut harness = Harness::new(config(), Some(3));
    let (mut peer, _) = harness.login(7).await;

    peer.send_record(&Reconnect {
        name: "Realm of the Mad God".into(),
        host: "10.0.0.9".into(),
        port: 2051,
        game_id: 42,
        key_time: 1234,
        key: vec![1, 2, 3],
    })
    .await
    .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(peer.endpoint, Endpoint::new("10.0.0.9", 2051));
    let hello = expect::<Hello>(&mut peer).await;
    assert_eq!(hello.game_id, 42);
    assert_eq!(hello.key_time, 1234);
    assert_eq!(hello.key, vec![1, 2, 3]);

    // The key is refused; the next attempt goes back to the nexus defaults
    peer.send_record(&Failure {
        error_id: 8,
        error_message: "Bad key".into(),
    })
    .await
    .unwrap();

    let mut peer = harness.accept().await;
    assert_eq!(peer.endpoint, Endpoint::new("10.0.0.9", 2051));
    let hello = expect::<Hello>(&mut peer).await;
    assert_eq!(hello.game_id, GAME_ID_NEXUS);
    assert_eq!(hello.key_time, -1);
    assert!(hello.key.is_empty());

    harness.handle.disconnect().await.unwrap();
    assert!(harness.finish().await.is_ok());
}

#[tokio::test]
async fn test_handshake_rejection_is_surfaced() {
    init_tracing();
    let mut harness = Harness::new(config(), None);

    let mut peer = harness.accept().await;
    expect::<Hello>(&mut peer).await;
    peer.send_record(&Failure {
        error_id: 0,
        error_message: "Account in use".into(),
    })
    .await
    .unwrap();

    match harness.finish().await {
        Err(ClientError::HandshakeRejected { code, message }) => {
            assert_eq!(code, 0);
            assert_eq!(message, "Account in use");
        }
        other => panic!("expected handshake rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_in_game_failure_keeps_session() {
    init_tracing();
    let mut harness = Harness::new(config(), Some(3));
    let (mut peer, _) = harness.login(7).await;

    // Keep-alive and an informational failure
    peer.send_record(&Failure {
        error_id: 0,
        error_message: String::new(),
    })
    .await
    .unwrap();
    peer.send_record(&Failure {
        error_id: 5,
        error_message: "Invalid teleport target".into(),
    })
    .await
    .unwrap();

    peer.send_record(&Ping { serial: 1 }).await.unwrap();
    assert_eq!(expect::<Pong>(&mut peer).await.serial, 1);
    assert_eq!(harness.handle.state(), ConnectionState::InGame);

    harness.handle.disconnect().await.unwrap();
    assert!(harness.finish().await.is_ok());
}

#[tokio::test]
async fn test_decode_anomalies_do_not_end_session() {
    init_tracing();
    let config = config();
    let (connector, listener) = MemoryConnector::pair(64 * 1024);
    let mut client = Client::with_connector(config.clone(), credentials(Some(3)), connector).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    client.on::<Text, _>(move |text| {
        sink.lock().unwrap().push(text.raw_text.clone());
        Ok(())
    });
    client.on::<Text, _>(|_| panic!("subscriber bug"));

    let mut harness = Harness::start(config, client, listener);
    let (mut peer, _) = harness.login(7).await;

    // Unregistered kind, then a truncated Ping
    peer.send_envelope(&Envelope::new(2, Bytes::from_static(&[1, 2, 3]))).await.unwrap();
    peer.send_envelope(&Envelope::new(Ping::KIND, Bytes::from_static(&[0, 0]))).await.unwrap();
    peer.send_record(&Text {
        name: "Alice".into(),
        object_id: 9,
        num_stars: 10,
        bubble_time: 0,
        recipient: String::new(),
        raw_text: "still here".into(),
        clean_text: "still here".into(),
        is_supporter: false,
        star_bg: 0,
    })
    .await
    .unwrap();
    peer.send_record(&Ping { serial: 2 }).await.unwrap();

    assert_eq!(expect::<Pong>(&mut peer).await.serial, 2);
    assert_eq!(*seen.lock().unwrap(), vec!["still here".to_string()]);
    assert_eq!(harness.handle.state(), ConnectionState::InGame);

    harness.handle.disconnect().await.unwrap();
    assert!(harness.finish().await.is_ok());
}

#[tokio::test]
async fn test_garbage_length_forces_reconnect() {
    init_tracing();
    let mut harness = Harness::new(config(), Some(3));
    let (mut peer, _) = harness.login(7).await;

    peer.send_raw(&[0xff, 0xff, 0xff, 0xff, 0x00]).await.unwrap();

    let mut peer = harness.accept().await;
    let hello = expect::<Hello>(&mut peer).await;
    assert_eq!(hello.game_id, GAME_ID_NEXUS);

    harness.handle.disconnect().await.unwrap();
    assert!(harness.finish().await.is_ok());
}

#[tokio::test]
async fn test_send_and_walk() {
    init_tracing();
    let mut harness = Harness::new(config(), Some(3));
    let (mut peer, _) = harness.login(7).await;

    peer.send_record(&tick(1, vec![own_status(7, 10.0, 10.0)])).await.unwrap();
    expect::<Move>(&mut peer).await;

    harness
        .handle
        .send(&PlayerText { text: "hello".into() })
        .await
        .unwrap();
    assert_eq!(expect::<PlayerText>(&mut peer).await.text, "hello");

    harness.handle.walk_to(Location::new(20.0, 10.0)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    peer.send_record(&tick(2, vec![])).await.unwrap();

    let report = expect::<Move>(&mut peer).await;
    assert_eq!(report.tick_id, 2);
    let position = report.records.last().unwrap().position;
    assert!(position.x > 10.0 && position.x <= 20.0, "x = {}", position.x);
    assert!((position.y - 10.0).abs() < 1e-3);

    harness.handle.disconnect().await.unwrap();
    assert!(harness.finish().await.is_ok());
}

#[tokio::test]
async fn test_walk_between_ticks_reports_one_sample_per_window() {
    init_tracing();
    let mut harness = Harness::new(config(), Some(3));
    let (mut peer, _) = harness.login(7).await;

    peer.send_record(&tick(1, vec![own_status(7, 10.0, 10.0)])).await.unwrap();
    let first = expect::<Move>(&mut peer).await;

    harness.handle.walk_to(Location::new(30.0, 10.0)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(450)).await;
    peer.send_record(&tick(2, vec![])).await.unwrap();

    let report = expect::<Move>(&mut peer).await;
    assert!(report.records.len() > 1, "records: {:?}", report.records);

    // Windows are anchored at the previous report
    let windows: Vec<i64> = report
        .records
        .iter()
        .map(|record| ((record.time - first.time) as f64 / 100.0 + 0.5).round() as i64)
        .collect();
    assert!(windows.iter().all(|w| (1..=10).contains(w)), "windows: {windows:?}");
    assert!(windows.windows(2).all(|pair| pair[0] < pair[1]), "windows: {windows:?}");

    let xs: Vec<f32> = report.records.iter().map(|record| record.position.x).collect();
    assert!(xs.windows(2).all(|pair| pair[0] <= pair[1]), "xs: {xs:?}");
    assert!(*xs.last().unwrap() > 10.0);

    harness.handle.disconnect().await.unwrap();
    assert!(harness.finish().await.is_ok());
}

#[tokio::test]
async fn test_ping_burst_is_answered() {
    init_tracing();
    let mut harness = Harness::new(config(), Some(3));
    let (mut peer, _) = harness.login(7).await;

    // Far more reply-generating frames than either link queue holds
    const PINGS: i32 = 1000;
    let mut burst = Vec::new();
    for serial in 0..PINGS {
        burst.extend_from_slice(&Envelope::from_record(&Ping { serial }).unwrap().to_bytes());
    }
    peer.send_raw(&burst).await.unwrap();

    for serial in 0..PINGS {
        assert_eq!(expect::<Pong>(&mut peer).await.serial, serial);
    }

    timeout(TIMEOUT, harness.handle.disconnect()).await.unwrap().unwrap();
    assert!(harness.finish().await.is_ok());
}

#[tokio::test]
async fn test_update_marks_enemies_from_definitions() {
    init_tracing();
    let definitions: MemoryObjectDefinitions = [ObjectDefinition {
        id: 0x0d50,
        name: "Pirate".into(),
        enemy: true,
        ..ObjectDefinition::default()
    }]
    .into_iter()
    .collect();
    let (connector, listener) = MemoryConnector::pair(64 * 1024);
    let client = Client::with_connector(config(), credentials(Some(3)), connector)
        .unwrap()
        .with_object_definitions(definitions);
    let mut harness = Harness::start(config(), client, listener);
    let (mut peer, _) = harness.login(7).await;

    let entity = |object_type: u16, object_id: i32| Entity {
        object_type,
        status: Status {
            object_id,
            position: Location::new(12.0, 12.0),
            stats: vec![],
        },
    };
    peer.send_record(&Update {
        player_position: Location::default(),
        unknown: 0,
        tiles: vec![],
        new_objects: vec![entity(0x0d50, 40), entity(0x0734, 41)],
        drops: vec![],
    })
    .await
    .unwrap();
    expect::<UpdateAck>(&mut peer).await;

    let snapshot = harness.handle.snapshot();
    assert_eq!(snapshot.objects.len(), 2);
    let enemies: Vec<i32> = snapshot.enemies().map(|(id, _)| id).collect();
    assert_eq!(enemies, vec![40]);

    harness.handle.disconnect().await.unwrap();
    assert!(harness.finish().await.is_ok());
}

#[tokio::test]
async fn test_refused_connection_without_auto_reconnect() {
    init_tracing();
    let config = ClientConfig {
        auto_reconnect: false,
        ..config()
    };
    let harness = Harness::new(config, None);
    let Harness { listener, task, .. } = harness;
    drop(listener);

    let result = timeout(TIMEOUT, task).await.unwrap().unwrap();
    assert!(matches!(result, Err(ClientError::Io(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused));
}

#[tokio::test]
async fn test_reconnect_attempts_run_out() {
    init_tracing();
    let config = ClientConfig {
        reconnect_delay_ms: 10,
        max_reconnect_attempts: 2,
        ..config()
    };
    let harness = Harness::new(config, None);
    let Harness { listener, task, .. } = harness;
    drop(listener);

    let result = timeout(TIMEOUT, task).await.unwrap().unwrap();
    match result {
        Err(ClientError::ReconnectExhausted { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected exhaustion, got {other:?}"),
    }
}
