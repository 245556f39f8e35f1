//! Session task
//!
//! One task per client runs everything that touches session state: it owns
//! the decoder table, the player snapshot and the movement buffer, decodes
//! every inbound record, answers the server's bookkeeping records and fans
//! records out to subscribers. The transport runs as a separate task per
//! connection; outbound records reach it through a single queue so the
//! outbound keystream sees them in order.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use realmlink_protocol::cipher::CipherPair;
use realmlink_protocol::messages::data::Location;
use realmlink_protocol::messages::incoming::{Failure, MapInfo, NewTick, Reconnect};
use realmlink_protocol::messages::{kinds, outgoing};
use realmlink_protocol::{
    ConnectionState, DecodeError, Endpoint, Envelope, FailureAction, Record, RecordRegistry,
    ServerPacket, Transport,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use crate::chat::ChatMessage;
use crate::config::ClientConfig;
use crate::credentials::{CredentialProvider, Credentials};
use crate::dispatch::Dispatcher;
use crate::movement::MovementBuffer;
use crate::player::PlayerState;
use crate::plugin::ExtensionRegistry;
use crate::services::{ObjectDefinitions, PathFinder, PathFollower};
use crate::transport::{Connector, StreamTransport, TransportError};
use crate::{Client, ClientError, Command};

/// Envelopes buffered between the session and its transport, per direction
const LINK_CAPACITY: usize = 256;

/// Time allowed for queued writes to drain on a clean disconnect
const FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Position sampling period between two `Move` reports; one movement window
const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Key material for the next `Hello`
#[derive(Debug, Clone, PartialEq, Eq)]
struct ReconnectKey {
    game_id: i32,
    key_time: i32,
    key: Vec<u8>,
}

impl Default for ReconnectKey {
    fn default() -> Self {
        Self {
            game_id: outgoing::GAME_ID_NEXUS,
            key_time: -1,
            key: Vec::new(),
        }
    }
}

/// How one connection ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionEnd {
    /// Disconnect requested; stop the session
    Shutdown,
    /// Dial again right away (server directive, failure action or command)
    Reconnect,
}

type TransportTask = JoinHandle<Result<(), TransportError>>;

pub(crate) struct Session<C: Connector> {
    id: Uuid,
    config: ClientConfig,
    config_path: Option<PathBuf>,
    endpoint: Endpoint,
    connector: C,
    credentials: Arc<dyn CredentialProvider>,
    registry: RecordRegistry,
    dispatcher: Dispatcher,
    _extensions: ExtensionRegistry,
    path_finder: Arc<dyn PathFinder>,
    definitions: Arc<dyn ObjectDefinitions>,
    commands: mpsc::Receiver<Command>,
    commands_open: bool,
    state: ConnectionState,
    state_tx: watch::Sender<ConnectionState>,
    snapshot_tx: watch::Sender<PlayerState>,

    reconnect_key: ReconnectKey,
    player: PlayerState,
    movement: MovementBuffer,
    follower: PathFollower,
    /// Session time the follower was last advanced to
    last_step: i64,
    failures: u32,
    malformed_streak: u32,
    started: Instant,
}

impl<C: Connector> Session<C> {
    pub(crate) fn new(client: Client<C>) -> Self {
        let Client {
            config,
            config_path,
            endpoint,
            connector,
            credentials,
            registry,
            dispatcher,
            extensions,
            path_finder,
            definitions,
            session_id,
            commands_tx,
            commands_rx,
            state_tx,
            snapshot_tx,
        } = client;
        // Handles alone keep the command queue open
        drop(commands_tx);

        let follower = PathFollower::new(config.move_speed);
        Self {
            id: session_id,
            config,
            config_path,
            endpoint,
            connector,
            credentials,
            registry,
            dispatcher,
            _extensions: extensions,
            path_finder,
            definitions,
            commands: commands_rx,
            commands_open: true,
            state: ConnectionState::Disconnected,
            state_tx,
            snapshot_tx,
            reconnect_key: ReconnectKey::default(),
            player: PlayerState::default(),
            movement: MovementBuffer::new(),
            follower,
            last_step: 0,
            failures: 0,
            malformed_streak: 0,
            started: Instant::now(),
        }
    }

    pub(crate) async fn run(mut self) -> Result<(), ClientError> {
        tracing::info!(session = %self.id, endpoint = %self.endpoint, "Session starting");

        loop {
            self.set_state(ConnectionState::Connecting)?;

            match self.run_connection().await {
                Ok(ConnectionEnd::Shutdown) => {
                    self.set_state(ConnectionState::Disconnected)?;
                    tracing::info!(session = %self.id, "Session closed");
                    return Ok(());
                }
                Ok(ConnectionEnd::Reconnect) => {
                    tracing::info!(session = %self.id, endpoint = %self.endpoint, "Reconnecting");
                }
                Err(e @ ClientError::HandshakeRejected { .. }) => {
                    tracing::error!(session = %self.id, error = %e, "Handshake rejected");
                    self.set_state(ConnectionState::Disconnected)?;
                    return Err(e);
                }
                Err(e) => {
                    self.failures += 1;
                    tracing::error!(
                        session = %self.id,
                        endpoint = %self.endpoint,
                        attempt = self.failures,
                        error = %e,
                        "Connection lost"
                    );

                    if !self.config.auto_reconnect {
                        self.set_state(ConnectionState::Disconnected)?;
                        return Err(e);
                    }
                    if self.failures > self.config.max_reconnect_attempts {
                        self.set_state(ConnectionState::Disconnected)?;
                        return Err(ClientError::ReconnectExhausted {
                            attempts: self.failures,
                            last: Box::new(e),
                        });
                    }
                }
            }

            self.set_state(ConnectionState::Reconnecting)?;
            if !self.wait_reconnect_delay().await {
                self.set_state(ConnectionState::Disconnected)?;
                tracing::info!(session = %self.id, "Session closed while reconnecting");
                return Ok(());
            }
        }
    }

    /// Sleeps out the reconnect delay; false when a disconnect arrives first
    async fn wait_reconnect_delay(&mut self) -> bool {
        let delay = tokio::time::sleep(self.config.reconnect_delay());
        tokio::pin!(delay);

        loop {
            tokio::select! {
                _ = &mut delay => return true,
                command = self.commands.recv(), if self.commands_open => match command {
                    Some(Command::Disconnect) => return false,
                    Some(Command::Reconnect(endpoint)) => {
                        if let Some(endpoint) = endpoint {
                            self.switch_endpoint(endpoint);
                        }
                        return true;
                    }
                    Some(Command::WalkTo(target)) => self.plan_walk(target),
                    Some(Command::Send(envelope)) => {
                        tracing::warn!(session = %self.id, kind = envelope.kind, "Dropping send while reconnecting");
                    }
                    None => self.commands_open = false,
                },
            }
        }
    }

    async fn run_connection(&mut self) -> Result<ConnectionEnd, ClientError> {
        let endpoint = self.endpoint.clone();
        tracing::info!(session = %self.id, endpoint = %endpoint, "Connecting");

        let stream = tokio::time::timeout(self.config.connect_timeout(), self.connector.connect(&endpoint))
            .await
            .map_err(|_| ClientError::ConnectTimeout {
                endpoint: endpoint.clone(),
            })??;
        let credentials = self.credentials.credentials().await?;

        let cipher = if self.config.plaintext {
            CipherPair::plaintext()
        } else {
            CipherPair::rc4(&self.config.inbound_key, &self.config.outbound_key)
        };
        tracing::debug!(session = %self.id, cipher = cipher.cipher_type().name(), "Connected");
        let (incoming_tx, mut incoming_rx) = mpsc::channel(LINK_CAPACITY);
        let (outgoing_tx, outgoing_rx) = mpsc::channel(LINK_CAPACITY);
        let transport = StreamTransport::new(stream, cipher, self.config.stream_options());
        let mut transport_task: TransportTask = tokio::spawn(transport.run(incoming_tx, outgoing_rx));

        self.set_state(ConnectionState::Handshaking)?;
        self.malformed_streak = 0;

        let result = self
            .drive(&credentials, &outgoing_tx, &mut incoming_rx, &mut transport_task)
            .await;

        // Closing the queue lets the transport flush and shut the stream down
        drop(outgoing_tx);
        if matches!(result, Ok(ConnectionEnd::Shutdown)) {
            let _ = tokio::time::timeout(FLUSH_TIMEOUT, &mut transport_task).await;
        }
        transport_task.abort();
        result
    }

    async fn drive(
        &mut self,
        credentials: &Credentials,
        outgoing: &mpsc::Sender<Envelope>,
        incoming: &mut mpsc::Receiver<Envelope>,
        transport_task: &mut TransportTask,
    ) -> Result<ConnectionEnd, ClientError> {
        let hello = self.hello(credentials);
        send_record(self.id, outgoing, &hello).await?;
        tracing::info!(
            session = %self.id,
            build = %hello.build_version,
            game_id = hello.game_id,
            "Sent Hello"
        );

        let mut sampler = tokio::time::interval(SAMPLE_INTERVAL);
        sampler.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = sampler.tick() => self.sample_position(),
                envelope = incoming.recv() => match envelope {
                    Some(envelope) => {
                        if let Some(end) = self.handle_envelope(envelope, outgoing, credentials).await? {
                            return Ok(end);
                        }
                    }
                    None => return Err(transport_exit(transport_task).await),
                },
                command = self.commands.recv(), if self.commands_open => match command {
                    Some(Command::Send(envelope)) => {
                        tracing::trace!(session = %self.id, kind = envelope.kind, "Sending queued envelope");
                        outgoing.send(envelope).await.map_err(|_| ClientError::NotConnected)?;
                    }
                    Some(Command::Disconnect) => return Ok(ConnectionEnd::Shutdown),
                    Some(Command::Reconnect(endpoint)) => {
                        if let Some(endpoint) = endpoint {
                            self.switch_endpoint(endpoint);
                        }
                        return Ok(ConnectionEnd::Reconnect);
                    }
                    Some(Command::WalkTo(target)) => self.plan_walk(target),
                    None => self.commands_open = false,
                },
            }
        }
    }

    async fn handle_envelope(
        &mut self,
        envelope: Envelope,
        outgoing: &mpsc::Sender<Envelope>,
        credentials: &Credentials,
    ) -> Result<Option<ConnectionEnd>, ClientError> {
        let decoded = match self.registry.decode(envelope.kind, &envelope.payload) {
            Ok(decoded) => decoded,
            Err(DecodeError::UnknownKind(kind)) => {
                tracing::trace!(
                    session = %self.id,
                    kind,
                    name = kinds::name(kind).unwrap_or("?"),
                    len = envelope.payload.len(),
                    "Discarding record without decoder"
                );
                return Ok(None);
            }
            Err(e) => {
                self.malformed_streak += 1;
                tracing::warn!(
                    session = %self.id,
                    kind = envelope.kind,
                    streak = self.malformed_streak,
                    error = %e,
                    "Dropping malformed record"
                );
                if self.malformed_streak > self.config.desync_threshold {
                    return Err(ClientError::CipherDesync {
                        malformed: self.malformed_streak,
                    });
                }
                return Ok(None);
            }
        };
        self.malformed_streak = 0;

        let packet = decoded.packet;
        if decoded.unread > 0 {
            tracing::trace!(
                session = %self.id,
                kind = packet.kind(),
                name = packet.name(),
                unread = decoded.unread,
                "Record left trailing bytes"
            );
        }
        tracing::trace!(session = %self.id, kind = packet.kind(), name = packet.name(), "Received");

        // Subscribers see the record even when it ends the connection
        let outcome = self.handle_packet(&packet, outgoing, credentials).await;
        self.dispatcher.dispatch(&packet);
        outcome
    }

    /// Session bookkeeping for one record, before subscribers see it
    async fn handle_packet(
        &mut self,
        packet: &ServerPacket,
        outgoing: &mpsc::Sender<Envelope>,
        credentials: &Credentials,
    ) -> Result<Option<ConnectionEnd>, ClientError> {
        match packet {
            ServerPacket::Ping(ping) => {
                let pong = outgoing::Pong {
                    serial: ping.serial,
                    time: self.now(),
                };
                send_record(self.id, outgoing, &pong).await?;
            }
            ServerPacket::Update(update) => {
                self.player.apply_update(update, self.definitions.as_ref());
                self.publish();
                send_record(self.id, outgoing, &outgoing::UpdateAck).await?;
            }
            ServerPacket::NewTick(tick) => self.on_new_tick(tick, outgoing).await?,
            ServerPacket::EnemyShoot(_) => {
                let ack = outgoing::ShootAckCounter {
                    time: self.now(),
                    amount: 1,
                };
                send_record(self.id, outgoing, &ack).await?;
            }
            ServerPacket::Goto(goto) => {
                let ack = outgoing::GotoAck {
                    time: self.now(),
                    unknown: false,
                };
                send_record(self.id, outgoing, &ack).await?;
                if self.player.is_own(goto.object_id) {
                    self.player.position = goto.location;
                    self.follower.clear();
                    self.publish();
                }
            }
            ServerPacket::Aoe(aoe) => {
                if self.player.is_hit_by(aoe) {
                    tracing::debug!(session = %self.id, damage = aoe.damage, "Hit by area effect");
                }
                let ack = outgoing::AoeAck {
                    time: self.now(),
                    position: self.player.position,
                };
                send_record(self.id, outgoing, &ack).await?;
            }
            ServerPacket::MapInfo(info) => self.on_map_info(info, outgoing, credentials).await?,
            ServerPacket::CreateSuccess(created) => {
                self.player.object_id = created.object_id;
                self.player.char_id = created.char_id;
                self.publish();
                tracing::info!(
                    session = %self.id,
                    object_id = created.object_id,
                    char_id = created.char_id,
                    "Character ready"
                );
            }
            ServerPacket::Reconnect(directive) => return Ok(Some(self.on_reconnect(directive))),
            ServerPacket::Failure(failure) => return self.on_failure(failure),
            ServerPacket::Text(text) => ChatMessage::from_text(text).log(&self.id),
            ServerPacket::Death(death) => {
                tracing::info!(
                    session = %self.id,
                    char_id = death.char_id,
                    killed_by = %death.killed_by,
                    "Character died"
                );
            }
            _ => {}
        }
        Ok(None)
    }

    async fn on_new_tick(&mut self, tick: &NewTick, outgoing: &mpsc::Sender<Envelope>) -> Result<(), ClientError> {
        self.player.apply_tick(tick);

        let now = self.now_ms();
        if self.movement.is_armed() {
            self.step_follower(now);
        }
        self.publish();

        if !self.movement.is_armed() || !self.player.has_position() {
            return Ok(());
        }

        self.movement.add_sample(now, self.player.position);
        let report = outgoing::Move {
            tick_id: tick.tick_id,
            time: now as i32,
            records: self.movement.records(),
        };
        send_record(self.id, outgoing, &report).await?;
        self.movement.clear(now);
        Ok(())
    }

    async fn on_map_info(
        &mut self,
        info: &MapInfo,
        outgoing: &mpsc::Sender<Envelope>,
        credentials: &Credentials,
    ) -> Result<(), ClientError> {
        tracing::info!(
            session = %self.id,
            map = %info.name,
            width = info.width,
            height = info.height,
            "Map loaded"
        );
        self.player.reset_world();
        self.player.map_name = info.name.clone();

        let known = (self.player.char_id > 0).then_some(self.player.char_id);
        match credentials.character_id.or(known) {
            Some(character_id) => {
                let load = outgoing::Load {
                    character_id,
                    first_session: false,
                };
                send_record(self.id, outgoing, &load).await?;
            }
            None => {
                let create = outgoing::Create {
                    class_type: self.config.default_class,
                    skin_type: 0,
                    is_challenger: false,
                    is_seasonal: false,
                };
                send_record(self.id, outgoing, &create).await?;
            }
        }

        // Reconnect key material is single use
        self.reconnect_key = ReconnectKey::default();
        let now = self.now_ms();
        self.movement.clear(now);
        self.last_step = now;
        self.follower.clear();
        self.failures = 0;
        self.set_state(ConnectionState::InGame)?;
        self.publish();
        Ok(())
    }

    /// Records the current position in the movement buffer between ticks
    fn sample_position(&mut self) {
        if !self.movement.is_armed() || !self.player.has_position() {
            return;
        }
        let now = self.now_ms();
        self.step_follower(now);
        self.movement.add_sample(now, self.player.position);
        self.publish();
    }

    /// Advances along the planned path up to `now`
    fn step_follower(&mut self, now: i64) {
        let elapsed = Duration::from_millis((now - self.last_step).max(0) as u64);
        self.last_step = now;
        if let Some(next) = self.follower.advance(self.player.position, elapsed) {
            self.player.position = next;
        }
    }

    fn on_reconnect(&mut self, directive: &Reconnect) -> ConnectionEnd {
        if !directive.host.is_empty() {
            self.endpoint = Endpoint::new(directive.host.clone(), directive.port);
        }
        self.reconnect_key = ReconnectKey {
            game_id: directive.game_id,
            key_time: directive.key_time,
            key: directive.key.clone(),
        };
        tracing::info!(
            session = %self.id,
            name = %directive.name,
            endpoint = %self.endpoint,
            game_id = directive.game_id,
            "Server requested reconnect"
        );
        ConnectionEnd::Reconnect
    }

    fn on_failure(&mut self, failure: &Failure) -> Result<Option<ConnectionEnd>, ClientError> {
        match failure.action() {
            FailureAction::KeepAlive => {
                tracing::trace!(session = %self.id, "Keep-alive");
                Ok(None)
            }
            FailureAction::UpdateBuild(build) => {
                tracing::warn!(
                    session = %self.id,
                    old = %self.config.build_version,
                    new = %build,
                    "Server expects a different build"
                );
                self.config.build_version = build;
                self.persist_config();
                Ok(Some(ConnectionEnd::Reconnect))
            }
            FailureAction::ClearKey => {
                tracing::warn!(session = %self.id, "Server rejected the session key");
                self.reconnect_key = ReconnectKey::default();
                Ok(Some(ConnectionEnd::Reconnect))
            }
            FailureAction::Report if self.state == ConnectionState::Handshaking => {
                Err(ClientError::HandshakeRejected {
                    code: failure.error_id,
                    message: failure.error_message.clone(),
                })
            }
            FailureAction::Report => {
                tracing::warn!(
                    session = %self.id,
                    code = ?failure.code(),
                    message = %failure.error_message,
                    "Server reported failure"
                );
                Ok(None)
            }
        }
    }

    fn hello(&self, credentials: &Credentials) -> outgoing::Hello {
        outgoing::Hello {
            game_id: self.reconnect_key.game_id,
            build_version: self.config.build_version.clone(),
            access_token: credentials.access_token.clone(),
            key_time: self.reconnect_key.key_time,
            key: self.reconnect_key.key.clone(),
            game_net: self.config.game_net.clone(),
            play_platform: self.config.play_platform.clone(),
            platform_token: credentials.platform_token.clone(),
            client_token: credentials.client_token.clone(),
            client_identification: credentials.client_identification.clone(),
        }
    }

    fn switch_endpoint(&mut self, endpoint: Endpoint) {
        tracing::info!(session = %self.id, from = %self.endpoint, to = %endpoint, "Switching server");
        self.endpoint = endpoint;
        self.reconnect_key = ReconnectKey::default();
    }

    fn plan_walk(&mut self, target: Location) {
        let path = self.path_finder.find_path(self.player.position, target);
        if path.is_empty() {
            tracing::warn!(session = %self.id, x = target.x, y = target.y, "No path to target");
            return;
        }
        tracing::debug!(session = %self.id, waypoints = path.len(), "Walking");
        self.last_step = self.now_ms();
        self.follower.set_path(path);
    }

    fn persist_config(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        if let Err(e) = self.config.save(path) {
            tracing::warn!(session = %self.id, path = %path.display(), error = %e, "Failed to save config");
        }
    }

    fn set_state(&mut self, next: ConnectionState) -> Result<(), ClientError> {
        if self.state == next {
            return Ok(());
        }
        let previous = self.state;
        self.state.transition_to(next)?;
        self.state_tx.send_replace(next);
        tracing::info!(session = %self.id, from = %previous, to = %next, "State changed");
        Ok(())
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.player.clone());
    }

    /// Milliseconds since the session started
    fn now_ms(&self) -> i64 {
        self.started.elapsed().as_millis() as i64
    }

    fn now(&self) -> i32 {
        self.now_ms() as i32
    }
}

async fn send_record<R: Record>(
    session: Uuid,
    outgoing: &mpsc::Sender<Envelope>,
    record: &R,
) -> Result<(), ClientError> {
    let envelope = Envelope::from_record(record)?;
    tracing::trace!(
        session = %session,
        kind = R::KIND,
        name = R::NAME,
        len = envelope.payload.len(),
        "Sending"
    );
    outgoing.send(envelope).await.map_err(|_| ClientError::NotConnected)
}

/// Turns a finished transport task into the error that ended the connection
async fn transport_exit(task: &mut TransportTask) -> ClientError {
    match task.await {
        Ok(Ok(())) => ClientError::Transport(TransportError::Closed),
        Ok(Err(e)) => ClientError::Transport(e),
        Err(e) => ClientError::Io(std::io::Error::other(e)),
    }
}
