//! # realmlink client
//!
//! Session driver for the realmlink protocol. A [`Client`] owns one account
//! session: it connects, performs the handshake, answers the server's
//! bookkeeping records, reports movement every tick and reconnects when the
//! server or the network asks for it. Everything the session decodes is
//! fanned out to subscribers registered on the client.
//!
//! ## Example
//!
//! ```no_run
//! use realmlink_client::config::ClientConfig;
//! use realmlink_client::credentials::{Credentials, StaticCredentials};
//! use realmlink_client::Client;
//! use realmlink_protocol::messages::incoming::Text;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::load("config.json")?;
//!     let credentials = StaticCredentials::new(Credentials {
//!         access_token: "token".into(),
//!         ..Credentials::default()
//!     });
//!
//!     let mut client = Client::new(config, credentials)?;
//!     client.on::<Text, _>(|text| {
//!         println!("<{}> {}", text.name, text.raw_text);
//!         Ok(())
//!     });
//!
//!     let handle = client.handle();
//!     tokio::spawn(async move {
//!         tokio::signal::ctrl_c().await.ok();
//!         handle.disconnect().await.ok();
//!     });
//!
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod movement;
pub mod player;
pub mod plugin;
pub mod services;
mod session;
pub mod transport;

use std::path::PathBuf;
use std::sync::Arc;

use realmlink_protocol::error::CodecError;
use realmlink_protocol::messages::data::Location;
use realmlink_protocol::{
    ConnectionState, Endpoint, Envelope, IncomingRecord, ProtocolError, Record, RecordRegistry,
    ServerPacket,
};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::config::{ClientConfig, ConfigError};
use crate::credentials::{CredentialError, CredentialProvider};
use crate::dispatch::{Dispatcher, SubscriberResult};
use crate::player::PlayerState;
use crate::plugin::{Extension, ExtensionRegistry};
use crate::services::{DirectPath, MemoryObjectDefinitions, ObjectDefinitions, PathFinder};
use crate::transport::tcp::TcpConnector;
use crate::transport::{Connector, TransportError};

/// Capacity of the command queue shared by all handles
const COMMAND_CAPACITY: usize = 256;

/// Requests from handles to the session task
#[derive(Debug)]
pub(crate) enum Command {
    Send(Envelope),
    Disconnect,
    Reconnect(Option<Endpoint>),
    WalkTo(Location),
}

/// A single account session
///
/// Configure subscribers and extensions, take as many [`ClientHandle`]s as
/// needed, then drive the session with [`Client::run`].
pub struct Client<C: Connector = TcpConnector> {
    config: ClientConfig,
    config_path: Option<PathBuf>,
    endpoint: Endpoint,
    connector: C,
    credentials: Arc<dyn CredentialProvider>,
    registry: RecordRegistry,
    dispatcher: Dispatcher,
    extensions: ExtensionRegistry,
    path_finder: Arc<dyn PathFinder>,
    definitions: Arc<dyn ObjectDefinitions>,
    session_id: Uuid,
    commands_tx: mpsc::Sender<Command>,
    commands_rx: mpsc::Receiver<Command>,
    state_tx: watch::Sender<ConnectionState>,
    snapshot_tx: watch::Sender<PlayerState>,
}

impl Client<TcpConnector> {
    /// Creates a client connecting over TCP
    pub fn new(
        config: ClientConfig,
        credentials: impl CredentialProvider + 'static,
    ) -> Result<Self, ClientError> {
        Self::with_connector(config, credentials, TcpConnector::new())
    }
}

impl<C: Connector> Client<C> {
    /// Creates a client using `connector` to open streams
    pub fn with_connector(
        config: ClientConfig,
        credentials: impl CredentialProvider + 'static,
        connector: C,
    ) -> Result<Self, ClientError> {
        let endpoint = config.endpoint()?;
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (snapshot_tx, _) = watch::channel(PlayerState::default());

        Ok(Self {
            config,
            config_path: None,
            endpoint,
            connector,
            credentials: Arc::new(credentials),
            registry: RecordRegistry::with_server_records(),
            dispatcher: Dispatcher::new(),
            extensions: ExtensionRegistry::new(),
            path_finder: Arc::new(DirectPath),
            definitions: Arc::new(MemoryObjectDefinitions::new()),
            session_id: Uuid::new_v4(),
            commands_tx,
            commands_rx,
            state_tx,
            snapshot_tx,
        })
    }

    /// Writes the config back to `path` whenever the session changes it
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_path_finder(mut self, path_finder: impl PathFinder + 'static) -> Self {
        self.path_finder = Arc::new(path_finder);
        self
    }

    /// Object data used to classify objects entering view
    pub fn with_object_definitions(mut self, definitions: impl ObjectDefinitions + 'static) -> Self {
        self.definitions = Arc::new(definitions);
        self
    }

    /// Replaces the decoder table
    pub fn with_registry(mut self, registry: RecordRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn registry_mut(&mut self) -> &mut RecordRegistry {
        &mut self.registry
    }

    pub fn handle(&self) -> ClientHandle {
        ClientHandle {
            session_id: self.session_id,
            commands: self.commands_tx.clone(),
            state: self.state_tx.subscribe(),
            snapshot: self.snapshot_tx.subscribe(),
        }
    }

    /// Registers a callback for every record of `kind`
    pub fn subscribe<F>(&mut self, kind: u8, callback: F)
    where
        F: FnMut(&ServerPacket) -> SubscriberResult + Send + 'static,
    {
        self.dispatcher.subscribe(kind, callback);
    }

    /// Registers a typed callback for record `R`
    pub fn on<R, F>(&mut self, callback: F)
    where
        R: IncomingRecord,
        F: FnMut(&R) -> SubscriberResult + Send + 'static,
    {
        self.dispatcher.on::<R, F>(callback);
    }

    pub fn add_extension(&mut self, extension: impl Extension + 'static) {
        self.extensions.add(extension);
    }

    /// Runs the session until it is disconnected or gives up
    pub async fn run(mut self) -> Result<(), ClientError> {
        let handle = self.handle();
        self.extensions.install_all(&mut self.dispatcher, &handle);
        drop(handle);

        session::Session::new(self).run().await
    }
}

/// Cloneable remote control for a running [`Client`]
#[derive(Debug, Clone)]
pub struct ClientHandle {
    session_id: Uuid,
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ConnectionState>,
    snapshot: watch::Receiver<PlayerState>,
}

impl ClientHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Latest published player snapshot
    pub fn snapshot(&self) -> PlayerState {
        self.snapshot.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Waits until the session reaches `target`
    pub async fn wait_for_state(&self, target: ConnectionState) -> Result<(), ClientError> {
        let mut state = self.state.clone();
        state
            .wait_for(|current| *current == target)
            .await
            .map_err(|_| ClientError::Stopped)?;
        Ok(())
    }

    fn check_connected(&self) -> Result<(), ClientError> {
        match self.state() {
            ConnectionState::Handshaking | ConnectionState::InGame => Ok(()),
            _ => Err(ClientError::NotConnected),
        }
    }

    /// Queues `record` for the current connection
    pub async fn send<R: Record>(&self, record: &R) -> Result<(), ClientError> {
        self.send_envelope(Envelope::from_record(record)?).await
    }

    pub async fn send_envelope(&self, envelope: Envelope) -> Result<(), ClientError> {
        self.check_connected()?;
        self.commands
            .send(Command::Send(envelope))
            .await
            .map_err(|_| ClientError::Stopped)
    }

    /// Non-blocking [`send`](Self::send), usable from subscribers
    pub fn try_send<R: Record>(&self, record: &R) -> Result<(), ClientError> {
        self.check_connected()?;
        let envelope = Envelope::from_record(record)?;
        self.commands.try_send(Command::Send(envelope)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ClientError::Backpressure,
            mpsc::error::TrySendError::Closed(_) => ClientError::Stopped,
        })
    }

    pub async fn disconnect(&self) -> Result<(), ClientError> {
        self.command(Command::Disconnect).await
    }

    /// Drops the connection and dials the current endpoint again
    pub async fn reconnect(&self) -> Result<(), ClientError> {
        self.command(Command::Reconnect(None)).await
    }

    pub async fn switch_server(&self, endpoint: Endpoint) -> Result<(), ClientError> {
        self.command(Command::Reconnect(Some(endpoint))).await
    }

    /// Plans a route to `target` and walks it on subsequent ticks
    pub async fn walk_to(&self, target: Location) -> Result<(), ClientError> {
        self.command(Command::WalkTo(target)).await
    }

    async fn command(&self, command: Command) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ClientError::Stopped)
    }
}

/// Client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out connecting to {endpoint}")]
    ConnectTimeout { endpoint: Endpoint },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Handshake rejected ({code}): {message}")]
    HandshakeRejected { code: i32, message: String },

    #[error("Cipher desync: {malformed} consecutive malformed records")]
    CipherDesync { malformed: u32 },

    #[error("Not connected")]
    NotConnected,

    #[error("Command queue is full")]
    Backpressure,

    #[error("Client stopped")]
    Stopped,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Gave up after {attempts} failed attempts: {last}")]
    ReconnectExhausted {
        attempts: u32,
        #[source]
        last: Box<ClientError>,
    },
}

impl ClientError {
    /// True when the failure means the keystreams can no longer be trusted
    pub fn is_desync(&self) -> bool {
        matches!(
            self,
            ClientError::CipherDesync { .. } | ClientError::Transport(TransportError::Desync(_))
        )
    }
}
