//! Client configuration
//!
//! Stored as camelCase JSON. Every field has a default, so a partial file (or
//! no file at all) yields a usable configuration.
//!
//! ```
//! use realmlink_client::config::ClientConfig;
//!
//! let config: ClientConfig = serde_json::from_str(r#"{ "host": "10.0.0.5", "buildVersion": "X5.2" }"#).unwrap();
//! assert_eq!(config.host, "10.0.0.5");
//! assert_eq!(config.port, 2050);
//! assert_eq!(config.reconnect_delay_ms, 5000);
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use realmlink_protocol::cipher::{CipherKey, DEFAULT_INBOUND_KEY, DEFAULT_OUTBOUND_KEY};
use realmlink_protocol::transport::DEFAULT_PORT;
use realmlink_protocol::{Endpoint, DEFAULT_MAX_FRAME_LEN};
use serde::{Deserialize, Serialize};

use crate::transport::StreamOptions;

/// Named game servers
///
/// Owned by the configuration and passed explicitly to whoever needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerList(BTreeMap<String, Endpoint>);

impl ServerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, endpoint: Endpoint) -> Option<Endpoint> {
        self.0.insert(name.into(), endpoint)
    }

    pub fn get(&self, name: &str) -> Option<&Endpoint> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Entry of `servers` to connect to; empty means `host`/`port`
    pub server: String,
    pub host: String,
    pub port: u16,
    pub servers: ServerList,

    /// Build string sent in `Hello`; replaced when the server reports a newer one
    pub build_version: String,
    pub game_net: String,
    pub play_platform: String,

    pub auto_reconnect: bool,
    pub reconnect_delay_ms: u64,
    pub max_reconnect_attempts: u32,

    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub max_frame_len: usize,

    /// Consecutive malformed records treated as a desynchronised keystream
    pub desync_threshold: u32,

    pub inbound_key: CipherKey,
    pub outbound_key: CipherKey,

    /// Disables the stream cipher (local test servers only)
    pub plaintext: bool,

    /// Walking speed for path following, in tiles per second
    pub move_speed: f32,

    /// Class sent in `Create` when no character id is known
    pub default_class: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            servers: ServerList::new(),
            build_version: String::new(),
            game_net: "rotmg".to_string(),
            play_platform: "rotmg".to_string(),
            auto_reconnect: true,
            reconnect_delay_ms: 5000,
            max_reconnect_attempts: 3,
            connect_timeout_ms: 10_000,
            read_timeout_ms: 30_000,
            write_timeout_ms: 10_000,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
            desync_threshold: 8,
            inbound_key: DEFAULT_INBOUND_KEY,
            outbound_key: DEFAULT_OUTBOUND_KEY,
            plaintext: false,
            move_speed: 4.0,
            default_class: 768,
        }
    }
}

impl ClientConfig {
    /// Reads a JSON config; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Endpoint of the configured server
    pub fn endpoint(&self) -> Result<Endpoint, ConfigError> {
        if self.server.is_empty() {
            return Ok(Endpoint::new(self.host.clone(), self.port));
        }
        self.servers
            .get(&self.server)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownServer(self.server.clone()))
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn stream_options(&self) -> StreamOptions {
        StreamOptions {
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            write_timeout: Duration::from_millis(self.write_timeout_ms),
            max_frame_len: self.max_frame_len,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server {0:?} is not in the server list")]
    UnknownServer(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = ClientConfig::default();
        config.build_version = "X5.1.0".into();
        config.servers.insert("USWest", Endpoint::new("1.2.3.4", 2050));
        config.server = "USWest".into();
        config.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"buildVersion\""));
        assert!(text.contains("\"reconnectDelayMs\""));

        let loaded = ClientConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.endpoint().unwrap(), Endpoint::new("1.2.3.4", 2050));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "port": 2051, "autoReconnect": false }"#).unwrap();

        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.port, 2051);
        assert!(!config.auto_reconnect);
        assert_eq!(config.max_reconnect_attempts, 3);
        assert_eq!(config.inbound_key, DEFAULT_INBOUND_KEY);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(ClientConfig::load(&path), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_unknown_server_name() {
        let config = ClientConfig {
            server: "EUNorth".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(config.endpoint(), Err(ConfigError::UnknownServer(name)) if name == "EUNorth"));
    }

    #[test]
    fn test_stream_options() {
        let options = ClientConfig::default().stream_options();
        assert_eq!(options.read_timeout, Duration::from_secs(30));
        assert_eq!(options.write_timeout, Duration::from_secs(10));
    }
}
