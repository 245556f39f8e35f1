//! Transport seam
//!
//! A [`Transport`] owns one live connection and bridges it to two envelope
//! channels, so the session loop never touches sockets or keystreams. The
//! transport decrypts and frames inbound bytes, and encrypts and writes
//! outbound envelopes in the order they were queued.
//!
//! # Example: a transport that drops everything
//!
//! ```no_run
//! use async_trait::async_trait;
//! use realmlink_protocol::transport::Transport;
//! use realmlink_protocol::Envelope;
//! use tokio::sync::mpsc;
//!
//! struct BlackHole;
//!
//! #[async_trait]
//! impl Transport for BlackHole {
//!     type Error = std::io::Error;
//!
//!     async fn run(
//!         self,
//!         _incoming_tx: mpsc::Sender<Envelope>,
//!         mut outgoing_rx: mpsc::Receiver<Envelope>,
//!     ) -> Result<(), Self::Error> {
//!         while outgoing_rx.recv().await.is_some() {}
//!         Ok(())
//!     }
//! }
//! ```

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::Envelope;

/// Port game servers listen on
pub const DEFAULT_PORT: u16 = 2050;

/// Host and port of a game server
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One connection, bridged to envelope channels
#[async_trait]
pub trait Transport: Send + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Pumps envelopes until the connection ends
    ///
    /// Decoded inbound envelopes go to `incoming_tx`; envelopes received on
    /// `outgoing_rx` are written in order. Returns `Ok(())` when the session
    /// side hangs up (either channel closes), and an error when the
    /// connection itself fails.
    async fn run(
        self,
        incoming_tx: mpsc::Sender<Envelope>,
        outgoing_rx: mpsc::Receiver<Envelope>,
    ) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_display() {
        let endpoint = Endpoint::new("127.0.0.1", DEFAULT_PORT);
        assert_eq!(endpoint.to_string(), "127.0.0.1:2050");
    }
}
