//! In-memory connector for tests and local tooling
//!
//! Every `connect` creates a fresh `tokio::io::duplex` pipe and hands the far
//! end to the paired [`MemoryListener`], so a scripted server can observe
//! each (re)connection and the endpoint it was aimed at.
//!
//! # Example
//!
//! ```
//! use realmlink_client::transport::memory::MemoryConnector;
//! use realmlink_client::transport::Connector;
//! use realmlink_protocol::Endpoint;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (connector, mut listener) = MemoryConnector::pair(4096);
//!     let _client_end = connector.connect(&Endpoint::new("nexus", 2050)).await.unwrap();
//!
//!     let accepted = listener.accept().await.unwrap();
//!     assert_eq!(accepted.endpoint.host, "nexus");
//! }
//! ```

use async_trait::async_trait;
use realmlink_protocol::cipher::{CipherKey, CipherPair};
use realmlink_protocol::envelope::FrameDecoder;
use realmlink_protocol::{Endpoint, Envelope, Record, ServerPacket};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::mpsc;

use super::{Connector, TransportError};

/// Connector handing out in-memory pipes
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    accept_tx: mpsc::UnboundedSender<MemoryConnection>,
    buffer_size: usize,
}

/// Server side of a [`MemoryConnector`]
#[derive(Debug)]
pub struct MemoryListener {
    accept_rx: mpsc::UnboundedReceiver<MemoryConnection>,
}

/// One accepted pipe
#[derive(Debug)]
pub struct MemoryConnection {
    /// Endpoint the client dialled
    pub endpoint: Endpoint,
    pub stream: DuplexStream,
}

impl MemoryConnector {
    /// Creates a connected connector/listener pair
    pub fn pair(buffer_size: usize) -> (Self, MemoryListener) {
        let (accept_tx, accept_rx) = mpsc::unbounded_channel();
        (
            Self {
                accept_tx,
                buffer_size,
            },
            MemoryListener { accept_rx },
        )
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    type Stream = DuplexStream;

    async fn connect(&self, endpoint: &Endpoint) -> std::io::Result<DuplexStream> {
        let (client, server) = tokio::io::duplex(self.buffer_size);
        self.accept_tx
            .send(MemoryConnection {
                endpoint: endpoint.clone(),
                stream: server,
            })
            .map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "listener dropped")
            })?;
        Ok(client)
    }
}

impl MemoryListener {
    /// Waits for the next connection; `None` once every connector is gone
    pub async fn accept(&mut self) -> Option<MemoryConnection> {
        self.accept_rx.recv().await
    }
}

impl MemoryConnection {
    /// Wraps the pipe as the server end of an encrypted session
    ///
    /// `client_inbound` and `client_outbound` are the keys the client was
    /// configured with; the server encrypts with the former and decrypts with
    /// the latter.
    pub fn into_peer(self, client_inbound: &CipherKey, client_outbound: &CipherKey) -> MemoryPeer {
        MemoryPeer {
            endpoint: self.endpoint,
            stream: self.stream,
            cipher: CipherPair::rc4(client_outbound, client_inbound),
            decoder: FrameDecoder::default(),
        }
    }

    /// Wraps the pipe as the server end of an unencrypted session
    pub fn into_plaintext_peer(self) -> MemoryPeer {
        MemoryPeer {
            endpoint: self.endpoint,
            stream: self.stream,
            cipher: CipherPair::plaintext(),
            decoder: FrameDecoder::default(),
        }
    }
}

/// Scripted server end of one connection
#[derive(Debug)]
pub struct MemoryPeer {
    pub endpoint: Endpoint,
    stream: DuplexStream,
    cipher: CipherPair,
    decoder: FrameDecoder,
}

impl MemoryPeer {
    /// Frames, encrypts and writes one envelope
    pub async fn send_envelope(&mut self, envelope: &Envelope) -> Result<(), TransportError> {
        let mut frame = envelope.to_bytes().to_vec();
        self.cipher.encrypt(&mut frame);
        self.stream.write_all(&frame).await?;
        Ok(())
    }

    pub async fn send_packet(&mut self, packet: &ServerPacket) -> Result<(), TransportError> {
        let envelope = packet
            .to_envelope()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.send_envelope(&envelope).await
    }

    pub async fn send_record<R: Record>(&mut self, record: &R) -> Result<(), TransportError> {
        let envelope = Envelope::from_record(record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.send_envelope(&envelope).await
    }

    /// Writes raw bytes through the cipher, bypassing framing
    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut data = bytes.to_vec();
        self.cipher.encrypt(&mut data);
        self.stream.write_all(&data).await?;
        Ok(())
    }

    /// Reads until one full envelope from the client is available
    pub async fn recv_envelope(&mut self) -> Result<Envelope, TransportError> {
        let mut buf = [0u8; 1024];
        loop {
            if let Some(envelope) = self.decoder.next_envelope()? {
                return Ok(envelope);
            }
            let n = self.stream.read(&mut buf).await?;
            if n == 0 {
                return Err(TransportError::Closed);
            }
            let chunk = &mut buf[..n];
            self.cipher.decrypt(chunk);
            self.decoder.extend(chunk);
        }
    }

    /// Reads envelopes until one of kind `R` arrives and decodes it
    pub async fn expect_record<R: Record>(&mut self) -> Result<R, TransportError> {
        loop {
            let envelope = self.recv_envelope().await?;
            if envelope.kind == R::KIND {
                let mut reader = realmlink_protocol::PacketReader::new(&envelope.payload);
                return R::decode(&mut reader)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into());
            }
            tracing::trace!(kind = envelope.kind, expected = R::NAME, "Skipping record");
        }
    }
}
