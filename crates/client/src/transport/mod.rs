//! Byte-stream transports
//!
//! A [`Connector`] opens a raw duplex stream to an [`Endpoint`];
//! [`StreamTransport`] wraps that stream with the session's keystreams and the
//! frame decoder and runs it as a [`Transport`].

pub mod memory;
pub mod tcp;

use std::time::Duration;

use async_trait::async_trait;
use realmlink_protocol::cipher::{CipherPair, Keystream};
use realmlink_protocol::envelope::FrameDecoder;
use realmlink_protocol::{Endpoint, Envelope, EnvelopeError};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

pub use realmlink_protocol::Transport;

const READ_CHUNK: usize = 8 * 1024;

/// Opens raw streams to game servers
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    async fn connect(&self, endpoint: &Endpoint) -> std::io::Result<Self::Stream>;
}

/// Per-connection limits
#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    /// Longest silence tolerated from the peer
    pub read_timeout: Duration,

    /// Longest a single frame write may take
    pub write_timeout: Duration,

    pub max_frame_len: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(10),
            max_frame_len: realmlink_protocol::DEFAULT_MAX_FRAME_LEN,
        }
    }
}

/// Encrypted, framed transport over any duplex byte stream
///
/// Inbound bytes are decrypted as they arrive, before framing; outbound
/// envelopes are framed, encrypted and written one at a time in queue order,
/// so each keystream advances exactly once per byte.
pub struct StreamTransport<S> {
    stream: S,
    cipher: CipherPair,
    options: StreamOptions,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(stream: S, cipher: CipherPair, options: StreamOptions) -> Self {
        Self {
            stream,
            cipher,
            options,
        }
    }
}

#[async_trait]
impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    type Error = TransportError;

    /// Runs the reader here and the writer as its own task
    ///
    /// The two directions never wait on each other: a burst of inbound frames
    /// that the session answers one by one keeps draining through the writer
    /// while the reader is still delivering.
    async fn run(
        self,
        incoming_tx: mpsc::Sender<Envelope>,
        outgoing_rx: mpsc::Receiver<Envelope>,
    ) -> Result<(), Self::Error> {
        let StreamTransport {
            stream,
            cipher,
            options,
        } = self;
        let (reader, writer) = tokio::io::split(stream);
        let (inbound, outbound) = cipher.into_parts();

        let mut write_task = tokio::spawn(write_frames(writer, outbound, outgoing_rx, options.write_timeout));

        let result = tokio::select! {
            read = read_frames(reader, inbound, incoming_tx, options) => read,
            written = &mut write_task => match written {
                Ok(result) => result,
                Err(e) => Err(TransportError::Io(std::io::Error::other(e))),
            },
        };
        write_task.abort();
        result
    }
}

/// Decrypts, frames and forwards inbound bytes until the peer or the session hangs up
async fn read_frames<R>(
    mut reader: R,
    mut inbound: Box<dyn Keystream>,
    incoming_tx: mpsc::Sender<Envelope>,
    options: StreamOptions,
) -> Result<(), TransportError>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = FrameDecoder::new(options.max_frame_len);
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let n = tokio::time::timeout(options.read_timeout, reader.read(&mut buf))
            .await
            .map_err(|_| TransportError::ReadTimeout(options.read_timeout))??;
        if n == 0 {
            return Err(TransportError::Closed);
        }

        let chunk = &mut buf[..n];
        inbound.apply(chunk);
        decoder.extend(chunk);

        while let Some(envelope) = decoder.next_envelope()? {
            if incoming_tx.send(envelope).await.is_err() {
                return Ok(());
            }
        }
    }
}

/// Frames, encrypts and writes queued envelopes in order
///
/// Returns once the queue closes, after shutting the write half down.
async fn write_frames<W>(
    mut writer: W,
    mut outbound: Box<dyn Keystream>,
    mut outgoing_rx: mpsc::Receiver<Envelope>,
    write_timeout: Duration,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(envelope) = outgoing_rx.recv().await {
        let mut frame = envelope.to_bytes().to_vec();
        outbound.apply(&mut frame);
        tokio::time::timeout(write_timeout, writer.write_all(&frame))
            .await
            .map_err(|_| TransportError::WriteTimeout(write_timeout))??;
    }
    let _ = writer.shutdown().await;
    Ok(())
}

/// Why a connection ended
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed by peer")]
    Closed,

    #[error("No data from peer for {0:?}")]
    ReadTimeout(Duration),

    #[error("Write did not complete within {0:?}")]
    WriteTimeout(Duration),

    /// The inbound stream no longer parses as frames
    #[error("Stream desynchronised: {0}")]
    Desync(#[from] EnvelopeError),
}
