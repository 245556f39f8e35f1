//! TCP connector

use async_trait::async_trait;
use realmlink_protocol::Endpoint;
use tokio::net::TcpStream;

use super::Connector;

/// Opens plain TCP connections with Nagle disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl TcpConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, endpoint: &Endpoint) -> std::io::Result<TcpStream> {
        tracing::debug!(%endpoint, "Opening TCP connection");
        let stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port)).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}
