//! Per-call TCP transport
//!
//! Each call opens a fresh connection, writes one JSON request, reads one
//! JSON response and drops the connection. The service may keep its side
//! open after replying, so reading stops as soon as the buffer holds a
//! complete JSON value rather than waiting for EOF.

use crate::error::TransportError;
use crate::messages::{action::ActionRequest, response::ActionResponse};
use crate::transport::{Transport, config::TransportConfig};
use async_trait::async_trait;
use serde::de::IgnoredAny;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

const READ_CHUNK: usize = 4096;

/// Framing state of a partially received response
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    /// More bytes may complete the value
    Incomplete,
    /// A full value (or bytes that can never become one) is buffered
    Complete,
}

fn frame_state(buf: &[u8]) -> Frame {
    if buf.iter().all(u8::is_ascii_whitespace) {
        return Frame::Incomplete;
    }
    let mut values = serde_json::Deserializer::from_slice(buf).into_iter::<IgnoredAny>();
    match values.next() {
        Some(Err(e)) if e.is_eof() => Frame::Incomplete,
        // Garbage never becomes valid JSON; hand it to the decoder as-is
        Some(_) => Frame::Complete,
        None => Frame::Incomplete,
    }
}

/// TCP transport, one connection per call
#[derive(Debug, Clone)]
pub struct TcpTransport {
    config: TransportConfig,
}

impl TcpTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    async fn connect(&self) -> Result<TcpStream, TransportError> {
        let address = self.config.address();
        match timeout(self.config.connect_timeout, TcpStream::connect(&address)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(TransportError::Connection(format!("{}: {}", address, e))),
            Err(_) => Err(TransportError::Connection(format!(
                "{}: connect timed out",
                address
            ))),
        }
    }

    async fn exchange(&self, stream: &mut TcpStream, payload: &[u8]) -> Result<Vec<u8>, TransportError> {
        stream
            .write_all(payload)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;

        let limit = self.config.max_response_bytes;
        let mut buf = Vec::with_capacity(READ_CHUNK);
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = stream
                .read(&mut chunk)
                .await
                .map_err(|e| TransportError::Receive(e.to_string()))?;
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if frame_state(&buf) == Frame::Complete {
                break;
            }
            if buf.len() > limit {
                return Err(TransportError::ResponseTooLarge(limit));
            }
        }
        Ok(buf)
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn try_call(&self, request: &ActionRequest) -> Result<ActionResponse, TransportError> {
        let payload = request.encode()?;
        let mut stream = self.connect().await?;

        let bytes = timeout(
            self.config.request_timeout,
            self.exchange(&mut stream, &payload),
        )
        .await
        .map_err(|_| TransportError::Timeout)??;

        log::trace!(
            "{} -> {}",
            request.action(),
            String::from_utf8_lossy(&bytes)
        );
        ActionResponse::decode(&bytes)
    }
}
