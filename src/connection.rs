use crate::error::{HtdError, Result};
use crate::protocol::hex;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Default bound on connecting and on waiting for the response
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Largest response read in one exchange
const RECV_BUF_LEN: usize = 1024;

/// One-shot TCP exchange with the controller
///
/// The device expects a fresh connection for every command, so nothing is
/// kept open between calls.
#[derive(Debug, Clone)]
pub struct Connection {
    host: String,
    port: u16,
    timeout: Duration,
}

impl Connection {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the connect/receive timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the controller's host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Get the controller's port
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one frame and return the single response read
    ///
    /// Returns [`HtdError::Timeout`] if the connection or the response does
    /// not arrive in time. A response of zero bytes (peer closed without
    /// answering) is returned as an empty buffer.
    pub async fn exchange(&self, frame: &[u8]) -> Result<Vec<u8>> {
        let addr = format!("{}:{}", self.host, self.port);

        let mut stream = timeout(self.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| {
                tracing::warn!(addr = %addr, "Connection timed out");
                HtdError::Timeout
            })?
            .map_err(|e| {
                tracing::error!(addr = %addr, error = %e, "Connection failed");
                HtdError::Io(e)
            })?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(addr = %addr, error = %e, "Failed to set TCP_NODELAY");
        }

        tracing::debug!(addr = %addr, command = %hex(frame), "Sending");
        timeout(self.timeout, stream.write_all(frame))
            .await
            .map_err(|_| HtdError::Timeout)??;

        let mut buf = vec![0u8; RECV_BUF_LEN];
        let n = match timeout(self.timeout, stream.read(&mut buf)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                tracing::error!(addr = %addr, error = %e, "Failed to receive");
                return Err(HtdError::Io(e));
            }
            Err(_) => {
                tracing::debug!(
                    addr = %addr,
                    timeout_ms = self.timeout.as_millis(),
                    "Timeout waiting for response"
                );
                return Err(HtdError::Timeout);
            }
        };
        buf.truncate(n);
        tracing::debug!(addr = %addr, bytes = n, response = %hex(&buf), "Received");

        if let Err(e) = stream.shutdown().await {
            tracing::debug!(addr = %addr, error = %e, "Failed to shut down connection");
        }

        Ok(buf)
    }
}
