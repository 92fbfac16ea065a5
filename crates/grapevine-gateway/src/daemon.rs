//! Daemon socket relay.
//!
//! One TCP connection per command: write the JSON command, read the reply to
//! EOF, close.  The whole exchange is bounded by `RELAY_TIMEOUT`.

use std::ops::RangeInclusive;
use std::time::Duration;

use grapevine_proto::platform::{self, daemon_address, DAEMON_ADDR_ENV, DAEMON_PORT_RANGE};
use grapevine_proto::protocol::{ApiResponse, DaemonCommand};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

pub const RELAY_TIMEOUT: Duration = Duration::from_secs(3);
const PROBE_TIMEOUT: Duration = Duration::from_millis(200);

/// Body returned for every relay failure.
pub const RELAY_FAILED: &str = "gateway failed to reach daemon";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("daemon socket: {0}")]
    Io(#[from] std::io::Error),
    #[error("daemon did not answer within {0:?}")]
    Timeout(Duration),
    #[error("daemon reply unreadable: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct DaemonSocket {
    addr: String,
    timeout: Duration,
}

impl DaemonSocket {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: RELAY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Relay `cmd` and return the daemon's reply, or the fixed ERR body when
    /// the daemon could not be reached or answered garbage.
    pub async fn send(&self, cmd: &DaemonCommand) -> ApiResponse {
        match self.try_send(cmd).await {
            Ok(resp) => {
                debug!("{:?} -> {:?}", cmd.command, resp.status);
                resp
            }
            Err(e) => {
                warn!("{:?} via {} failed: {}", cmd.command, self.addr, e);
                ApiResponse::err(RELAY_FAILED)
            }
        }
    }

    pub async fn try_send(&self, cmd: &DaemonCommand) -> Result<ApiResponse, RelayError> {
        let payload = serde_json::to_vec(cmd)?;
        let exchange = async {
            let mut stream = TcpStream::connect(&self.addr).await?;
            stream.write_all(&payload).await?;
            let mut buf = Vec::with_capacity(1024);
            stream.read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(buf)
        };
        let buf = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| RelayError::Timeout(self.timeout))??;
        Ok(serde_json::from_slice(&buf)?)
    }
}

/// First port in `ports` on 127.0.0.1 that accepts a connection.
pub async fn discover(ports: RangeInclusive<u16>) -> Option<String> {
    for port in ports {
        let addr = daemon_address(port);
        if let Ok(Ok(_)) = tokio::time::timeout(PROBE_TIMEOUT, TcpStream::connect(&addr)).await {
            return Some(addr);
        }
    }
    None
}

/// Explicit sources in priority order: command line, environment, config.
pub fn pick_address(
    cli: Option<String>,
    env: Option<String>,
    config: Option<String>,
) -> Option<String> {
    cli.or(env)
        .or(config)
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
}

/// Resolve the daemon address, probing the port range when nothing pins it.
pub async fn resolve_address(cli: Option<String>, config: Option<String>) -> String {
    let env = std::env::var(DAEMON_ADDR_ENV).ok();
    if let Some(addr) = pick_address(cli, env, config) {
        info!("daemon address pinned to {}", addr);
        return addr;
    }
    match discover(DAEMON_PORT_RANGE).await {
        Some(addr) => {
            info!("discovered daemon at {}", addr);
            addr
        }
        None => {
            let addr = platform::fallback_daemon_address();
            warn!("no daemon found on ports {:?}, assuming {}", DAEMON_PORT_RANGE, addr);
            addr
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_address_priority() {
        let s = |v: &str| Some(v.to_string());
        assert_eq!(
            pick_address(s("a:1"), s("b:2"), s("c:3")),
            s("a:1")
        );
        assert_eq!(pick_address(None, s("b:2"), s("c:3")), s("b:2"));
        assert_eq!(pick_address(None, None, s(" c:3 ")), s("c:3"));
        assert_eq!(pick_address(None, None, None), None);
        assert_eq!(pick_address(None, s(""), None), None);
    }

    #[tokio::test]
    async fn test_discover_finds_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        assert_eq!(discover(port..=port).await, Some(daemon_address(port)));
    }

    #[tokio::test]
    async fn test_discover_nothing_listening() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        assert_eq!(discover(port..=port).await, None);
    }
}
