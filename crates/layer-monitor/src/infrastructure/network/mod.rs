//! Network infrastructure: the connection loop to the kanata daemon.
//!
//! kanata's TCP server writes one JSON message per line.  The loop:
//!
//! ```text
//!           ┌──────────── redial (stream ended, reconnect.enabled) ───────────┐
//!           ▼                                                                 │
//!   Connecting ──dial ok──► Streaming ──EOF / read error──► Disconnected ─────┘
//!       │
//!       └─dial failed──► show "Error" ──► retry allowed? ──yes──► sleep, redial
//!                                              │
//!                                              no
//!                                              ▼
//!                                          Terminated
//! ```
//!
//! With the default [`ReconnectPolicy`] a failed dial terminates the loop
//! after a single attempt, while a stream that ends is redialled at once.
//! No timeouts are applied to the dial or to reads; a silent daemon simply
//! leaves the loop waiting.  A line longer than [`MAX_LINE_LEN`] ends the
//! stream like a read error does.

use layer_monitor_core::{Configuration, ReconnectPolicy, SyntheticState};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, error, info, warn};

use crate::application::monitor_layer::LayerMonitor;

/// Longest accepted status line, newline included.
pub const MAX_LINE_LEN: usize = 64 * 1024;

/// Errors raised while talking to the daemon.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The TCP connection to the daemon could not be established.
    #[error("failed to connect to kanata at {addr}: {source}")]
    Dial {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// An I/O error occurred on the established connection.
    #[error("connection I/O error: {0}")]
    Read(#[from] std::io::Error),
    /// The daemon sent more than `limit` bytes without a newline.
    #[error("status line exceeds {limit} bytes without a newline")]
    LineTooLong { limit: usize },
}

/// Where the connection loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected; a redial is pending.
    Disconnected,
    /// Dialling the daemon.
    Connecting,
    /// Connected and reading lines.
    Streaming,
    /// The loop has given up; `"Error"` is on display.
    Terminated,
}

/// Dials the daemon and feeds its status lines to a [`LayerMonitor`].
#[derive(Debug, Clone)]
pub struct ConnectionLoop {
    host: String,
    port: u16,
    policy: ReconnectPolicy,
    state: ConnectionState,
}

impl ConnectionLoop {
    pub fn new(host: impl Into<String>, port: u16, policy: ReconnectPolicy) -> Self {
        Self {
            host: host.into(),
            port,
            policy,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::new(config.host.clone(), config.port, config.reconnect.clone())
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// `host:port` being dialled.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Runs until the reconnect policy gives up.
    ///
    /// Every failed dial shows the synthetic `"Error"` state; so does a
    /// closed stream when reconnecting is disabled.
    pub async fn run(&mut self, monitor: &mut LayerMonitor) {
        let mut failed_dials = 0u32;

        loop {
            self.state = ConnectionState::Connecting;
            debug!(addr = %self.address(), "dialling kanata");

            let stream = match self.dial().await {
                Ok(stream) => stream,
                Err(e) => {
                    error!("{e}");
                    monitor.show_state(SyntheticState::Error);
                    failed_dials = failed_dials.saturating_add(1);

                    if !self.policy.allows_redial(failed_dials) {
                        info!(attempts = failed_dials, "giving up on kanata connection");
                        self.state = ConnectionState::Terminated;
                        return;
                    }

                    let delay = self.policy.retry_delay(failed_dials);
                    info!("redialling kanata in {delay:?}");
                    self.state = ConnectionState::Disconnected;
                    tokio::time::sleep(delay).await;
                    continue;
                }
            };

            failed_dials = 0;
            self.state = ConnectionState::Streaming;
            info!("Connected to kanata at {}", self.address());

            match stream_lines(BufReader::new(stream), monitor).await {
                Ok(()) => info!("kanata closed the connection"),
                Err(e) => warn!("{e}"),
            }
            self.state = ConnectionState::Disconnected;

            if !self.policy.enabled {
                monitor.show_state(SyntheticState::Error);
                self.state = ConnectionState::Terminated;
                return;
            }
            info!("reconnecting to kanata at {}", self.address());
        }
    }

    async fn dial(&self) -> Result<TcpStream, ConnectionError> {
        TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(|source| ConnectionError::Dial {
                addr: self.address(),
                source,
            })
    }
}

/// Reads newline-delimited messages from `reader` until end of input.
///
/// A final line without a trailing newline is still handled.  Lines are
/// read at most [`MAX_LINE_LEN`] bytes at a time, so a peer that never
/// sends a newline cannot grow the buffer without bound.
///
/// # Errors
///
/// Returns [`ConnectionError::Read`] if the underlying reader fails and
/// [`ConnectionError::LineTooLong`] once a line reaches [`MAX_LINE_LEN`]
/// bytes without a newline.
pub async fn stream_lines<R>(mut reader: R, monitor: &mut LayerMonitor) -> Result<(), ConnectionError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = (&mut reader)
            .take(MAX_LINE_LEN as u64)
            .read_until(b'\n', &mut line)
            .await?;
        if n == 0 {
            return Ok(());
        }
        if n == MAX_LINE_LEN && line.last() != Some(&b'\n') {
            return Err(ConnectionError::LineTooLong {
                limit: MAX_LINE_LEN,
            });
        }
        monitor.handle_line(&line);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, RwLock};
    use std::time::Duration;

    use layer_monitor_core::IconCache;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    use super::*;
    use crate::application::show_layer::{DisplayContext, LayerDisplay};
    use crate::infrastructure::tray::mock::{RecordingSink, RecordingTray};

    const TEST_TIMEOUT: Duration = Duration::from_secs(5);

    fn make_monitor() -> (LayerMonitor, Arc<RecordingTray>, Arc<RecordingSink>) {
        let tray = Arc::new(RecordingTray::new());
        let sink = Arc::new(RecordingSink::new());
        let display = LayerDisplay::new(DisplayContext {
            config: Arc::new(RwLock::new(Configuration::default())),
            icons: Arc::new(IconCache::new()),
            default_icon: b"default",
            tray: Arc::clone(&tray) as _,
            sink: Arc::clone(&sink) as _,
        });
        (LayerMonitor::new(display), tray, sink)
    }

    /// Returns a local port that nothing is listening on.
    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    // ── stream_lines ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_stream_lines_handles_split_reads() {
        // Arrange: one message arrives in two TCP segments.
        let mock = tokio_test::io::Builder::new()
            .read(b"{\"LayerChange\":{\"new\"")
            .read(b":\"nav\"}}\n{\"LayerChange\":{\"new\":\"base\"}}")
            .build();
        let (mut monitor, tray, _sink) = make_monitor();

        // Act
        let result = stream_lines(BufReader::new(mock), &mut monitor).await;

        // Assert
        assert!(result.is_ok());
        assert_eq!(tray.titles(), vec![" nav", " base"]);
    }

    #[tokio::test]
    async fn test_stream_lines_reports_read_errors() {
        let mock = tokio_test::io::Builder::new()
            .read(b"{\"LayerChange\":{\"new\":\"nav\"}}\n")
            .read_error(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let (mut monitor, tray, _sink) = make_monitor();

        let result = stream_lines(BufReader::new(mock), &mut monitor).await;

        assert!(matches!(result, Err(ConnectionError::Read(_))));
        assert_eq!(tray.titles(), vec![" nav"]);
    }

    #[tokio::test]
    async fn test_stream_lines_rejects_line_without_newline_past_limit() {
        // Arrange: one good line, then a flood with no newline.
        let mut payload = b"{\"LayerChange\":{\"new\":\"nav\"}}\n".to_vec();
        payload.extend(std::iter::repeat(b'a').take(MAX_LINE_LEN + 10));
        let (mut monitor, tray, _sink) = make_monitor();

        // Act
        let result = stream_lines(payload.as_slice(), &mut monitor).await;

        // Assert: the flood is never handed to the decoder.
        assert!(matches!(
            result,
            Err(ConnectionError::LineTooLong { limit: MAX_LINE_LEN })
        ));
        assert_eq!(tray.titles(), vec![" nav"]);
    }

    #[tokio::test]
    async fn test_stream_lines_accepts_line_at_limit() {
        // Whitespace padding keeps the message valid JSON.
        let mut line = b"{\"LayerChange\":{\"new\":\"nav\"}}".to_vec();
        line.resize(MAX_LINE_LEN - 1, b' ');
        line.push(b'\n');
        let (mut monitor, tray, _sink) = make_monitor();

        let result = stream_lines(line.as_slice(), &mut monitor).await;

        assert!(result.is_ok());
        assert_eq!(tray.titles(), vec![" nav"]);
    }

    #[tokio::test]
    async fn test_overlong_line_ends_stream_and_redials() {
        // Arrange: the first connection floods, the second behaves.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut first, _) = listener.accept().await.unwrap();
            // The client hangs up mid-flood, so the write may fail.
            let _ = first.write_all(&vec![b'a'; MAX_LINE_LEN * 2]).await;
            drop(first);

            let (mut second, _) = listener.accept().await.unwrap();
            second.write_all(b"{\"LayerChange\":{\"new\":\"nav\"}}\n").await.unwrap();
            drop(listener);
            drop(second);
        });
        let mut connection = ConnectionLoop::new("127.0.0.1", port, ReconnectPolicy::default());
        let (mut monitor, tray, _sink) = make_monitor();

        // Act
        tokio::time::timeout(TEST_TIMEOUT, connection.run(&mut monitor))
            .await
            .expect("loop must give up once the listener is gone");
        server.await.unwrap();

        // Assert
        assert_eq!(tray.titles(), vec![" nav", " Error"]);
        assert_eq!(connection.state(), ConnectionState::Terminated);
    }

    // ── ConnectionLoop ────────────────────────────────────────────────────────

    #[test]
    fn test_from_config_uses_host_port_and_policy() {
        let mut config = Configuration::default();
        config.port = 4545;

        let connection = ConnectionLoop::from_config(&config);

        assert_eq!(connection.address(), "127.0.0.1:4545");
        assert_eq!(connection.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_failed_dial_shows_error_and_terminates() {
        // Arrange
        let port = closed_port().await;
        let mut connection = ConnectionLoop::new("127.0.0.1", port, ReconnectPolicy::default());
        let (mut monitor, tray, sink) = make_monitor();

        // Act
        tokio::time::timeout(TEST_TIMEOUT, connection.run(&mut monitor))
            .await
            .expect("loop must give up");

        // Assert
        assert_eq!(connection.state(), ConnectionState::Terminated);
        assert_eq!(tray.titles(), vec![" Error"]);
        assert_eq!(sink.writes(), vec!["Error"]);
    }

    #[tokio::test]
    async fn test_each_failed_dial_reannounces_error() {
        let port = closed_port().await;
        let policy = ReconnectPolicy {
            dial_attempts: 3,
            retry_delay_ms: 1,
            ..Default::default()
        };
        let mut connection = ConnectionLoop::new("127.0.0.1", port, policy);
        let (mut monitor, tray, _sink) = make_monitor();

        tokio::time::timeout(TEST_TIMEOUT, connection.run(&mut monitor))
            .await
            .expect("loop must give up");

        assert_eq!(tray.titles(), vec![" Error", " Error", " Error"]);
    }

    #[tokio::test]
    async fn test_closed_stream_is_redialled() {
        // Arrange: serve two connections, then stop listening.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut first, _) = listener.accept().await.unwrap();
            first.write_all(b"{\"LayerChange\":{\"new\":\"base\"}}\n").await.unwrap();
            drop(first);

            let (mut second, _) = listener.accept().await.unwrap();
            second.write_all(b"{\"LayerChange\":{\"new\":\"nav\"}}\n").await.unwrap();
            drop(listener);
            drop(second);
        });
        let mut connection = ConnectionLoop::new("127.0.0.1", port, ReconnectPolicy::default());
        let (mut monitor, tray, _sink) = make_monitor();

        // Act
        tokio::time::timeout(TEST_TIMEOUT, connection.run(&mut monitor))
            .await
            .expect("loop must give up once the listener is gone");
        server.await.unwrap();

        // Assert
        assert_eq!(tray.titles(), vec![" base", " nav", " Error"]);
        assert_eq!(connection.state(), ConnectionState::Terminated);
    }

    #[tokio::test]
    async fn test_disabled_reconnect_shows_error_when_stream_ends() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"{\"LayerChange\":{\"new\":\"nav\"}}\n").await.unwrap();
        });
        let policy = ReconnectPolicy {
            enabled: false,
            ..Default::default()
        };
        let mut connection = ConnectionLoop::new("127.0.0.1", port, policy);
        let (mut monitor, tray, sink) = make_monitor();

        // Act
        tokio::time::timeout(TEST_TIMEOUT, connection.run(&mut monitor))
            .await
            .expect("loop must stop after the stream ends");
        server.await.unwrap();

        // Assert
        assert_eq!(tray.titles(), vec![" nav", " Error"]);
        assert_eq!(sink.last().as_deref(), Some("Error"));
        assert_eq!(connection.state(), ConnectionState::Terminated);
    }
}
