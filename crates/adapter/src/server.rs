//! TCP server for controller connections
//!
//! Each connection stands in for one radio link. The server turns the line
//! protocol into [`TransportEvent`]s for the console and routes console
//! signals back to the connection that currently owns the address.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::OutboundMessage;
use crate::session::TransportEvent;
use crate::types::{PeerAddress, CONTROLLER_NAME};

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Capacity of the event channel to the console. Gestures that find it
    /// full are rejected with `backpressure`.
    pub max_pending_events: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_pending_events: 64,
        }
    }
}

impl ServerConfig {
    /// Create from `BLOCK_BASH_HOST`, `BLOCK_BASH_PORT` and `BLOCK_BASH_MAX_PENDING`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create from any key/value source. Unparseable values and a zero
    /// event capacity fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let host = lookup("BLOCK_BASH_HOST").unwrap_or(defaults.host);
        let port = lookup("BLOCK_BASH_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_events = lookup("BLOCK_BASH_MAX_PENDING")
            .and_then(|s| s.trim().parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.max_pending_events);

        Self {
            host,
            port,
            max_pending_events,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

/// Live connection owning an address
struct PeerHandle {
    conn_id: u64,
    signal_capable: bool,
    tx: mpsc::UnboundedSender<ConsoleMessage>,
}

/// Shared server state
struct ServerState {
    peers: RwLock<HashMap<PeerAddress, PeerHandle>>,
}

impl ServerState {
    fn new() -> Self {
        Self {
            peers: RwLock::new(HashMap::new()),
        }
    }
}

/// Start the TCP server
///
/// `ready_tx` receives the bound address once the listener is up (useful
/// with port 0).
pub async fn run_server(
    config: ServerConfig,
    event_tx: mpsc::Sender<TransportEvent>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let bound = listener.local_addr()?;
    info!(%bound, "controller server listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new());

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let mut seq: u64 = 0;
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::Signal { address, signal } => {
                        let peers = state.peers.read().await;
                        match peers.get(&address) {
                            Some(peer) if peer.signal_capable => {
                                seq += 1;
                                let _ = peer.tx.send(create_signal(seq, signal));
                            }
                            Some(_) => {
                                debug!(%address, ?signal, "peer has no signal characteristic");
                            }
                            None => {
                                debug!(%address, ?signal, "signal for offline peer dropped");
                            }
                        }
                    }
                }
            }
        });
    }

    let mut conn_id_counter = 0u64;

    loop {
        let (socket, remote) = listener.accept().await?;
        conn_id_counter += 1;
        let conn_id = conn_id_counter;
        debug!(conn_id, %remote, "connection accepted");

        let state = Arc::clone(&state);
        let event_tx = event_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, conn_id, state, event_tx).await {
                warn!(conn_id, error = %e, "connection error");
            }
            debug!(conn_id, "connection closed");
        });
    }
}

/// Handle a single controller connection
async fn handle_client(
    socket: TcpStream,
    conn_id: u64,
    state: Arc<ServerState>,
    event_tx: mpsc::Sender<TransportEvent>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let (tx, mut rx) = mpsc::unbounded_channel::<ConsoleMessage>();

    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(256);
        while let Some(msg) = rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &msg).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let mut line: Vec<u8> = Vec::with_capacity(256);
    let mut peer: Option<PeerAddress> = None;
    let mut validated = false;
    let mut read_error = None;

    loop {
        line.clear();
        let bytes_read = match reader.read_until(b'\n', &mut line).await {
            Ok(n) => n,
            Err(e) => {
                read_error = Some(e);
                break;
            }
        };
        if bytes_read == 0 {
            break;
        }

        let Ok(text) = std::str::from_utf8(&line) else {
            debug!(conn_id, "line is not valid UTF-8");
            let _ = tx.send(create_error(
                0,
                ErrorCode::InvalidMessage,
                "line is not valid UTF-8",
            ));
            continue;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                if peer.is_some() {
                    let _ = tx.send(create_error(
                        hello.seq,
                        ErrorCode::InvalidMessage,
                        "hello already received",
                    ));
                    continue;
                }

                if hello.name != CONTROLLER_NAME {
                    info!(conn_id, name = %hello.name, "peer rejected by name");
                    let _ = tx.send(create_error(
                        hello.seq,
                        ErrorCode::NameRejected,
                        &format!("expected name {CONTROLLER_NAME}"),
                    ));
                    break;
                }

                let claimed = {
                    let mut peers = state.peers.write().await;
                    if peers.contains_key(&hello.address) {
                        false
                    } else {
                        peers.insert(
                            hello.address,
                            PeerHandle {
                                conn_id,
                                signal_capable: false,
                                tx: tx.clone(),
                            },
                        );
                        true
                    }
                };
                if !claimed {
                    warn!(conn_id, address = %hello.address, "address already connected");
                    let _ = tx.send(create_error(
                        hello.seq,
                        ErrorCode::AddressInUse,
                        "address is already connected",
                    ));
                    break;
                }

                peer = Some(hello.address);
                let _ = tx.send(create_welcome(hello.seq));
                if event_tx
                    .send(TransportEvent::PeerConnected(hello.address))
                    .await
                    .is_err()
                {
                    break;
                }
            }

            Ok(ParsedMessage::Capabilities(caps)) => {
                let Some(address) = peer else {
                    let _ = tx.send(create_error(
                        caps.seq,
                        ErrorCode::HandshakeRequired,
                        "send hello before capabilities",
                    ));
                    continue;
                };

                if caps.has_signal() {
                    let mut peers = state.peers.write().await;
                    if let Some(handle) = peers.get_mut(&address) {
                        handle.signal_capable = true;
                    }
                }

                if !caps.has_gesture() {
                    debug!(%address, "peer lacks the gesture characteristic");
                    continue;
                }
                if !validated {
                    validated = true;
                    if event_tx
                        .send(TransportEvent::CapabilityConfirmed(address))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            }

            Ok(ParsedMessage::Gesture(gesture)) => {
                let Some(address) = peer.filter(|_| validated) else {
                    let _ = tx.send(create_error(
                        gesture.seq,
                        ErrorCode::HandshakeRequired,
                        "send hello and capabilities before gestures",
                    ));
                    continue;
                };

                let event = TransportEvent::ActionReceived {
                    address,
                    action: gesture.action(),
                    magnitude: gesture.magnitude,
                };
                match event_tx.try_send(event) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        let _ = tx.send(create_error(
                            gesture.seq,
                            ErrorCode::Backpressure,
                            "console event queue is full",
                        ));
                    }
                    Err(TrySendError::Closed(_)) => break,
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                let _ = tx.send(create_error(
                    unknown.seq,
                    ErrorCode::InvalidMessage,
                    &format!("unknown message type {}", unknown.msg_type),
                ));
            }

            Err(e) => {
                let _ = tx.send(create_error(
                    0,
                    ErrorCode::InvalidMessage,
                    &format!("parse error: {e}"),
                ));
            }
        }
    }

    // The disconnect is queued before the address is released, so a
    // reconnect on a new connection is always seen after it.
    if let Some(address) = peer {
        let _ = event_tx
            .send(TransportEvent::PeerDisconnected(address))
            .await;
        let mut peers = state.peers.write().await;
        if peers.get(&address).is_some_and(|p| p.conn_id == conn_id) {
            peers.remove(&address);
        }
    }

    drop(tx);
    let _ = write_task.await;

    match read_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7878);
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:7878".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_config_from_lookup() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BLOCK_BASH_HOST", "0.0.0.0"),
            ("BLOCK_BASH_PORT", "9000"),
            ("BLOCK_BASH_MAX_PENDING", "8"),
        ]));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.max_pending_events, 8);
    }

    #[test]
    fn test_bad_port_falls_back_to_default() {
        for bad in ["nope", "70000", "-1", ""] {
            let config = ServerConfig::from_lookup(move |key| {
                (key == "BLOCK_BASH_PORT").then(|| bad.to_string())
            });
            assert_eq!(config.port, 7878, "{bad}");
        }
    }

    #[test]
    fn test_zero_pending_falls_back_to_default() {
        let config = ServerConfig::from_lookup(lookup(&[("BLOCK_BASH_MAX_PENDING", "0")]));
        assert_eq!(config.max_pending_events, 64);
        assert_eq!(ServerConfig::from_lookup(lookup(&[])), ServerConfig::default());
    }
}
