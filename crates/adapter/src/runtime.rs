//! Adapter runtime integration.
//!
//! Bridges the console's synchronous loop with the async TCP server: events
//! are drained with [`Adapter::try_recv`], signals go out through an
//! [`AdapterLink`].

use std::net::SocketAddr;

use anyhow::{anyhow, Context};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::server::{run_server, ServerConfig};
use crate::session::{ControllerLink, TransportEvent};
use crate::types::{ControllerSignal, PeerAddress};

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundMessage {
    Signal {
        address: PeerAddress,
        signal: ControllerSignal,
    },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    event_rx: mpsc::Receiver<TransportEvent>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    local_addr: SocketAddr,
}

impl Adapter {
    /// Start the server on its own runtime and wait until it is listening.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let (event_tx, event_rx) = mpsc::channel::<TransportEvent>(config.max_pending_events.max(1));
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let server = rt.spawn(run_server(config, event_tx, out_rx, Some(ready_tx)));

        let local_addr = match rt.block_on(ready_rx) {
            Ok(addr) => addr,
            Err(_) => {
                // The server exited before binding; surface its error.
                return Err(match rt.block_on(server) {
                    Ok(Err(e)) => e,
                    Ok(Ok(())) => anyhow!("controller server stopped before listening"),
                    Err(join) => anyhow!("controller server task failed: {join}"),
                });
            }
        };

        Ok(Self {
            _rt: rt,
            event_rx,
            out_tx,
            local_addr,
        })
    }

    /// Start the adapter from environment variables.
    pub fn start_from_env() -> anyhow::Result<Self> {
        Self::start(ServerConfig::from_env())
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn try_recv(&mut self) -> Option<TransportEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Handle for sending signals; cheap to clone
    pub fn link(&self) -> AdapterLink {
        AdapterLink {
            out_tx: self.out_tx.clone(),
        }
    }
}

/// [`ControllerLink`] backed by the running server
#[derive(Debug, Clone)]
pub struct AdapterLink {
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl AdapterLink {
    /// Link over a caller-owned channel (tests, custom servers)
    pub fn from_sender(out_tx: mpsc::UnboundedSender<OutboundMessage>) -> Self {
        Self { out_tx }
    }
}

impl ControllerLink for AdapterLink {
    fn send_signal(&mut self, address: PeerAddress, signal: ControllerSignal) {
        if self
            .out_tx
            .send(OutboundMessage::Signal { address, signal })
            .is_err()
        {
            debug!(%address, ?signal, "adapter stopped; signal dropped");
        }
    }
}
