//! Session registry - stable player ids over transient connections
//!
//! A session is created the first time an address connects and is never
//! removed; later connections from the same address resume it with the same
//! player id and whatever actions were still queued.
//!
//! Every operation is total: unknown ids and addresses are logged and ignored.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use crate::session::{Enqueue, PlayerSession, QueuedAction, NO_ACTION};
use crate::transport::TransportEvent;
use crate::types::{Action, PeerAddress, PlayerId};

/// Owns every [`PlayerSession`]
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    sessions: BTreeMap<PlayerId, PlayerSession>,
    by_address: HashMap<PeerAddress, PlayerId>,
    next_player_id: PlayerId,
    queue_cap: Option<usize>,
}

impl SessionRegistry {
    /// Registry with unbounded per-player queues
    pub fn new() -> Self {
        Self::with_queue_cap(None)
    }

    /// Registry whose per-player queues reject new actions beyond `cap`
    pub fn with_queue_cap(cap: Option<usize>) -> Self {
        Self {
            sessions: BTreeMap::new(),
            by_address: HashMap::new(),
            next_player_id: 1,
            queue_cap: cap,
        }
    }

    /// Create a session for an unseen address. Existing sessions are left alone.
    ///
    /// Returns the address's player id either way.
    pub fn create_session(&mut self, address: PeerAddress) -> PlayerId {
        if let Some(&id) = self.by_address.get(&address) {
            return id;
        }
        let id = self.next_player_id;
        self.next_player_id += 1;
        self.by_address.insert(address, id);
        self.sessions.insert(id, PlayerSession::new(id, address));
        info!(player_id = id, %address, "new controller session");
        id
    }

    /// Create or resume the session for `address` and mark it connected
    pub fn connect(&mut self, address: PeerAddress) -> PlayerId {
        let id = self.create_session(address);
        self.set_connected(id, true);
        id
    }

    pub fn player_id(&self, address: &PeerAddress) -> Option<PlayerId> {
        self.by_address.get(address).copied()
    }

    pub fn set_connected(&mut self, player_id: PlayerId, connected: bool) -> bool {
        match self.sessions.get_mut(&player_id) {
            Some(session) => {
                session.set_connected(connected);
                true
            }
            None => {
                warn!(player_id, connected, "connection change for unknown player");
                false
            }
        }
    }

    /// Mark a session eligible for a game slot (idempotent)
    pub fn validate(&mut self, player_id: PlayerId) -> bool {
        match self.sessions.get_mut(&player_id) {
            Some(session) => {
                if !session.is_valid() {
                    info!(player_id, "controller validated");
                }
                session.validate();
                true
            }
            None => {
                warn!(player_id, "validation for unknown player");
                false
            }
        }
    }

    pub fn enqueue(&mut self, player_id: PlayerId, action: Action, magnitude: u8) -> Enqueue {
        let Some(session) = self.sessions.get_mut(&player_id) else {
            debug!(player_id, ?action, "action for unknown player dropped");
            return Enqueue::UnknownPlayer;
        };
        let outcome = session.enqueue(action, magnitude, self.queue_cap);
        if outcome == Enqueue::QueueFull {
            warn!(player_id, ?action, "action queue full, dropping newest");
        }
        outcome
    }

    /// Oldest queued action, or `(NoOp, 0)` for an empty queue or unknown id
    pub fn dequeue(&mut self, player_id: PlayerId) -> QueuedAction {
        self.sessions
            .get_mut(&player_id)
            .map(PlayerSession::dequeue)
            .unwrap_or(NO_ACTION)
    }

    /// Validated ids in ascending order, connected or not
    pub fn valid_player_ids(&self) -> Vec<PlayerId> {
        self.sessions
            .values()
            .filter(|s| s.is_valid())
            .map(PlayerSession::player_id)
            .collect()
    }

    pub fn session(&self, player_id: PlayerId) -> Option<&PlayerSession> {
        self.sessions.get(&player_id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &PlayerSession> {
        self.sessions.values()
    }

    /// Addresses of the sessions currently connected
    pub fn connected_addresses(&self) -> Vec<PeerAddress> {
        self.sessions
            .values()
            .filter(|s| s.is_connected())
            .map(PlayerSession::address)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Apply one transport event. Returns the player it concerned, if known.
    pub fn handle_event(&mut self, event: TransportEvent) -> Option<PlayerId> {
        match event {
            TransportEvent::PeerConnected(address) => Some(self.connect(address)),
            TransportEvent::PeerDisconnected(address) => {
                let id = self.known(&address, "disconnect")?;
                self.set_connected(id, false);
                info!(player_id = id, %address, "controller disconnected");
                Some(id)
            }
            TransportEvent::CapabilityConfirmed(address) => {
                let id = self.known(&address, "capability")?;
                self.validate(id);
                Some(id)
            }
            TransportEvent::ActionReceived {
                address,
                action,
                magnitude,
            } => {
                let id = self.known(&address, "action")?;
                self.enqueue(id, action, magnitude);
                Some(id)
            }
        }
    }

    fn known(&self, address: &PeerAddress, what: &str) -> Option<PlayerId> {
        let id = self.player_id(address);
        if id.is_none() {
            debug!(%address, what, "event from unknown address ignored");
        }
        id
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
