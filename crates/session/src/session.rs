//! Per-player connection and action-queue state.

use std::collections::VecDeque;

use crate::types::{Action, PeerAddress, PlayerId};

/// One queued controller action with its gesture magnitude
pub type QueuedAction = (Action, u8);

/// What `dequeue` hands back when nothing is waiting
pub const NO_ACTION: QueuedAction = (Action::NoOp, 0);

/// Outcome of queueing an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    Queued,
    /// No session for the player id; the action is dropped
    UnknownPlayer,
    /// Queue at capacity; the newest action is dropped
    QueueFull,
}

/// A controller's session, kept for the life of the registry
#[derive(Debug, Clone)]
pub struct PlayerSession {
    player_id: PlayerId,
    address: PeerAddress,
    connected: bool,
    valid: bool,
    pending: VecDeque<QueuedAction>,
}

impl PlayerSession {
    /// New sessions start connected and not yet validated
    pub fn new(player_id: PlayerId, address: PeerAddress) -> Self {
        Self {
            player_id,
            address,
            connected: true,
            valid: false,
            pending: VecDeque::new(),
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn address(&self) -> PeerAddress {
        self.address
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn validate(&mut self) {
        self.valid = true;
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Append to the tail, unless `cap` is reached
    pub fn enqueue(&mut self, action: Action, magnitude: u8, cap: Option<usize>) -> Enqueue {
        if cap.is_some_and(|cap| self.pending.len() >= cap) {
            return Enqueue::QueueFull;
        }
        self.pending.push_back((action, magnitude));
        Enqueue::Queued
    }

    /// Oldest queued action, or [`NO_ACTION`]
    pub fn dequeue(&mut self) -> QueuedAction {
        self.pending.pop_front().unwrap_or(NO_ACTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> PeerAddress {
        PeerAddress([1, 2, 3, 4, 5, 6])
    }

    #[test]
    fn queue_is_fifo() {
        let mut s = PlayerSession::new(1, addr());
        s.enqueue(Action::MoveLeft, 1, None);
        s.enqueue(Action::Drop, 2, None);
        s.enqueue(Action::Rotate, 3, None);
        assert_eq!(s.dequeue(), (Action::MoveLeft, 1));
        assert_eq!(s.dequeue(), (Action::Drop, 2));
        assert_eq!(s.dequeue(), (Action::Rotate, 3));
        assert_eq!(s.dequeue(), NO_ACTION);
    }

    #[test]
    fn cap_drops_newest() {
        let mut s = PlayerSession::new(1, addr());
        assert_eq!(s.enqueue(Action::MoveLeft, 0, Some(2)), Enqueue::Queued);
        assert_eq!(s.enqueue(Action::MoveRight, 0, Some(2)), Enqueue::Queued);
        assert_eq!(s.enqueue(Action::Drop, 0, Some(2)), Enqueue::QueueFull);
        assert_eq!(s.pending_len(), 2);
        assert_eq!(s.dequeue().0, Action::MoveLeft);
    }

    #[test]
    fn new_session_is_connected_but_not_valid() {
        let s = PlayerSession::new(7, addr());
        assert!(s.is_connected());
        assert!(!s.is_valid());
        assert_eq!(s.player_id(), 7);
        assert_eq!(s.address(), addr());
    }
}
