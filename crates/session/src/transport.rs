//! Transport boundary
//!
//! The radio (or its TCP stand-in) is reduced to events flowing in and
//! signals flowing out, so the console can run against anything that speaks
//! these two types.

use crate::types::{Action, ControllerSignal, PeerAddress};

/// Events a transport delivers to the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// A peer connected (first time or again)
    PeerConnected(PeerAddress),
    /// A peer's connection dropped; its session lives on
    PeerDisconnected(PeerAddress),
    /// The peer exposes the gesture characteristic
    CapabilityConfirmed(PeerAddress),
    /// A gesture read produced an action
    ActionReceived {
        address: PeerAddress,
        action: Action,
        magnitude: u8,
    },
}

impl TransportEvent {
    pub fn address(&self) -> PeerAddress {
        match *self {
            TransportEvent::PeerConnected(a)
            | TransportEvent::PeerDisconnected(a)
            | TransportEvent::CapabilityConfirmed(a) => a,
            TransportEvent::ActionReceived { address, .. } => address,
        }
    }
}

/// Outbound, fire-and-forget signals to controllers
pub trait ControllerLink {
    fn send_signal(&mut self, address: PeerAddress, signal: ControllerSignal);

    fn send_ready(&mut self, address: PeerAddress) {
        self.send_signal(address, ControllerSignal::Ready);
    }

    fn send_pause(&mut self, address: PeerAddress) {
        self.send_signal(address, ControllerSignal::Paused);
    }

    fn send_player_slot(&mut self, address: PeerAddress, slot: u8) {
        self.send_signal(address, ControllerSignal::PlayerSlot(slot));
    }
}

impl<T: ControllerLink + ?Sized> ControllerLink for &mut T {
    fn send_signal(&mut self, address: PeerAddress, signal: ControllerSignal) {
        (**self).send_signal(address, signal);
    }
}

/// Link that keeps every signal it was asked to send
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingLink {
    pub sent: Vec<(PeerAddress, ControllerSignal)>,
}

impl RecordingLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals sent to one address, in order
    pub fn sent_to(&self, address: PeerAddress) -> Vec<ControllerSignal> {
        self.sent
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, s)| *s)
            .collect()
    }
}

impl ControllerLink for RecordingLink {
    fn send_signal(&mut self, address: PeerAddress, signal: ControllerSignal) {
        self.sent.push((address, signal));
    }
}
