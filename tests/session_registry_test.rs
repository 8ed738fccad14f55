//! Session identity and action queues across connects and disconnects.

use block_bash::session::{Enqueue, SessionRegistry, TransportEvent};
use block_bash::types::{Action, PeerAddress};

fn addr(n: u8) -> PeerAddress {
    PeerAddress([0x24, 0x0a, 0xc4, 0x10, 0x20, n])
}

fn gesture(address: PeerAddress, action: Action, magnitude: u8) -> TransportEvent {
    TransportEvent::ActionReceived {
        address,
        action,
        magnitude,
    }
}

#[test]
fn reconnect_keeps_identity_validity_and_queue() {
    let mut registry = SessionRegistry::new();
    let a = addr(1);

    let id = registry.handle_event(TransportEvent::PeerConnected(a)).unwrap();
    registry.handle_event(TransportEvent::CapabilityConfirmed(a));
    registry.handle_event(gesture(a, Action::Rotate, 12));
    registry.handle_event(TransportEvent::PeerDisconnected(a));

    let session = registry.session(id).unwrap();
    assert!(!session.is_connected());
    assert!(session.is_valid());
    assert_eq!(session.pending_len(), 1);
    assert_eq!(registry.valid_player_ids(), vec![id]);

    assert_eq!(
        registry.handle_event(TransportEvent::PeerConnected(a)),
        Some(id)
    );
    assert!(registry.session(id).unwrap().is_connected());
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.dequeue(id), (Action::Rotate, 12));
}

#[test]
fn ids_are_unique_and_never_reused() {
    let mut registry = SessionRegistry::new();
    let ids: Vec<_> = (1..=4)
        .map(|n| registry.handle_event(TransportEvent::PeerConnected(addr(n))).unwrap())
        .collect();
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            assert_ne!(a, b);
        }
    }
    registry.handle_event(TransportEvent::PeerDisconnected(addr(1)));
    let again = registry.handle_event(TransportEvent::PeerConnected(addr(1)));
    assert_eq!(again, Some(ids[0]));
}

#[test]
fn actions_come_out_in_arrival_order() {
    let mut registry = SessionRegistry::new();
    let a = addr(1);
    let id = registry.connect(a);

    for (action, m) in [(Action::MoveLeft, 1), (Action::Drop, 2), (Action::Store, 3)] {
        registry.handle_event(gesture(a, action, m));
    }

    assert_eq!(registry.dequeue(id), (Action::MoveLeft, 1));
    assert_eq!(registry.dequeue(id), (Action::Drop, 2));
    assert_eq!(registry.dequeue(id), (Action::Store, 3));
    assert_eq!(registry.dequeue(id), (Action::NoOp, 0));
}

#[test]
fn events_for_unknown_addresses_are_ignored() {
    let mut registry = SessionRegistry::new();
    assert_eq!(
        registry.handle_event(TransportEvent::PeerDisconnected(addr(9))),
        None
    );
    assert_eq!(registry.handle_event(gesture(addr(9), Action::Drop, 0)), None);
    assert_eq!(
        registry.handle_event(TransportEvent::CapabilityConfirmed(addr(9))),
        None
    );
    assert!(registry.is_empty());
}

#[test]
fn unknown_player_dequeue_is_noop() {
    let mut registry = SessionRegistry::new();
    assert_eq!(registry.dequeue(42), (Action::NoOp, 0));
    assert_eq!(registry.enqueue(42, Action::Drop, 0), Enqueue::UnknownPlayer);
}

#[test]
fn capped_queue_rejects_newest() {
    let mut registry = SessionRegistry::with_queue_cap(Some(2));
    let id = registry.connect(addr(1));

    assert_eq!(registry.enqueue(id, Action::MoveLeft, 0), Enqueue::Queued);
    assert_eq!(registry.enqueue(id, Action::MoveRight, 0), Enqueue::Queued);
    assert_eq!(registry.enqueue(id, Action::Drop, 0), Enqueue::QueueFull);

    assert_eq!(registry.dequeue(id).0, Action::MoveLeft);
    assert_eq!(registry.dequeue(id).0, Action::MoveRight);
    assert_eq!(registry.dequeue(id).0, Action::NoOp);
}

#[test]
fn only_validated_sessions_are_eligible() {
    let mut registry = SessionRegistry::new();
    let first = registry.connect(addr(1));
    let second = registry.connect(addr(2));
    let third = registry.connect(addr(3));
    registry.validate(third);
    registry.validate(first);

    assert_eq!(registry.valid_player_ids(), vec![first, third]);
    assert!(!registry.session(second).unwrap().is_valid());
}
