//! Controller session management.
//!
//! Maps transient controller connections onto stable player ids, queues the
//! actions each controller sends, and tracks which controllers completed the
//! capability handshake.
//!
//! - [`session`]: one player's connection state and FIFO action queue
//! - [`registry`]: every session, keyed by player id and by peer address
//! - [`transport`]: the event/signal boundary to whatever carries the bytes
//!
//! # Example
//!
//! ```
//! use block_bash_session::{SessionRegistry, TransportEvent};
//! use block_bash_types::{Action, PeerAddress};
//!
//! let addr = PeerAddress([0xc0, 0xff, 0xee, 0, 0, 1]);
//! let mut registry = SessionRegistry::new();
//!
//! let id = registry.handle_event(TransportEvent::PeerConnected(addr)).unwrap();
//! registry.handle_event(TransportEvent::ActionReceived {
//!     address: addr,
//!     action: Action::Drop,
//!     magnitude: 3,
//! });
//! registry.handle_event(TransportEvent::PeerDisconnected(addr));
//!
//! // Reconnecting resumes the same player with its queue intact.
//! assert_eq!(registry.handle_event(TransportEvent::PeerConnected(addr)), Some(id));
//! assert_eq!(registry.dequeue(id), (Action::Drop, 3));
//! assert_eq!(registry.dequeue(id), (Action::NoOp, 0));
//! ```

pub mod registry;
pub mod session;
pub mod transport;

pub use block_bash_types as types;

pub use registry::SessionRegistry;
pub use session::{Enqueue, PlayerSession, QueuedAction, NO_ACTION};
pub use transport::{ControllerLink, RecordingLink, TransportEvent};
