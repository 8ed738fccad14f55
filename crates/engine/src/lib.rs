//! Console engine
//!
//! Joins the session layer to the game layer: controllers become players,
//! players get games, and queued gestures drive those games one frame at a
//! time. The binary owns a [`Console`] on its main thread and feeds it
//! transport events, operator commands and [`Schedule`] duties.

pub mod config;
pub mod console;
pub mod schedule;

pub use block_bash_core as core;
pub use block_bash_session as session;
pub use block_bash_types as types;

pub use config::ConsoleConfig;
pub use console::{Console, ConsoleCommand, MAX_SLOTS};
pub use schedule::{Duty, Schedule};
