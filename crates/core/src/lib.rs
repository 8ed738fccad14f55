//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the game rules and the manager that runs several
//! boards side by side. It has **no dependencies** on networking or I/O.
//!
//! # Module Structure
//!
//! - [`board`]: 10x20 settled-block grid with collision and row clearing
//! - [`pieces`]: the six shapes and pivot rotation
//! - [`rng`]: seeded LCG used for uniform piece selection
//! - [`game`]: one board's state machine (`Ready → Playing → GameOver`)
//! - [`manager`]: N games driven in lockstep, rendered through a [`RenderSink`]
//!
//! # Game Rules
//!
//! - Gravity moves the falling piece one row per tick
//! - A piece that cannot fall is placed; complete rows clear together
//! - One point per cleared row
//! - A piece may be swapped with the stored piece once per placement
//! - The game ends when a freshly spawned piece overlaps settled blocks
//!
//! # Example
//!
//! ```
//! use block_bash_core::{GameManager, NullSink};
//! use block_bash_types::{GameStatus, TetrisAction};
//!
//! let mut manager = GameManager::new(NullSink, 12345);
//! let first = manager.add_game();
//! manager.play_game();
//!
//! manager.push_action(first, TetrisAction::Drop);
//! manager.run_tick();
//!
//! assert_eq!(manager.game(first).unwrap().status(), GameStatus::Playing);
//! ```

pub mod board;
pub mod game;
pub mod manager;
pub mod pieces;
pub mod rng;

pub use block_bash_types as types;

pub use board::Board;
pub use game::{FallingPiece, Gravity, TetrisGame, ViewBoard};
pub use manager::{GameManager, NullSink, RenderSink};
pub use pieces::{get_shape, rotate_cw};
pub use rng::SimpleRng;
