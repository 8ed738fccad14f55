//! Text rendering for the console.
//!
//! The console's display is a plain line stream on stdout (see
//! [`TextRenderer`]); any process that understands the `RENDER` lines can
//! draw the boards.

pub mod renderer;

pub use block_bash_core as core;
pub use block_bash_types as types;

pub use renderer::{encode_frame_into, encode_header_into, encode_set_games_into, TextRenderer};
