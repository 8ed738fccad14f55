//! Block Bash (workspace facade crate).
//!
//! Re-exports the member crates under one name so the binary, the
//! integration tests and the benches use `block_bash::{core, session, ...}`
//! while the implementation lives under `crates/`.

pub use block_bash_adapter as adapter;
pub use block_bash_core as core;
pub use block_bash_engine as engine;
pub use block_bash_session as session;
pub use block_bash_term as term;
pub use block_bash_types as types;
