//! Adapter module - controller transport over TCP with a JSON line protocol
//!
//! Stands in for the radio link between controllers and the console. Each
//! TCP connection plays the part of one connected peer.
//!
//! # Protocol Overview
//!
//! 1. **Hello**: the controller announces its stable address and its name.
//!    Only `BlockBashController` is accepted. The console answers `welcome`.
//! 2. **Capabilities**: the controller lists its characteristics. Reporting
//!    the gesture characteristic (`0xA001`) validates it as a player; the
//!    signal characteristic (`0xA002`) lets the console send it signals.
//! 3. **Gestures**: each recognized motion arrives as an action code
//!    (`0x01` left, `0x02` right, `0x03` drop, `0x04` store, `0x05` rotate)
//!    and a magnitude.
//! 4. **Signals**: the console sends `playerSlot`, `ready` and `paused`.
//!
//! Closing the connection (or a read error) after hello is a disconnect; the
//! console keeps the player's session for when the same address returns. A
//! second connection claiming an address that is still connected is refused.
//!
//! # Example Protocol Flow
//!
//! ```text
//! Controller -> Console: {"type":"hello","seq":1,"address":"24:0a:c4:00:00:01","name":"BlockBashController"}
//! Console -> Controller: {"type":"welcome","seq":1,"ts":1700000000000,"protocol_version":"1.0","console":"BlockBashConsole","service":40960}
//! Controller -> Console: {"type":"capabilities","seq":2,"characteristics":[40961,40962]}
//! Console -> Controller: {"type":"signal","seq":1,"ts":1700000000100,"signal":"playerSlot","slot":0,"bytes":[21,0]}
//! Controller -> Console: {"type":"gesture","seq":3,"code":5,"magnitude":40}
//! ```
//!
//! # Environment Variables
//!
//! - `BLOCK_BASH_HOST`: Bind address (default: "127.0.0.1")
//! - `BLOCK_BASH_PORT`: Port number (default: 7878)
//! - `BLOCK_BASH_MAX_PENDING`: Event queue depth toward the console (default: 64)

pub mod protocol;
pub mod runtime;
pub mod server;

pub use block_bash_session as session;
pub use block_bash_types as types;

pub use protocol::*;
pub use runtime::{Adapter, AdapterLink, OutboundMessage};
pub use server::{run_server, ServerConfig};
