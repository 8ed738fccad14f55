//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the console:
//! controller actions, piece kinds, game states and the byte codes that travel
//! between the console and its controllers.
//!
//! # Board Dimensions
//!
//! - **Width**: 10 columns (indexed 0-9)
//! - **Height**: 20 rows (indexed 0-19, row 0 at the top)
//! - **Spawn column offset**: `BOARD_WIDTH / 2 - 1` (4)
//!
//! # Controller Wire Codes
//!
//! | Byte | Meaning |
//! |------|---------|
//! | `0x01` | move left |
//! | `0x02` | move right |
//! | `0x03` | drop |
//! | `0x04` | store |
//! | `0x05` | rotate |
//! | other | no-op |
//!
//! Signals written back to a controller start with `0x15` (player slot, followed
//! by the slot byte), `0x20` (ready) or `0x40` (paused).
//!
//! # Examples
//!
//! ```
//! use block_bash_types::{Action, PeerAddress, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};
//!
//! assert_eq!(Action::from_code(0x03), Action::Drop);
//! assert_eq!(Action::from_code(0x7f), Action::NoOp);
//!
//! assert_eq!(PieceKind::from_index(1), Some(PieceKind::Line));
//!
//! let addr: PeerAddress = "c0:ff:ee:00:00:01".parse().unwrap();
//! assert_eq!(addr.to_string(), "c0:ff:ee:00:00:01");
//!
//! assert_eq!(BOARD_WIDTH, 10);
//! assert_eq!(BOARD_HEIGHT, 20);
//! ```

use std::fmt;
use std::str::FromStr;

/// Board width in cells (10 columns)
pub const BOARD_WIDTH: u8 = 10;

/// Board height in cells (20 rows)
pub const BOARD_HEIGHT: u8 = 20;

/// Columns a freshly spawned piece is shifted right by
pub const SPAWN_X_OFFSET: i8 = (BOARD_WIDTH / 2 - 1) as i8;

/// Default number of concurrent games the console runs
pub const MAX_PLAYERS: usize = 3;

/// Default simulation tick period (1 row of gravity per second)
pub const TICK_MS: u64 = 1000;

/// Default interval between slot assignment passes before the game starts
pub const SETUP_INTERVAL_MS: u64 = 2000;

/// Default delay between the start request and the first tick
pub const START_DELAY_MS: u64 = 5000;

/// Name the console announces itself with
pub const CONSOLE_NAME: &str = "BlockBashConsole";

/// Name a peer must announce to be accepted as a controller
pub const CONTROLLER_NAME: &str = "BlockBashController";

/// Controller service id
pub const CONTROLLER_SERVICE_ID: u16 = 0xA000;

/// Characteristic carrying gesture reads; its presence validates a controller
pub const GESTURE_CHARACTERISTIC_ID: u16 = 0xA001;

/// Characteristic the console writes signals to
pub const SIGNAL_CHARACTERISTIC_ID: u16 = 0xA002;

/// Registry-assigned player identity, stable for the life of a peer address
pub type PlayerId = u32;

/// Controller intent decoded from a gesture read
///
/// `NoOp` doubles as the "nothing queued" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Drop,
    Store,
    Rotate,
    #[default]
    NoOp,
}

impl Action {
    /// Decode a gesture byte. Unknown codes map to `NoOp`.
    pub fn from_code(code: u8) -> Self {
        match code {
            0x01 => Action::MoveLeft,
            0x02 => Action::MoveRight,
            0x03 => Action::Drop,
            0x04 => Action::Store,
            0x05 => Action::Rotate,
            _ => Action::NoOp,
        }
    }

    /// Gesture byte for this action (`0x00` for `NoOp`)
    pub fn code(&self) -> u8 {
        match self {
            Action::MoveLeft => 0x01,
            Action::MoveRight => 0x02,
            Action::Drop => 0x03,
            Action::Store => 0x04,
            Action::Rotate => 0x05,
            Action::NoOp => 0x00,
        }
    }

    /// The game action this controller intent maps to, if any
    pub fn to_tetris(&self) -> Option<TetrisAction> {
        match self {
            Action::MoveLeft => Some(TetrisAction::MoveLeft),
            Action::MoveRight => Some(TetrisAction::MoveRight),
            Action::Drop => Some(TetrisAction::Drop),
            Action::Store => Some(TetrisAction::Store),
            Action::Rotate => Some(TetrisAction::Rotate),
            Action::NoOp => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::MoveLeft => "moveLeft",
            Action::MoveRight => "moveRight",
            Action::Drop => "drop",
            Action::Store => "store",
            Action::Rotate => "rotate",
            Action::NoOp => "noOp",
        }
    }
}

/// Game actions that can be applied to a single board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrisAction {
    /// Move piece one column left
    MoveLeft,
    /// Move piece one column right
    MoveRight,
    /// Fast-forward the piece to its resting position and place it
    Drop,
    /// Swap the piece with the stored one (once per placement)
    Store,
    /// Rotate piece 90° clockwise
    Rotate,
}

/// The six piece shapes, in the order used by the render stream codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Square,
    Line,
    T,
    S,
    L,
    J,
}

impl PieceKind {
    /// All kinds in code order
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Square,
        PieceKind::Line,
        PieceKind::T,
        PieceKind::S,
        PieceKind::L,
        PieceKind::J,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Render stream code (0..=5)
    pub fn code(&self) -> i8 {
        match self {
            PieceKind::Square => 0,
            PieceKind::Line => 1,
            PieceKind::T => 2,
            PieceKind::S => 3,
            PieceKind::L => 4,
            PieceKind::J => 5,
        }
    }
}

/// Lifecycle of a single game
///
/// `Ready → Playing → GameOver`; `GameOver` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameStatus {
    #[default]
    Ready,
    Playing,
    GameOver,
}

impl GameStatus {
    /// Render stream code
    pub fn code(&self) -> u8 {
        match self {
            GameStatus::Ready => 0,
            GameStatus::Playing => 1,
            GameStatus::GameOver => 2,
        }
    }
}

/// Signals the console writes to a controller's signal characteristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerSignal {
    /// Assigned game slot (0-based)
    PlayerSlot(u8),
    Ready,
    Paused,
}

impl ControllerSignal {
    pub const PLAYER_SLOT_CODE: u8 = 0x15;
    pub const READY_CODE: u8 = 0x20;
    pub const PAUSED_CODE: u8 = 0x40;

    /// Bytes written to the signal characteristic
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            ControllerSignal::PlayerSlot(slot) => vec![Self::PLAYER_SLOT_CODE, slot],
            ControllerSignal::Ready => vec![Self::READY_CODE],
            ControllerSignal::Paused => vec![Self::PAUSED_CODE],
        }
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [Self::PLAYER_SLOT_CODE, slot] => Some(ControllerSignal::PlayerSlot(*slot)),
            [Self::READY_CODE] => Some(ControllerSignal::Ready),
            [Self::PAUSED_CODE] => Some(ControllerSignal::Paused),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerSignal::PlayerSlot(_) => "playerSlot",
            ControllerSignal::Ready => "ready",
            ControllerSignal::Paused => "paused",
        }
    }
}

/// Stable six-byte peer address, independent of the transient connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerAddress(pub [u8; 6]);

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// Error returned when a peer address string is malformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAddressError(String);

impl fmt::Display for ParseAddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid peer address: {}", self.0)
    }
}

impl std::error::Error for ParseAddressError {}

impl FromStr for PeerAddress {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; 6];
        let mut parts = s.split(':');
        for byte in out.iter_mut() {
            let part = parts.next().ok_or_else(|| ParseAddressError(s.to_string()))?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ParseAddressError(s.to_string()));
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| ParseAddressError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ParseAddressError(s.to_string()));
        }
        Ok(PeerAddress(out))
    }
}

impl serde::Serialize for PeerAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for PeerAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl serde::de::Visitor<'_> for V {
            type Value = PeerAddress;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a colon-separated six-byte hex address")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(V)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_codes_match_controller_firmware() {
        assert_eq!(Action::from_code(0x01), Action::MoveLeft);
        assert_eq!(Action::from_code(0x02), Action::MoveRight);
        assert_eq!(Action::from_code(0x03), Action::Drop);
        assert_eq!(Action::from_code(0x04), Action::Store);
        assert_eq!(Action::from_code(0x05), Action::Rotate);
        assert_eq!(Action::from_code(0x00), Action::NoOp);
        assert_eq!(Action::from_code(0x06), Action::NoOp);

        for action in [
            Action::MoveLeft,
            Action::MoveRight,
            Action::Drop,
            Action::Store,
            Action::Rotate,
        ] {
            assert_eq!(Action::from_code(action.code()), action);
        }
    }

    #[test]
    fn noop_has_no_game_action() {
        assert_eq!(Action::NoOp.to_tetris(), None);
        assert_eq!(Action::Rotate.to_tetris(), Some(TetrisAction::Rotate));
        assert_eq!(Action::default(), Action::NoOp);
    }

    #[test]
    fn signal_bytes() {
        assert_eq!(ControllerSignal::PlayerSlot(2).encode(), vec![0x15, 2]);
        assert_eq!(ControllerSignal::Ready.encode(), vec![0x20]);
        assert_eq!(ControllerSignal::Paused.encode(), vec![0x40]);
        assert_eq!(
            ControllerSignal::decode(&[0x15, 1]),
            Some(ControllerSignal::PlayerSlot(1))
        );
        assert_eq!(ControllerSignal::decode(&[0x99]), None);
    }

    #[test]
    fn piece_codes_follow_shape_order() {
        for (i, kind) in PieceKind::ALL.iter().enumerate() {
            assert_eq!(kind.code() as usize, i);
            assert_eq!(PieceKind::from_index(i), Some(*kind));
        }
        assert_eq!(PieceKind::from_index(6), None);
    }

    #[test]
    fn status_codes() {
        assert_eq!(GameStatus::Ready.code(), 0);
        assert_eq!(GameStatus::Playing.code(), 1);
        assert_eq!(GameStatus::GameOver.code(), 2);
    }

    #[test]
    fn peer_address_parse_rejects_garbage() {
        assert!("c0:ff:ee:00:00".parse::<PeerAddress>().is_err());
        assert!("c0:ff:ee:00:00:01:02".parse::<PeerAddress>().is_err());
        assert!("zz:ff:ee:00:00:01".parse::<PeerAddress>().is_err());
        assert!("c0ff:ee:00:00:01:0".parse::<PeerAddress>().is_err());
        assert!("+f:ff:ee:00:00:01".parse::<PeerAddress>().is_err());
        assert!("c0:ff:ee:00:00:-1".parse::<PeerAddress>().is_err());
        let addr: PeerAddress = "C0:FF:EE:00:00:0A".parse().unwrap();
        assert_eq!(addr, PeerAddress([0xc0, 0xff, 0xee, 0, 0, 0x0a]));
    }
}
