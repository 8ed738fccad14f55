//! Protocol module - JSON messages for the controller link
//!
//! One JSON object per line. Every message carries `type` and `seq`; console
//! messages also carry `ts` (milliseconds since the Unix epoch).

use serde::{Deserialize, Serialize};

use crate::types::{
    Action, ControllerSignal, PeerAddress, CONSOLE_NAME, CONTROLLER_SERVICE_ID,
    GESTURE_CHARACTERISTIC_ID, SIGNAL_CHARACTERISTIC_ID,
};

pub const PROTOCOL_VERSION: &str = "1.0";

// ============== Controller -> Console ==============

/// First message on a connection: who the peer is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(default)]
    pub seq: u64,
    pub address: PeerAddress,
    pub name: String,
}

/// Characteristics the peer exposes on the controller service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitiesMessage {
    #[serde(default)]
    pub seq: u64,
    #[serde(default = "default_service")]
    pub service: u16,
    pub characteristics: Vec<u16>,
}

fn default_service() -> u16 {
    CONTROLLER_SERVICE_ID
}

impl CapabilitiesMessage {
    /// The peer can report gestures, which makes it a valid controller
    pub fn has_gesture(&self) -> bool {
        self.service == CONTROLLER_SERVICE_ID
            && self.characteristics.contains(&GESTURE_CHARACTERISTIC_ID)
    }

    /// The peer accepts console signals
    pub fn has_signal(&self) -> bool {
        self.service == CONTROLLER_SERVICE_ID
            && self.characteristics.contains(&SIGNAL_CHARACTERISTIC_ID)
    }
}

/// One recognized gesture: the raw action byte and its magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureMessage {
    #[serde(default)]
    pub seq: u64,
    pub code: u8,
    #[serde(default)]
    pub magnitude: u8,
}

impl GestureMessage {
    pub fn action(&self) -> Action {
        Action::from_code(self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Capabilities(CapabilitiesMessage),
    Gesture(GestureMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
    pub msg_type: String,
}

impl ParsedMessage {
    pub fn seq(&self) -> u64 {
        match self {
            ParsedMessage::Hello(m) => m.seq,
            ParsedMessage::Capabilities(m) => m.seq,
            ParsedMessage::Gesture(m) => m.seq,
            ParsedMessage::Unknown(m) => m.seq,
        }
    }
}

/// Parse one line from a controller.
///
/// A well-formed object with an unrecognized `type` is `Unknown`, not an error.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type", rename_all = "snake_case")]
    enum InboundMessage {
        Hello(HelloMessage),
        Capabilities(CapabilitiesMessage),
        Gesture(GestureMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Capabilities(m)) => Ok(ParsedMessage::Capabilities(m)),
        Ok(InboundMessage::Gesture(m)) => Ok(ParsedMessage::Gesture(m)),
        Err(e) => {
            #[derive(Debug, Deserialize)]
            struct TypeOnly<'a> {
                #[serde(rename = "type")]
                msg_type: Option<&'a str>,
                #[serde(default)]
                seq: u64,
            }
            let header = serde_json::from_str::<TypeOnly>(json)?;
            match header.msg_type {
                Some(t) if !matches!(t, "hello" | "capabilities" | "gesture") => {
                    Ok(ParsedMessage::Unknown(UnknownMessage {
                        seq: header.seq,
                        msg_type: t.to_string(),
                    }))
                }
                _ => Err(e),
            }
        }
    }
}

// ============== Console -> Controller ==============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConsoleMessage {
    Welcome(WelcomeMessage),
    Signal(SignalMessage),
    Error(ErrorMessage),
}

/// Response to an accepted hello
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub console: String,
    pub service: u16,
}

/// A console signal, as its name and its raw characteristic bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalMessage {
    pub seq: u64,
    pub ts: u64,
    pub signal: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub slot: Option<u8>,
    pub bytes: Vec<u8>,
}

impl SignalMessage {
    pub fn decode(&self) -> Option<ControllerSignal> {
        ControllerSignal::decode(&self.bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Message needs a completed hello (or capabilities) first
    HandshakeRequired,
    /// Hello announced a name other than the controller name
    NameRejected,
    /// Another live connection already owns this address
    AddressInUse,
    /// Unparseable or out-of-place message
    InvalidMessage,
    /// Console event queue is full; the gesture was dropped
    Backpressure,
}

pub fn create_welcome(seq: u64) -> ConsoleMessage {
    ConsoleMessage::Welcome(WelcomeMessage {
        seq,
        ts: current_timestamp_ms(),
        protocol_version: PROTOCOL_VERSION.to_string(),
        console: CONSOLE_NAME.to_string(),
        service: CONTROLLER_SERVICE_ID,
    })
}

pub fn create_signal(seq: u64, signal: ControllerSignal) -> ConsoleMessage {
    let slot = match signal {
        ControllerSignal::PlayerSlot(slot) => Some(slot),
        _ => None,
    };
    ConsoleMessage::Signal(SignalMessage {
        seq,
        ts: current_timestamp_ms(),
        signal: signal.as_str().to_string(),
        slot,
        bytes: signal.encode(),
    })
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ConsoleMessage {
    ConsoleMessage::Error(ErrorMessage {
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    })
}

fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
