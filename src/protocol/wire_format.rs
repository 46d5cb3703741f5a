//! Wire format constants and control type codes.
//!
//! ```text
//! Data frame:
//! ┌──────────────┬──────────────────┐
//! │ Length (>0)  │ Payload          │
//! │ uint32 BE    │ Length bytes     │
//! └──────────────┴──────────────────┘
//!
//! Control frame:
//! ┌──────────────┬──────────────┬──────────────┬─────────────────────────┐
//! │ Escape (=0)  │ CF Length    │ Control Type │ Fields ...              │
//! │ uint32 BE    │ uint32 BE    │ uint32 BE    │ (type, length, value)*  │
//! └──────────────┴──────────────┴──────────────┴─────────────────────────┘
//! ```
//!
//! All multi-byte integers are Big Endian.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Size of every length, escape, type and field header word.
pub const LENGTH_SIZE: usize = 4;

/// Escape word that introduces a control frame.
pub const CONTROL_ESCAPE: u32 = 0;

/// Field type code for a content-type field.
pub const CONTENT_TYPE_FIELD: u32 = 0x01;

/// Maximum size of a control frame body (512 bytes).
pub const MAX_CONTROL_FRAME_SIZE: u32 = 512;

/// Default maximum data frame payload size (1 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 1_048_576;

/// Control frame types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ControlType {
    /// Reader accepts the writer's READY (bidirectional).
    Accept,
    /// Start of a unidirectional stream.
    Start,
    /// End of stream, sent by the writer.
    Stop,
    /// Writer offers content types (bidirectional).
    Ready,
    /// Reader acknowledges STOP.
    Finish,
}

impl ControlType {
    /// All control types, in code order.
    pub const ALL: [ControlType; 5] = [
        ControlType::Accept,
        ControlType::Start,
        ControlType::Stop,
        ControlType::Ready,
        ControlType::Finish,
    ];

    /// Numeric code used on the wire.
    #[inline]
    pub fn code(self) -> u32 {
        match self {
            ControlType::Accept => 0x01,
            ControlType::Start => 0x02,
            ControlType::Stop => 0x03,
            ControlType::Ready => 0x04,
            ControlType::Finish => 0x05,
        }
    }

    /// Look up a control type from its wire code.
    ///
    /// # Example
    ///
    /// ```
    /// use framestream::protocol::ControlType;
    ///
    /// assert_eq!(ControlType::from_code(0x04), Some(ControlType::Ready));
    /// assert_eq!(ControlType::from_code(0x99), None);
    /// ```
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0x01 => Some(ControlType::Accept),
            0x02 => Some(ControlType::Start),
            0x03 => Some(ControlType::Stop),
            0x04 => Some(ControlType::Ready),
            0x05 => Some(ControlType::Finish),
            _ => None,
        }
    }

    /// Whether frames of this type carry content-type fields.
    #[inline]
    pub fn carries_content_types(self) -> bool {
        matches!(
            self,
            ControlType::Ready | ControlType::Accept | ControlType::Start
        )
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlType::Accept => "ACCEPT",
            ControlType::Start => "START",
            ControlType::Stop => "STOP",
            ControlType::Ready => "READY",
            ControlType::Finish => "FINISH",
        };
        f.write_str(name)
    }
}

/// Read a big-endian u32 from the first four bytes of `buf`.
///
/// Returns `None` if buffer is too short.
#[inline]
pub fn decode_length(buf: &[u8]) -> Option<u32> {
    let word: [u8; LENGTH_SIZE] = buf.get(..LENGTH_SIZE)?.try_into().ok()?;
    Some(u32::from_be_bytes(word))
}
