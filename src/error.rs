//! Error types for framestream.

use thiserror::Error;

use crate::handshake::Phase;
use crate::protocol::ControlType;

/// Main error type for all Frame Streams operations.
///
/// Every error is terminal for the [`Writer`](crate::Writer) or
/// [`Reader`](crate::Reader) that produced it.
#[derive(Debug, Error)]
pub enum FramestreamError {
    /// I/O error on the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport ended in the middle of a frame.
    #[error("Unexpected end of stream inside a frame")]
    UnexpectedEof,

    /// Control frame body could not be decoded.
    #[error("Malformed control frame: {0}")]
    MalformedControlFrame(String),

    /// Wrong frame received during the handshake.
    #[error(
        "Handshake failed: expected {expected} control frame, received {}",
        describe_received(.received)
    )]
    HandshakeFailed {
        /// Control type the local state machine was waiting for.
        expected: ControlType,
        /// Control type that actually arrived, `None` for a data frame.
        received: Option<ControlType>,
    },

    /// Content-type negotiation did not produce exactly one match.
    #[error("Content type mismatch: {matched} matching content types, exactly one required")]
    ContentTypeMismatch {
        /// Number of entries the matcher produced.
        matched: usize,
    },

    /// Control frame other than STOP received after the handshake.
    #[error("Unexpected {0} control frame on an established stream")]
    UnexpectedControlFrame(ControlType),

    /// Data frame received before the handshake completed.
    #[error("Data frame received before the handshake completed")]
    PrematureDataFrame,

    /// Declared frame length exceeds the configured maximum.
    #[error("Frame size {size} exceeds maximum {max}")]
    FrameTooLarge {
        /// Length declared on the wire.
        size: u32,
        /// Limit in effect.
        max: u32,
    },

    /// Zero-length data frames cannot be encoded (zero is the control escape).
    #[error("Data frames must not be empty")]
    EmptyDataFrame,

    /// Operation issued in a phase that does not permit it.
    #[error("Invalid state: cannot {operation} while {phase}")]
    InvalidState {
        /// Operation the caller attempted.
        operation: &'static str,
        /// Phase the stream was in.
        phase: Phase,
    },
}

/// Result type alias using FramestreamError.
pub type Result<T> = std::result::Result<T, FramestreamError>;

fn describe_received(received: &Option<ControlType>) -> String {
    match received {
        Some(control_type) => format!("{} control frame", control_type),
        None => "data frame".to_string(),
    }
}

/// Map `read_exact` short reads onto [`FramestreamError::UnexpectedEof`].
pub(crate) fn map_read_error(err: std::io::Error) -> FramestreamError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        FramestreamError::UnexpectedEof
    } else {
        FramestreamError::Io(err)
    }
}
