//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` for zero-copy buffer management.
//! Implements a state machine for handling fragmented frames:
//! - `WaitingForLength`: Need the 4-byte length (or escape) word
//! - `WaitingForControlLength`: Escape seen, need the control frame length
//! - `WaitingForPayload`: Data length known, need N more payload bytes
//! - `WaitingForControlBody`: Control length known, need N more body bytes
//!
//! This is the sans-I/O counterpart of [`read_frame`](super::read_frame) for
//! callers that drive their own event loop.
//!
//! # Example
//!
//! ```
//! use framestream::protocol::{build_data_frame, Frame, FrameBuffer};
//!
//! let mut buffer = FrameBuffer::new();
//! let wire = build_data_frame(b"hello").unwrap();
//!
//! // Data arrives in chunks from the transport
//! assert!(buffer.push(&wire[..3]).unwrap().is_empty());
//! let frames = buffer.push(&wire[3..]).unwrap();
//! assert_eq!(frames, vec![Frame::Data("hello".into())]);
//! ```

use bytes::BytesMut;

use super::control::ControlFrame;
use super::frame::{check_size, Frame};
use super::wire_format::{
    decode_length, CONTROL_ESCAPE, DEFAULT_MAX_FRAME_SIZE, LENGTH_SIZE, MAX_CONTROL_FRAME_SIZE,
};
use crate::error::Result;

/// State machine for frame parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    WaitingForLength,
    WaitingForControlLength,
    WaitingForPayload { remaining: u32 },
    WaitingForControlBody { remaining: u32 },
}

/// Buffer for accumulating incoming bytes and extracting complete frames.
///
/// An error (oversized length, malformed control body) leaves the buffer in
/// an unspecified position; discard it and the connection.
pub struct FrameBuffer {
    buffer: BytesMut,
    state: State,
    max_frame_size: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer with default settings.
    ///
    /// Default capacity: 64KB, max frame: 1MB.
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Create a new frame buffer with custom max data frame size.
    pub fn with_max_frame_size(max_frame_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(64 * 1024),
            state: State::WaitingForLength,
            max_frame_size,
        }
    }

    /// Push data into the buffer and extract all complete frames.
    ///
    /// Partial data is kept for the next push.
    ///
    /// # Errors
    ///
    /// `FrameTooLarge` if a declared length exceeds its limit,
    /// `MalformedControlFrame` if a control body does not decode.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Frame>> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one()? {
            frames.push(frame);
        }

        Ok(frames)
    }

    fn try_extract_one(&mut self) -> Result<Option<Frame>> {
        loop {
            match self.state {
                State::WaitingForLength => {
                    let Some(length) = self.take_length() else {
                        return Ok(None);
                    };

                    if length == CONTROL_ESCAPE {
                        self.state = State::WaitingForControlLength;
                    } else {
                        check_size(length, self.max_frame_size)?;
                        self.state = State::WaitingForPayload { remaining: length };
                    }
                }

                State::WaitingForControlLength => {
                    let Some(length) = self.take_length() else {
                        return Ok(None);
                    };

                    check_size(length, MAX_CONTROL_FRAME_SIZE)?;
                    self.state = State::WaitingForControlBody { remaining: length };
                }

                State::WaitingForPayload { remaining } => {
                    let remaining = remaining as usize;
                    if self.buffer.len() < remaining {
                        return Ok(None);
                    }

                    let payload = self.buffer.split_to(remaining).freeze();
                    self.state = State::WaitingForLength;
                    return Ok(Some(Frame::Data(payload)));
                }

                State::WaitingForControlBody { remaining } => {
                    let remaining = remaining as usize;
                    if self.buffer.len() < remaining {
                        return Ok(None);
                    }

                    let body = self.buffer.split_to(remaining).freeze();
                    self.state = State::WaitingForLength;
                    return Ok(Some(Frame::Control(ControlFrame::decode(body)?)));
                }
            }
        }
    }

    fn take_length(&mut self) -> Option<u32> {
        let length = decode_length(&self.buffer)?;
        let _ = self.buffer.split_to(LENGTH_SIZE);
        Some(length)
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Whether the buffer sits exactly on a frame boundary.
    ///
    /// A transport that ends while this is false ended mid-frame.
    pub fn is_at_boundary(&self) -> bool {
        matches!(self.state, State::WaitingForLength) && self.buffer.is_empty()
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForLength;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::WaitingForLength => "WaitingForLength",
            State::WaitingForControlLength => "WaitingForControlLength",
            State::WaitingForPayload { .. } => "WaitingForPayload",
            State::WaitingForControlBody { .. } => "WaitingForControlBody",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
