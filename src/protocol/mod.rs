//! Protocol module - wire format, control frames, and framing.
//!
//! This module implements the Frame Streams wire protocol:
//! - Data frames and escaped control frames
//! - Control frame body encoding/decoding
//! - Async frame codec over tokio I/O
//! - Frame buffer for accumulating partial reads

mod control;
mod frame;
mod frame_buffer;
mod wire_format;

pub use control::ControlFrame;
pub use frame::{
    build_control_frame, build_data_frame, read_frame, write_control_frame, write_data_frame,
    Frame,
};
pub use frame_buffer::FrameBuffer;
pub use wire_format::{
    decode_length, ControlType, CONTENT_TYPE_FIELD, CONTROL_ESCAPE, DEFAULT_MAX_FRAME_SIZE,
    LENGTH_SIZE, MAX_CONTROL_FRAME_SIZE,
};
