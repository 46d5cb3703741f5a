//! Writer and reader configuration.
//!
//! Both option types are plain data with builder-style setters, and derive
//! serde so an embedding application can load them from its own config.
//!
//! # Example
//!
//! ```
//! use framestream::{DecoderOptions, EncoderOptions};
//!
//! let encoder = EncoderOptions::new()
//!     .content_type("protobuf:dnstap.Dnstap")
//!     .bidirectional(true);
//! assert_eq!(encoder.content_types.len(), 1);
//!
//! let decoder = DecoderOptions::new()
//!     .content_type("protobuf:dnstap.Dnstap")
//!     .max_frame_size(64 * 1024);
//! assert!(!decoder.bidirectional);
//! ```

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::protocol::DEFAULT_MAX_FRAME_SIZE;

/// Default I/O buffer capacity (64 KiB).
pub const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Configuration for a [`Writer`](crate::Writer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderOptions {
    /// Content types offered to the reader, in preference order.
    ///
    /// Usually exactly one. Empty means no content type is declared.
    pub content_types: Vec<Bytes>,
    /// Run the READY/ACCEPT handshake instead of sending START.
    pub bidirectional: bool,
    /// Capacity of the write buffer.
    pub buffer_capacity: usize,
    /// Largest data frame tolerated while reading the handshake reply.
    pub max_frame_size: u32,
}

impl EncoderOptions {
    /// Unidirectional options with no content type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a content type to offer.
    pub fn content_type(mut self, content_type: impl Into<Bytes>) -> Self {
        self.content_types.push(content_type.into());
        self
    }

    /// Select the bidirectional handshake.
    pub fn bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = bidirectional;
        self
    }

    /// Set the write buffer capacity.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the frame size limit for frames read during the handshake.
    pub fn max_frame_size(mut self, max: u32) -> Self {
        self.max_frame_size = max;
        self
    }
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            content_types: Vec::new(),
            bidirectional: false,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Configuration for a [`Reader`](crate::Reader).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderOptions {
    /// Content types this reader accepts. Empty accepts anything.
    pub content_types: Vec<Bytes>,
    /// Answer READY with ACCEPT instead of waiting for START.
    pub bidirectional: bool,
    /// Capacity of the read buffer.
    pub buffer_capacity: usize,
    /// Largest data frame payload accepted.
    pub max_frame_size: u32,
}

impl DecoderOptions {
    /// Unidirectional options accepting any content type.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an accepted content type.
    pub fn content_type(mut self, content_type: impl Into<Bytes>) -> Self {
        self.content_types.push(content_type.into());
        self
    }

    /// Select the bidirectional handshake.
    pub fn bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = bidirectional;
        self
    }

    /// Set the read buffer capacity.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the largest data frame payload accepted.
    pub fn max_frame_size(mut self, max: u32) -> Self {
        self.max_frame_size = max;
        self
    }
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            content_types: Vec::new(),
            bidirectional: false,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_options_default() {
        let options = EncoderOptions::default();
        assert!(options.content_types.is_empty());
        assert!(!options.bidirectional);
        assert_eq!(options.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
        assert_eq!(options.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
    }

    #[test]
    fn test_builder_accumulates_content_types() {
        let options = DecoderOptions::new()
            .content_type("t1")
            .content_type(b"t2".to_vec())
            .bidirectional(true);

        assert_eq!(
            options.content_types,
            vec![Bytes::from_static(b"t1"), Bytes::from_static(b"t2")]
        );
        assert!(options.bidirectional);
    }

    #[test]
    fn test_decoder_options_from_json() {
        let options: DecoderOptions =
            serde_json::from_str(r#"{"bidirectional": true, "max_frame_size": 4096}"#).unwrap();

        assert!(options.bidirectional);
        assert_eq!(options.max_frame_size, 4096);
        assert_eq!(options.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
        assert!(options.content_types.is_empty());
    }

    #[test]
    fn test_encoder_options_json_roundtrip() {
        let options = EncoderOptions::new().content_type("t1").buffer_capacity(512);
        let json = serde_json::to_string(&options).unwrap();
        let parsed: EncoderOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, options);
    }
}
