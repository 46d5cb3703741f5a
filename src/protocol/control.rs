//! Control frame model and body encoding.
//!
//! The body of a control frame (everything after the escape and length words):
//! ```text
//! ┌──────────────┬────────────┬──────────────┬──────────────┐
//! │ Control Type │ Field Type │ Field Length │ Field Value  │ ...
//! │ uint32 BE    │ uint32 BE  │ uint32 BE    │ Length bytes │
//! └──────────────┴────────────┴──────────────┴──────────────┘
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::wire_format::{ControlType, CONTENT_TYPE_FIELD, LENGTH_SIZE};
use crate::error::{FramestreamError, Result};

/// A decoded control frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFrame {
    /// Frame type.
    pub control_type: ControlType,
    /// Content types, in wire order. Duplicates are kept.
    pub content_types: Vec<Bytes>,
}

impl ControlFrame {
    /// Create a control frame with no content types.
    pub fn new(control_type: ControlType) -> Self {
        Self {
            control_type,
            content_types: Vec::new(),
        }
    }

    /// Create a control frame carrying the given content types.
    pub fn with_content_types(control_type: ControlType, content_types: Vec<Bytes>) -> Self {
        Self {
            control_type,
            content_types,
        }
    }

    /// Size of the encoded body in bytes.
    pub fn encoded_len(&self) -> usize {
        LENGTH_SIZE
            + self
                .content_types
                .iter()
                .map(|ct| 2 * LENGTH_SIZE + ct.len())
                .sum::<usize>()
    }

    /// Encode the control frame body.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::Bytes;
    /// use framestream::protocol::{ControlFrame, ControlType};
    ///
    /// let frame = ControlFrame::with_content_types(
    ///     ControlType::Ready,
    ///     vec![Bytes::from_static(b"t1")],
    /// );
    /// let body = frame.encode();
    /// assert_eq!(&body[..], &[0, 0, 0, 4, 0, 0, 0, 1, 0, 0, 0, 2, b't', b'1']);
    /// assert_eq!(ControlFrame::decode(body).unwrap(), frame);
    /// ```
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u32(self.control_type.code());
        for content_type in &self.content_types {
            buf.put_u32(CONTENT_TYPE_FIELD);
            buf.put_u32(content_type.len() as u32);
            buf.put_slice(content_type);
        }
        buf.freeze()
    }

    /// Decode a control frame body.
    ///
    /// Content-type values are zero-copy slices of `body`.
    pub fn decode(mut body: Bytes) -> Result<Self> {
        if body.len() < LENGTH_SIZE {
            return Err(malformed(format!(
                "body of {} bytes is shorter than the control type",
                body.len()
            )));
        }

        let code = body.get_u32();
        let control_type = ControlType::from_code(code)
            .ok_or_else(|| malformed(format!("unknown control type {:#x}", code)))?;

        let mut content_types = Vec::new();
        while body.has_remaining() {
            if body.remaining() < 2 * LENGTH_SIZE {
                return Err(malformed(format!(
                    "{} trailing bytes after last field",
                    body.remaining()
                )));
            }

            let field_type = body.get_u32();
            if field_type != CONTENT_TYPE_FIELD {
                return Err(malformed(format!("unknown field type {:#x}", field_type)));
            }

            let field_len = body.get_u32() as usize;
            if field_len > body.remaining() {
                return Err(malformed(format!(
                    "field length {} exceeds remaining {} bytes",
                    field_len,
                    body.remaining()
                )));
            }

            content_types.push(body.split_to(field_len));
        }

        Ok(Self {
            control_type,
            content_types,
        })
    }
}

fn malformed(reason: String) -> FramestreamError {
    FramestreamError::MalformedControlFrame(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn body(words: &[u32], tail: &[u8]) -> Bytes {
        let mut buf = BytesMut::new();
        for word in words {
            buf.put_u32(*word);
        }
        buf.put_slice(tail);
        buf.freeze()
    }

    #[test]
    fn test_encode_without_content_types() {
        let encoded = ControlFrame::new(ControlType::Stop).encode();
        assert_eq!(&encoded[..], &[0, 0, 0, 3]);
    }

    #[test]
    fn test_encode_preserves_order_and_duplicates() {
        let frame = ControlFrame::with_content_types(
            ControlType::Accept,
            vec![
                Bytes::from_static(b"b"),
                Bytes::from_static(b"a"),
                Bytes::from_static(b"b"),
            ],
        );
        let decoded = ControlFrame::decode(frame.encode()).unwrap();
        assert_eq!(decoded.content_types.len(), 3);
        assert_eq!(decoded.content_types[0], "b");
        assert_eq!(decoded.content_types[1], "a");
        assert_eq!(decoded.content_types[2], "b");
    }

    #[test]
    fn test_empty_content_type_value() {
        let frame = ControlFrame::with_content_types(ControlType::Start, vec![Bytes::new()]);
        let encoded = frame.encode();
        assert_eq!(encoded.len(), 12);
        assert_eq!(ControlFrame::decode(encoded).unwrap(), frame);
    }

    #[test]
    fn test_encoded_len_matches_encode() {
        let frame = ControlFrame::with_content_types(
            ControlType::Ready,
            vec![Bytes::from_static(b"protobuf:dnstap.Dnstap")],
        );
        assert_eq!(frame.encoded_len(), frame.encode().len());
    }

    #[test]
    fn test_decode_too_short() {
        let err = ControlFrame::decode(Bytes::from_static(&[0, 0, 1])).unwrap_err();
        assert!(matches!(err, FramestreamError::MalformedControlFrame(_)));
    }

    #[test]
    fn test_decode_unknown_control_type() {
        let err = ControlFrame::decode(body(&[0x42], &[])).unwrap_err();
        assert!(err.to_string().contains("unknown control type"));
    }

    #[test]
    fn test_decode_unknown_field_type() {
        let err = ControlFrame::decode(body(&[0x04, 0x02, 1], b"x")).unwrap_err();
        assert!(err.to_string().contains("unknown field type"));
    }

    #[test]
    fn test_decode_field_length_past_end() {
        let err = ControlFrame::decode(body(&[0x04, 0x01, 10], b"abc")).unwrap_err();
        assert!(err.to_string().contains("exceeds remaining"));
    }

    #[test]
    fn test_decode_trailing_bytes() {
        let err = ControlFrame::decode(body(&[0x04, 0x01, 1], b"ab")).unwrap_err();
        assert!(err.to_string().contains("trailing bytes"));
    }

    #[test]
    fn test_decode_stop_with_content_type_is_kept() {
        let decoded = ControlFrame::decode(body(&[0x03, 0x01, 2], b"t1")).unwrap();
        assert_eq!(decoded.control_type, ControlType::Stop);
        assert_eq!(decoded.content_types, vec![Bytes::from_static(b"t1")]);
    }

    fn control_frame_strategy() -> impl Strategy<Value = ControlFrame> {
        (
            prop::sample::select(ControlType::ALL.to_vec()),
            prop::collection::vec(prop::collection::vec(any::<u8>(), 0..32), 0..6),
        )
            .prop_map(|(ty, cts)| {
                ControlFrame::with_content_types(ty, cts.into_iter().map(Bytes::from).collect())
            })
    }

    proptest! {
        #[test]
        fn prop_control_frame_roundtrip(frame in control_frame_strategy()) {
            let decoded = ControlFrame::decode(frame.encode()).unwrap();
            prop_assert_eq!(decoded, frame);
        }
    }
}
