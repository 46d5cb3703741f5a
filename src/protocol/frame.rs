//! Frame type and async frame codec.
//!
//! A frame on the wire is either a data frame (non-zero length + payload)
//! or a control frame (zero escape + length + control body). Payloads use
//! `bytes::Bytes` so they can be handed out without copying.
//!
//! # Example
//!
//! ```
//! use framestream::protocol::{read_frame, write_data_frame, Frame, DEFAULT_MAX_FRAME_SIZE};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut wire = Vec::new();
//! write_data_frame(&mut wire, b"hello").await.unwrap();
//!
//! let mut input = &wire[..];
//! let frame = read_frame(&mut input, DEFAULT_MAX_FRAME_SIZE).await.unwrap();
//! assert_eq!(frame, Some(Frame::Data("hello".into())));
//! # }
//! ```

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::control::ControlFrame;
use super::wire_format::{CONTROL_ESCAPE, LENGTH_SIZE, MAX_CONTROL_FRAME_SIZE};
use crate::error::{map_read_error, FramestreamError, Result};

/// A complete frame read from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Opaque payload (never empty).
    Data(Bytes),
    /// Decoded control frame.
    Control(ControlFrame),
}

impl Frame {
    /// Get the control frame, if this is one.
    #[inline]
    pub fn as_control(&self) -> Option<&ControlFrame> {
        match self {
            Frame::Control(cf) => Some(cf),
            Frame::Data(_) => None,
        }
    }

    /// Check if this is a data frame.
    #[inline]
    pub fn is_data(&self) -> bool {
        matches!(self, Frame::Data(_))
    }
}

/// Build the wire bytes of a data frame as a single byte vector.
///
/// Fails with `EmptyDataFrame` for an empty payload.
pub fn build_data_frame(payload: &[u8]) -> Result<Vec<u8>> {
    let length = data_frame_length(payload)?;
    let mut buf = Vec::with_capacity(LENGTH_SIZE + payload.len());
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Build the wire bytes of a control frame (escape, length and body).
///
/// Fails with `FrameTooLarge` if the body exceeds [`MAX_CONTROL_FRAME_SIZE`].
pub fn build_control_frame(frame: &ControlFrame) -> Result<Vec<u8>> {
    let body = frame.encode();
    let length = control_frame_length(&body)?;
    let mut buf = Vec::with_capacity(2 * LENGTH_SIZE + body.len());
    buf.extend_from_slice(&CONTROL_ESCAPE.to_be_bytes());
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(&body);
    Ok(buf)
}

/// Write a data frame.
pub async fn write_data_frame<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let length = data_frame_length(payload)?;
    writer.write_all(&length.to_be_bytes()).await?;
    writer.write_all(payload).await?;
    Ok(())
}

/// Write a control frame. Does not flush.
pub async fn write_control_frame<W>(writer: &mut W, frame: &ControlFrame) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = build_control_frame(frame)?;
    writer.write_all(&bytes).await?;
    Ok(())
}

/// Read the next frame.
///
/// Returns `Ok(None)` when the transport ends cleanly on a frame boundary,
/// `Err(UnexpectedEof)` when it ends inside a frame.
///
/// Declared lengths are checked against `max_frame_size` (data frames) or
/// [`MAX_CONTROL_FRAME_SIZE`] (control frames) before anything is allocated.
pub async fn read_frame<R>(reader: &mut R, max_frame_size: u32) -> Result<Option<Frame>>
where
    R: AsyncRead + Unpin,
{
    let length = match read_first_length(reader).await? {
        Some(length) => length,
        None => return Ok(None),
    };

    if length != CONTROL_ESCAPE {
        check_size(length, max_frame_size)?;
        let payload = read_body(reader, length).await?;
        return Ok(Some(Frame::Data(payload)));
    }

    let length = reader.read_u32().await.map_err(map_read_error)?;
    check_size(length, MAX_CONTROL_FRAME_SIZE)?;
    let body = read_body(reader, length).await?;
    Ok(Some(Frame::Control(ControlFrame::decode(body)?)))
}

/// Read the leading length word, distinguishing a clean end of stream.
async fn read_first_length<R>(reader: &mut R) -> Result<Option<u32>>
where
    R: AsyncRead + Unpin,
{
    let mut word = [0u8; LENGTH_SIZE];
    let mut filled = 0;

    while filled < LENGTH_SIZE {
        let n = reader.read(&mut word[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(FramestreamError::UnexpectedEof);
        }
        filled += n;
    }

    Ok(Some(u32::from_be_bytes(word)))
}

async fn read_body<R>(reader: &mut R, length: u32) -> Result<Bytes>
where
    R: AsyncRead + Unpin,
{
    let mut body = vec![0u8; length as usize];
    reader.read_exact(&mut body).await.map_err(map_read_error)?;
    Ok(Bytes::from(body))
}

pub(crate) fn check_size(size: u32, max: u32) -> Result<()> {
    if size > max {
        return Err(FramestreamError::FrameTooLarge { size, max });
    }
    Ok(())
}

fn data_frame_length(payload: &[u8]) -> Result<u32> {
    if payload.is_empty() {
        return Err(FramestreamError::EmptyDataFrame);
    }
    u32::try_from(payload.len()).map_err(|_| FramestreamError::FrameTooLarge {
        size: u32::MAX,
        max: u32::MAX,
    })
}

fn control_frame_length(body: &[u8]) -> Result<u32> {
    let length = u32::try_from(body.len()).unwrap_or(u32::MAX);
    check_size(length, MAX_CONTROL_FRAME_SIZE)?;
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ControlType, DEFAULT_MAX_FRAME_SIZE};
    use proptest::prelude::*;

    async fn read_all(mut input: &[u8]) -> Result<Vec<Frame>> {
        let mut frames = Vec::new();
        while let Some(frame) = read_frame(&mut input, DEFAULT_MAX_FRAME_SIZE).await? {
            frames.push(frame);
        }
        Ok(frames)
    }

    #[test]
    fn test_build_data_frame_layout() {
        let bytes = build_data_frame(b"hello").unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 5]);
        assert_eq!(&bytes[4..], b"hello");
    }

    #[test]
    fn test_build_data_frame_rejects_empty() {
        assert!(matches!(
            build_data_frame(b""),
            Err(FramestreamError::EmptyDataFrame)
        ));
    }

    #[test]
    fn test_build_control_frame_layout() {
        let bytes = build_control_frame(&ControlFrame::new(ControlType::Stop)).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 3]);
    }

    #[test]
    fn test_build_control_frame_too_large() {
        let frame = ControlFrame::with_content_types(
            ControlType::Ready,
            vec![Bytes::from(vec![b'x'; MAX_CONTROL_FRAME_SIZE as usize])],
        );
        assert!(matches!(
            build_control_frame(&frame),
            Err(FramestreamError::FrameTooLarge { max: MAX_CONTROL_FRAME_SIZE, .. })
        ));
    }

    #[tokio::test]
    async fn test_mixed_frames_roundtrip() {
        let mut wire = Vec::new();
        let start = ControlFrame::with_content_types(ControlType::Start, vec!["t1".into()]);
        write_control_frame(&mut wire, &start).await.unwrap();
        write_data_frame(&mut wire, b"first").await.unwrap();
        write_data_frame(&mut wire, b"second").await.unwrap();
        write_control_frame(&mut wire, &ControlFrame::new(ControlType::Stop))
            .await
            .unwrap();

        let frames = read_all(&wire).await.unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0], Frame::Control(start));
        assert_eq!(frames[1], Frame::Data("first".into()));
        assert_eq!(frames[2], Frame::Data("second".into()));
        assert_eq!(
            frames[3].as_control().map(|cf| cf.control_type),
            Some(ControlType::Stop)
        );
    }

    #[tokio::test]
    async fn test_clean_eof_returns_none() {
        let mut input: &[u8] = &[];
        let frame = read_frame(&mut input, DEFAULT_MAX_FRAME_SIZE).await.unwrap();
        assert!(frame.is_none());
    }

    #[tokio::test]
    async fn test_eof_inside_length() {
        let mut input: &[u8] = &[0, 0];
        let err = read_frame(&mut input, DEFAULT_MAX_FRAME_SIZE)
            .await
            .unwrap_err();
        assert!(matches!(err, FramestreamError::UnexpectedEof));
    }

    #[tokio::test]
    async fn test_eof_inside_payload() {
        let mut input: &[u8] = &[0, 0, 0, 10, b'a', b'b'];
        let err = read_frame(&mut input, DEFAULT_MAX_FRAME_SIZE)
            .await
            .unwrap_err();
        assert!(matches!(err, FramestreamError::UnexpectedEof));
    }

    #[tokio::test]
    async fn test_eof_after_escape() {
        let mut input: &[u8] = &[0, 0, 0, 0, 0, 0];
        let err = read_frame(&mut input, DEFAULT_MAX_FRAME_SIZE)
            .await
            .unwrap_err();
        assert!(matches!(err, FramestreamError::UnexpectedEof));
    }

    #[tokio::test]
    async fn test_data_frame_too_large_is_not_read() {
        // Declares 4 GiB - 1 but carries nothing; must fail on the header alone.
        let mut input: &[u8] = &[0xFF, 0xFF, 0xFF, 0xFF];
        let err = read_frame(&mut input, 1024).await.unwrap_err();
        assert!(matches!(
            err,
            FramestreamError::FrameTooLarge {
                size: u32::MAX,
                max: 1024
            }
        ));
    }

    #[tokio::test]
    async fn test_control_frame_too_large() {
        let mut input: &[u8] = &[0, 0, 0, 0, 0, 0, 0x02, 0x01];
        let err = read_frame(&mut input, DEFAULT_MAX_FRAME_SIZE)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FramestreamError::FrameTooLarge { size: 513, max: 512 }
        ));
    }

    #[tokio::test]
    async fn test_malformed_control_body() {
        let mut input: &[u8] = &[0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0x7F];
        let err = read_frame(&mut input, DEFAULT_MAX_FRAME_SIZE)
            .await
            .unwrap_err();
        assert!(matches!(err, FramestreamError::MalformedControlFrame(_)));
    }

    #[tokio::test]
    async fn test_write_empty_data_frame_rejected() {
        let mut wire = Vec::new();
        let err = write_data_frame(&mut wire, b"").await.unwrap_err();
        assert!(matches!(err, FramestreamError::EmptyDataFrame));
        assert!(wire.is_empty());
    }

    #[tokio::test]
    async fn test_payload_at_exact_limit() {
        let payload = vec![0xAB; 64];
        let wire = build_data_frame(&payload).unwrap();
        let mut input = &wire[..];
        let frame = read_frame(&mut input, 64).await.unwrap();
        assert_eq!(frame, Some(Frame::Data(Bytes::from(payload))));
    }

    proptest! {
        #[test]
        fn prop_data_frame_roundtrip(payload in prop::collection::vec(any::<u8>(), 1..2048)) {
            let wire = build_data_frame(&payload).unwrap();
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let frames = runtime.block_on(read_all(&wire)).unwrap();
            prop_assert_eq!(frames, vec![Frame::Data(Bytes::from(payload))]);
        }
    }
}
