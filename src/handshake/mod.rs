//! Handshake module - protocol phases and content-type negotiation.
//!
//! Bidirectional streams open with a READY/ACCEPT exchange; unidirectional
//! streams are bracketed by START and STOP.
//!
//! # Workflow
//!
//! ```text
//! Bidirectional                         Unidirectional
//!
//! Writer            Reader              Writer            Reader
//!   │ ── READY ──────► │                  │ ── START ──────► │
//!   │ ◄───── ACCEPT ── │                  │ ── data ───────► │
//!   │ ── data ───────► │                  │ ── STOP ───────► │
//!   │ ── STOP ───────► │
//! ```
//!
//! The bidirectional handshake requires exactly one matching content type on
//! both ends; zero or several matches both fail. A unidirectional reader with
//! no content types configured accepts any START.

mod content_type;

pub use content_type::match_content_types;

use std::fmt;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use content_type::single_match;

use crate::error::{FramestreamError, Result};
use crate::protocol::{read_frame, write_control_frame, ControlFrame, ControlType, Frame};

/// Protocol phase of a [`Writer`](crate::Writer) or [`Reader`](crate::Reader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing exchanged yet.
    Init,
    /// Writer sent READY, waiting for ACCEPT.
    HandshakeSent,
    /// Reader waiting for READY.
    AwaitReady,
    /// Reader waiting for START.
    AwaitStart,
    /// Handshake done; data frames may flow.
    Established,
    /// STOP sent (writer) or observed (reader).
    Closed,
    /// An error occurred; the stream is unusable.
    Failed,
}

impl Phase {
    /// Ensure the current phase is `expected`, or report `operation` as misuse.
    pub(crate) fn require(self, expected: Phase, operation: &'static str) -> Result<()> {
        if self != expected {
            return Err(FramestreamError::InvalidState {
                operation,
                phase: self,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "initializing",
            Phase::HandshakeSent => "awaiting ACCEPT",
            Phase::AwaitReady => "awaiting READY",
            Phase::AwaitStart => "awaiting START",
            Phase::Established => "established",
            Phase::Closed => "closed",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Send READY offering `local` and flush it to the peer.
pub(crate) async fn send_ready<T>(io: &mut T, local: &[Bytes]) -> Result<()>
where
    T: AsyncWrite + Unpin,
{
    let ready = ControlFrame::with_content_types(ControlType::Ready, local.to_vec());
    write_control_frame(io, &ready).await?;
    io.flush().await?;
    tracing::debug!("READY sent with {} content types", local.len());
    Ok(())
}

/// Wait for ACCEPT and negotiate against `local`.
///
/// Exactly one of the local content types must appear in ACCEPT. A writer
/// with no content types therefore cannot open a bidirectional stream.
pub(crate) async fn await_accept<T>(
    io: &mut T,
    local: &[Bytes],
    max_frame_size: u32,
) -> Result<Bytes>
where
    T: AsyncRead + Unpin,
{
    let accept = expect_control(io, ControlType::Accept, max_frame_size).await?;
    tracing::debug!(
        "ACCEPT received with {} content types",
        accept.content_types.len()
    );
    negotiate(&match_content_types(local, &accept.content_types))
}

/// Wait for READY, reply with ACCEPT, and negotiate.
///
/// ACCEPT carries the matches (the whole READY offer when `local` is
/// empty) and is sent even when negotiation fails. The verdict is taken
/// on that same list, so both ends agree.
pub(crate) async fn respond_to_ready<T>(
    io: &mut T,
    local: &[Bytes],
    max_frame_size: u32,
) -> Result<Bytes>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let ready = expect_control(io, ControlType::Ready, max_frame_size).await?;
    tracing::debug!(
        "READY received with {} content types",
        ready.content_types.len()
    );

    let matched = if local.is_empty() {
        ready.content_types
    } else {
        match_content_types(&ready.content_types, local)
    };

    let accept = ControlFrame::with_content_types(ControlType::Accept, matched);
    write_control_frame(io, &accept).await?;
    io.flush().await?;
    tracing::debug!("ACCEPT sent with {} content types", accept.content_types.len());

    negotiate(&accept.content_types)
}

/// Send START declaring `local`. Does not flush.
pub(crate) async fn send_start<W>(io: &mut W, local: &[Bytes]) -> Result<Option<Bytes>>
where
    W: AsyncWrite + Unpin,
{
    let start = ControlFrame::with_content_types(ControlType::Start, local.to_vec());
    write_control_frame(io, &start).await?;
    tracing::debug!("START written with {} content types", local.len());
    Ok(single_match(local).ok())
}

/// Wait for START and check its content types against `local`.
///
/// With no local content types anything is accepted; the writer's single
/// declared type (if it declared exactly one) is reported.
pub(crate) async fn await_start<R>(
    io: &mut R,
    local: &[Bytes],
    max_frame_size: u32,
) -> Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let start = expect_control(io, ControlType::Start, max_frame_size).await?;
    tracing::debug!(
        "START received with {} content types",
        start.content_types.len()
    );
    if local.is_empty() {
        return Ok(single_match(&start.content_types).ok());
    }
    negotiate(&match_content_types(&start.content_types, local)).map(Some)
}

/// Read one frame and require it to be a control frame of type `expected`.
async fn expect_control<R>(
    io: &mut R,
    expected: ControlType,
    max_frame_size: u32,
) -> Result<ControlFrame>
where
    R: AsyncRead + Unpin,
{
    match read_frame(io, max_frame_size).await? {
        Some(Frame::Control(frame)) if frame.control_type == expected => Ok(frame),
        Some(Frame::Control(frame)) => {
            tracing::warn!(
                "Handshake expected {}, received {}",
                expected,
                frame.control_type
            );
            Err(FramestreamError::HandshakeFailed {
                expected,
                received: Some(frame.control_type),
            })
        }
        // Writers never receive data, so for them it is just the wrong reply.
        Some(Frame::Data(_)) if expected == ControlType::Accept => {
            tracing::warn!("Data frame received while waiting for ACCEPT");
            Err(FramestreamError::HandshakeFailed {
                expected,
                received: None,
            })
        }
        Some(Frame::Data(_)) => {
            tracing::warn!("Data frame received while waiting for {}", expected);
            Err(FramestreamError::PrematureDataFrame)
        }
        None => Err(FramestreamError::UnexpectedEof),
    }
}

/// Apply the exactly-one-match policy.
fn negotiate(matched: &[Bytes]) -> Result<Bytes> {
    match single_match(matched) {
        Ok(content_type) => {
            tracing::debug!("Negotiated content type {:?}", content_type);
            Ok(content_type)
        }
        Err(count) => {
            tracing::warn!("Content type negotiation produced {} matches", count);
            Err(FramestreamError::ContentTypeMismatch { matched: count })
        }
    }
}
