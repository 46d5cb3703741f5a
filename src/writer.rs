//! Frame Streams writer (encoder).
//!
//! A [`Writer`] wraps a transport in a private write buffer, performs the
//! opening handshake on construction, then writes one data frame per
//! [`write`](Writer::write) call.
//!
//! # Lifecycle
//!
//! ```text
//! open ─► READY ─► ACCEPT ─┐
//!                          ├─► Established ─► write* ─► close (STOP) ─► Closed
//! open ─► START ───────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use framestream::{EncoderOptions, Writer};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> framestream::Result<()> {
//! let mut out = Vec::new();
//! let mut writer = Writer::open_unidirectional(
//!     &mut out,
//!     EncoderOptions::new().content_type("text/plain"),
//! )
//! .await?;
//!
//! writer.write(b"hello").await?;
//! writer.close().await?;
//! drop(writer);
//!
//! assert_eq!(&out[out.len() - 4..], &[0, 0, 0, 3]); // STOP
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufWriter};

use crate::error::{FramestreamError, Result};
use crate::handshake::{self, Phase};
use crate::options::EncoderOptions;
use crate::protocol::{write_control_frame, write_data_frame, ControlFrame, ControlType};

/// Writing end of a Frame Streams connection.
///
/// Generic over the transport: pass an owned stream, or `&mut` to one to keep
/// ownership with the caller. The transport is never shut down by the writer.
pub struct Writer<T> {
    /// Buffered transport.
    io: BufWriter<T>,
    /// Current protocol phase.
    phase: Phase,
    /// Content type agreed during the handshake.
    content_type: Option<Bytes>,
    /// Data frames written so far.
    frames_written: u64,
}

impl<T> Writer<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Open a writer over a duplex transport.
    ///
    /// With `options.bidirectional` this sends READY, flushes, and waits for
    /// the reader's ACCEPT. Otherwise it writes START.
    ///
    /// # Errors
    ///
    /// `HandshakeFailed` or `UnexpectedEof` if the peer answers with anything
    /// but ACCEPT; `ContentTypeMismatch` unless exactly one offered content
    /// type comes back in ACCEPT (so a bidirectional writer needs at least
    /// one); `Io` on transport failure.
    pub async fn open(transport: T, options: EncoderOptions) -> Result<Self> {
        if !options.bidirectional {
            return Self::start(transport, &options).await;
        }

        let mut writer = Self::new(transport, &options);

        handshake::send_ready(&mut writer.io, &options.content_types).await?;
        writer.phase = Phase::HandshakeSent;

        let negotiated = handshake::await_accept(
            &mut writer.io,
            &options.content_types,
            options.max_frame_size,
        )
        .await?;
        writer.content_type = Some(negotiated);
        writer.phase = Phase::Established;

        Ok(writer)
    }
}

impl<T> Writer<T>
where
    T: AsyncWrite + Unpin,
{
    /// Open a unidirectional writer over a write-only transport (file, pipe).
    ///
    /// Writes START into the buffer; nothing reaches the transport until
    /// [`flush`](Self::flush) or [`close`](Self::close).
    pub async fn open_unidirectional(transport: T, options: EncoderOptions) -> Result<Self> {
        if options.bidirectional {
            return Err(FramestreamError::InvalidState {
                operation: "run a bidirectional handshake on a write-only transport",
                phase: Phase::Init,
            });
        }
        Self::start(transport, &options).await
    }

    fn new(transport: T, options: &EncoderOptions) -> Self {
        Self {
            io: BufWriter::with_capacity(options.buffer_capacity, transport),
            phase: Phase::Init,
            content_type: None,
            frames_written: 0,
        }
    }

    async fn start(transport: T, options: &EncoderOptions) -> Result<Self> {
        let mut writer = Self::new(transport, options);
        writer.content_type =
            handshake::send_start(&mut writer.io, &options.content_types).await?;
        writer.phase = Phase::Established;
        Ok(writer)
    }

    /// Write one data frame.
    ///
    /// Returns the number of payload bytes accepted. The frame may sit in the
    /// buffer until the next flush.
    ///
    /// # Errors
    ///
    /// `InvalidState` unless established; `EmptyDataFrame` for an empty
    /// payload (the stream stays usable); `Io` on transport failure.
    pub async fn write(&mut self, payload: &[u8]) -> Result<usize> {
        self.phase.require(Phase::Established, "write")?;
        if payload.is_empty() {
            return Err(FramestreamError::EmptyDataFrame);
        }

        let result = write_data_frame(&mut self.io, payload).await;
        self.track(result)?;
        self.frames_written += 1;
        Ok(payload.len())
    }

    /// Push buffered bytes to the transport.
    pub async fn flush(&mut self) -> Result<()> {
        self.phase.require(Phase::Established, "flush")?;
        let result = self.io.flush().await.map_err(FramestreamError::from);
        self.track(result)
    }

    /// Send STOP and flush.
    ///
    /// May be called once; a second call fails with `InvalidState`.
    pub async fn close(&mut self) -> Result<()> {
        self.phase.require(Phase::Established, "close")?;

        let stop = ControlFrame::new(ControlType::Stop);
        let result: Result<()> = async {
            write_control_frame(&mut self.io, &stop).await?;
            self.io.flush().await?;
            Ok(())
        }
        .await;
        self.track(result)?;

        self.phase = Phase::Closed;
        tracing::debug!("STOP sent after {} data frames", self.frames_written);
        Ok(())
    }

    /// Current protocol phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Content type agreed during the handshake, if any.
    pub fn content_type(&self) -> Option<&Bytes> {
        self.content_type.as_ref()
    }

    /// Number of data frames written.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Get a reference to the underlying transport.
    pub fn get_ref(&self) -> &T {
        self.io.get_ref()
    }

    /// Release the transport.
    ///
    /// Bytes still in the write buffer are discarded; close or flush first.
    pub fn into_inner(self) -> T {
        if self.phase == Phase::Established {
            tracing::debug!("Writer released without STOP");
        }
        self.io.into_inner()
    }

    fn track<R>(&mut self, result: Result<R>) -> Result<R> {
        if let Err(e) = &result {
            tracing::warn!("Writer failed: {}", e);
            self.phase = Phase::Failed;
        }
        result
    }
}
