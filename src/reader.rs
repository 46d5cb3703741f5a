//! Frame Streams reader (decoder).
//!
//! A [`Reader`] performs the opening handshake on construction and then
//! yields one payload per [`read`](Reader::read) call until the writer's
//! STOP, which is reported once as `None`.
//!
//! # Example
//!
//! ```
//! use framestream::protocol::{build_control_frame, build_data_frame, ControlFrame, ControlType};
//! use framestream::{DecoderOptions, Reader};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> framestream::Result<()> {
//! let mut wire = build_control_frame(&ControlFrame::new(ControlType::Start))?;
//! wire.extend(build_data_frame(b"hello")?);
//! wire.extend(build_control_frame(&ControlFrame::new(ControlType::Stop))?);
//!
//! let mut reader = Reader::open_unidirectional(&wire[..], DecoderOptions::new()).await?;
//! assert_eq!(reader.read().await?.as_deref(), Some(&b"hello"[..]));
//! assert_eq!(reader.read().await?, None);
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite, BufReader};

use crate::error::{FramestreamError, Result};
use crate::handshake::{self, Phase};
use crate::options::DecoderOptions;
use crate::protocol::{read_frame, ControlType, Frame};

/// Reading end of a Frame Streams connection.
pub struct Reader<T> {
    /// Buffered transport.
    io: BufReader<T>,
    /// Current protocol phase.
    phase: Phase,
    /// Content type agreed during the handshake.
    content_type: Option<Bytes>,
    /// Largest data frame payload accepted.
    max_frame_size: u32,
    /// Data frames read so far.
    frames_read: u64,
    /// Whether the stream ended with STOP rather than transport end.
    stop_received: bool,
}

impl<T> Reader<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Open a reader over a duplex transport.
    ///
    /// With `options.bidirectional` this waits for READY and answers with
    /// ACCEPT carrying the matching content types (the whole READY offer when
    /// none are configured). Exactly one entry must be in that ACCEPT.
    /// Otherwise it waits for START.
    ///
    /// # Errors
    ///
    /// `HandshakeFailed`, `PrematureDataFrame` or `UnexpectedEof` if the
    /// writer opens with anything else; `ContentTypeMismatch` if negotiation
    /// does not yield exactly one content type. ACCEPT has already been sent
    /// in that case, so the writer fails too.
    pub async fn open(transport: T, options: DecoderOptions) -> Result<Self> {
        if !options.bidirectional {
            return Self::await_start(transport, &options).await;
        }

        let mut reader = Self::new(transport, &options);
        reader.phase = Phase::AwaitReady;

        let negotiated = handshake::respond_to_ready(
            &mut reader.io,
            &options.content_types,
            options.max_frame_size,
        )
        .await?;
        reader.content_type = Some(negotiated);
        reader.phase = Phase::Established;

        Ok(reader)
    }
}

impl<T> Reader<T>
where
    T: AsyncRead + Unpin,
{
    /// Open a unidirectional reader over a read-only transport (file, pipe).
    pub async fn open_unidirectional(transport: T, options: DecoderOptions) -> Result<Self> {
        if options.bidirectional {
            return Err(FramestreamError::InvalidState {
                operation: "run a bidirectional handshake on a read-only transport",
                phase: Phase::Init,
            });
        }
        Self::await_start(transport, &options).await
    }

    fn new(transport: T, options: &DecoderOptions) -> Self {
        Self {
            io: BufReader::with_capacity(options.buffer_capacity, transport),
            phase: Phase::Init,
            content_type: None,
            max_frame_size: options.max_frame_size,
            frames_read: 0,
            stop_received: false,
        }
    }

    async fn await_start(transport: T, options: &DecoderOptions) -> Result<Self> {
        let mut reader = Self::new(transport, options);
        reader.phase = Phase::AwaitStart;

        reader.content_type =
            handshake::await_start(&mut reader.io, &options.content_types, reader.max_frame_size)
                .await?;
        reader.phase = Phase::Established;

        Ok(reader)
    }

    /// Read the next data frame.
    ///
    /// Returns `Some(payload)` per data frame and `None` once, when STOP
    /// arrives or the transport ends on a frame boundary. Reading again
    /// after that fails with `InvalidState`.
    ///
    /// # Errors
    ///
    /// `UnexpectedControlFrame` for any control frame other than STOP;
    /// `FrameTooLarge`, `MalformedControlFrame`, `UnexpectedEof` or `Io`
    /// from the frame codec.
    pub async fn read(&mut self) -> Result<Option<Bytes>> {
        self.phase.require(Phase::Established, "read")?;

        let frame = read_frame(&mut self.io, self.max_frame_size).await;
        match self.track(frame)? {
            Some(Frame::Data(payload)) => {
                self.frames_read += 1;
                Ok(Some(payload))
            }
            Some(Frame::Control(frame)) if frame.control_type == ControlType::Stop => {
                tracing::debug!("STOP received after {} data frames", self.frames_read);
                self.stop_received = true;
                self.phase = Phase::Closed;
                Ok(None)
            }
            Some(Frame::Control(frame)) => {
                tracing::warn!("Unexpected {} control frame", frame.control_type);
                self.phase = Phase::Failed;
                Err(FramestreamError::UnexpectedControlFrame(frame.control_type))
            }
            None => {
                tracing::debug!(
                    "Transport ended without STOP after {} data frames",
                    self.frames_read
                );
                self.phase = Phase::Closed;
                Ok(None)
            }
        }
    }

    /// Current protocol phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Content type agreed during the handshake, if any.
    pub fn content_type(&self) -> Option<&Bytes> {
        self.content_type.as_ref()
    }

    /// Number of data frames read.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Whether end of stream has been reported.
    pub fn is_terminated(&self) -> bool {
        self.phase == Phase::Closed
    }

    /// Whether the stream ended with an explicit STOP.
    pub fn stop_received(&self) -> bool {
        self.stop_received
    }

    /// Get a reference to the underlying transport.
    pub fn get_ref(&self) -> &T {
        self.io.get_ref()
    }

    /// Release the transport.
    ///
    /// Bytes already pulled into the read buffer are discarded.
    pub fn into_inner(self) -> T {
        self.io.into_inner()
    }

    fn track<R>(&mut self, result: Result<R>) -> Result<R> {
        if let Err(e) = &result {
            tracing::warn!("Reader failed: {}", e);
            self.phase = Phase::Failed;
        }
        result
    }
}
