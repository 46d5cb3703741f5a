//! # framestream
//!
//! Frame Streams protocol for tokio: length-prefixed data frames over any
//! byte stream, bracketed by control frames, with optional content-type
//! negotiation.
//!
//! ## Architecture
//!
//! - **Protocol**: data/control frame codec and the control frame model
//! - **Handshake**: READY/ACCEPT (bidirectional) or START (unidirectional),
//!   exactly-one-match content-type negotiation
//! - **Writer / Reader**: buffered endpoints that run the handshake on open
//!   and exchange one payload per call
//!
//! ## Example
//!
//! ```
//! use framestream::{DecoderOptions, EncoderOptions, Reader, Writer};
//!
//! #[tokio::main]
//! async fn main() -> framestream::Result<()> {
//!     let (client, server) = tokio::io::duplex(64 * 1024);
//!
//!     let reader = tokio::spawn(async move {
//!         let options = DecoderOptions::new().content_type("t1").bidirectional(true);
//!         let mut reader = Reader::open(server, options).await?;
//!         let mut payloads = Vec::new();
//!         while let Some(payload) = reader.read().await? {
//!             payloads.push(payload);
//!         }
//!         framestream::Result::Ok(payloads)
//!     });
//!
//!     let options = EncoderOptions::new().content_type("t1").bidirectional(true);
//!     let mut writer = Writer::open(client, options).await?;
//!     writer.write(b"hello").await?;
//!     writer.close().await?;
//!
//!     let payloads = reader.await.expect("reader task panicked")?;
//!     assert_eq!(payloads, vec!["hello"]);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod handshake;
pub mod protocol;
pub mod transport;

mod options;
mod reader;
mod writer;

pub use error::{FramestreamError, Result};
pub use options::{DecoderOptions, EncoderOptions, DEFAULT_BUFFER_CAPACITY};
pub use reader::Reader;
pub use writer::Writer;
