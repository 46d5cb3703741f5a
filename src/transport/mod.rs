//! Transport module - Unix domain socket helpers.
//!
//! Frame Streams is transport-agnostic: [`Writer`](crate::Writer) and
//! [`Reader`](crate::Reader) accept any tokio `AsyncRead`/`AsyncWrite`.
//! This module covers the common deployment of a reader listening on a
//! Unix socket path with writers connecting to it.

#[cfg(unix)]
mod socket;

#[cfg(unix)]
pub use socket::{connect, generate_socket_path, SocketListener};
