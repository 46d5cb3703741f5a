//! Unix domain socket listener and connector.
//!
//! # Example
//!
//! ```ignore
//! use framestream::transport::{connect, generate_socket_path, SocketListener};
//! use framestream::{DecoderOptions, EncoderOptions, Reader, Writer};
//!
//! let path = generate_socket_path();
//! let listener = SocketListener::bind(&path).await?;
//!
//! let stream = connect(&path).await?;
//! let options = EncoderOptions::new().content_type("t1").bidirectional(true);
//! let mut writer = Writer::open(stream, options).await?;
//! ```

use std::path::Path;

use tokio::net::{UnixListener, UnixStream};

use crate::error::Result;

/// Generate a unique socket path for this process.
///
/// Format: `{tmp}/framestream-{pid}-{random}.sock`
pub fn generate_socket_path() -> String {
    let dir = std::env::temp_dir();
    let name = format!("framestream-{}-{:x}.sock", std::process::id(), rand_u64());
    dir.join(name).to_string_lossy().into_owned()
}

/// Simple random u64 using system time, process ID and a counter.
fn rand_u64() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let pid = std::process::id() as u64;
    let count = COUNTER.fetch_add(1, Ordering::Relaxed);

    nanos.wrapping_mul(0x517cc1b727220a95) ^ pid ^ count.rotate_left(32)
}

/// Unix domain socket listener that owns its socket file.
///
/// The socket file is removed when the listener is dropped.
pub struct SocketListener {
    listener: UnixListener,
    path: String,
}

impl SocketListener {
    /// Bind to a Unix socket path.
    ///
    /// Removes any stale socket file at the path before binding.
    pub async fn bind(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            std::fs::remove_file(path)?;
        }

        let listener = UnixListener::bind(path)?;
        tracing::debug!("Listening on {}", path);

        Ok(Self {
            listener,
            path: path.to_string(),
        })
    }

    /// Accept a single connection.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self.listener.accept().await?;
        tracing::debug!("Accepted connection on {}", self.path);
        Ok(stream)
    }

    /// Get the socket path.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Drop for SocketListener {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Connect to a listening Unix socket.
pub async fn connect(path: &str) -> Result<UnixStream> {
    Ok(UnixStream::connect(path).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_socket_path_format() {
        let path = generate_socket_path();
        let file_name = Path::new(&path).file_name().unwrap().to_str().unwrap();

        assert!(file_name.starts_with("framestream-"));
        assert!(file_name.ends_with(".sock"));
        assert!(file_name.contains(&std::process::id().to_string()));
    }

    #[test]
    fn test_generate_socket_path_uniqueness() {
        let paths: Vec<String> = (0..10).map(|_| generate_socket_path()).collect();

        for (i, p1) in paths.iter().enumerate() {
            for p2 in &paths[i + 1..] {
                assert_ne!(p1, p2, "Paths should be unique");
            }
        }
    }

    #[tokio::test]
    async fn test_bind_replaces_stale_file_and_cleans_up() {
        let path = generate_socket_path();
        std::fs::write(&path, b"stale").unwrap();

        let listener = SocketListener::bind(&path).await.unwrap();
        assert_eq!(listener.path(), path);

        let accept = listener.accept();
        let (accepted, connected) = tokio::join!(accept, connect(&path));
        accepted.unwrap();
        connected.unwrap();

        drop(listener);
        assert!(!Path::new(&path).exists());
    }

    #[tokio::test]
    async fn test_connect_without_listener_fails() {
        let path = generate_socket_path();
        assert!(connect(&path).await.is_err());
    }
}
