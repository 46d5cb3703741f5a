//! File Round-trip - example of a unidirectional Frame Stream on disk.
//!
//! This example demonstrates:
//! - Writing a START/data/STOP stream to a file with `Writer::open_unidirectional`
//! - Reading it back with `Reader::open_unidirectional`
//! - Content type checking on the reading side
//!
//! # Running
//!
//! ```sh
//! cargo run --example file_roundtrip -- /tmp/messages.fstrm
//! ```

use framestream::{DecoderOptions, EncoderOptions, Reader, Writer};
use tokio::fs::File;

const CONTENT_TYPE: &str = "text:demo.Message";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "messages.fstrm".to_string());

    let file = File::create(&path).await?;
    let mut writer =
        Writer::open_unidirectional(file, EncoderOptions::new().content_type(CONTENT_TYPE))
            .await?;
    for i in 0..5 {
        let message = format!("message {}", i);
        writer.write(message.as_bytes()).await?;
    }
    writer.close().await?;
    println!("Wrote {} frames to {}", writer.frames_written(), path);

    let file = File::open(&path).await?;
    let mut reader =
        Reader::open_unidirectional(file, DecoderOptions::new().content_type(CONTENT_TYPE))
            .await?;
    while let Some(payload) = reader.read().await? {
        println!("{}", String::from_utf8_lossy(&payload));
    }
    println!(
        "Read {} frames (content type {:?})",
        reader.frames_read(),
        reader.content_type()
    );

    Ok(())
}
