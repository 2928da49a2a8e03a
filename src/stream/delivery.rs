use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};
use tracing::{debug, info};

use super::registry::Subscription;

/// Bytes sent ahead of the first chunk so players recognize the stream
pub const PRIMING_HEADER: [u8; 10] = [0x49, 0x44, 0x33, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

/// Server identifier sent with every stream response
pub const SERVER_NAME: &str = "dumb-mp3-streamer";

/// How a delivery ended
#[derive(Debug)]
pub enum DeliveryEnd {
    /// The registry closed this subscriber's queue
    QueueClosed { bytes: u64 },
    /// Writing to the peer failed
    WriteFailed { bytes: u64, error: io::Error },
}

impl DeliveryEnd {
    pub fn bytes(&self) -> u64 {
        match self {
            Self::QueueClosed { bytes } | Self::WriteFailed { bytes, .. } => *bytes,
        }
    }
}

/// Drain one subscriber's queue into `peer`
///
/// Writes the priming header, then every chunk in queue order through a
/// buffered writer. The buffer is flushed whenever the queue is momentarily
/// empty. Consumes the subscription, so it is released on every return path.
pub async fn deliver<W>(mut subscription: Subscription, peer: W, write_buffer: usize) -> DeliveryEnd
where
    W: AsyncWrite + Unpin,
{
    let id = subscription.id();
    let mut writer = BufWriter::with_capacity(write_buffer, peer);
    let mut bytes = 0u64;

    info!("Starting client #{}", id);

    if let Err(error) = write_and_flush(&mut writer, &PRIMING_HEADER).await {
        info!("Client #{} went away before the header: {}", id, error);
        return DeliveryEnd::WriteFailed { bytes, error };
    }
    bytes += PRIMING_HEADER.len() as u64;

    while let Some(chunk) = subscription.recv().await {
        if let Err(error) = writer.write_all(&chunk).await {
            info!("Client #{} write failed after {} bytes: {}", id, bytes, error);
            return DeliveryEnd::WriteFailed { bytes, error };
        }
        bytes += chunk.len() as u64;

        if subscription.is_empty() {
            if let Err(error) = writer.flush().await {
                info!("Client #{} flush failed after {} bytes: {}", id, bytes, error);
                return DeliveryEnd::WriteFailed { bytes, error };
            }
        }
    }

    debug!("Client #{} queue closed after {} bytes", id, bytes);
    // Best effort: the peer may already be gone
    let _ = writer.flush().await;
    DeliveryEnd::QueueClosed { bytes }
}

async fn write_and_flush<W: AsyncWrite + Unpin>(writer: &mut W, data: &[u8]) -> io::Result<()> {
    writer.write_all(data).await?;
    writer.flush().await
}
