use bytes::BytesMut;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};

use super::registry::FanoutRegistry;
use crate::session::RecordingSwitch;

/// Why the read loop stopped
#[derive(Debug)]
pub enum ReadLoopExit {
    /// Recording was disabled; observed between reads
    Disabled { chunks: u64 },
    /// The live feed failed, ended, or delivered a short read
    FeedClosed { chunks: u64, error: io::Error },
}

impl ReadLoopExit {
    pub fn chunks(&self) -> u64 {
        match self {
            Self::Disabled { chunks } | Self::FeedClosed { chunks, .. } => *chunks,
        }
    }
}

/// Pull fixed-size chunks from the live feed and broadcast each one
///
/// The enable switch is checked only between reads. A read that is already
/// waiting on the feed is not interrupted by a disable; it completes when the
/// next chunk's worth of bytes arrives.
pub async fn run_read_loop<R>(
    mut feed: R,
    registry: &FanoutRegistry,
    switch: &RecordingSwitch,
) -> ReadLoopExit
where
    R: AsyncRead + Unpin,
{
    let chunk_size = registry.tuning().read_chunk_bytes;
    let mut chunks = 0u64;

    info!("Read loop started ({} byte chunks)", chunk_size);

    loop {
        if !switch.is_enabled() {
            info!("Read loop stopping: recording disabled after {} chunks", chunks);
            return ReadLoopExit::Disabled { chunks };
        }

        let mut buffer = BytesMut::zeroed(chunk_size);
        if let Err(error) = feed.read_exact(&mut buffer).await {
            warn!("Read loop stopping: live feed read failed: {}", error);
            return ReadLoopExit::FeedClosed { chunks, error };
        }

        let report = registry.broadcast(buffer.freeze());
        chunks += 1;
        debug!(
            "Chunk {} broadcast: {} delivered, {} dropped",
            chunks, report.delivered, report.dropped
        );
    }
}
