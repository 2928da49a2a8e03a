// Sinks the encoder writes into
//
// `TeeWriter` duplicates every byte into two writers. `live_pipe` builds the
// in-process byte pipe that carries the encoded stream from the encoder
// (blocking `Write`, capture thread) to the read loop (`AsyncRead`, runtime).

use bytes::Bytes;
use std::io::{self, Write};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::io::StreamReader;

/// Writer that forwards every byte to two destinations
///
/// Both legs receive the full buffer; the first failing leg aborts the write.
pub struct TeeWriter<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> TeeWriter<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: Write, B: Write> Write for TeeWriter<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

/// Reading half of the live pipe. Reads EOF once the writer is dropped.
pub type PipeReader = StreamReader<UnboundedReceiverStream<io::Result<Bytes>>, Bytes>;

/// Create an unbounded in-process byte pipe
pub fn live_pipe() -> (PipeWriter, PipeReader) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        PipeWriter { tx },
        StreamReader::new(UnboundedReceiverStream::new(rx)),
    )
}

/// Writing half of the live pipe. Never blocks.
///
/// Dropping it signals end-of-stream to the reader.
pub struct PipeWriter {
    tx: mpsc::UnboundedSender<io::Result<Bytes>>,
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        self.tx
            .send(Ok(Bytes::copy_from_slice(buf)))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "live pipe reader closed"))?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_tee_writes_both_legs() {
        let mut tee = TeeWriter::new(Vec::new(), Vec::new());
        tee.write_all(b"abc").unwrap();
        tee.write_all(b"def").unwrap();

        let (first, second) = tee.into_inner();
        assert_eq!(first, b"abcdef");
        assert_eq!(second, b"abcdef");
    }

    #[test]
    fn test_tee_fails_when_a_leg_fails() {
        let (pipe_writer, pipe_reader) = live_pipe();
        drop(pipe_reader);

        let mut tee = TeeWriter::new(Vec::new(), pipe_writer);
        let err = tee.write_all(b"abc").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_pipe_reassembles_exact_reads() {
        let (mut writer, mut reader) = live_pipe();
        writer.write_all(&[1, 2, 3]).unwrap();
        writer.write_all(&[4, 5]).unwrap();
        writer.write_all(&[6, 7, 8, 9]).unwrap();

        let mut chunk = [0u8; 4];
        reader.read_exact(&mut chunk).await.unwrap();
        assert_eq!(chunk, [1, 2, 3, 4]);
        reader.read_exact(&mut chunk).await.unwrap();
        assert_eq!(chunk, [5, 6, 7, 8]);
    }

    #[tokio::test]
    async fn test_pipe_short_read_after_writer_drop() {
        let (mut writer, mut reader) = live_pipe();
        writer.write_all(&[1, 2]).unwrap();
        drop(writer);

        let mut chunk = [0u8; 4];
        let err = reader.read_exact(&mut chunk).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
