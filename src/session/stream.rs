//! Byte streams attached to the master side of the PTY
//!
//! The PTY reader handed out by `portable-pty` is blocking, so a dedicated
//! thread pumps fixed-size chunks into a channel. [`OutputStream`] turns that
//! channel back into a non-blocking stream with a bounded readiness wait.
//!
//! The channel is bounded. Once it is full the reader thread blocks, unread
//! output stays in the kernel's PTY buffer and a chatty child stalls on its
//! next write until the session reads again.

use bytes::Bytes;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::sync::Mutex;

type Chunk = io::Result<Bytes>;

/// Chunks the reader thread may queue ahead of the session.
pub(crate) const PUMP_CAPACITY: usize = 8;

/// Outcome of a non-blocking read attempt.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ReadChunk {
    /// Bytes were available.
    Data(Bytes),
    /// Nothing available right now.
    WouldBlock,
    /// The child closed its side; nothing more will arrive.
    Closed,
}

/// Read end of the terminal.
pub(crate) struct OutputStream {
    rx: mpsc::Receiver<Chunk>,
    ready: Option<Chunk>,
}

impl OutputStream {
    /// Start a reader thread pumping `reader` in chunks of at most `chunk_size` bytes.
    pub(crate) fn pump<R>(reader: R, chunk_size: usize) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(PUMP_CAPACITY);
        std::thread::Builder::new()
            .name("pity-reader".to_string())
            .spawn(move || pump_chunks(reader, chunk_size.max(1), tx))?;
        Ok(Self::from_channel(rx))
    }

    pub(crate) fn from_channel(rx: mpsc::Receiver<Chunk>) -> Self {
        Self { rx, ready: None }
    }

    /// Attempt to read without waiting.
    pub(crate) fn try_read(&mut self) -> io::Result<ReadChunk> {
        let next = match self.ready.take() {
            Some(chunk) => Some(chunk),
            None => match self.rx.try_recv() {
                Ok(chunk) => Some(chunk),
                Err(TryRecvError::Empty) => return Ok(ReadChunk::WouldBlock),
                Err(TryRecvError::Disconnected) => None,
            },
        };

        match next {
            Some(Ok(bytes)) => Ok(ReadChunk::Data(bytes)),
            Some(Err(e)) => Err(e),
            None => Ok(ReadChunk::Closed),
        }
    }

    /// Wait up to `wait` for the stream to become readable.
    ///
    /// Returns `true` once a read would not block, which includes the stream
    /// having closed.
    pub(crate) async fn wait_readable(&mut self, wait: Duration) -> bool {
        if self.ready.is_some() {
            return true;
        }

        match tokio::time::timeout(wait, self.rx.recv()).await {
            Ok(Some(chunk)) => {
                self.ready = Some(chunk);
                true
            }
            Ok(None) => true,
            Err(_) => false,
        }
    }
}

fn pump_chunks<R: Read>(mut reader: R, chunk_size: usize, tx: mpsc::Sender<Chunk>) {
    let mut buf = vec![0u8; chunk_size];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                // Blocks while the session is behind; errors once it is gone
                if tx.blocking_send(Ok(Bytes::copy_from_slice(&buf[..n]))).is_err() {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if is_hangup(&e) => break,
            Err(e) => {
                let _ = tx.blocking_send(Err(e));
                break;
            }
        }
    }
}

/// Linux reports EIO on the master once every slave descriptor is closed.
#[cfg(unix)]
fn is_hangup(e: &io::Error) -> bool {
    e.raw_os_error() == Some(nix::errno::Errno::EIO as i32)
}

#[cfg(not(unix))]
fn is_hangup(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::BrokenPipe
}

/// Write end of the terminal.
pub(crate) struct InputStream {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl InputStream {
    pub(crate) fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    /// Write all of `data` and flush.
    pub(crate) async fn write_flush(&self, data: Vec<u8>) -> io::Result<()> {
        let writer = self.writer.clone();

        tokio::task::spawn_blocking(move || {
            let mut writer = writer.blocking_lock();
            writer.write_all(&data)?;
            writer.flush()
        })
        .await
        .map_err(io::Error::other)?
    }
}
