//! Timeout-bounded incremental read-and-match

use super::stream::{OutputStream, ReadChunk};
use crate::buffer::PendingRead;
use crate::logger::Logger;
use crate::result::{ExpectError, Output, StopReason};
use std::time::{Duration, Instant};

/// Tuning for the read loop.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReadSettings {
    /// Initial capacity of the accumulation buffer
    pub(crate) chunk_size: usize,
    /// Longest single wait for the stream to become readable
    pub(crate) poll_interval: Duration,
}

/// Accumulate output until `predicate` holds for the whole buffer, the
/// stream closes, or `timeout` elapses.
///
/// Timing out and reaching end-of-stream are normal outcomes; only
/// unexpected I/O failures are errors. The call returns at most one poll
/// interval after the deadline.
pub(crate) async fn read_until<P>(
    stream: &mut OutputStream,
    settings: ReadSettings,
    logger: &dyn Logger,
    timeout: Duration,
    mut predicate: P,
) -> Result<Output, ExpectError>
where
    P: FnMut(&[u8]) -> bool,
{
    let mut pending = PendingRead::with_capacity(settings.chunk_size);
    let started = Instant::now();

    let stop_reason = loop {
        let elapsed = started.elapsed();
        if elapsed >= timeout {
            break StopReason::Timeout;
        }

        match stream.try_read()? {
            ReadChunk::Data(chunk) => {
                pending.append(&chunk);
                // Patterns may span chunks, so always test everything read so far
                if predicate(pending.as_bytes()) {
                    break StopReason::Matched;
                }
            }
            ReadChunk::WouldBlock => {
                let slice = settings.poll_interval.min(timeout - elapsed);
                stream.wait_readable(slice).await;
            }
            ReadChunk::Closed => break StopReason::Eof,
        }
    };

    let len = pending.len();
    let text = pending.into_text();
    logger.info(&text);
    logger.debug(&format!("Read ({len} bytes, {stop_reason:?}): {text:?}"));

    Ok(Output::new(text, stop_reason))
}
