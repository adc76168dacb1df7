//! Accumulation buffer for a single read operation

use bytes::BytesMut;

/// Bytes accumulated by one read operation.
///
/// A `PendingRead` lives only for the duration of one call; it only ever
/// grows, and nothing is discarded until the call returns.
pub struct PendingRead {
    buffer: BytesMut,
}

impl PendingRead {
    /// Create an empty buffer with room for one chunk
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Append a chunk
    pub fn append(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Everything accumulated so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Decode the buffer, replacing invalid UTF-8 sequences
    pub fn into_text(self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }
}
