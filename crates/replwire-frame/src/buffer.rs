use std::collections::VecDeque;

use bytes::BytesMut;
use tracing::trace;

use crate::codec::split_frames;
use crate::error::Result;

const INITIAL_PENDING_CAPACITY: usize = 4 * 1024;

/// Accumulates raw read chunks into complete, delivery-ready frames.
///
/// Owns the two pieces of framing state a session needs across reads:
/// the bytes of an as-yet-unterminated frame, and a FIFO queue of frames
/// that are complete but not yet consumed. All queued frames are
/// delimiter-stripped, valid UTF-8 documents.
#[derive(Debug, Default)]
pub struct StreamBuffer {
    pending: BytesMut,
    queue: VecDeque<String>,
}

impl StreamBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            pending: BytesMut::with_capacity(INITIAL_PENDING_CAPACITY),
            queue: VecDeque::new(),
        }
    }

    /// Feed one raw read chunk, queueing any frames it completes.
    ///
    /// Returns the number of newly queued frames.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<usize> {
        let frames = split_frames(chunk, &mut self.pending)?;
        let queued = frames.len();
        self.queue.extend(frames);
        trace!(
            chunk_len = chunk.len(),
            queued,
            pending = self.pending.len(),
            "fed stream buffer"
        );
        Ok(queued)
    }

    /// Dequeue the oldest complete frame, if any.
    pub fn pop_frame(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Number of complete frames waiting to be consumed.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Number of buffered bytes belonging to an incomplete frame.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// True when no frames are queued and no partial bytes are buffered.
    pub fn is_drained(&self) -> bool {
        self.queue.is_empty() && self.pending.is_empty()
    }
}
