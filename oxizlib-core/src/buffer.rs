//! Stream buffers.
//!
//! [`OutputBuffer`] is the growable byte buffer the engine writes into. It
//! keeps an explicit fill watermark separate from its allocated capacity, plus
//! the size of the window currently offered to the engine (`avail_out`).
//! [`InputQueue`] holds bytes that have been fed but not yet consumed.
//!
//! Growth is geometric and capped:
//!
//! - the first allocation is [`INITIAL_BUFSIZE`] bytes;
//! - afterwards the buffer grows by half its fill, at least
//!   [`AVAIL_OUT_STEP_MIN`] and at most [`AVAIL_OUT_STEP_MAX`] bytes;
//! - when the free tail is already [`AVAIL_OUT_STEP_MAX`] bytes or more it is
//!   reused as-is.
//!
//! The buffer never shrinks between growth calls.

use tracing::trace;

/// Size of the first output allocation.
pub const INITIAL_BUFSIZE: usize = 1024;

/// Largest window offered to the engine in one step.
pub const AVAIL_OUT_STEP_MAX: usize = 16384;

/// Smallest growth step once the buffer exists.
pub const AVAIL_OUT_STEP_MIN: usize = 2048;

/// Growable output buffer with a fill watermark.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    /// Allocated storage; its length is the capacity.
    data: Vec<u8>,
    /// Number of valid bytes at the front of `data`.
    filled: usize,
    /// Size of the writable window after `filled` offered to the engine.
    avail_out: usize,
}

impl OutputBuffer {
    /// Create an unallocated buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Valid bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.filled]
    }

    /// The fill watermark.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// True when no valid bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// Allocated capacity.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Size of the window currently offered to the engine.
    pub fn avail_out(&self) -> usize {
        self.avail_out
    }

    /// True once storage has been allocated.
    pub fn is_allocated(&self) -> bool {
        !self.data.is_empty()
    }

    /// Grow the buffer (or reuse its free tail) and offer a new window.
    pub fn expand(&mut self) {
        if self.data.is_empty() {
            self.data = vec![0; INITIAL_BUFSIZE];
            self.filled = 0;
            self.avail_out = INITIAL_BUFSIZE;
            trace!(capacity = INITIAL_BUFSIZE, "allocated output buffer");
            return;
        }

        let free = self.data.len() - self.filled;
        if free >= AVAIL_OUT_STEP_MAX {
            self.avail_out = AVAIL_OUT_STEP_MAX;
            return;
        }

        let inc = (self.filled / 2).clamp(AVAIL_OUT_STEP_MIN, AVAIL_OUT_STEP_MAX);
        let old_capacity = self.data.len();
        let new_capacity = old_capacity.max(self.filled + inc);
        self.data.resize(new_capacity, 0);
        self.avail_out = (new_capacity - self.filled).min(AVAIL_OUT_STEP_MAX);
        trace!(
            filled = self.filled,
            old_capacity,
            new_capacity,
            avail_out = self.avail_out,
            "expanded output buffer"
        );
    }

    /// Make sure at least `size` bytes of window follow the watermark.
    pub fn expand_into(&mut self, size: usize) {
        if self.data.is_empty() {
            self.data = vec![0; size];
            self.filled = 0;
            self.avail_out = size;
        } else if self.avail_out < size {
            let needed = self.filled + size;
            if needed > self.data.len() {
                self.data.resize(needed, 0);
            }
            self.avail_out = size;
        }
    }

    /// The writable window offered to the engine.
    pub fn window_mut(&mut self) -> &mut [u8] {
        let end = self.filled + self.avail_out;
        &mut self.data[self.filled..end]
    }

    /// Record that the engine wrote `n` bytes into the window.
    pub fn commit(&mut self, n: usize) {
        debug_assert!(n <= self.avail_out);
        let n = n.min(self.avail_out);
        self.filled += n;
        self.avail_out -= n;
    }

    /// Append bytes after the watermark, growing as needed.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let needed = self.filled + bytes.len();
        if needed > self.data.len() {
            self.data.resize(needed, 0);
            self.avail_out = 0;
        } else {
            self.avail_out = self.avail_out.saturating_sub(bytes.len());
        }
        self.data[self.filled..needed].copy_from_slice(bytes);
        self.filled = needed;
        self.avail_out = self.avail_out.min(self.data.len() - self.filled);
    }

    /// Take all valid bytes, leaving the buffer unallocated.
    pub fn detach(&mut self) -> Vec<u8> {
        let mut data = std::mem::take(&mut self.data);
        data.truncate(self.filled);
        self.filled = 0;
        self.avail_out = 0;
        data
    }

    /// Take exactly `n` bytes from the front, compacting the rest.
    ///
    /// When fewer than `n` bytes are buffered this is [`detach`](Self::detach).
    pub fn shift(&mut self, n: usize) -> Vec<u8> {
        if n >= self.filled {
            return self.detach();
        }
        let head = self.data[..n].to_vec();
        self.data.copy_within(n..self.filled, 0);
        self.filled -= n;
        self.avail_out = (self.avail_out + n)
            .min(AVAIL_OUT_STEP_MAX)
            .min(self.data.len() - self.filled);
        head
    }

    /// Push one byte back in front of the valid bytes.
    pub fn unget(&mut self, byte: u8) {
        if self.filled == self.data.len() {
            self.data.push(0);
        }
        self.data.copy_within(0..self.filled, 1);
        self.data[0] = byte;
        self.filled += 1;
        self.avail_out = self.avail_out.min(self.data.len() - self.filled);
    }

    /// Drop all valid bytes but keep the allocation.
    pub fn clear(&mut self) {
        self.filled = 0;
        self.avail_out = 0;
    }

    /// Drop all valid bytes and release the allocation.
    pub fn release(&mut self) {
        self.data = Vec::new();
        self.filled = 0;
        self.avail_out = 0;
    }
}

/// Queue of input bytes waiting to be consumed by the engine.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    data: Vec<u8>,
}

impl InputQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes at the back.
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Drop `n` bytes from the front.
    pub fn consume(&mut self, n: usize) {
        if n >= self.data.len() {
            self.data.clear();
        } else {
            self.data.drain(..n);
        }
    }

    /// Queued bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Number of queued bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Take every queued byte.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }

    /// Drop every queued byte.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}
