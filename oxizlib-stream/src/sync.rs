//! Full-flush point search.
//!
//! A full flush ends with an empty stored block whose length fields read
//! `00 00 FF FF`. After that marker the compressor's dictionary is empty, so
//! decoding can restart there in raw mode.

/// Bytes ending a full-flush point.
pub const SYNC_MARKER: [u8; 4] = [0x00, 0x00, 0xFF, 0xFF];

/// Result of [`ZStream::sync`](crate::ZStream::sync).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A flush point was found. Bytes after it stay queued for decoding.
    Found {
        /// Input bytes discarded, marker included.
        skipped: usize,
    },
    /// No flush point yet. All input was discarded; a marker split across
    /// calls is still recognized.
    NotFound {
        /// Input bytes discarded.
        skipped: usize,
    },
}

impl SyncOutcome {
    /// Whether a flush point was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Bytes discarded by this call.
    pub fn skipped(&self) -> usize {
        match self {
            Self::Found { skipped } | Self::NotFound { skipped } => *skipped,
        }
    }
}

/// Incremental marker matcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSearch {
    /// Marker bytes matched so far (0..=4).
    have: u8,
}

impl SyncSearch {
    /// Fresh matcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marker bytes matched so far.
    pub fn matched(&self) -> usize {
        self.have as usize
    }

    /// Forget any partial match.
    pub fn reset(&mut self) {
        self.have = 0;
    }

    /// Scan `buf`; returns the offset just past the marker when it completes.
    pub fn search(&mut self, buf: &[u8]) -> Option<usize> {
        let mut got = self.have;
        let mut next = 0;
        while next < buf.len() && got < 4 {
            let expect = if got < 2 { 0x00 } else { 0xFF };
            let byte = buf[next];
            if byte == expect {
                got += 1;
            } else if byte != 0 {
                got = 0;
            } else {
                // trailing zeros become the new prefix
                got = 4 - got;
            }
            next += 1;
        }
        if got == 4 {
            self.have = 0;
            Some(next)
        } else {
            self.have = got;
            None
        }
    }
}
