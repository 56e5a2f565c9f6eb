//! Stream lifecycle.
//!
//! ```text
//! Uninitialized ──► Ready ◄──────────────┐
//!                    │  ▲                 │
//!                    ▼  │                 │
//!                 InStream ──► Finished ──┤ (reset)
//!                    │            │       │
//!                    └──► Closing ◄┘      │
//!                           │  └──────────┘
//!                           ▼
//!                         Ended
//! ```

use oxizlib_core::error::{Result, ZlibError};
use std::fmt;

/// State of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StreamState {
    /// No engine yet.
    #[default]
    Uninitialized,
    /// Engine initialized and idle.
    Ready,
    /// A run stopped with output room left; more input may follow.
    InStream,
    /// The engine signalled the logical end of the stream.
    Finished,
    /// Teardown in progress.
    Closing,
    /// Resources released. Terminal.
    Ended,
}

impl StreamState {
    /// Whether moving from `self` to `next` is allowed.
    pub fn can_transition_to(self, next: StreamState) -> bool {
        use StreamState::*;
        match self {
            Uninitialized => matches!(next, Ready),
            Ready | InStream => matches!(next, Ready | InStream | Finished | Closing),
            Finished => matches!(next, Ready | Finished | Closing),
            Closing => matches!(next, Ready | Ended),
            Ended => false,
        }
    }

    /// Checked transition.
    pub fn transition(self, next: StreamState) -> Result<StreamState> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ZlibError::contract(format!(
                "illegal stream transition {} -> {}",
                self, next
            )))
        }
    }

    /// Engine initialized and not torn down.
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready | Self::InStream | Self::Finished)
    }

    /// Logical end reached.
    pub fn is_finished(self) -> bool {
        self == Self::Finished
    }

    /// Torn down, or being torn down.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Closing | Self::Ended)
    }
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::InStream => "in-stream",
            Self::Finished => "finished",
            Self::Closing => "closing",
            Self::Ended => "ended",
        };
        f.write_str(name)
    }
}
