//! # OxiZlib Stream
//!
//! Push-style zlib streams over a DEFLATE engine.
//!
//! A [`ZStream`] accepts arbitrary input chunks, runs the engine, and grows
//! its output buffer as the engine produces data. Its lifecycle is an explicit
//! state machine ([`StreamState`]); every transition is checked.
//!
//! ## Modules
//!
//! - [`engine`]: Compressor / decompressor variants and their parameters
//! - [`state`]: Stream lifecycle
//! - [`stream`]: The stream itself
//! - [`sync`]: Full-flush point search for resynchronization
//! - [`deflate`], [`inflate`]: Convenience wrappers and one-shot helpers
//!
//! ## Example
//!
//! ```rust
//! use oxizlib_core::{CompressionLevel, FlushMode};
//! use oxizlib_stream::{DeflateParams, InflateParams, ZStream};
//!
//! let mut compressor = ZStream::with_params(DeflateParams::new()).unwrap();
//! compressor.feed(b"Hello, ", FlushMode::None).unwrap();
//! compressor.feed(b"World!", FlushMode::None).unwrap();
//! let compressed = compressor.finish().unwrap();
//!
//! let mut decompressor = ZStream::with_params(InflateParams::new()).unwrap();
//! decompressor.feed(&compressed, FlushMode::Sync).unwrap();
//! assert!(decompressor.is_finished());
//! assert_eq!(decompressor.drain_output().unwrap(), b"Hello, World!");
//!
//! // One-shot helpers
//! let packed = oxizlib_stream::deflate(b"abc", CompressionLevel::BEST_SPEED).unwrap();
//! assert_eq!(oxizlib_stream::inflate(&packed).unwrap(), b"abc");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod deflate;
pub mod engine;
pub mod inflate;
pub mod state;
pub mod stream;
pub mod sync;

pub use deflate::{Deflate, deflate, deflate_raw};
pub use engine::{
    Compressor, Decompressor, DeflateParams, Engine, EngineParams, InflateParams, RunOutcome,
    RunStatus,
};
pub use inflate::{Inflate, inflate, inflate_raw};
pub use state::StreamState;
pub use stream::ZStream;
pub use sync::{SYNC_MARKER, SyncOutcome};
