//! # OxiZlib Core
//!
//! Core components shared by the OxiZlib stream engine and gzip codec.
//!
//! This crate provides the fundamental building blocks:
//!
//! - [`buffer`]: Growable output buffer with a fill watermark, and the input queue
//! - [`checksum`]: CRC-32 and Adler-32 checksums
//! - [`options`]: Flush modes, compression levels, strategies and framing formats
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! OxiZlib is designed as a layered stack:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     compress / decompress / cat / test / info          │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container                                           │
//! │     GzipWriter / GzipReader (RFC 1952 framing)         │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Stream engine                                       │
//! │     ZStream state machine over a DEFLATE engine        │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Core (this crate)                                   │
//! │     Buffers, checksums, options, errors                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxizlib_core::buffer::OutputBuffer;
//! use oxizlib_core::checksum::{crc32, CRC32_INIT};
//!
//! // Compute CRC-32
//! let crc = crc32(b"Hello, World!", CRC32_INIT);
//! assert_eq!(crc, 0xEC4AC3D0);
//!
//! // Grow an output buffer the way the stream engine does
//! let mut buffer = OutputBuffer::new();
//! buffer.expand();
//! assert_eq!(buffer.capacity(), 1024);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod checksum;
pub mod error;
pub mod options;

// Re-exports for convenience
pub use buffer::{InputQueue, OutputBuffer};
pub use checksum::{Crc32, adler32, crc_table, crc32};
pub use error::{ContainerErrorKind, EngineErrorKind, Result, ZlibError};
pub use options::{CompressionLevel, DataType, FlushMode, Format, Strategy};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::buffer::{InputQueue, OutputBuffer};
    pub use crate::checksum::{Crc32, adler32, crc32};
    pub use crate::error::{ContainerErrorKind, EngineErrorKind, Result, ZlibError};
    pub use crate::options::{CompressionLevel, DataType, FlushMode, Format, Strategy};
}
