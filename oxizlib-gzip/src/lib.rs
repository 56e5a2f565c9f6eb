//! # OxiZlib Gzip
//!
//! Gzip container (RFC 1952) on top of the OxiZlib stream engine.
//!
//! - [`GzipWriter`]: compresses onto any [`std::io::Write`], emitting the
//!   header on the first write and the CRC-32 / length footer on finish.
//! - [`GzipReader`]: decompresses from any [`std::io::Read`], with record
//!   reading ([`GzipReader::gets`]), push-back, rewind on seekable sources,
//!   and access to bytes following the member.
//!
//! ## Example
//!
//! ```rust
//! use oxizlib_core::CompressionLevel;
//! use oxizlib_gzip::{GzipReader, Separator};
//!
//! let gz = oxizlib_gzip::compress(b"one\ntwo\n", CompressionLevel::DEFAULT).unwrap();
//! assert_eq!(oxizlib_gzip::decompress(&gz).unwrap(), b"one\ntwo\n");
//!
//! let mut reader = GzipReader::new(&gz[..]).unwrap();
//! let lines = reader.read_records(Separator::LINE).unwrap();
//! assert_eq!(lines, vec![b"one\n".to_vec(), b"two\n".to_vec()]);
//! assert_eq!(reader.lineno(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod footer;
pub mod header;
pub mod reader;
pub mod writer;

pub use footer::{FOOTER_SIZE, GzipFooter};
pub use header::{CM_DEFLATE, FixedHeader, GZIP_MAGIC, GzipHeader, HEADER_SIZE};
pub use reader::{GzipReader, Records, Separator};
pub use writer::GzipWriter;

use oxizlib_core::error::Result;
use oxizlib_core::options::{CompressionLevel, Strategy};

/// Compress `data` into a single gzip member.
pub fn compress(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    let mut writer = GzipWriter::with_params(Vec::new(), level, Strategy::Default);
    writer.write(data)?;
    writer.finish()
}

/// Decompress gzip data, concatenating every member.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut offset = 0;
    loop {
        let mut reader = GzipReader::new(&data[offset..])?;
        out.extend_from_slice(&reader.read_all()?);
        let unused = reader.unused()?.map_or(0, |rest| rest.len());
        let unread = reader.finish()?;
        offset = data.len() - unread.len() - unused;
        if offset >= data.len() {
            return Ok(out);
        }
    }
}
