//! Streaming gzip compression onto a [`Write`] transport.

use crate::footer::GzipFooter;
use crate::header::{GzipHeader, current_mtime, truncate_at_nul};
use oxizlib_core::checksum::Crc32;
use oxizlib_core::error::{Result, ZlibError};
use oxizlib_core::options::{CompressionLevel, FlushMode, Format, Strategy};
use oxizlib_stream::{DeflateParams, ZStream};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Gzip compressor writing to `W`.
///
/// The header goes out with the first write or flush, so header fields can
/// be set until then. [`GzipWriter::finish`] (or drop) writes the footer.
///
/// ```rust
/// use oxizlib_gzip::{GzipReader, GzipWriter};
///
/// let mut writer = GzipWriter::new(Vec::new());
/// writer.set_orig_name("hello.txt").unwrap();
/// writer.write(b"Hello, gzip!").unwrap();
/// let gz = writer.finish().unwrap();
///
/// let mut reader = GzipReader::new(&gz[..]).unwrap();
/// assert_eq!(reader.orig_name(), Some(&b"hello.txt"[..]));
/// assert_eq!(reader.read_all().unwrap(), b"Hello, gzip!");
/// ```
#[derive(Debug)]
pub struct GzipWriter<W: Write> {
    inner: Option<W>,
    stream: ZStream,
    header: GzipHeader,
    crc: Crc32,
    sync: bool,
    header_written: bool,
    finishing: bool,
}

impl GzipWriter<File> {
    /// Create `path` and write a gzip stream into it.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> GzipWriter<W> {
    /// Writer with the default level and strategy.
    pub fn new(inner: W) -> Self {
        Self::with_params(inner, CompressionLevel::DEFAULT, Strategy::Default)
    }

    /// Writer with an explicit level and strategy.
    pub fn with_params(inner: W, level: CompressionLevel, strategy: Strategy) -> Self {
        let params = DeflateParams::new()
            .with_level(level)
            .with_strategy(strategy)
            .with_format(Format::Raw);
        Self {
            inner: Some(inner),
            stream: ZStream::ready(params),
            header: GzipHeader {
                level,
                ..GzipHeader::new()
            },
            crc: Crc32::new(),
            sync: false,
            header_written: false,
            finishing: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.inner.is_none() || self.stream.is_closed() {
            return Err(ZlibError::contract("closed gzip stream"));
        }
        Ok(())
    }

    fn ensure_header_pending(&self) -> Result<()> {
        self.ensure_open()?;
        if self.header_written {
            return Err(ZlibError::header_written());
        }
        Ok(())
    }

    /// Set the modification time recorded in the header.
    pub fn set_mtime(&mut self, mtime: u32) -> Result<()> {
        self.ensure_header_pending()?;
        self.header.mtime = mtime;
        Ok(())
    }

    /// Set the original filename. Anything from the first NUL on is dropped.
    pub fn set_orig_name(&mut self, name: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_header_pending()?;
        self.header.orig_name = Some(truncate_at_nul(name.as_ref()));
        Ok(())
    }

    /// Set the comment. Anything from the first NUL on is dropped.
    pub fn set_comment(&mut self, comment: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_header_pending()?;
        self.header.comment = Some(truncate_at_nul(comment.as_ref()));
        Ok(())
    }

    /// In sync mode every write is sync-flushed and the transport flushed.
    pub fn set_sync(&mut self, sync: bool) {
        self.sync = sync;
    }

    fn write_header(&mut self) -> Result<()> {
        if self.header.mtime == 0 {
            self.header.mtime = current_mtime();
        }
        let bytes = self.header.encode();
        self.stream.append_output(&bytes)?;
        self.header_written = true;
        debug!(
            mtime = self.header.mtime,
            os_code = self.header.os_code,
            "gzip header written"
        );
        Ok(())
    }

    fn write_raw(&mut self) -> Result<()> {
        if self.stream.buffered_len() == 0 {
            return Ok(());
        }
        let data = self.stream.drain_output()?;
        let inner = self
            .inner
            .as_mut()
            .ok_or_else(|| ZlibError::contract("closed gzip stream"))?;
        inner.write_all(&data)?;
        if self.sync {
            inner.flush()?;
        }
        Ok(())
    }

    /// Compress `bytes`, returning how many were accepted.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize> {
        self.ensure_open()?;
        if !self.header_written {
            self.write_header()?;
        }
        if !bytes.is_empty() || self.sync {
            self.crc.update(bytes);
            let flush = if self.sync {
                FlushMode::Sync
            } else {
                FlushMode::None
            };
            self.stream.feed(bytes, flush)?;
        }
        self.write_raw()?;
        Ok(bytes.len())
    }

    /// Compress a single byte.
    pub fn putc(&mut self, byte: u8) -> Result<()> {
        self.write(&[byte]).map(|_| ())
    }

    /// Flush the engine with `mode` and push everything to the transport.
    ///
    /// `FlushMode::None` only writes what is already buffered.
    pub fn flush_with(&mut self, mode: FlushMode) -> Result<()> {
        self.ensure_open()?;
        if !self.header_written {
            self.write_header()?;
        }
        if mode != FlushMode::None {
            self.stream.feed(&[], mode)?;
        }
        self.write_raw()?;
        if let Some(inner) = self.inner.as_mut() {
            inner.flush()?;
        }
        Ok(())
    }

    /// Write the footer and end the stream.
    ///
    /// The footer goes out at most once: after a failed attempt only the
    /// teardown is repeated.
    fn finish_stream(&mut self) -> Result<()> {
        if self.finishing {
            return self.stream.end();
        }
        self.finishing = true;
        let written = self.write_footer();
        let ended = self.stream.end();
        written.and(ended)
    }

    fn write_footer(&mut self) -> Result<()> {
        if !self.header_written {
            self.write_header()?;
        }
        self.stream.feed(&[], FlushMode::Finish)?;
        let footer = GzipFooter::new(self.crc.value(), self.crc.len());
        self.stream.append_output(&footer.encode())?;
        self.write_raw()?;
        debug!(
            total_in = self.stream.total_in(),
            total_out = self.stream.total_out(),
            crc = footer.crc,
            "gzip member finished"
        );
        Ok(())
    }

    /// Write the footer and hand back the transport without closing it.
    pub fn finish(&mut self) -> Result<W> {
        self.ensure_open()?;
        self.finish_stream()?;
        self.inner
            .take()
            .ok_or_else(|| ZlibError::contract("closed gzip stream"))
    }

    /// Write the footer, flush and drop the transport.
    pub fn close(&mut self) -> Result<()> {
        let mut inner = self.finish()?;
        inner.flush()?;
        Ok(())
    }

    /// Modification time (filled with the current time once the header is out).
    pub fn mtime(&self) -> u32 {
        self.header.mtime
    }

    /// Original filename, if set.
    pub fn orig_name(&self) -> Option<&[u8]> {
        self.header.orig_name.as_deref()
    }

    /// Comment, if set.
    pub fn comment(&self) -> Option<&[u8]> {
        self.header.comment.as_deref()
    }

    /// Operating system code.
    pub fn os_code(&self) -> u8 {
        self.header.os_code
    }

    /// Configured compression level.
    pub fn level(&self) -> CompressionLevel {
        self.header.level
    }

    /// CRC-32 of everything written so far.
    pub fn crc(&self) -> u32 {
        self.crc.value()
    }

    /// Uncompressed bytes written.
    pub fn total_in(&self) -> u64 {
        self.stream.total_in()
    }

    /// Compressed bytes produced by the engine, framing excluded.
    pub fn total_out(&self) -> u64 {
        self.stream.total_out()
    }

    /// Whether sync mode is on.
    pub fn sync(&self) -> bool {
        self.sync
    }

    /// Whether the header has been emitted.
    pub fn is_header_written(&self) -> bool {
        self.header_written
    }

    /// Whether the writer has been finished or closed.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none() || self.stream.is_closed()
    }

    /// The transport, unless finished.
    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }

    /// The transport, mutably, unless finished.
    pub fn get_mut(&mut self) -> Option<&mut W> {
        self.inner.as_mut()
    }
}

impl<W: Write> Write for GzipWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        GzipWriter::write(self, buf).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_with(FlushMode::Sync).map_err(io::Error::from)
    }
}

impl<W: Write> Drop for GzipWriter<W> {
    fn drop(&mut self) {
        if self.inner.is_some() && !self.stream.is_closed() {
            if let Err(err) = self.finish_stream() {
                warn!(%err, "failed to finish gzip stream on drop");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{GZIP_MAGIC, extra_flags, flags, os};
    use oxizlib_core::checksum::crc32;
    use oxizlib_core::error::ContainerErrorKind;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Transport that fails its next write once armed.
    #[derive(Debug, Default)]
    struct FlakyTransport {
        data: Rc<RefCell<Vec<u8>>>,
        fail_next: Rc<Cell<bool>>,
    }

    impl Write for FlakyTransport {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail_next.replace(false) {
                return Err(io::Error::other("transient"));
            }
            self.data.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_header_layout() {
        let mut writer = GzipWriter::new(Vec::new());
        writer.set_mtime(1_000_000).unwrap();
        writer.set_orig_name(b"a.txt").unwrap();
        writer.write(b"payload").unwrap();
        let gz = writer.finish().unwrap();

        assert_eq!(&gz[..2], &GZIP_MAGIC);
        assert_eq!(gz[2], 8);
        assert_eq!(gz[3], flags::FNAME);
        assert_eq!(&gz[4..8], &1_000_000u32.to_le_bytes());
        assert_eq!(gz[8], 0);
        assert_eq!(gz[9], os::UNIX);
        assert_eq!(&gz[10..16], b"a.txt\0");

        let footer = GzipFooter::decode(&gz[gz.len() - 8..]).unwrap();
        assert_eq!(footer.crc, crc32(b"payload", 0));
        assert_eq!(footer.size, 7);
    }

    #[test]
    fn test_extra_flags_follow_level() {
        let fast =
            GzipWriter::with_params(Vec::new(), CompressionLevel::BEST_SPEED, Strategy::Default)
                .finish()
                .unwrap();
        assert_eq!(fast[8], extra_flags::FAST);

        let slow = GzipWriter::with_params(
            Vec::new(),
            CompressionLevel::BEST_COMPRESSION,
            Strategy::Default,
        )
        .finish()
        .unwrap();
        assert_eq!(slow[8], extra_flags::SLOW);
    }

    #[test]
    fn test_zero_mtime_becomes_now() {
        let mut writer = GzipWriter::new(Vec::new());
        writer.write(b"x").unwrap();
        assert!(writer.mtime() > 0);
    }

    #[test]
    fn test_header_lock() {
        let mut writer = GzipWriter::new(Vec::new());
        writer.set_comment("first").unwrap();
        writer.write(b"data").unwrap();

        let err = writer.set_comment("second").unwrap_err();
        assert_eq!(err.container_kind(), Some(ContainerErrorKind::HeaderWritten));
        assert!(writer.set_mtime(5).is_err());
        assert!(writer.set_orig_name("b").is_err());
        assert_eq!(writer.comment(), Some(&b"first"[..]));
    }

    #[test]
    fn test_flush_emits_header() {
        let mut writer = GzipWriter::new(Vec::new());
        writer.flush_with(FlushMode::None).unwrap();
        assert!(writer.is_header_written());
        assert_eq!(writer.get_ref().unwrap().len(), 10);
    }

    #[test]
    fn test_empty_write_without_sync() {
        let mut writer = GzipWriter::new(Vec::new());
        assert_eq!(writer.write(b"").unwrap(), 0);
        assert_eq!(writer.total_in(), 0);
        assert_eq!(writer.total_out(), 0);
    }

    #[test]
    fn test_sync_mode_flushes_each_write() {
        let mut writer = GzipWriter::new(Vec::new());
        writer.set_sync(true);
        writer.write(b"line one\n").unwrap();
        let after_first = writer.get_ref().unwrap().len();
        assert!(after_first > 10);
        assert!(writer.get_ref().unwrap().ends_with(&[0x00, 0x00, 0xFF, 0xFF]));
    }

    #[test]
    fn test_closed_writer_rejects() {
        let mut writer = GzipWriter::new(Vec::new());
        writer.write(b"abc").unwrap();
        writer.close().unwrap();
        assert!(writer.is_closed());
        assert!(writer.write(b"more").unwrap_err().is_contract_violation());
        assert!(writer.finish().unwrap_err().is_contract_violation());
    }

    #[test]
    fn test_name_truncated_at_nul() {
        let mut writer = GzipWriter::new(Vec::new());
        writer.set_orig_name(b"abc\0def").unwrap();
        assert_eq!(writer.orig_name(), Some(&b"abc"[..]));
    }

    #[test]
    fn test_failed_finish_writes_footer_once() {
        let transport = FlakyTransport::default();
        let data = Rc::clone(&transport.data);
        let fail_next = Rc::clone(&transport.fail_next);

        let mut writer = GzipWriter::new(transport);
        writer.write(b"hello world").unwrap();
        let before = data.borrow().len();

        fail_next.set(true);
        let err = writer.finish().unwrap_err();
        assert!(matches!(err, ZlibError::Io(_)));
        assert!(writer.is_closed());
        assert!(writer.finish().unwrap_err().is_contract_violation());
        assert!(writer.write(b"more").unwrap_err().is_contract_violation());

        drop(writer);
        assert_eq!(data.borrow().len(), before);
    }
}
