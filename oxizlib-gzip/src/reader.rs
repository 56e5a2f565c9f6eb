//! Streaming gzip decompression from a [`Read`] transport.
//!
//! The reader pulls raw bytes in fixed-size chunks, keeps whatever the
//! engine has not consumed queued, and validates the footer the first time
//! the end of the data is reached. Bytes after the footer stay available
//! through [`GzipReader::unused`].

use crate::footer::{FOOTER_SIZE, GzipFooter};
use crate::header::{FixedHeader, GzipHeader, HEADER_SIZE};
use oxizlib_core::checksum::Crc32;
use oxizlib_core::error::{Result, ZlibError};
use oxizlib_core::options::{CompressionLevel, FlushMode, Format};
use oxizlib_stream::{InflateParams, ZStream};
use std::fs::File;
use std::io::{self, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace};

/// Raw bytes pulled from the transport per read.
pub const READ_CHUNK_SIZE: usize = 2048;

/// Record separator for [`GzipReader::gets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator<'a> {
    /// Records end after this byte sequence. An empty sequence means
    /// [`Separator::Paragraph`].
    Bytes(&'a [u8]),
    /// Records end after a blank line; runs of newlines are collapsed.
    Paragraph,
    /// The rest of the data is one record.
    Whole,
}

impl Separator<'static> {
    /// Newline-terminated lines.
    pub const LINE: Separator<'static> = Separator::Bytes(b"\n");
}

impl Default for Separator<'_> {
    fn default() -> Self {
        Separator::LINE
    }
}

/// Gzip decompressor reading from `R`.
#[derive(Debug)]
pub struct GzipReader<R: Read> {
    inner: Option<R>,
    stream: ZStream,
    header: GzipHeader,
    crc: Crc32,
    lineno: u64,
    ungetc: usize,
    footer_checked: bool,
    footer_consumed: u64,
}

impl GzipReader<File> {
    /// Open a gzip file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(file)
    }
}

impl<R: Read> GzipReader<R> {
    /// Parse the member header from `inner`.
    pub fn new(inner: R) -> Result<Self> {
        let stream = ZStream::with_params(InflateParams::new().with_format(Format::Raw))?;
        let mut reader = Self {
            inner: Some(inner),
            stream,
            header: GzipHeader::new(),
            crc: Crc32::new(),
            lineno: 0,
            ungetc: 0,
            footer_checked: false,
            footer_consumed: 0,
        };
        reader.read_header()?;
        Ok(reader)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.inner.is_none() || self.stream.is_closed() {
            return Err(ZlibError::contract("closed gzip stream"));
        }
        Ok(())
    }

    /// One chunk from the transport; empty at end of file.
    fn read_raw(&mut self) -> Result<Vec<u8>> {
        let inner = self
            .inner
            .as_mut()
            .ok_or_else(|| ZlibError::contract("closed gzip stream"))?;
        let mut buf = vec![0u8; READ_CHUNK_SIZE];
        loop {
            match inner.read(&mut buf) {
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(buf);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Queue raw input until at least `size` bytes are pending.
    fn read_raw_ensure(&mut self, size: usize) -> Result<bool> {
        while self.stream.pending_input().len() < size {
            let chunk = self.read_raw()?;
            if chunk.is_empty() {
                return Ok(false);
            }
            self.stream.append_input(&chunk)?;
        }
        Ok(true)
    }

    /// Take a NUL-terminated field off the front of the queued input.
    fn read_raw_until_nul(&mut self) -> Result<Vec<u8>> {
        let mut searched = 0;
        loop {
            let pending = self.stream.pending_input();
            if let Some(pos) = pending[searched..].iter().position(|&b| b == 0) {
                let end = searched + pos;
                let field = pending[..end].to_vec();
                self.stream.discard_input(end + 1)?;
                return Ok(field);
            }
            searched = pending.len();
            let chunk = self.read_raw()?;
            if chunk.is_empty() {
                return Err(ZlibError::unexpected_eof());
            }
            self.stream.append_input(&chunk)?;
        }
    }

    fn read_header(&mut self) -> Result<()> {
        if !self.read_raw_ensure(HEADER_SIZE)? {
            return Err(ZlibError::not_gzip());
        }
        let fixed = FixedHeader::parse(self.stream.pending_input())?;
        self.header.mtime = fixed.mtime;
        self.header.os_code = fixed.os_code;
        self.header.level = fixed.level();
        self.stream.discard_input(HEADER_SIZE)?;

        if fixed.has_extra() {
            if !self.read_raw_ensure(2)? {
                return Err(ZlibError::unexpected_eof());
            }
            let pending = self.stream.pending_input();
            let xlen = u16::from_le_bytes([pending[0], pending[1]]) as usize;
            if !self.read_raw_ensure(2 + xlen)? {
                return Err(ZlibError::unexpected_eof());
            }
            self.stream.discard_input(2 + xlen)?;
        }
        if fixed.has_name() {
            self.header.orig_name = Some(self.read_raw_until_nul()?);
        }
        if fixed.has_comment() {
            self.header.comment = Some(self.read_raw_until_nul()?);
        }

        debug!(
            mtime = self.header.mtime,
            os_code = self.header.os_code,
            level = %self.header.level,
            "gzip header parsed"
        );

        if !self.stream.pending_input().is_empty() {
            self.stream.feed(&[], FlushMode::Sync)?;
        }
        Ok(())
    }

    /// Pull and decompress until output is buffered or the data ends.
    fn read_more(&mut self) -> Result<()> {
        while !self.stream.is_finished() {
            let chunk = self.read_raw()?;
            if chunk.is_empty() {
                return Err(ZlibError::unexpected_eof());
            }
            trace!(len = chunk.len(), "gzip input chunk");
            self.stream.feed(&chunk, FlushMode::Sync)?;
            if self.stream.buffered_len() > 0 {
                break;
            }
        }
        Ok(())
    }

    fn check_footer(&mut self) -> Result<()> {
        self.footer_checked = true;
        if !self.read_raw_ensure(FOOTER_SIZE)? {
            return Err(ZlibError::no_footer());
        }
        let footer =
            GzipFooter::decode(self.stream.pending_input()).ok_or_else(ZlibError::no_footer)?;
        self.footer_consumed = FOOTER_SIZE as u64;
        self.stream.discard_input(FOOTER_SIZE)?;
        footer.verify(self.crc.value(), self.stream.total_out())?;
        debug!(crc = footer.crc, size = footer.size, "gzip footer verified");
        Ok(())
    }

    /// Fold delivered bytes into the running CRC, skipping pushed-back ones.
    fn update_crc(&mut self, data: &[u8]) {
        if data.len() <= self.ungetc {
            self.ungetc -= data.len();
        } else {
            self.crc.update(&data[self.ungetc..]);
            self.ungetc = 0;
        }
    }

    fn take_output(&mut self, len: usize) -> Result<Option<Vec<u8>>> {
        if self.eof() {
            if !self.footer_checked {
                self.check_footer()?;
            }
            return Ok(None);
        }
        let data = self.stream.shift_output(len)?;
        self.update_crc(&data);
        Ok(Some(data))
    }

    /// Up to `len` bytes; fewer only at the end of the data.
    ///
    /// Returns `None` once everything has been read, after validating the
    /// footer.
    pub fn read_bytes(&mut self, len: usize) -> Result<Option<Vec<u8>>> {
        self.ensure_open()?;
        if len == 0 {
            return Ok(Some(Vec::new()));
        }
        while !self.stream.is_finished() && self.stream.buffered_len() < len {
            self.read_more()?;
        }
        self.take_output(len)
    }

    /// Whatever is available, at most `len` bytes, pulling only when
    /// nothing is buffered.
    pub fn read_partial(&mut self, len: usize) -> Result<Option<Vec<u8>>> {
        self.ensure_open()?;
        if len == 0 {
            return Ok(Some(Vec::new()));
        }
        while !self.stream.is_finished() && self.stream.buffered_len() == 0 {
            self.read_more()?;
        }
        self.take_output(len)
    }

    /// Everything up to the end of the data, footer validated.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        self.ensure_open()?;
        while !self.stream.is_finished() {
            self.read_more()?;
        }
        let data = self.stream.drain_output()?;
        self.update_crc(&data);
        if !self.footer_checked {
            self.check_footer()?;
        }
        Ok(data)
    }

    /// Next byte.
    pub fn getc(&mut self) -> Result<Option<u8>> {
        Ok(self.read_bytes(1)?.and_then(|b| b.first().copied()))
    }

    /// Push a byte back; the next read returns it first.
    pub fn ungetc(&mut self, byte: u8) -> Result<()> {
        self.ensure_open()?;
        self.stream.unget_output(byte)?;
        self.ungetc += 1;
        Ok(())
    }

    fn skip_linebreaks(&mut self) -> Result<()> {
        loop {
            while self.stream.buffered_len() == 0 {
                if self.stream.is_finished() {
                    return Ok(());
                }
                self.read_more()?;
            }
            let output = self.stream.output();
            let newlines = output.iter().take_while(|&&b| b == b'\n').count();
            if newlines < output.len() {
                let skipped = self.stream.shift_output(newlines)?;
                self.update_crc(&skipped);
                return Ok(());
            }
            let skipped = self.stream.drain_output()?;
            self.update_crc(&skipped);
        }
    }

    /// Next record, separator included. `None` at the end of the data.
    pub fn gets(&mut self, separator: Separator<'_>) -> Result<Option<Vec<u8>>> {
        self.ensure_open()?;
        let (sep, paragraph): (&[u8], bool) = match separator {
            Separator::Whole => {
                let record = self.read_all()?;
                if record.is_empty() {
                    return Ok(None);
                }
                self.lineno += 1;
                return Ok(Some(record));
            }
            Separator::Paragraph => (&b"\n\n"[..], true),
            Separator::Bytes(sep) if sep.is_empty() => (&b"\n\n"[..], true),
            Separator::Bytes(sep) => (sep, false),
        };

        if paragraph {
            self.skip_linebreaks()?;
        }

        while self.stream.buffered_len() < sep.len() {
            if self.stream.is_finished() {
                if self.stream.buffered_len() > 0 {
                    self.lineno += 1;
                }
                return self.read_bytes(sep.len());
            }
            self.read_more()?;
        }

        let mut searched = 0;
        let end = loop {
            let output = self.stream.output();
            if let Some(pos) = output[searched..]
                .windows(sep.len())
                .position(|window| window == sep)
            {
                break searched + pos + sep.len();
            }
            if self.stream.is_finished() {
                break output.len();
            }
            // A separator may straddle the next chunk.
            searched = output.len() + 1 - sep.len();
            self.read_more()?;
        };

        self.lineno += 1;
        let record = self.read_bytes(end)?;
        if paragraph {
            self.skip_linebreaks()?;
        }
        Ok(record)
    }

    /// Next newline-terminated line.
    pub fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        self.gets(Separator::LINE)
    }

    /// Iterate over the remaining records.
    pub fn records<'r, 's>(&'r mut self, separator: Separator<'s>) -> Records<'r, 's, R> {
        Records {
            reader: self,
            separator,
            done: false,
        }
    }

    /// Collect the remaining records.
    pub fn read_records(&mut self, separator: Separator<'_>) -> Result<Vec<Vec<u8>>> {
        self.records(separator).collect()
    }

    /// Records returned by `gets` so far.
    pub fn lineno(&self) -> u64 {
        self.lineno
    }

    /// Overwrite the record counter.
    pub fn set_lineno(&mut self, lineno: u64) {
        self.lineno = lineno;
    }

    /// Trailing bytes after the footer, once the data has been read.
    ///
    /// Only bytes already pulled from the transport are returned. Anything
    /// the transport has not handed over yet stays there, so a short-read
    /// transport can leave this `None` with more data behind the footer.
    pub fn unused(&mut self) -> Result<Option<Vec<u8>>> {
        self.ensure_open()?;
        if !self.eof() {
            return Ok(None);
        }
        if !self.footer_checked {
            self.check_footer()?;
        }
        let pending = self.stream.pending_input();
        Ok((!pending.is_empty()).then(|| pending.to_vec()))
    }

    /// Whether the data has ended and everything has been read.
    pub fn eof(&self) -> bool {
        self.stream.is_finished() && self.stream.buffered_len() == 0
    }

    /// Release the stream and hand back the transport.
    ///
    /// The footer is validated first if the data was read to the end.
    pub fn finish(&mut self) -> Result<R> {
        self.ensure_open()?;
        if self.eof() && !self.footer_checked {
            self.check_footer()?;
        }
        self.stream.end()?;
        self.inner
            .take()
            .ok_or_else(|| ZlibError::contract("closed gzip stream"))
    }

    /// Release the stream and drop the transport.
    pub fn close(&mut self) -> Result<()> {
        self.finish().map(drop)
    }

    /// Parsed header.
    pub fn header(&self) -> &GzipHeader {
        &self.header
    }

    /// Modification time from the header.
    pub fn mtime(&self) -> u32 {
        self.header.mtime
    }

    /// Original filename from the header.
    pub fn orig_name(&self) -> Option<&[u8]> {
        self.header.orig_name.as_deref()
    }

    /// Comment from the header.
    pub fn comment(&self) -> Option<&[u8]> {
        self.header.comment.as_deref()
    }

    /// Operating system code from the header.
    pub fn os_code(&self) -> u8 {
        self.header.os_code
    }

    /// Level implied by the header's extra flags.
    pub fn level(&self) -> CompressionLevel {
        self.header.level
    }

    /// CRC-32 of the bytes delivered so far.
    pub fn crc(&self) -> u32 {
        self.crc.value()
    }

    /// Compressed bytes consumed, footer included once read.
    pub fn total_in(&self) -> u64 {
        self.stream.total_in() + self.footer_consumed
    }

    /// Uncompressed bytes delivered.
    pub fn total_out(&self) -> u64 {
        self.stream
            .total_out()
            .saturating_sub(self.stream.buffered_len() as u64)
    }

    /// Whether the reader has been finished or closed.
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// The transport, unless finished.
    pub fn get_ref(&self) -> Option<&R> {
        self.inner.as_ref()
    }
}

impl<R: Read + Seek> GzipReader<R> {
    /// Seek the transport back to the start of the compressed data and
    /// start over. Header fields are kept.
    pub fn rewind(&mut self) -> Result<()> {
        self.ensure_open()?;
        let consumed = self.total_in() + self.stream.pending_input().len() as u64;
        let inner = self
            .inner
            .as_mut()
            .ok_or_else(|| ZlibError::contract("closed gzip stream"))?;
        inner.seek(SeekFrom::Current(-(consumed as i64)))?;

        self.stream.reset()?;
        self.crc.reset();
        self.lineno = 0;
        self.ungetc = 0;
        self.footer_checked = false;
        self.footer_consumed = 0;
        debug!(consumed, "gzip reader rewound");
        Ok(())
    }
}

impl<R: Read> Read for GzipReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        match self.read_partial(buf.len()).map_err(io::Error::from)? {
            Some(data) => {
                buf[..data.len()].copy_from_slice(&data);
                Ok(data.len())
            }
            None => Ok(0),
        }
    }
}

/// Iterator over records, see [`GzipReader::records`].
#[derive(Debug)]
pub struct Records<'r, 's, R: Read> {
    reader: &'r mut GzipReader<R>,
    separator: Separator<'s>,
    done: bool,
}

impl<R: Read> Iterator for Records<'_, '_, R> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.gets(self.separator) {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
