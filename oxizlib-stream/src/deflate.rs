//! Compressing convenience wrapper.

use crate::engine::{DeflateParams, EngineParams};
use crate::stream::ZStream;
use oxizlib_core::error::Result;
use oxizlib_core::options::{CompressionLevel, DataType, FlushMode, Format, Strategy};

/// A compressing stream that hands back output after each call.
///
/// # Example
///
/// ```rust
/// use oxizlib_core::FlushMode;
/// use oxizlib_stream::{Deflate, DeflateParams};
///
/// let mut deflate = Deflate::new(DeflateParams::new()).unwrap();
/// let mut out = deflate.deflate(b"hello ", FlushMode::None).unwrap();
/// out.extend(deflate.deflate(b"world", FlushMode::Finish).unwrap());
/// assert_eq!(oxizlib_stream::inflate(&out).unwrap(), b"hello world");
/// ```
#[derive(Debug)]
pub struct Deflate {
    stream: ZStream,
}

impl Deflate {
    /// Create a compressor.
    pub fn new(params: DeflateParams) -> Result<Self> {
        Ok(Self {
            stream: ZStream::with_params(EngineParams::Compress(params))?,
        })
    }

    /// Compress `src` and return whatever output is ready.
    ///
    /// Empty input without a flush does not touch the engine.
    pub fn deflate(&mut self, src: &[u8], flush: FlushMode) -> Result<Vec<u8>> {
        if !src.is_empty() || flush != FlushMode::None {
            self.stream.feed(src, flush)?;
        }
        self.stream.drain_output()
    }

    /// Compress `src`, keeping the output buffered.
    pub fn push(&mut self, src: &[u8]) -> Result<&mut Self> {
        if !src.is_empty() {
            self.stream.feed(src, FlushMode::None)?;
        }
        Ok(self)
    }

    /// Flush with `mode` and return the buffered output.
    pub fn flush(&mut self, mode: FlushMode) -> Result<Vec<u8>> {
        if mode != FlushMode::None {
            self.stream.feed(&[], mode)?;
        }
        self.stream.drain_output()
    }

    /// Sync flush and return the buffered output.
    pub fn flush_sync(&mut self) -> Result<Vec<u8>> {
        self.flush(FlushMode::Sync)
    }

    /// Finish the stream and return the remaining output.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        self.stream.finish()
    }

    /// Change level and strategy; see [`ZStream::set_params`].
    pub fn set_params(&mut self, level: CompressionLevel, strategy: Strategy) -> Result<()> {
        self.stream.set_params(level, strategy)
    }

    /// Load a preset dictionary before the first byte; see
    /// [`ZStream::set_dictionary`].
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<u32> {
        self.stream.set_dictionary(dictionary)
    }

    /// Text/binary guess over the input so far.
    pub fn data_type(&self) -> DataType {
        self.stream.data_type()
    }

    /// Restart with the current parameters. A dictionary must be set again.
    pub fn reset(&mut self) -> Result<()> {
        self.stream.reset()
    }

    /// Tear down.
    pub fn end(&mut self) -> Result<()> {
        self.stream.end()
    }

    /// Uncompressed bytes consumed.
    pub fn total_in(&self) -> u64 {
        self.stream.total_in()
    }

    /// Compressed bytes produced.
    pub fn total_out(&self) -> u64 {
        self.stream.total_out()
    }

    /// Adler-32 of the input so far (zlib framing).
    pub fn adler(&self) -> u32 {
        self.stream.adler()
    }

    /// Whether the stream is finished.
    pub fn is_finished(&self) -> bool {
        self.stream.is_finished()
    }

    /// Whether the stream is torn down.
    pub fn is_closed(&self) -> bool {
        self.stream.is_closed()
    }

    /// The underlying stream.
    pub fn stream(&self) -> &ZStream {
        &self.stream
    }

    /// The underlying stream, mutably.
    pub fn stream_mut(&mut self) -> &mut ZStream {
        &mut self.stream
    }
}

fn deflate_with(data: &[u8], params: DeflateParams) -> Result<Vec<u8>> {
    let mut stream = ZStream::with_params(EngineParams::Compress(params))?;
    stream.feed(data, FlushMode::Finish)?;
    let out = stream.drain_output()?;
    stream.end()?;
    Ok(out)
}

/// Compress `data` into a zlib stream.
pub fn deflate(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    deflate_with(data, DeflateParams::new().with_level(level))
}

/// Compress `data` into raw DEFLATE.
pub fn deflate_raw(data: &[u8], level: CompressionLevel) -> Result<Vec<u8>> {
    deflate_with(
        data,
        DeflateParams::new().with_level(level).with_format(Format::Raw),
    )
}
