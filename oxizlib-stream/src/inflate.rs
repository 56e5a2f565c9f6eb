//! Decompressing convenience wrapper.

use crate::engine::{EngineParams, InflateParams};
use crate::stream::ZStream;
use crate::sync::SyncOutcome;
use oxizlib_core::error::Result;
use oxizlib_core::options::{FlushMode, Format};

/// A decompressing stream that hands back output after each call.
///
/// Once the compressed stream ends, further input is passed through
/// unchanged. Bytes that followed the end inside the same call are returned
/// by the next call or by [`finish`](Self::finish).
#[derive(Debug)]
pub struct Inflate {
    stream: ZStream,
}

impl Inflate {
    /// Create a decompressor.
    pub fn new(params: InflateParams) -> Result<Self> {
        Ok(Self {
            stream: ZStream::with_params(EngineParams::Decompress(params))?,
        })
    }

    /// Decompress `src` and return whatever output is ready.
    pub fn inflate(&mut self, src: &[u8]) -> Result<Vec<u8>> {
        if self.stream.is_finished() {
            self.stream.append_output(src)?;
            return self.stream.drain_output();
        }
        self.run(src)?;
        let out = self.stream.drain_output()?;
        if self.stream.is_finished() {
            self.stream.passthrough_input()?;
        }
        Ok(out)
    }

    /// Decompress `src`, keeping the output buffered.
    pub fn push(&mut self, src: &[u8]) -> Result<&mut Self> {
        if self.stream.is_finished() {
            self.stream.append_output(src)?;
        } else {
            self.run(src)?;
            if self.stream.is_finished() {
                self.stream.passthrough_input()?;
            }
        }
        Ok(self)
    }

    fn run(&mut self, src: &[u8]) -> Result<()> {
        if !src.is_empty() || !self.stream.pending_input().is_empty() {
            self.stream.feed(src, FlushMode::Sync)?;
        }
        Ok(())
    }

    /// Skip to the next full-flush point; see [`ZStream::sync`].
    pub fn sync(&mut self, src: &[u8]) -> Result<SyncOutcome> {
        self.stream.sync(src)
    }

    /// Load the preset dictionary the stream asked for; see
    /// [`ZStream::set_dictionary`].
    ///
    /// ```rust
    /// use oxizlib_core::{EngineErrorKind, FlushMode};
    /// use oxizlib_stream::{Deflate, DeflateParams, Inflate, InflateParams};
    ///
    /// let dictionary = b"common words shared by both sides";
    /// let mut deflate = Deflate::new(DeflateParams::new()).unwrap();
    /// deflate.set_dictionary(dictionary).unwrap();
    /// let packed = deflate.deflate(b"common words again", FlushMode::Finish).unwrap();
    ///
    /// let mut inflate = Inflate::new(InflateParams::new()).unwrap();
    /// let err = inflate.inflate(&packed).unwrap_err();
    /// assert_eq!(err.engine_kind(), Some(EngineErrorKind::NeedDictionary));
    /// inflate.set_dictionary(dictionary).unwrap();
    /// assert_eq!(inflate.inflate(&[]).unwrap(), b"common words again");
    /// ```
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<u32> {
        self.stream.set_dictionary(dictionary)
    }

    /// Whether the input consumed so far ends on a full-flush point.
    pub fn sync_point(&self) -> bool {
        self.stream.sync_point()
    }

    /// Finish and return the remaining output.
    ///
    /// Fails with a buffer error when the compressed stream is incomplete.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        self.stream.finish()
    }

    /// Restart with the current parameters.
    pub fn reset(&mut self) -> Result<()> {
        self.stream.reset()
    }

    /// Tear down.
    pub fn end(&mut self) -> Result<()> {
        self.stream.end()
    }

    /// Compressed bytes consumed.
    pub fn total_in(&self) -> u64 {
        self.stream.total_in()
    }

    /// Uncompressed bytes produced.
    pub fn total_out(&self) -> u64 {
        self.stream.total_out()
    }

    /// Adler-32 of the output so far (zlib framing).
    pub fn adler(&self) -> u32 {
        self.stream.adler()
    }

    /// Whether the compressed stream has ended.
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

fn inflate_with(data: &[u8], params: InflateParams) -> Result<Vec<u8>> {
    let mut stream = ZStream::with_params(EngineParams::Decompress(params))?;
    stream.feed(data, FlushMode::Sync)?;
    let out = stream.finish()?;
    stream.end()?;
    Ok(out)
}

/// Decompress a complete zlib stream.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    inflate_with(data, InflateParams::new())
}

/// Decompress complete raw DEFLATE data.
pub fn inflate_raw(data: &[u8]) -> Result<Vec<u8>> {
    inflate_with(data, InflateParams::new().with_format(Format::Raw))
}
