//! The push-style stream.
//!
//! A [`ZStream`] owns one engine, an input queue and a growable output
//! buffer. Callers push chunks with [`ZStream::feed`] and collect output with
//! [`ZStream::drain_output`] or [`ZStream::shift_output`]. Input that the
//! engine has not consumed stays queued, including when a run fails.

use crate::engine::{Engine, EngineParams, RunStatus};
use crate::state::StreamState;
use crate::sync::{SyncOutcome, SyncSearch};
use oxizlib_core::buffer::{InputQueue, OutputBuffer};
use oxizlib_core::checksum::{ADLER32_INIT, adler32};
use oxizlib_core::error::{EngineErrorKind, Result, ZlibError};
use oxizlib_core::options::{
    CompressionLevel, DataType, DataTypeDetector, FlushMode, Format, Strategy,
};
use tracing::{debug, trace, warn};

/// A compression or decompression session.
#[derive(Debug, Default)]
pub struct ZStream {
    state: StreamState,
    engine: Option<Engine>,
    input: InputQueue,
    output: OutputBuffer,
    total_in: u64,
    total_out: u64,
    adler: u32,
    sync_search: SyncSearch,
    data_type: DataTypeDetector,
}

impl ZStream {
    /// Create an uninitialized stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a stream that is ready to run.
    pub fn ready(params: impl Into<EngineParams>) -> Self {
        Self {
            state: StreamState::Ready,
            engine: Some(Engine::new(params.into())),
            input: InputQueue::default(),
            output: OutputBuffer::default(),
            total_in: 0,
            total_out: 0,
            adler: ADLER32_INIT,
            sync_search: SyncSearch::default(),
            data_type: DataTypeDetector::default(),
        }
    }

    /// Create and initialize a stream.
    pub fn with_params(params: impl Into<EngineParams>) -> Result<Self> {
        let mut stream = Self::new();
        stream.initialize(params.into())?;
        Ok(stream)
    }

    /// Allocate the engine and move to `Ready`.
    pub fn initialize(&mut self, params: EngineParams) -> Result<()> {
        if self.state != StreamState::Uninitialized {
            return Err(ZlibError::contract(format!(
                "cannot initialize a stream that is {}",
                self.state
            )));
        }
        self.engine = Some(Engine::new(params));
        self.adler = ADLER32_INIT;
        self.set_state(StreamState::Ready)
    }

    fn set_state(&mut self, next: StreamState) -> Result<()> {
        self.state = self.state.transition(next)?;
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.state.is_ready() {
            Ok(())
        } else {
            Err(ZlibError::contract(format!("stream is {}", self.state)))
        }
    }

    fn engine_mut(&mut self) -> Result<&mut Engine> {
        self.engine
            .as_mut()
            .ok_or_else(|| ZlibError::contract("stream has no engine"))
    }

    /// Push `bytes` and run the engine with `flush`.
    ///
    /// Empty `bytes` with [`FlushMode::Finish`] announces the end of input.
    /// A finished decompressor queues the bytes as trailing data without
    /// running; a finished compressor rejects further input.
    pub fn feed(&mut self, bytes: &[u8], flush: FlushMode) -> Result<()> {
        self.ensure_ready()?;
        if self.state.is_finished() {
            if !self.is_compressor() {
                self.input.append(bytes);
                return Ok(());
            }
            if bytes.is_empty() {
                return Ok(());
            }
            return Err(ZlibError::engine_with_message(
                EngineErrorKind::Stream,
                "stream is already finished",
            ));
        }
        self.input.append(bytes);
        self.run(flush)
    }

    fn run(&mut self, flush: FlushMode) -> Result<()> {
        if self.output.avail_out() == 0 {
            self.output.expand();
        }

        loop {
            let Some(engine) = self.engine.as_mut() else {
                return Err(ZlibError::contract("stream has no engine"));
            };
            let compressing = engine.is_compressor();
            let zlib_framed = engine.format() == Format::Zlib;
            let filled_before = self.output.filled();
            let outcome = engine.run(self.input.as_slice(), self.output.window_mut(), flush);

            if compressing {
                let consumed = &self.input.as_slice()[..outcome.consumed];
                self.data_type.update(consumed);
                if zlib_framed {
                    self.adler = adler32(consumed, self.adler);
                }
            }
            self.input.consume(outcome.consumed);
            self.output.commit(outcome.produced);
            if zlib_framed && !compressing {
                self.adler = adler32(&self.output.as_slice()[filled_before..], self.adler);
            }
            self.total_in += outcome.consumed as u64;
            self.total_out += outcome.produced as u64;

            match outcome.status {
                Ok(RunStatus::StreamEnd) => return self.set_state(StreamState::Finished),
                Ok(RunStatus::NeedDictionary) => {
                    let message = match self.dictionary_id() {
                        Some(id) => format!("need dictionary (adler32 {:08x})", id),
                        None => EngineErrorKind::NeedDictionary.description().to_string(),
                    };
                    return Err(ZlibError::engine_with_message(
                        EngineErrorKind::NeedDictionary,
                        message,
                    ));
                }
                Ok(RunStatus::Ok) => {}
                Err(EngineErrorKind::Buffer)
                    if flush != FlushMode::Finish && self.output.avail_out() > 0 =>
                {
                    return self.set_state(StreamState::InStream);
                }
                Err(kind) => return Err(ZlibError::engine(kind)),
            }

            if self.output.avail_out() > 0 {
                return self.set_state(StreamState::InStream);
            }
            self.output.expand();
        }
    }

    /// Announce the end of input, run to the end and take all output.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        self.ensure_ready()?;
        if !self.state.is_finished() {
            self.feed(&[], FlushMode::Finish)?;
        }
        Ok(self.output.detach())
    }

    /// Take all buffered output.
    pub fn drain_output(&mut self) -> Result<Vec<u8>> {
        self.ensure_ready()?;
        Ok(self.output.detach())
    }

    /// Take exactly `n` bytes of output, or everything if fewer are buffered.
    pub fn shift_output(&mut self, n: usize) -> Result<Vec<u8>> {
        self.ensure_ready()?;
        Ok(self.output.shift(n))
    }

    /// Append bytes to the output buffer.
    pub fn append_output(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_ready()?;
        self.output.append(bytes);
        Ok(())
    }

    /// Push one byte back to the front of the output buffer.
    pub fn unget_output(&mut self, byte: u8) -> Result<()> {
        self.ensure_ready()?;
        self.output.unget(byte);
        Ok(())
    }

    /// Queue bytes without running the engine.
    pub fn append_input(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_ready()?;
        self.input.append(bytes);
        Ok(())
    }

    /// Drop `n` queued input bytes.
    pub fn discard_input(&mut self, n: usize) -> Result<()> {
        self.ensure_ready()?;
        self.input.consume(n);
        Ok(())
    }

    /// Take all queued input.
    pub fn detach_input(&mut self) -> Result<Vec<u8>> {
        self.ensure_ready()?;
        Ok(self.input.take())
    }

    /// Move queued input straight to the output buffer.
    pub fn passthrough_input(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let pending = self.input.take();
        self.output.append(&pending);
        Ok(())
    }

    /// Make sure the next run is offered at least `n` bytes of output room.
    pub fn set_avail_out(&mut self, n: usize) -> Result<()> {
        self.ensure_ready()?;
        self.output.expand_into(n);
        Ok(())
    }

    /// Reinitialize the engine with its configuration and drop all buffered data.
    pub fn reset(&mut self) -> Result<()> {
        if !self.state.is_ready() && self.state != StreamState::Closing {
            return Err(ZlibError::contract(format!(
                "cannot reset a stream that is {}",
                self.state
            )));
        }
        self.engine_mut()?.reset();
        self.input.clear();
        self.output.release();
        self.total_in = 0;
        self.total_out = 0;
        self.adler = ADLER32_INIT;
        self.sync_search.reset();
        self.data_type.reset();
        self.set_state(StreamState::Ready)
    }

    /// Change the compression level and strategy.
    ///
    /// Queued input is sync-flushed into the output buffer first. The
    /// strategy can only change before compression starts.
    pub fn set_params(&mut self, level: CompressionLevel, strategy: Strategy) -> Result<()> {
        self.ensure_ready()?;
        let started = match self.engine.as_ref() {
            Some(Engine::Compressor(compressor)) => compressor.is_started(),
            _ => return Err(ZlibError::contract("parameters can only be set on a compressor")),
        };
        if started {
            if strategy != Strategy::Default {
                return Err(ZlibError::config(format!(
                    "strategy {:?} can only be set before compression starts",
                    strategy
                )));
            }
            self.feed(&[], FlushMode::Sync)?;
        }
        match self.engine.as_mut() {
            Some(Engine::Compressor(compressor)) => compressor.set_params(level, strategy),
            _ => Err(ZlibError::contract("stream has no engine")),
        }
    }

    /// Load a preset dictionary and return its Adler-32.
    ///
    /// A compressor takes it before the first byte. A zlib decompressor
    /// takes it after a run failed with a need-dictionary error, and the
    /// dictionary's Adler-32 has to match the one the stream announced; the
    /// queued header is then consumed and the next feed resumes. A raw
    /// decompressor takes it before any input.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<u32> {
        self.ensure_ready()?;
        if self.state.is_finished() {
            return Err(ZlibError::engine_with_message(
                EngineErrorKind::Stream,
                "stream is already finished",
            ));
        }
        match self.engine.as_mut() {
            Some(Engine::Compressor(compressor)) => compressor.set_dictionary(dictionary),
            Some(Engine::Decompressor(decompressor)) => {
                let header_len = decompressor.set_dictionary(dictionary)?;
                self.input.consume(header_len);
                self.total_in += header_len as u64;
                self.adler = ADLER32_INIT;
                debug!(header_len, "preset dictionary accepted");
                Ok(adler32(dictionary, ADLER32_INIT))
            }
            None => Err(ZlibError::contract("stream has no engine")),
        }
    }

    /// Adler-32 of the preset dictionary in use, or the one a decompressor
    /// is waiting for.
    pub fn dictionary_id(&self) -> Option<u32> {
        match self.engine.as_ref()? {
            Engine::Compressor(compressor) => compressor.dictionary_id(),
            Engine::Decompressor(decompressor) => decompressor.dictionary_id(),
        }
    }

    /// Whether a decompressor's consumed input ends on a full-flush point.
    pub fn sync_point(&self) -> bool {
        match self.engine.as_ref() {
            Some(Engine::Decompressor(decompressor)) => decompressor.at_sync_point(),
            _ => false,
        }
    }

    /// Text/binary guess over the input a compressor has consumed.
    /// Always [`DataType::Unknown`] for a decompressor.
    pub fn data_type(&self) -> DataType {
        if self.is_compressor() {
            self.data_type.data_type()
        } else {
            DataType::Unknown
        }
    }

    /// Skip input up to the next full-flush point.
    ///
    /// Searches the queued input, then `bytes`. On success the decompressor
    /// restarts in raw mode right after the marker, with everything after it
    /// queued and totals preserved. Otherwise all input is discarded and a
    /// partial marker at the end is remembered for the next call.
    pub fn sync(&mut self, bytes: &[u8]) -> Result<SyncOutcome> {
        self.ensure_ready()?;
        if self.is_compressor() {
            return Err(ZlibError::contract("sync requires a decompressor"));
        }

        let mut skipped = 0;
        if !self.input.is_empty() {
            match self.sync_search.search(self.input.as_slice()) {
                Some(end) => {
                    self.input.consume(end);
                    self.input.append(bytes);
                    return self.resynchronized(end);
                }
                None => {
                    skipped = self.input.len();
                    self.input.clear();
                }
            }
        }

        match self.sync_search.search(bytes) {
            Some(end) => {
                self.input.append(&bytes[end..]);
                self.resynchronized(skipped + end)
            }
            None => {
                skipped += bytes.len();
                self.total_in += skipped as u64;
                debug!(skipped, partial = self.sync_search.matched(), "no flush point yet");
                Ok(SyncOutcome::NotFound { skipped })
            }
        }
    }

    fn resynchronized(&mut self, skipped: usize) -> Result<SyncOutcome> {
        match self.engine.as_mut() {
            Some(Engine::Decompressor(decompressor)) => decompressor.reset_raw(),
            _ => return Err(ZlibError::contract("sync requires a decompressor")),
        }
        self.total_in += skipped as u64;
        self.sync_search.reset();
        self.set_state(StreamState::Ready)?;
        debug!(skipped, "resynchronized at full flush point");
        Ok(SyncOutcome::Found { skipped })
    }

    /// Tear down the stream. Idempotent.
    ///
    /// Closing an uninitialized stream is ignored with a warning. A stream
    /// still in the middle of a run is reset first.
    pub fn end(&mut self) -> Result<()> {
        match self.state {
            StreamState::Uninitialized => {
                warn!("attempt to close uninitialized zstream; ignored.");
                return Ok(());
            }
            StreamState::Ended => return Ok(()),
            StreamState::InStream => {
                warn!("attempt to close unfinished zstream; reset forced.");
                self.reset()?;
            }
            _ => {}
        }
        if self.state != StreamState::Closing {
            self.set_state(StreamState::Closing)?;
        }
        self.release();
        self.set_state(StreamState::Ended)
    }

    fn release(&mut self) {
        self.input.clear();
        self.output.release();
        if let Some(engine) = self.engine.take() {
            engine.end();
        }
    }

    /// Valid output bytes.
    pub fn output(&self) -> &[u8] {
        self.output.as_slice()
    }

    /// Number of valid output bytes.
    pub fn buffered_len(&self) -> usize {
        self.output.filled()
    }

    /// Output buffer capacity.
    pub fn capacity(&self) -> usize {
        self.output.capacity()
    }

    /// Output room offered to the next run.
    pub fn avail_out(&self) -> usize {
        self.output.avail_out()
    }

    /// Queued input.
    pub fn pending_input(&self) -> &[u8] {
        self.input.as_slice()
    }

    /// Input bytes consumed since the last reset.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Output bytes produced since the last reset.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Running Adler-32 of the uncompressed data (zlib framing only).
    pub fn adler(&self) -> u32 {
        self.adler
    }

    /// Current state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Whether the engine signalled the logical end of the stream.
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Whether the stream can run.
    pub fn is_ready(&self) -> bool {
        self.state.is_ready()
    }

    /// Whether the stream has been torn down.
    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Whether this stream compresses.
    pub fn is_compressor(&self) -> bool {
        self.engine.as_ref().is_some_and(Engine::is_compressor)
    }

    /// Parameters of the engine, if initialized.
    pub fn params(&self) -> Option<EngineParams> {
        self.engine.as_ref().map(Engine::params)
    }
}

impl Drop for ZStream {
    fn drop(&mut self) {
        if self.engine.is_some() {
            trace!(state = %self.state, "releasing stream on drop");
            self.release();
            self.state = StreamState::Ended;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DeflateParams, InflateParams};
    use oxizlib_core::buffer::{AVAIL_OUT_STEP_MAX, INITIAL_BUFSIZE};

    fn compressor() -> ZStream {
        ZStream::with_params(DeflateParams::new()).expect("init compressor")
    }

    fn decompressor() -> ZStream {
        ZStream::with_params(InflateParams::new()).expect("init decompressor")
    }

    fn sample(len: usize) -> Vec<u8> {
        let mut seed: u32 = 0x2545F491;
        (0..len)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                b'a' + (seed % 26) as u8
            })
            .collect()
    }

    #[test]
    fn test_lifecycle_states() {
        let mut stream = ZStream::new();
        assert_eq!(stream.state(), StreamState::Uninitialized);
        assert!(stream.feed(b"x", FlushMode::None).is_err());

        stream
            .initialize(DeflateParams::new().into())
            .expect("initialize");
        assert_eq!(stream.state(), StreamState::Ready);

        stream.feed(b"hello", FlushMode::None).expect("feed");
        assert_eq!(stream.state(), StreamState::InStream);

        stream.finish().expect("finish");
        assert_eq!(stream.state(), StreamState::Finished);

        stream.end().expect("end");
        assert_eq!(stream.state(), StreamState::Ended);
        stream.end().expect("end is idempotent");
    }

    #[test]
    fn test_ready_constructor() {
        let mut stream = ZStream::ready(DeflateParams::new());
        assert_eq!(stream.state(), StreamState::Ready);
        assert!(stream.is_compressor());
        assert!(stream.initialize(DeflateParams::new().into()).is_err());

        stream.feed(b"ready to go\n", FlushMode::Sync).expect("feed");
        assert_eq!(stream.data_type(), DataType::Text);
        stream.reset().expect("reset");
        assert_eq!(stream.data_type(), DataType::Unknown);
    }

    #[test]
    fn test_double_initialize_is_contract_error() {
        let mut stream = compressor();
        let err = stream
            .initialize(DeflateParams::new().into())
            .expect_err("already initialized");
        assert!(err.is_contract_violation());
    }

    #[test]
    fn test_operations_after_end_rejected() {
        let mut stream = compressor();
        stream.end().expect("end");
        assert!(stream.feed(b"x", FlushMode::None).unwrap_err().is_contract_violation());
        assert!(stream.drain_output().unwrap_err().is_contract_violation());
        assert!(stream.reset().unwrap_err().is_contract_violation());
        assert!(stream.finish().unwrap_err().is_contract_violation());
    }

    #[test]
    fn test_end_uninitialized_is_ignored() {
        let mut stream = ZStream::new();
        stream.end().expect("ignored");
        assert_eq!(stream.state(), StreamState::Uninitialized);
    }

    #[test]
    fn test_end_in_stream_forces_reset() {
        let mut stream = compressor();
        stream.feed(b"pending", FlushMode::None).expect("feed");
        assert_eq!(stream.state(), StreamState::InStream);
        stream.end().expect("end");
        assert_eq!(stream.state(), StreamState::Ended);
    }

    #[test]
    fn test_roundtrip_in_chunks() {
        let data = sample(50_000);
        let mut deflater = compressor();
        let mut compressed = Vec::new();
        for chunk in data.chunks(777) {
            deflater.feed(chunk, FlushMode::None).expect("feed");
            compressed.extend(deflater.drain_output().expect("drain"));
        }
        compressed.extend(deflater.finish().expect("finish"));
        assert_eq!(deflater.total_in(), data.len() as u64);
        assert_eq!(deflater.total_out(), compressed.len() as u64);

        let mut inflater = decompressor();
        let mut plain = Vec::new();
        for chunk in compressed.chunks(100) {
            inflater.feed(chunk, FlushMode::Sync).expect("feed");
            plain.extend(inflater.drain_output().expect("drain"));
        }
        assert!(inflater.is_finished());
        assert_eq!(plain, data);
        assert_eq!(inflater.adler(), deflater.adler());
        assert_eq!(inflater.adler(), adler32(&data, ADLER32_INIT));
    }

    #[test]
    fn test_output_grows_past_initial_buffer() {
        let data = sample(200_000);
        let mut deflater = ZStream::with_params(DeflateParams::new().with_level(CompressionLevel::NONE))
            .expect("init");
        deflater.feed(&data, FlushMode::Sync).expect("feed");
        assert!(deflater.capacity() > INITIAL_BUFSIZE);
        assert!(deflater.buffered_len() >= data.len());
        assert!(deflater.buffered_len() <= deflater.capacity());
        assert!(deflater.avail_out() <= AVAIL_OUT_STEP_MAX);
    }

    #[test]
    fn test_failed_run_keeps_input() {
        let mut inflater = decompressor();
        let garbage = [0x78, 0x9C, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let err = inflater.feed(&garbage, FlushMode::Sync).expect_err("corrupt");
        assert_eq!(err.engine_kind(), Some(EngineErrorKind::Data));
        assert_eq!(
            inflater.total_in() as usize + inflater.pending_input().len(),
            garbage.len()
        );
    }

    #[test]
    fn test_truncated_stream_fails_on_finish() {
        let mut deflater = compressor();
        deflater.feed(&sample(4096), FlushMode::None).expect("feed");
        let compressed = deflater.finish().expect("finish");

        let mut inflater = decompressor();
        inflater
            .feed(&compressed[..compressed.len() / 2], FlushMode::Sync)
            .expect("partial input is fine");
        let err = inflater.finish().expect_err("truncated");
        assert_eq!(err.engine_kind(), Some(EngineErrorKind::Buffer));
    }

    #[test]
    fn test_trailing_data_stays_queued() {
        let mut deflater = compressor();
        deflater.feed(b"payload", FlushMode::Finish).expect("feed");
        let mut compressed = deflater.drain_output().expect("drain");
        compressed.extend_from_slice(b"TRAILER");

        let mut inflater = decompressor();
        inflater.feed(&compressed, FlushMode::Sync).expect("feed");
        assert!(inflater.is_finished());
        assert_eq!(inflater.output(), b"payload");
        assert_eq!(inflater.pending_input(), b"TRAILER");

        inflater.feed(b"++", FlushMode::Sync).expect("queued");
        assert_eq!(inflater.detach_input().expect("detach"), b"TRAILER++");
    }

    #[test]
    fn test_feed_after_finish_compressor_errors() {
        let mut deflater = compressor();
        deflater.finish().expect("finish");
        let err = deflater.feed(b"late", FlushMode::None).expect_err("finished");
        assert_eq!(err.engine_kind(), Some(EngineErrorKind::Stream));
        deflater.finish().expect("finishing twice is harmless");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut deflater = compressor();
        deflater.feed(b"abc", FlushMode::Sync).expect("feed");
        deflater.reset().expect("reset");
        assert_eq!(deflater.state(), StreamState::Ready);
        assert_eq!(deflater.total_in(), 0);
        assert_eq!(deflater.total_out(), 0);
        assert_eq!(deflater.buffered_len(), 0);
        assert_eq!(deflater.adler(), ADLER32_INIT);

        deflater.feed(b"abc", FlushMode::Finish).expect("feed again");
        let mut inflater = decompressor();
        inflater
            .feed(&deflater.drain_output().expect("drain"), FlushMode::Sync)
            .expect("inflate");
        assert_eq!(inflater.output(), b"abc");
    }

    #[test]
    fn test_shift_and_unget() {
        let mut inflater = decompressor();
        inflater.append_output(b"abcdef").expect("append");
        assert_eq!(inflater.shift_output(2).expect("shift"), b"ab");
        inflater.unget_output(b'Z').expect("unget");
        assert_eq!(inflater.output(), b"Zcdef");
        assert_eq!(inflater.shift_output(99).expect("shift all"), b"Zcdef");
        assert_eq!(inflater.buffered_len(), 0);
    }

    #[test]
    fn test_passthrough_input() {
        let mut inflater = decompressor();
        inflater.append_input(b"raw").expect("append");
        inflater.passthrough_input().expect("passthrough");
        assert!(inflater.pending_input().is_empty());
        assert_eq!(inflater.output(), b"raw");
    }

    #[test]
    fn test_set_avail_out() {
        let mut deflater = compressor();
        deflater.set_avail_out(40_000).expect("presize");
        assert!(deflater.avail_out() >= 40_000);
        assert!(deflater.capacity() >= 40_000);
    }

    #[test]
    fn test_set_params_midstream() {
        let data = sample(10_000);
        let mut deflater = compressor();
        deflater.feed(&data[..5000], FlushMode::None).expect("feed");
        deflater
            .set_params(CompressionLevel::BEST_SPEED, Strategy::Default)
            .expect("level change");
        let err = deflater
            .set_params(CompressionLevel::BEST_SPEED, Strategy::Filtered)
            .expect_err("strategy locked");
        assert!(matches!(err, ZlibError::Config { .. }));
        deflater.feed(&data[5000..], FlushMode::None).expect("feed");
        let compressed = deflater.finish().expect("finish");

        let mut inflater = decompressor();
        inflater.feed(&compressed, FlushMode::Sync).expect("inflate");
        assert_eq!(inflater.output(), &data[..]);
    }

    #[test]
    fn test_set_params_on_decompressor_rejected() {
        let mut inflater = decompressor();
        let err = inflater
            .set_params(CompressionLevel::DEFAULT, Strategy::Default)
            .expect_err("decompressor");
        assert!(err.is_contract_violation());
        let mut deflater = compressor();
        assert!(deflater.sync(b"x").unwrap_err().is_contract_violation());
    }

    #[test]
    fn test_sync_on_queued_input() {
        let mut inflater = ZStream::with_params(InflateParams::new().with_format(Format::Raw))
            .expect("init");
        inflater.append_input(&[9, 9, 0, 0]).expect("queue");
        let outcome = inflater.sync(&[0xFF, 0xFF, 1, 2]).expect("sync");
        assert_eq!(outcome, SyncOutcome::Found { skipped: 6 });
        assert_eq!(inflater.pending_input(), &[1, 2]);
        assert_eq!(inflater.total_in(), 6);
    }

    #[test]
    fn test_sync_not_found_discards() {
        let mut inflater = decompressor();
        let outcome = inflater.sync(&[5, 5, 5, 0, 0]).expect("sync");
        assert_eq!(outcome, SyncOutcome::NotFound { skipped: 5 });
        assert!(inflater.pending_input().is_empty());

        let outcome = inflater.sync(&[0xFF, 0xFF, 7]).expect("sync");
        assert_eq!(outcome, SyncOutcome::Found { skipped: 2 });
        assert_eq!(inflater.pending_input(), &[7]);
    }
}
