//! DEFLATE engine variants.
//!
//! A stream drives exactly one engine: a [`Compressor`] or a
//! [`Decompressor`], both backed by `miniz_oxide`'s push-style stream API.
//! The [`Engine`] enum gives the stream one surface for both: `run`,
//! `reset` and `end`.

use miniz_oxide::deflate::core::{CompressorOxide, create_comp_flags_from_zip_params};
use miniz_oxide::inflate::stream::InflateState;
use miniz_oxide::{DataFormat, MZError, MZFlush, MZStatus, StreamResult};
use crate::sync::SYNC_MARKER;
use oxizlib_core::checksum::{ADLER32_INIT, adler32};
use oxizlib_core::error::{EngineErrorKind, Result, ZlibError};
use oxizlib_core::options::{CompressionLevel, FlushMode, Format, Strategy};
use std::fmt;
use tracing::trace;

/// Compression parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeflateParams {
    /// Compression level.
    pub level: CompressionLevel,
    /// Compression strategy.
    pub strategy: Strategy,
    /// Framing of the produced stream.
    pub format: Format,
}

impl DeflateParams {
    /// Default parameters with zlib framing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the level.
    pub fn with_level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the framing.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }
}

/// Decompression parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InflateParams {
    /// Expected framing of the input.
    pub format: Format,
}

impl InflateParams {
    /// Default parameters with zlib framing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the framing.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }
}

/// Parameters selecting the engine variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineParams {
    /// Compressor.
    Compress(DeflateParams),
    /// Decompressor.
    Decompress(InflateParams),
}

impl From<DeflateParams> for EngineParams {
    fn from(params: DeflateParams) -> Self {
        Self::Compress(params)
    }
}

impl From<InflateParams> for EngineParams {
    fn from(params: InflateParams) -> Self {
        Self::Decompress(params)
    }
}

/// Non-error status of one engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Progress was made; the stream continues.
    Ok,
    /// The logical end of the stream was reached.
    StreamEnd,
    /// A preset dictionary is required.
    NeedDictionary,
}

/// Result of one engine run.
///
/// Byte counts are valid even when `status` is an error, so partial progress
/// is never lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// Input bytes consumed.
    pub consumed: usize,
    /// Output bytes written.
    pub produced: usize,
    /// Engine status.
    pub status: std::result::Result<RunStatus, EngineErrorKind>,
}

impl From<StreamResult> for RunOutcome {
    fn from(result: StreamResult) -> Self {
        let status = match result.status {
            Ok(MZStatus::Ok) => Ok(RunStatus::Ok),
            Ok(MZStatus::StreamEnd) => Ok(RunStatus::StreamEnd),
            Ok(MZStatus::NeedDict) => Ok(RunStatus::NeedDictionary),
            Err(err) => Err(error_kind(err)),
        };
        Self {
            consumed: result.bytes_consumed,
            produced: result.bytes_written,
            status,
        }
    }
}

fn error_kind(err: MZError) -> EngineErrorKind {
    EngineErrorKind::from_code(err as i32)
}

fn data_format(format: Format) -> DataFormat {
    match format {
        Format::Raw => DataFormat::Raw,
        Format::Zlib => DataFormat::Zlib,
    }
}

/// LZ window size; only the last this many dictionary bytes matter.
pub const WINDOW_SIZE: usize = 32 * 1024;

/// zlib header bytes when a preset dictionary is used: CMF, FLG and the
/// dictionary's Adler-32.
pub const DICT_HEADER_SIZE: usize = 6;

const FDICT: u8 = 0x20;
const ZLIB_TRAILER_SIZE: usize = 4;

fn dictionary_window(dictionary: &[u8]) -> &[u8] {
    &dictionary[dictionary.len().saturating_sub(WINDOW_SIZE)..]
}

/// zlib header announcing a preset dictionary.
fn dict_header(params: &DeflateParams, dict_id: u32) -> [u8; DICT_HEADER_SIZE] {
    let level = params.level.effective();
    let level_flags: u16 = if params.strategy.code() >= Strategy::HuffmanOnly.code() || level < 2
    {
        0
    } else if level < 6 {
        1
    } else if level == 6 {
        2
    } else {
        3
    };
    let mut header: u16 = (0x78 << 8) | (level_flags << 6) | u16::from(FDICT);
    header += 31 - header % 31;
    let [cmf, flg] = header.to_be_bytes();
    let [a, b, c, d] = dict_id.to_be_bytes();
    [cmf, flg, a, b, c, d]
}

/// zlib framing written around raw DEFLATE output once a preset
/// dictionary is in use.
#[derive(Debug)]
struct DictFraming {
    pending: Vec<u8>,
    adler: u32,
    trailer_queued: bool,
}

impl DictFraming {
    fn new(header: [u8; DICT_HEADER_SIZE]) -> Self {
        Self {
            pending: header.to_vec(),
            adler: ADLER32_INIT,
            trailer_queued: false,
        }
    }

    fn emit(&mut self, output: &mut [u8]) -> usize {
        let n = self.pending.len().min(output.len());
        output[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        n
    }

    fn status(&self) -> std::result::Result<RunStatus, EngineErrorKind> {
        if self.trailer_queued && self.pending.is_empty() {
            Ok(RunStatus::StreamEnd)
        } else {
            Ok(RunStatus::Ok)
        }
    }
}

/// Streaming DEFLATE compressor.
pub struct Compressor {
    inner: Box<CompressorOxide>,
    params: DeflateParams,
    started: bool,
    dictionary: Option<u32>,
    framing: Option<DictFraming>,
}

impl Compressor {
    /// Create a compressor.
    pub fn new(params: DeflateParams) -> Self {
        Self {
            inner: Box::new(CompressorOxide::new(Self::flags(&params))),
            params,
            started: false,
            dictionary: None,
            framing: None,
        }
    }

    fn flags(params: &DeflateParams) -> u32 {
        create_comp_flags_from_zip_params(
            params.level.level(),
            params.format.window_bits(),
            params.strategy.code(),
        )
    }

    /// Framing the backend itself writes. Raw once a dictionary is set,
    /// since the zlib header then carries the dictionary id.
    fn backend_format(&self) -> Format {
        if self.dictionary.is_some() {
            Format::Raw
        } else {
            self.params.format
        }
    }

    /// Current parameters.
    pub fn params(&self) -> &DeflateParams {
        &self.params
    }

    /// Whether any byte has gone through the compressor, or a dictionary
    /// was loaded, since the last reset.
    pub fn is_started(&self) -> bool {
        self.started || self.dictionary.is_some()
    }

    /// Adler-32 of the preset dictionary, if one is set.
    pub fn dictionary_id(&self) -> Option<u32> {
        self.dictionary
    }

    fn deflate(
        inner: &mut CompressorOxide,
        started: &mut bool,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> RunOutcome {
        let flush = match flush {
            FlushMode::None => MZFlush::None,
            FlushMode::Sync => MZFlush::Sync,
            FlushMode::Full => MZFlush::Full,
            FlushMode::Finish => MZFlush::Finish,
        };
        let outcome = RunOutcome::from(miniz_oxide::deflate::stream::deflate(
            inner, input, output, flush,
        ));
        if outcome.consumed > 0 || outcome.produced > 0 {
            *started = true;
        }
        outcome
    }

    /// Compress from `input` into `output`.
    pub fn run(&mut self, input: &[u8], output: &mut [u8], flush: FlushMode) -> RunOutcome {
        let Some(framing) = self.framing.as_mut() else {
            return Self::deflate(&mut self.inner, &mut self.started, input, output, flush);
        };

        let mut produced = framing.emit(output);
        if framing.trailer_queued || !framing.pending.is_empty() {
            return RunOutcome {
                consumed: 0,
                produced,
                status: framing.status(),
            };
        }

        let outcome = Self::deflate(
            &mut self.inner,
            &mut self.started,
            input,
            &mut output[produced..],
            flush,
        );
        framing.adler = adler32(&input[..outcome.consumed], framing.adler);
        produced += outcome.produced;
        let status = match outcome.status {
            Ok(RunStatus::StreamEnd) => {
                framing.pending.extend_from_slice(&framing.adler.to_be_bytes());
                framing.trailer_queued = true;
                produced += framing.emit(&mut output[produced..]);
                framing.status()
            }
            Err(EngineErrorKind::Buffer) if produced > 0 => Ok(RunStatus::Ok),
            other => other,
        };
        RunOutcome {
            consumed: outcome.consumed,
            produced,
            status,
        }
    }

    /// Load a preset dictionary; returns its Adler-32.
    ///
    /// Only allowed before the first byte is compressed. The dictionary is
    /// run through the backend with a sync flush and the output dropped, so
    /// later matches can reach back into it. With zlib framing the header
    /// announces the dictionary and the trailer is written here.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<u32> {
        if self.is_started() {
            return Err(ZlibError::engine_with_message(
                EngineErrorKind::Stream,
                "dictionary can only be set before compression starts",
            ));
        }
        let dict_id = adler32(dictionary, ADLER32_INIT);
        let raw = DeflateParams {
            format: Format::Raw,
            ..self.params
        };
        *self.inner = CompressorOxide::new(Self::flags(&raw));

        let window = dictionary_window(dictionary);
        let mut scratch = vec![0u8; window.len() + window.len() / 8 + 64];
        let mut offset = 0;
        loop {
            let result = miniz_oxide::deflate::stream::deflate(
                &mut self.inner,
                &window[offset..],
                &mut scratch,
                MZFlush::Sync,
            );
            match result.status {
                Ok(_) | Err(MZError::Buf) => {}
                Err(err) => return Err(ZlibError::engine(error_kind(err))),
            }
            offset += result.bytes_consumed;
            let drained = result.bytes_written < scratch.len();
            if (offset >= window.len() && drained)
                || (result.bytes_consumed == 0 && result.bytes_written == 0)
            {
                break;
            }
        }

        if self.params.format == Format::Zlib {
            self.framing = Some(DictFraming::new(dict_header(&self.params, dict_id)));
        }
        self.dictionary = Some(dict_id);
        trace!(dict_id, len = dictionary.len(), "compressor dictionary loaded");
        Ok(dict_id)
    }

    /// Change level and strategy.
    ///
    /// Before the first byte any combination is accepted. Once started, only
    /// the level can change; the strategy must be [`Strategy::Default`].
    pub fn set_params(&mut self, level: CompressionLevel, strategy: Strategy) -> Result<()> {
        if !self.is_started() {
            self.params.level = level;
            self.params.strategy = strategy;
            *self.inner = CompressorOxide::new(Self::flags(&self.params));
            return Ok(());
        }
        if strategy != Strategy::Default {
            return Err(ZlibError::config(format!(
                "strategy {:?} can only be set before compression starts",
                strategy
            )));
        }
        self.inner
            .set_format_and_level(data_format(self.backend_format()), level.effective());
        self.params.level = level;
        self.params.strategy = strategy;
        Ok(())
    }

    /// Reinitialize with the current parameters. A preset dictionary is
    /// dropped and has to be set again.
    pub fn reset(&mut self) {
        *self.inner = CompressorOxide::new(Self::flags(&self.params));
        self.started = false;
        self.dictionary = None;
        self.framing = None;
    }
}

impl fmt::Debug for Compressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compressor")
            .field("params", &self.params)
            .field("started", &self.started)
            .field("dictionary", &self.dictionary)
            .finish_non_exhaustive()
    }
}

/// Preset dictionary handling of a zlib-framed decompressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preset {
    /// No dictionary involved (yet).
    Idle,
    /// The header asks for the dictionary with this Adler-32.
    Required(u32),
    /// The dictionary is loaded and the backend runs raw; the zlib trailer
    /// is checked here against the Adler-32 of the output.
    Primed { adler: u32, ended: bool },
}

/// Streaming DEFLATE decompressor.
pub struct Decompressor {
    state: Box<InflateState>,
    params: InflateParams,
    preset: Preset,
    dictionary: Option<u32>,
    header_checked: bool,
    consumed: u64,
    tail: u32,
}

impl Decompressor {
    /// Create a decompressor.
    pub fn new(params: InflateParams) -> Self {
        Self {
            state: InflateState::new_boxed(data_format(params.format)),
            params,
            preset: Preset::Idle,
            dictionary: None,
            header_checked: params.format == Format::Raw,
            consumed: 0,
            tail: 0,
        }
    }

    /// Current parameters.
    pub fn params(&self) -> &InflateParams {
        &self.params
    }

    /// Adler-32 of the dictionary the stream asked for or was given.
    pub fn dictionary_id(&self) -> Option<u32> {
        self.dictionary
    }

    /// Whether the input consumed so far ends on a full-flush point.
    pub fn at_sync_point(&self) -> bool {
        self.consumed >= SYNC_MARKER.len() as u64 && self.tail == u32::from_be_bytes(SYNC_MARKER)
    }

    fn note_consumed(&mut self, bytes: &[u8]) {
        for &byte in &bytes[bytes.len().saturating_sub(4)..] {
            self.tail = (self.tail << 8) | u32::from(byte);
        }
        self.consumed += bytes.len() as u64;
    }

    fn waiting(status: std::result::Result<RunStatus, EngineErrorKind>) -> RunOutcome {
        RunOutcome {
            consumed: 0,
            produced: 0,
            status,
        }
    }

    /// Look for a zlib header that asks for a preset dictionary. The backend
    /// rejects such headers, so they are intercepted before it sees them.
    fn check_dict_header(&mut self, input: &[u8]) -> Option<RunOutcome> {
        let (&cmf, &flg) = match input {
            [cmf, flg, ..] => (cmf, flg),
            _ => return Some(Self::waiting(Err(EngineErrorKind::Buffer))),
        };
        let valid = cmf & 0x0F == 8 && ((u16::from(cmf) << 8) | u16::from(flg)) % 31 == 0;
        if !valid || flg & FDICT == 0 {
            return None;
        }
        if input.len() < DICT_HEADER_SIZE {
            return Some(Self::waiting(Err(EngineErrorKind::Buffer)));
        }
        let dict_id = u32::from_be_bytes([input[2], input[3], input[4], input[5]]);
        self.preset = Preset::Required(dict_id);
        self.dictionary = Some(dict_id);
        Some(Self::waiting(Ok(RunStatus::NeedDictionary)))
    }

    /// Compare the zlib trailer after a dictionary-primed stream ended.
    fn check_trailer(&mut self, input: &[u8], adler: u32) -> RunOutcome {
        if input.len() < ZLIB_TRAILER_SIZE {
            return Self::waiting(Err(EngineErrorKind::Buffer));
        }
        let expected = u32::from_be_bytes([input[0], input[1], input[2], input[3]]);
        if expected != adler {
            return Self::waiting(Err(EngineErrorKind::Data));
        }
        self.note_consumed(&input[..ZLIB_TRAILER_SIZE]);
        self.preset = Preset::Idle;
        RunOutcome {
            consumed: ZLIB_TRAILER_SIZE,
            produced: 0,
            status: Ok(RunStatus::StreamEnd),
        }
    }

    /// Decompress from `input` into `output`.
    ///
    /// The end of input is never announced to the backend; `Finish` behaves
    /// like `Sync` and a truncated stream surfaces as a buffer error.
    pub fn run(&mut self, input: &[u8], output: &mut [u8], flush: FlushMode) -> RunOutcome {
        match self.preset {
            Preset::Idle if !self.header_checked => {
                if let Some(outcome) = self.check_dict_header(input) {
                    return outcome;
                }
                self.header_checked = true;
            }
            Preset::Required(_) => return Self::waiting(Ok(RunStatus::NeedDictionary)),
            Preset::Primed { adler, ended: true } => return self.check_trailer(input, adler),
            _ => {}
        }

        let flush = match flush {
            FlushMode::None => MZFlush::None,
            FlushMode::Sync | FlushMode::Full | FlushMode::Finish => MZFlush::Sync,
        };
        let outcome = RunOutcome::from(miniz_oxide::inflate::stream::inflate(
            &mut self.state,
            input,
            output,
            flush,
        ));
        self.note_consumed(&input[..outcome.consumed]);

        let Preset::Primed { adler, .. } = self.preset else {
            return outcome;
        };
        let adler = adler32(&output[..outcome.produced], adler);
        if outcome.status != Ok(RunStatus::StreamEnd) {
            self.preset = Preset::Primed { adler, ended: false };
            return outcome;
        }
        self.preset = Preset::Primed { adler, ended: true };
        let trailer = self.check_trailer(&input[outcome.consumed..], adler);
        RunOutcome {
            consumed: outcome.consumed + trailer.consumed,
            produced: outcome.produced,
            status: trailer.status,
        }
    }

    /// Load a preset dictionary.
    ///
    /// A zlib stream accepts it only after asking for it, and only when its
    /// Adler-32 matches the id in the header. A raw stream accepts it before
    /// any input. Returns how many queued header bytes the caller must drop.
    pub fn set_dictionary(&mut self, dictionary: &[u8]) -> Result<usize> {
        let header_len = match self.preset {
            Preset::Required(dict_id) => {
                let actual = adler32(dictionary, ADLER32_INIT);
                if actual != dict_id {
                    return Err(ZlibError::engine_with_message(
                        EngineErrorKind::Data,
                        format!(
                            "invalid dictionary: adler32 {:08x}, stream wants {:08x}",
                            actual, dict_id
                        ),
                    ));
                }
                DICT_HEADER_SIZE
            }
            Preset::Idle if self.params.format == Format::Raw && self.consumed == 0 => 0,
            _ => {
                return Err(ZlibError::engine_with_message(
                    EngineErrorKind::Stream,
                    "no dictionary expected at this point",
                ));
            }
        };

        self.state.reset(DataFormat::Raw);
        self.prime(dictionary_window(dictionary))?;
        self.consumed += header_len as u64;
        self.dictionary = Some(adler32(dictionary, ADLER32_INIT));
        if header_len > 0 {
            self.preset = Preset::Primed {
                adler: ADLER32_INIT,
                ended: false,
            };
        }
        trace!(len = dictionary.len(), "decompressor dictionary loaded");
        Ok(header_len)
    }

    /// Fill the backend's window by decoding the dictionary as one
    /// non-final stored block.
    fn prime(&mut self, window: &[u8]) -> Result<()> {
        if window.is_empty() {
            return Ok(());
        }
        let len = window.len() as u16;
        let mut block = Vec::with_capacity(window.len() + 5);
        block.push(0x00);
        block.extend_from_slice(&len.to_le_bytes());
        block.extend_from_slice(&(!len).to_le_bytes());
        block.extend_from_slice(window);

        let mut scratch = vec![0u8; window.len()];
        let mut offset = 0;
        while offset < block.len() {
            let result = miniz_oxide::inflate::stream::inflate(
                &mut self.state,
                &block[offset..],
                &mut scratch,
                MZFlush::None,
            );
            match result.status {
                Ok(_) | Err(MZError::Buf) => {}
                Err(err) => return Err(ZlibError::engine(error_kind(err))),
            }
            if result.bytes_consumed == 0 && result.bytes_written == 0 {
                break;
            }
            offset += result.bytes_consumed;
        }
        Ok(())
    }

    /// Reinitialize with the current parameters.
    pub fn reset(&mut self) {
        self.state.reset(data_format(self.params.format));
        self.preset = Preset::Idle;
        self.dictionary = None;
        self.header_checked = self.params.format == Format::Raw;
        self.consumed = 0;
        self.tail = 0;
    }

    /// Reinitialize expecting raw DEFLATE blocks, keeping the configured
    /// format for later resets.
    pub fn reset_raw(&mut self) {
        self.state.reset(DataFormat::Raw);
        self.preset = Preset::Idle;
        self.header_checked = true;
    }
}

impl fmt::Debug for Decompressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decompressor")
            .field("params", &self.params)
            .field("preset", &self.preset)
            .finish_non_exhaustive()
    }
}

/// The engine driven by a stream.
#[derive(Debug)]
pub enum Engine {
    /// Compressing engine.
    Compressor(Compressor),
    /// Decompressing engine.
    Decompressor(Decompressor),
}

impl Engine {
    /// Build the engine for `params`.
    pub fn new(params: EngineParams) -> Self {
        match params {
            EngineParams::Compress(params) => Self::Compressor(Compressor::new(params)),
            EngineParams::Decompress(params) => Self::Decompressor(Decompressor::new(params)),
        }
    }

    /// One run over `input` into `output`.
    pub fn run(&mut self, input: &[u8], output: &mut [u8], flush: FlushMode) -> RunOutcome {
        match self {
            Self::Compressor(c) => c.run(input, output, flush),
            Self::Decompressor(d) => d.run(input, output, flush),
        }
    }

    /// Reinitialize, keeping the configuration.
    pub fn reset(&mut self) {
        match self {
            Self::Compressor(c) => c.reset(),
            Self::Decompressor(d) => d.reset(),
        }
    }

    /// Release the engine.
    pub fn end(self) {
        trace!(compressor = self.is_compressor(), "engine released");
    }

    /// Whether this is the compressing variant.
    pub fn is_compressor(&self) -> bool {
        matches!(self, Self::Compressor(_))
    }

    /// Framing of the stream.
    pub fn format(&self) -> Format {
        match self {
            Self::Compressor(c) => c.params.format,
            Self::Decompressor(d) => d.params.format,
        }
    }

    /// The parameters this engine was built from.
    pub fn params(&self) -> EngineParams {
        match self {
            Self::Compressor(c) => EngineParams::Compress(c.params),
            Self::Decompressor(d) => EngineParams::Decompress(d.params),
        }
    }
}
