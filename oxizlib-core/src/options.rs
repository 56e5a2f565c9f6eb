//! Stream options: flush modes, compression levels, strategies and framing.

use crate::error::{Result, ZlibError};
use std::fmt;

/// Flush mode for a stream run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushMode {
    /// No flush - buffer data for best compression.
    #[default]
    None,
    /// Sync flush - emit all pending output on a byte boundary.
    Sync,
    /// Full flush - like sync, and reset the dictionary so decoding can restart here.
    Full,
    /// Finish - complete the stream.
    Finish,
}

impl FlushMode {
    /// The native flush code.
    pub fn code(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Sync => 2,
            Self::Full => 3,
            Self::Finish => 4,
        }
    }
}

/// Compression level.
///
/// `-1` selects the engine default (equivalent to 6); `0..=9` trade speed for
/// ratio, `0` storing data uncompressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressionLevel(i32);

impl CompressionLevel {
    /// No compression (store only).
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const BEST_SPEED: Self = Self(1);
    /// Best compression (slowest).
    pub const BEST_COMPRESSION: Self = Self(9);
    /// Engine default.
    pub const DEFAULT: Self = Self(-1);

    /// Create a level, rejecting values outside `-1..=9`.
    pub fn new(level: i32) -> Result<Self> {
        if (-1..=9).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ZlibError::config(format!(
                "compression level {} out of range (-1..=9)",
                level
            )))
        }
    }

    /// The level as given, `-1` for the default.
    pub fn level(&self) -> i32 {
        self.0
    }

    /// The level the engine actually runs at (`0..=9`).
    pub fn effective(&self) -> u8 {
        match self.0 {
            -1 => 6,
            level => level as u8,
        }
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i32> for CompressionLevel {
    type Error = ZlibError;

    fn try_from(level: i32) -> Result<Self> {
        Self::new(level)
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == -1 {
            f.write_str("default")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Compression strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Normal data.
    #[default]
    Default,
    /// Data produced by a filter or predictor: favor Huffman coding.
    Filtered,
    /// Huffman coding only, no string matching.
    HuffmanOnly,
    /// Match distance limited to one (run-length encoding).
    Rle,
    /// Fixed Huffman codes only.
    Fixed,
}

impl Strategy {
    /// The native strategy code.
    pub fn code(self) -> i32 {
        match self {
            Self::Default => 0,
            Self::Filtered => 1,
            Self::HuffmanOnly => 2,
            Self::Rle => 3,
            Self::Fixed => 4,
        }
    }

    /// All strategies.
    pub const ALL: [Strategy; 5] = [
        Self::Default,
        Self::Filtered,
        Self::HuffmanOnly,
        Self::Rle,
        Self::Fixed,
    ];
}

impl TryFrom<i32> for Strategy {
    type Error = ZlibError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Default),
            1 => Ok(Self::Filtered),
            2 => Ok(Self::HuffmanOnly),
            3 => Ok(Self::Rle),
            4 => Ok(Self::Fixed),
            other => Err(ZlibError::config(format!("unknown strategy {}", other))),
        }
    }
}

/// Framing around the DEFLATE data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// Raw DEFLATE, no header or trailer. Used inside gzip members.
    Raw,
    /// zlib framing: 2-byte header and Adler-32 trailer.
    #[default]
    Zlib,
}

impl Format {
    /// Window-bits parameter in the classic convention (negative for raw).
    pub fn window_bits(self) -> i32 {
        match self {
            Self::Raw => -15,
            Self::Zlib => 15,
        }
    }
}

/// Guess of the kind of data fed to a compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    /// Contains control bytes that do not occur in text.
    Binary,
    /// Looks like text.
    Text,
    /// Nothing seen yet.
    #[default]
    Unknown,
}

impl DataType {
    /// The native data type code.
    pub fn code(self) -> i32 {
        match self {
            Self::Binary => 0,
            Self::Text => 1,
            Self::Unknown => 2,
        }
    }
}

/// Running text/binary classification.
///
/// A byte in `0..=6`, `14..=25` or `28..=31` marks the data binary. Otherwise
/// a tab, newline, carriage return or any byte from 32 up marks it text.
/// Data made only of the remaining control bytes is binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataTypeDetector {
    seen: bool,
    binary: bool,
    text: bool,
}

impl DataTypeDetector {
    /// Fold `data` into the guess.
    pub fn update(&mut self, data: &[u8]) {
        if data.is_empty() || self.binary {
            return;
        }
        self.seen = true;
        for &byte in data {
            match byte {
                0..=6 | 14..=25 | 28..=31 => {
                    self.binary = true;
                    return;
                }
                9 | 10 | 13 | 32.. => self.text = true,
                _ => {}
            }
        }
    }

    /// Current guess.
    pub fn data_type(&self) -> DataType {
        match (self.seen, self.binary, self.text) {
            (false, _, _) => DataType::Unknown,
            (true, false, true) => DataType::Text,
            _ => DataType::Binary,
        }
    }

    /// Forget everything seen.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
