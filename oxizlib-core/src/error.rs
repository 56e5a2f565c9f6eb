//! Error types for OxiZlib operations.
//!
//! Every failure surfaces as a [`ZlibError`]. The variants follow the layers
//! of the library: bad parameters ([`ZlibError::Config`]), failures reported by
//! the DEFLATE engine ([`ZlibError::Engine`]), gzip framing problems
//! ([`ZlibError::Container`]), misuse of a stream that is closed or not ready
//! ([`ZlibError::Contract`]), and transport I/O.

use std::fmt;
use std::io;
use thiserror::Error;

/// Failure classes reported by the DEFLATE engine.
///
/// The numeric codes match the classic zlib return codes so callers that log
/// or compare codes see familiar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngineErrorKind {
    /// The engine reached the logical end of the stream where none was expected.
    StreamEnd,
    /// A preset dictionary is required to continue.
    NeedDictionary,
    /// The compressed input is corrupt.
    Data,
    /// The stream state is inconsistent or the request is invalid.
    Stream,
    /// Not enough memory.
    Memory,
    /// No progress was possible (input exhausted or output full).
    Buffer,
    /// Incompatible engine version.
    Version,
    /// An I/O error inside the engine.
    Io,
    /// Any other code.
    Unknown(i32),
}

impl EngineErrorKind {
    /// The native return code for this kind.
    pub fn code(self) -> i32 {
        match self {
            Self::StreamEnd => 1,
            Self::NeedDictionary => 2,
            Self::Io => -1,
            Self::Stream => -2,
            Self::Data => -3,
            Self::Memory => -4,
            Self::Buffer => -5,
            Self::Version => -6,
            Self::Unknown(code) => code,
        }
    }

    /// Map a native return code back to its kind.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::StreamEnd,
            2 => Self::NeedDictionary,
            -1 => Self::Io,
            -2 => Self::Stream,
            -3 => Self::Data,
            -4 => Self::Memory,
            -5 => Self::Buffer,
            -6 => Self::Version,
            other => Self::Unknown(other),
        }
    }

    /// Default message used when the engine supplies none.
    pub fn description(self) -> &'static str {
        match self {
            Self::StreamEnd => "stream end",
            Self::NeedDictionary => "need dictionary",
            Self::Io => "file error",
            Self::Stream => "stream error",
            Self::Data => "data error",
            Self::Memory => "insufficient memory",
            Self::Buffer => "buffer error",
            Self::Version => "incompatible version",
            Self::Unknown(_) => "unknown zlib error",
        }
    }
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "unknown zlib error {}", code),
            other => f.write_str(other.description()),
        }
    }
}

/// Failure classes of the gzip container layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerErrorKind {
    /// Magic bytes missing or wrong.
    NotGzipFormat,
    /// Compression method other than DEFLATE.
    UnsupportedMethod,
    /// Multi-part, encrypted or reserved flag bits set.
    UnsupportedFlags,
    /// The 8-byte footer is missing.
    NoFooter,
    /// Footer CRC-32 does not match the decompressed data.
    CrcMismatch,
    /// Footer length does not match the decompressed data.
    LengthMismatch,
    /// The transport ended in the middle of the container.
    UnexpectedEof,
    /// A header field was changed after the header was emitted.
    HeaderWritten,
}

impl fmt::Display for ContainerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotGzipFormat => "not in gzip format",
            Self::UnsupportedMethod => "unsupported compression method",
            Self::UnsupportedFlags => "unsupported flags",
            Self::NoFooter => "footer is not found",
            Self::CrcMismatch => "crc error",
            Self::LengthMismatch => "length error",
            Self::UnexpectedEof => "unexpected end of file",
            Self::HeaderWritten => "header is already written",
        };
        f.write_str(name)
    }
}

/// The main error type for OxiZlib operations.
#[derive(Debug, Error)]
pub enum ZlibError {
    /// I/O error from the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid compression or decompression parameters.
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the bad parameter.
        message: String,
    },

    /// Failure reported by the DEFLATE engine.
    #[error("zlib {kind} (code {code}): {message}", code = kind.code())]
    Engine {
        /// Engine failure class.
        kind: EngineErrorKind,
        /// Engine message.
        message: String,
    },

    /// Gzip framing failure.
    #[error("gzip {kind}: {message}")]
    Container {
        /// Container failure class.
        kind: ContainerErrorKind,
        /// Description of the failure.
        message: String,
    },

    /// Operation on a stream that is closed or not ready.
    #[error("Stream contract violated: {message}")]
    Contract {
        /// Description of the violated contract.
        message: String,
    },
}

/// Result type alias for OxiZlib operations.
pub type Result<T> = std::result::Result<T, ZlibError>;

impl ZlibError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an engine error with the default message for its kind.
    pub fn engine(kind: EngineErrorKind) -> Self {
        Self::Engine {
            kind,
            message: kind.description().to_string(),
        }
    }

    /// Create an engine error with a custom message.
    pub fn engine_with_message(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self::Engine {
            kind,
            message: message.into(),
        }
    }

    /// Create a container error.
    pub fn container(kind: ContainerErrorKind, message: impl Into<String>) -> Self {
        Self::Container {
            kind,
            message: message.into(),
        }
    }

    /// Create a not-gzip-format error.
    pub fn not_gzip() -> Self {
        Self::container(ContainerErrorKind::NotGzipFormat, "not in gzip format")
    }

    /// Create an unexpected EOF error.
    pub fn unexpected_eof() -> Self {
        Self::container(ContainerErrorKind::UnexpectedEof, "unexpected end of file")
    }

    /// Create a missing footer error.
    pub fn no_footer() -> Self {
        Self::container(ContainerErrorKind::NoFooter, "footer is not found")
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u32, computed: u32) -> Self {
        Self::container(
            ContainerErrorKind::CrcMismatch,
            format!(
                "invalid compressed data -- crc error (expected {:#010x}, computed {:#010x})",
                expected, computed
            ),
        )
    }

    /// Create a length mismatch error.
    pub fn length_mismatch(expected: u32, actual: u32) -> Self {
        Self::container(
            ContainerErrorKind::LengthMismatch,
            format!(
                "invalid compressed data -- length error (expected {}, got {})",
                expected, actual
            ),
        )
    }

    /// Create a header-already-written error.
    pub fn header_written() -> Self {
        Self::container(ContainerErrorKind::HeaderWritten, "header is already written")
    }

    /// Create a contract violation error.
    pub fn contract(message: impl Into<String>) -> Self {
        Self::Contract {
            message: message.into(),
        }
    }

    /// The engine failure class, if this is an engine error.
    pub fn engine_kind(&self) -> Option<EngineErrorKind> {
        match self {
            Self::Engine { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The container failure class, if this is a container error.
    pub fn container_kind(&self) -> Option<ContainerErrorKind> {
        match self {
            Self::Container { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// The native return code, if this is an engine error.
    pub fn code(&self) -> Option<i32> {
        self.engine_kind().map(EngineErrorKind::code)
    }

    /// Whether this error reports misuse of a closed or not-ready stream.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Contract { .. })
    }
}

impl From<ZlibError> for io::Error {
    fn from(err: ZlibError) -> Self {
        match err {
            ZlibError::Io(inner) => inner,
            ZlibError::Container {
                kind: ContainerErrorKind::UnexpectedEof,
                ..
            } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ZlibError::crc_mismatch(0x12345678, 0xDEADBEEF);
        assert!(err.to_string().contains("crc error"));
        assert!(err.to_string().contains("0x12345678"));

        let err = ZlibError::engine(EngineErrorKind::Data);
        assert_eq!(err.to_string(), "zlib data error (code -3): data error");

        let err = ZlibError::config("level 12 out of range");
        assert!(err.to_string().contains("level 12"));
    }

    #[test]
    fn test_engine_codes_roundtrip() {
        let kinds = [
            EngineErrorKind::StreamEnd,
            EngineErrorKind::NeedDictionary,
            EngineErrorKind::Io,
            EngineErrorKind::Stream,
            EngineErrorKind::Data,
            EngineErrorKind::Memory,
            EngineErrorKind::Buffer,
            EngineErrorKind::Version,
        ];
        for kind in kinds {
            assert_eq!(EngineErrorKind::from_code(kind.code()), kind);
        }
        assert_eq!(
            EngineErrorKind::from_code(-10000),
            EngineErrorKind::Unknown(-10000)
        );
        assert_eq!(
            EngineErrorKind::Unknown(-42).to_string(),
            "unknown zlib error -42"
        );
    }

    #[test]
    fn test_kind_accessors() {
        let err = ZlibError::no_footer();
        assert_eq!(err.container_kind(), Some(ContainerErrorKind::NoFooter));
        assert_eq!(err.engine_kind(), None);
        assert_eq!(err.code(), None);

        let err = ZlibError::engine(EngineErrorKind::Buffer);
        assert_eq!(err.code(), Some(-5));
        assert!(!err.is_contract_violation());

        assert!(ZlibError::contract("stream is closed").is_contract_violation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: ZlibError = io_err.into();
        assert!(matches!(err, ZlibError::Io(_)));

        let back: io::Error = ZlibError::unexpected_eof().into();
        assert_eq!(back.kind(), io::ErrorKind::UnexpectedEof);

        let back: io::Error = ZlibError::crc_mismatch(1, 2).into();
        assert_eq!(back.kind(), io::ErrorKind::InvalidData);
    }
}
