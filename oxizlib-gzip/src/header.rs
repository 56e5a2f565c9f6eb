//! Gzip member header (RFC 1952).
//!
//! ```text
//! +---+---+---+---+---+---+---+---+---+---+
//! |ID1|ID2|CM |FLG|     MTIME     |XFL|OS |
//! +---+---+---+---+---+---+---+---+---+---+
//! [XLEN + extra field] [name\0] [comment\0]
//! ```

use oxizlib_core::error::{ContainerErrorKind, Result, ZlibError};
use oxizlib_core::options::CompressionLevel;
use std::time::{SystemTime, UNIX_EPOCH};

/// Gzip magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 8;

/// Size of the fixed part of the header.
pub const HEADER_SIZE: usize = 10;

/// Header flag bits.
pub mod flags {
    /// Text file (advisory, ignored).
    pub const FTEXT: u8 = 0x01;
    /// Multi-part continuation. Not supported.
    pub const MULTIPART: u8 = 0x02;
    /// Extra field present.
    pub const FEXTRA: u8 = 0x04;
    /// Original filename present.
    pub const FNAME: u8 = 0x08;
    /// Comment present.
    pub const FCOMMENT: u8 = 0x10;
    /// Encrypted. Not supported.
    pub const ENCRYPT: u8 = 0x20;
    /// Reserved bits.
    pub const UNKNOWN_MASK: u8 = 0xC0;
}

/// Extra-flags byte values.
pub mod extra_flags {
    /// Compressed with the fastest level.
    pub const FAST: u8 = 0x04;
    /// Compressed with the slowest level.
    pub const SLOW: u8 = 0x02;
}

/// Operating system codes.
pub mod os {
    /// MS-DOS / FAT.
    pub const MSDOS: u8 = 0x00;
    /// Amiga.
    pub const AMIGA: u8 = 0x01;
    /// VMS.
    pub const VMS: u8 = 0x02;
    /// Unix.
    pub const UNIX: u8 = 0x03;
    /// VM/CMS.
    pub const VMCMS: u8 = 0x04;
    /// Atari TOS.
    pub const ATARI: u8 = 0x05;
    /// OS/2.
    pub const OS2: u8 = 0x06;
    /// Classic Mac OS.
    pub const MACOS: u8 = 0x07;
    /// Z-System.
    pub const ZSYSTEM: u8 = 0x08;
    /// CP/M.
    pub const CPM: u8 = 0x09;
    /// TOPS-20.
    pub const TOPS20: u8 = 0x0A;
    /// Windows NTFS.
    pub const WIN32: u8 = 0x0B;
    /// QDOS.
    pub const QDOS: u8 = 0x0C;
    /// Acorn RISC OS.
    pub const RISCOS: u8 = 0x0D;
    /// Unknown.
    pub const UNKNOWN: u8 = 0xFF;

    /// Human-readable name of an OS code.
    pub fn name(code: u8) -> &'static str {
        match code {
            MSDOS => "MS-DOS",
            AMIGA => "Amiga",
            VMS => "VMS",
            UNIX => "Unix",
            VMCMS => "VM/CMS",
            ATARI => "Atari TOS",
            OS2 => "OS/2",
            MACOS => "Mac OS",
            ZSYSTEM => "Z-System",
            CPM => "CP/M",
            TOPS20 => "TOPS-20",
            WIN32 => "Windows",
            QDOS => "QDOS",
            RISCOS => "RISC OS",
            _ => "unknown",
        }
    }
}

/// Header fields carried by a gzip member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipHeader {
    /// Modification time (Unix seconds). Zero means unset.
    pub mtime: u32,
    /// Operating system code.
    pub os_code: u8,
    /// Compression level, as recorded by the extra flags.
    pub level: CompressionLevel,
    /// Original filename, without its NUL terminator.
    pub orig_name: Option<Vec<u8>>,
    /// Comment, without its NUL terminator.
    pub comment: Option<Vec<u8>>,
}

impl Default for GzipHeader {
    fn default() -> Self {
        Self {
            mtime: 0,
            os_code: os::UNIX,
            level: CompressionLevel::DEFAULT,
            orig_name: None,
            comment: None,
        }
    }
}

impl GzipHeader {
    /// Create a header with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag byte for the optional fields present.
    pub fn flags(&self) -> u8 {
        let mut flg = 0;
        if self.orig_name.is_some() {
            flg |= flags::FNAME;
        }
        if self.comment.is_some() {
            flg |= flags::FCOMMENT;
        }
        flg
    }

    /// Encode the header, optional fields included.
    pub fn encode(&self) -> Vec<u8> {
        let name_len = self.orig_name.as_ref().map_or(0, |n| n.len() + 1);
        let comment_len = self.comment.as_ref().map_or(0, |c| c.len() + 1);
        let mut out = Vec::with_capacity(HEADER_SIZE + name_len + comment_len);

        out.extend_from_slice(&GZIP_MAGIC);
        out.push(CM_DEFLATE);
        out.push(self.flags());
        out.extend_from_slice(&self.mtime.to_le_bytes());
        out.push(extra_flags_for_level(self.level));
        out.push(self.os_code);

        if let Some(name) = &self.orig_name {
            out.extend_from_slice(name);
            out.push(0);
        }
        if let Some(comment) = &self.comment {
            out.extend_from_slice(comment);
            out.push(0);
        }
        out
    }
}

/// The fixed 10-byte part of a header, validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    /// Flag byte.
    pub flags: u8,
    /// Modification time.
    pub mtime: u32,
    /// Extra flags.
    pub xfl: u8,
    /// Operating system code.
    pub os_code: u8,
}

impl FixedHeader {
    /// Parse and validate the first [`HEADER_SIZE`] bytes of a member.
    pub fn parse(head: &[u8]) -> Result<Self> {
        if head.len() < HEADER_SIZE || head[..2] != GZIP_MAGIC {
            return Err(ZlibError::not_gzip());
        }
        if head[2] != CM_DEFLATE {
            return Err(ZlibError::container(
                ContainerErrorKind::UnsupportedMethod,
                format!("unsupported compression method {}", head[2]),
            ));
        }

        let flg = head[3];
        if flg & flags::MULTIPART != 0 {
            return Err(ZlibError::container(
                ContainerErrorKind::UnsupportedFlags,
                "multi-part gzip file is not supported",
            ));
        }
        if flg & flags::ENCRYPT != 0 {
            return Err(ZlibError::container(
                ContainerErrorKind::UnsupportedFlags,
                "encrypted gzip file is not supported",
            ));
        }
        if flg & flags::UNKNOWN_MASK != 0 {
            return Err(ZlibError::container(
                ContainerErrorKind::UnsupportedFlags,
                format!("unknown flags 0x{:02x}", flg),
            ));
        }

        Ok(Self {
            flags: flg,
            mtime: u32::from_le_bytes([head[4], head[5], head[6], head[7]]),
            xfl: head[8],
            os_code: head[9],
        })
    }

    /// Level implied by the extra flags.
    pub fn level(&self) -> CompressionLevel {
        level_from_extra_flags(self.xfl)
    }

    /// Whether an extra field follows.
    pub fn has_extra(&self) -> bool {
        self.flags & flags::FEXTRA != 0
    }

    /// Whether an original filename follows.
    pub fn has_name(&self) -> bool {
        self.flags & flags::FNAME != 0
    }

    /// Whether a comment follows.
    pub fn has_comment(&self) -> bool {
        self.flags & flags::FCOMMENT != 0
    }
}

/// Extra-flags byte recorded for `level`.
pub fn extra_flags_for_level(level: CompressionLevel) -> u8 {
    if level == CompressionLevel::BEST_SPEED {
        extra_flags::FAST
    } else if level == CompressionLevel::BEST_COMPRESSION {
        extra_flags::SLOW
    } else {
        0
    }
}

/// Level implied by an extra-flags byte.
pub fn level_from_extra_flags(xfl: u8) -> CompressionLevel {
    if xfl & extra_flags::FAST != 0 {
        CompressionLevel::BEST_SPEED
    } else if xfl & extra_flags::SLOW != 0 {
        CompressionLevel::BEST_COMPRESSION
    } else {
        CompressionLevel::DEFAULT
    }
}

/// Copy of `bytes` up to the first NUL.
pub fn truncate_at_nul(bytes: &[u8]) -> Vec<u8> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    bytes[..end].to_vec()
}

/// Current time as a header timestamp.
pub fn current_mtime() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gzip_magic() {
        assert_eq!(GZIP_MAGIC, [0x1F, 0x8B]);
    }

    #[test]
    fn test_header_default() {
        let header = GzipHeader::new();
        assert_eq!(header.os_code, os::UNIX);
        assert_eq!(header.flags(), 0);
        assert_eq!(
            header.encode(),
            [0x1F, 0x8B, 8, 0, 0, 0, 0, 0, 0, os::UNIX]
        );
    }

    #[test]
    fn test_header_with_fields() {
        let header = GzipHeader {
            mtime: 0x01020304,
            level: CompressionLevel::BEST_COMPRESSION,
            orig_name: Some(b"data.txt".to_vec()),
            comment: Some(b"hi".to_vec()),
            ..GzipHeader::default()
        };
        let bytes = header.encode();
        assert_eq!(bytes[3], flags::FNAME | flags::FCOMMENT);
        assert_eq!(&bytes[4..8], &[4, 3, 2, 1]);
        assert_eq!(bytes[8], extra_flags::SLOW);
        assert_eq!(&bytes[10..], b"data.txt\0hi\0");

        let fixed = FixedHeader::parse(&bytes).unwrap();
        assert_eq!(fixed.mtime, 0x01020304);
        assert!(fixed.has_name());
        assert!(fixed.has_comment());
        assert!(!fixed.has_extra());
        assert_eq!(fixed.level(), CompressionLevel::BEST_COMPRESSION);
    }

    #[test]
    fn test_parse_rejects() {
        let good = GzipHeader::new().encode();

        let mut bad = good.clone();
        bad[1] = 0x8C;
        let err = FixedHeader::parse(&bad).unwrap_err();
        assert_eq!(err.container_kind(), Some(ContainerErrorKind::NotGzipFormat));

        let mut bad = good.clone();
        bad[2] = 7;
        let err = FixedHeader::parse(&bad).unwrap_err();
        assert_eq!(err.container_kind(), Some(ContainerErrorKind::UnsupportedMethod));

        for flag in [flags::MULTIPART, flags::ENCRYPT, 0x40, 0x80] {
            let mut bad = good.clone();
            bad[3] = flag;
            let err = FixedHeader::parse(&bad).unwrap_err();
            assert_eq!(err.container_kind(), Some(ContainerErrorKind::UnsupportedFlags));
        }

        assert!(FixedHeader::parse(&good[..5]).is_err());
    }

    #[test]
    fn test_level_extra_flags() {
        assert_eq!(extra_flags_for_level(CompressionLevel::BEST_SPEED), 4);
        assert_eq!(extra_flags_for_level(CompressionLevel::BEST_COMPRESSION), 2);
        assert_eq!(extra_flags_for_level(CompressionLevel::DEFAULT), 0);
        assert_eq!(level_from_extra_flags(4), CompressionLevel::BEST_SPEED);
        assert_eq!(level_from_extra_flags(2), CompressionLevel::BEST_COMPRESSION);
        assert_eq!(level_from_extra_flags(0), CompressionLevel::DEFAULT);
    }

    #[test]
    fn test_truncate_at_nul() {
        assert_eq!(truncate_at_nul(b"abc\0def"), b"abc");
        assert_eq!(truncate_at_nul(b"plain"), b"plain");
        assert_eq!(os::name(os::WIN32), "Windows");
        assert_eq!(os::name(0x42), "unknown");
    }
}
