//! Gzip member footer: CRC-32 and length of the uncompressed data.

use oxizlib_core::error::{Result, ZlibError};

/// Size of the footer.
pub const FOOTER_SIZE: usize = 8;

/// Gzip footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GzipFooter {
    /// CRC-32 of the uncompressed data.
    pub crc: u32,
    /// Uncompressed length modulo 2^32.
    pub size: u32,
}

impl GzipFooter {
    /// Footer for `total_len` bytes with checksum `crc`.
    pub fn new(crc: u32, total_len: u64) -> Self {
        Self {
            crc,
            size: total_len as u32,
        }
    }

    /// Little-endian wire form.
    pub fn encode(&self) -> [u8; FOOTER_SIZE] {
        let mut out = [0u8; FOOTER_SIZE];
        out[..4].copy_from_slice(&self.crc.to_le_bytes());
        out[4..].copy_from_slice(&self.size.to_le_bytes());
        out
    }

    /// Decode from the first [`FOOTER_SIZE`] bytes, if present.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let bytes: &[u8; FOOTER_SIZE] = bytes.get(..FOOTER_SIZE)?.try_into().ok()?;
        Some(Self {
            crc: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            size: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        })
    }

    /// Check the footer against what was actually decompressed.
    pub fn verify(&self, crc: u32, total_len: u64) -> Result<()> {
        if self.crc != crc {
            return Err(ZlibError::crc_mismatch(self.crc, crc));
        }
        if self.size != total_len as u32 {
            return Err(ZlibError::length_mismatch(self.size, total_len as u32));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxizlib_core::error::ContainerErrorKind;

    #[test]
    fn test_encode_decode() {
        let footer = GzipFooter::new(0xCBF43926, 9);
        let bytes = footer.encode();
        assert_eq!(bytes, [0x26, 0x39, 0xF4, 0xCB, 9, 0, 0, 0]);
        assert_eq!(GzipFooter::decode(&bytes), Some(footer));
        assert_eq!(GzipFooter::decode(&bytes[..7]), None);
    }

    #[test]
    fn test_length_wraps() {
        let footer = GzipFooter::new(0, (1u64 << 32) + 5);
        assert_eq!(footer.size, 5);
        footer.verify(0, (1u64 << 32) + 5).unwrap();
    }

    #[test]
    fn test_verify() {
        let footer = GzipFooter::new(7, 100);
        let err = footer.verify(8, 100).unwrap_err();
        assert_eq!(err.container_kind(), Some(ContainerErrorKind::CrcMismatch));
        let err = footer.verify(7, 99).unwrap_err();
        assert_eq!(err.container_kind(), Some(ContainerErrorKind::LengthMismatch));
    }
}
