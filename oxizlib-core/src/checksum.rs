//! Checksum surface: CRC-32 (gzip footers) and Adler-32 (zlib trailers).
//!
//! Both checksums are seeded, so a running value can be carried across
//! chunks:
//!
//! ```rust
//! use oxizlib_core::checksum::{crc32, CRC32_INIT};
//!
//! let whole = crc32(b"hello world", CRC32_INIT);
//! let split = crc32(b" world", crc32(b"hello", CRC32_INIT));
//! assert_eq!(whole, split);
//! ```

/// Initial value for a CRC-32 computation.
pub const CRC32_INIT: u32 = 0;

/// Initial value for an Adler-32 computation.
pub const ADLER32_INIT: u32 = 1;

/// CRC-32 polynomial (IEEE 802.3, reversed representation).
const CRC32_POLY: u32 = 0xEDB8_8320;

static CRC_TABLE: [u32; 256] = make_crc_table();

const fn make_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ CRC32_POLY;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// The 256-entry lookup table of the CRC-32 polynomial.
pub fn crc_table() -> &'static [u32; 256] {
    &CRC_TABLE
}

/// Continue a CRC-32 computation from `seed` over `data`.
///
/// Pass [`CRC32_INIT`] to start a new checksum.
pub fn crc32(data: &[u8], seed: u32) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(seed);
    hasher.update(data);
    hasher.finalize()
}

/// Continue an Adler-32 computation from `seed` over `data`.
///
/// Pass [`ADLER32_INIT`] to start a new checksum.
pub fn adler32(data: &[u8], seed: u32) -> u32 {
    let mut adler = adler2::Adler32::from_checksum(seed);
    adler.write_slice(data);
    adler.checksum()
}

/// Incremental CRC-32 hasher.
///
/// Tracks the running checksum together with the number of bytes hashed,
/// which is what a gzip footer records.
#[derive(Debug, Clone, Default)]
pub struct Crc32 {
    hasher: crc32fast::Hasher,
    len: u64,
}

impl Crc32 {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the checksum.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.len += data.len() as u64;
    }

    /// Current checksum value.
    pub fn value(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// Number of bytes hashed so far.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True when nothing has been hashed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Restart from [`CRC32_INIT`].
    pub fn reset(&mut self) {
        self.hasher.reset();
        self.len = 0;
    }
}
