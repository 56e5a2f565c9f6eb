//! Property-based round-trip tests for the stream engine.
//!
//! - Every (level, strategy) pair reproduces its input
//! - Chunking on either side does not change the result
//! - Output interoperates with flate2 in both directions

use proptest::prelude::*;
use std::io::{Read, Write};

use oxizlib_core::{CompressionLevel, FlushMode, Format, Strategy as DeflateStrategy};
use oxizlib_stream::{DeflateParams, InflateParams, ZStream};

fn level_strategy() -> impl Strategy<Value = CompressionLevel> {
    (-1i32..=9).prop_map(|level| CompressionLevel::new(level).unwrap())
}

fn deflate_strategy() -> impl Strategy<Value = DeflateStrategy> {
    prop::sample::select(DeflateStrategy::ALL.to_vec())
}

fn format_strategy() -> impl Strategy<Value = Format> {
    prop_oneof![Just(Format::Zlib), Just(Format::Raw)]
}

/// Mostly-compressible data: short runs drawn from a small alphabet.
fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..4096),
        prop::collection::vec(prop::sample::select(b"abc \n".to_vec()), 0..20_000),
    ]
}

fn compress_chunked(data: &[u8], params: DeflateParams, chunk: usize) -> Vec<u8> {
    let mut stream = ZStream::with_params(params).unwrap();
    let mut out = Vec::new();
    for piece in data.chunks(chunk.max(1)) {
        stream.feed(piece, FlushMode::None).unwrap();
        out.extend(stream.drain_output().unwrap());
    }
    out.extend(stream.finish().unwrap());
    out
}

fn decompress_chunked(data: &[u8], format: Format, chunk: usize) -> Vec<u8> {
    let mut stream = ZStream::with_params(InflateParams::new().with_format(format)).unwrap();
    let mut out = Vec::new();
    for piece in data.chunks(chunk.max(1)) {
        stream.feed(piece, FlushMode::Sync).unwrap();
        out.extend(stream.drain_output().unwrap());
    }
    out.extend(stream.finish().unwrap());
    assert!(stream.is_finished());
    out
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_roundtrip_all_params(
        data in payload_strategy(),
        level in level_strategy(),
        strategy in deflate_strategy(),
        format in format_strategy(),
        in_chunk in 1usize..5000,
        out_chunk in 1usize..600,
    ) {
        let params = DeflateParams::new()
            .with_level(level)
            .with_strategy(strategy)
            .with_format(format);
        let compressed = compress_chunked(&data, params, in_chunk);
        let restored = decompress_chunked(&compressed, format, out_chunk);
        prop_assert_eq!(restored, data);
    }

    #[test]
    fn prop_flushes_do_not_change_content(
        data in payload_strategy(),
        split in 0usize..4096,
        full in any::<bool>(),
    ) {
        let split = split.min(data.len());
        let flush = if full { FlushMode::Full } else { FlushMode::Sync };
        let mut stream = ZStream::with_params(DeflateParams::new()).unwrap();
        stream.feed(&data[..split], flush).unwrap();
        stream.feed(&data[split..], FlushMode::Finish).unwrap();
        let compressed = stream.drain_output().unwrap();

        prop_assert_eq!(oxizlib_stream::inflate(&compressed).unwrap(), data);
    }

    #[test]
    fn prop_flate2_decodes_our_output(data in payload_strategy(), level in level_strategy()) {
        let compressed = oxizlib_stream::deflate(&data, level).unwrap();
        let mut decoder = flate2::read::ZlibDecoder::new(&compressed[..]);
        let mut restored = Vec::new();
        decoder.read_to_end(&mut restored).unwrap();
        prop_assert_eq!(restored, data);
    }

    #[test]
    fn prop_we_decode_flate2_output(data in payload_strategy(), level in 0u32..=9) {
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::new(level));
        encoder.write_all(&data).unwrap();
        let compressed = encoder.finish().unwrap();
        prop_assert_eq!(oxizlib_stream::inflate(&compressed).unwrap(), data);
    }
}

// ============================================================================
// Edge cases
// ============================================================================

#[test]
fn test_empty_input() {
    let compressed = oxizlib_stream::deflate(b"", CompressionLevel::DEFAULT).unwrap();
    assert_eq!(oxizlib_stream::inflate(&compressed).unwrap(), b"");
}

#[test]
fn test_store_level_larger_than_input() {
    let data = vec![0x42u8; 70_000];
    let compressed = oxizlib_stream::deflate(&data, CompressionLevel::NONE).unwrap();
    assert!(compressed.len() > data.len());
    assert_eq!(oxizlib_stream::inflate(&compressed).unwrap(), data);
}

#[test]
fn test_highly_compressible_large_input() {
    let data = vec![0u8; 4 * 1024 * 1024];
    let compressed = oxizlib_stream::deflate(&data, CompressionLevel::BEST_COMPRESSION).unwrap();
    assert!(compressed.len() < data.len() / 100);

    // Decompression expands far beyond the initial buffer in one call.
    let mut stream = ZStream::with_params(InflateParams::new()).unwrap();
    stream.feed(&compressed, FlushMode::Sync).unwrap();
    assert!(stream.is_finished());
    assert_eq!(stream.buffered_len(), data.len());
    assert!(stream.capacity() >= data.len());
}

#[test]
fn test_byte_at_a_time() {
    let data = b"byte at a time, both directions".repeat(8);
    let compressed = compress_chunked(&data, DeflateParams::new(), 1);
    assert_eq!(decompress_chunked(&compressed, Format::Zlib, 1), data);
}
