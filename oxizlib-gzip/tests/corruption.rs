//! Damaged and truncated gzip input.

use oxizlib_core::{CompressionLevel, ContainerErrorKind};
use oxizlib_gzip::{GzipReader, compress};
use std::io::Read;

fn sample() -> Vec<u8> {
    (0..10_000u32).map(|i| (i * 7 % 256) as u8).collect()
}

fn sample_gz() -> Vec<u8> {
    compress(&sample(), CompressionLevel::DEFAULT).unwrap()
}

#[test]
fn test_crc_bit_flip() {
    let mut gz = sample_gz();
    let crc_at = gz.len() - 8;
    gz[crc_at] ^= 0x01;

    let mut reader = GzipReader::new(&gz[..]).unwrap();
    let err = reader.read_all().unwrap_err();
    assert_eq!(err.container_kind(), Some(ContainerErrorKind::CrcMismatch));
}

#[test]
fn test_length_mismatch() {
    let mut gz = sample_gz();
    let len_at = gz.len() - 4;
    gz[len_at] = gz[len_at].wrapping_add(1);

    let mut reader = GzipReader::new(&gz[..]).unwrap();
    let err = reader.read_all().unwrap_err();
    assert_eq!(err.container_kind(), Some(ContainerErrorKind::LengthMismatch));
}

#[test]
fn test_missing_footer() {
    let gz = sample_gz();
    let truncated = &gz[..gz.len() - 3];

    let mut reader = GzipReader::new(truncated).unwrap();
    let err = reader.read_all().unwrap_err();
    assert_eq!(err.container_kind(), Some(ContainerErrorKind::NoFooter));
}

#[test]
fn test_truncated_body() {
    let gz = sample_gz();
    let truncated = &gz[..gz.len() / 2];

    let mut reader = GzipReader::new(truncated).unwrap();
    let err = reader.read_all().unwrap_err();
    assert_eq!(err.container_kind(), Some(ContainerErrorKind::UnexpectedEof));
}

#[test]
fn test_footer_checked_before_end_is_reported() {
    let mut gz = sample_gz();
    let crc_at = gz.len() - 8;
    gz[crc_at] ^= 0x80;

    let mut reader = GzipReader::new(&gz[..]).unwrap();
    let mut delivered = 0;
    loop {
        match reader.read_bytes(1000) {
            Ok(Some(chunk)) => delivered += chunk.len(),
            Ok(None) => panic!("corruption went unnoticed"),
            Err(err) => {
                assert_eq!(err.container_kind(), Some(ContainerErrorKind::CrcMismatch));
                break;
            }
        }
    }
    assert_eq!(delivered, sample().len());
}

#[test]
fn test_io_error_kind() {
    let gz = sample_gz();
    let truncated = &gz[..gz.len() / 2];
    let mut reader = GzipReader::new(truncated).unwrap();
    let mut out = Vec::new();
    let err = reader.read_to_end(&mut out).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
}

#[test]
fn test_unsupported_header_flags() {
    let mut gz = sample_gz();
    gz[3] |= 0x20;
    let err = GzipReader::new(&gz[..]).unwrap_err();
    assert_eq!(err.container_kind(), Some(ContainerErrorKind::UnsupportedFlags));
    assert!(err.to_string().contains("encrypted"));

    let mut gz = sample_gz();
    gz[2] = 9;
    let err = GzipReader::new(&gz[..]).unwrap_err();
    assert_eq!(err.container_kind(), Some(ContainerErrorKind::UnsupportedMethod));
}
