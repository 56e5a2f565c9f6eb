//! Resynchronization at full-flush points.

use oxizlib_core::FlushMode;
use oxizlib_stream::{DeflateParams, InflateParams, SYNC_MARKER, SyncOutcome, ZStream};

fn letters(len: usize) -> Vec<u8> {
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
    (0..len)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            b'a' + ((seed >> 33) % 26) as u8
        })
        .collect()
}

fn digits(len: usize) -> Vec<u8> {
    (0..len).map(|i| b'0' + (i % 10) as u8).collect()
}

/// Compress `first` ending with a full flush, then `second` to the end.
/// Returns the two compressed pieces.
fn two_part_stream(first: &[u8], second: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut stream = ZStream::with_params(DeflateParams::new()).unwrap();
    stream.feed(first, FlushMode::Full).unwrap();
    let head = stream.drain_output().unwrap();
    stream.feed(second, FlushMode::Finish).unwrap();
    let tail = stream.drain_output().unwrap();
    (head, tail)
}

#[test]
fn test_full_flush_ends_with_marker() {
    let (head, _) = two_part_stream(&letters(3000), &digits(100));
    assert!(head.ends_with(&SYNC_MARKER));
}

#[test]
fn test_sync_skips_corrupted_prefix() {
    let part1 = letters(5000);
    let part2 = digits(2000);
    let (mut head, tail) = two_part_stream(&part1, &part2);
    let marker_end = head.len();

    // Destroy everything in front of the marker.
    let corrupt_len = marker_end - SYNC_MARKER.len();
    head[..corrupt_len].fill(0xFF);

    let mut compressed = head;
    compressed.extend_from_slice(&tail);

    let mut inflater = ZStream::with_params(InflateParams::new()).unwrap();
    let outcome = inflater.sync(&compressed).unwrap();
    assert_eq!(outcome, SyncOutcome::Found { skipped: marker_end });
    assert_eq!(inflater.pending_input(), &tail[..]);
    assert_eq!(inflater.total_in(), marker_end as u64);

    inflater.feed(&[], FlushMode::Sync).unwrap();
    assert!(inflater.is_finished());
    assert_eq!(inflater.drain_output().unwrap(), part2);

    // The zlib trailer is not consumed after a raw restart.
    assert_eq!(inflater.pending_input().len(), 4);
}

#[test]
fn test_sync_fed_in_pieces() {
    let part1 = letters(2000);
    let part2 = digits(300);
    let (mut head, tail) = two_part_stream(&part1, &part2);
    let marker_end = head.len();
    head[..marker_end - SYNC_MARKER.len()].fill(0x01);

    let mut compressed = head;
    compressed.extend_from_slice(&tail);

    // Split right inside the marker.
    let split = marker_end - 2;
    let mut inflater = ZStream::with_params(InflateParams::new()).unwrap();
    let first = inflater.sync(&compressed[..split]).unwrap();
    assert_eq!(first, SyncOutcome::NotFound { skipped: split });

    let second = inflater.sync(&compressed[split..]).unwrap();
    assert_eq!(second, SyncOutcome::Found { skipped: 2 });
    assert_eq!(inflater.total_in(), marker_end as u64);

    inflater.feed(&[], FlushMode::Sync).unwrap();
    assert_eq!(inflater.drain_output().unwrap(), part2);
}
