//! Tests for the gzip stream codec
//!
//! These tests verify:
//! - Compress/decompress round trips, including header metadata
//! - Payloads larger than one copy chunk are fully drained
//! - Concatenated gzip members are decoded in full
//! - Corrupt, truncated and empty streams are rejected, as are trailing bytes
//! - The compressor refuses to finish an empty payload

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use gzkv::codec::{decompress, ArchiveHeader, Compressor};
use gzkv::GzkvError;

// =============================================================================
// Helper Functions
// =============================================================================

fn compress_bytes(payload: &[u8], header: Option<&ArchiveHeader>) -> Vec<u8> {
    let mut compressor = Compressor::new(Vec::new(), header);
    compressor.write_all(payload).unwrap();
    let (out, written) = compressor.finish().unwrap();
    assert_eq!(written, payload.len() as u64);
    out
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_roundtrip_small_payload() {
    let compressed = compress_bytes(b"hello archive", None);

    let mut out = Vec::new();
    let result = decompress(compressed.as_slice(), &mut out).unwrap();

    assert_eq!(out, b"hello archive");
    assert_eq!(result.written, 13);
    assert_eq!(result.header.comment, None);
}

#[test]
fn test_roundtrip_preserves_header() {
    let header = ArchiveHeader::with_comment("my precious dump")
        .filename("store.db")
        .mtime(1_700_000_000);
    let compressed = compress_bytes(b"payload", Some(&header));

    let mut out = Vec::new();
    let result = decompress(compressed.as_slice(), &mut out).unwrap();

    assert_eq!(result.header, header);
}

#[test]
fn test_large_payload_is_fully_drained() {
    // Several copy chunks worth of poorly compressible data
    let payload: Vec<u8> = (0..500_000u32)
        .map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8)
        .collect();
    let compressed = compress_bytes(&payload, None);

    let mut out = Vec::new();
    let result = decompress(compressed.as_slice(), &mut out).unwrap();

    assert_eq!(result.written, payload.len() as u64);
    assert_eq!(out, payload);
}

#[test]
fn test_concatenated_members_are_all_decoded() {
    let header = ArchiveHeader::with_comment("first member");
    let mut compressed = compress_bytes(b"first", Some(&header));
    compressed.extend(compress_bytes(b"second", None));

    let mut out = Vec::new();
    let result = decompress(compressed.as_slice(), &mut out).unwrap();

    assert_eq!(out, b"firstsecond");
    assert_eq!(result.written, 11);
    assert_eq!(result.header, header);
}

// =============================================================================
// Failure Tests
// =============================================================================

#[test]
fn test_trailing_garbage_is_corrupt() {
    let mut compressed = compress_bytes(b"payload", None);
    compressed.extend_from_slice(b"NOT GZIP TRAILING GARBAGE");

    let mut out = Vec::new();
    let err = decompress(compressed.as_slice(), &mut out).unwrap_err();

    assert!(matches!(err, GzkvError::CorruptArchive(_)), "got {:?}", err);
}


#[test]
fn test_not_gzip_is_corrupt() {
    let mut out = Vec::new();
    let err = decompress(&b"definitely not gzip data"[..], &mut out).unwrap_err();

    assert!(matches!(err, GzkvError::CorruptArchive(_)), "got {:?}", err);
}

#[test]
fn test_truncated_stream_is_corrupt() {
    let compressed = compress_bytes(&[7u8; 10_000], None);
    let truncated = &compressed[..compressed.len() / 2];

    let mut out = Vec::new();
    let err = decompress(truncated, &mut out).unwrap_err();

    assert!(matches!(err, GzkvError::CorruptArchive(_)), "got {:?}", err);
}

#[test]
fn test_empty_input_is_rejected() {
    let mut out = Vec::new();
    let err = decompress(&b""[..], &mut out).unwrap_err();

    assert!(
        matches!(err, GzkvError::CorruptArchive(_) | GzkvError::EmptyPayload(_)),
        "got {:?}",
        err
    );
}

#[test]
fn test_valid_gzip_with_empty_payload() {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let compressed = encoder.finish().unwrap();

    let mut out = Vec::new();
    let err = decompress(compressed.as_slice(), &mut out).unwrap_err();

    assert!(matches!(err, GzkvError::EmptyPayload(_)), "got {:?}", err);
}

#[test]
fn test_compressor_rejects_empty_payload() {
    let compressor = Compressor::new(Vec::new(), Some(&ArchiveHeader::with_comment("empty")));
    let err = compressor.finish().unwrap_err();

    assert!(matches!(err, GzkvError::EmptyPayload(_)), "got {:?}", err);
}

#[test]
fn test_compressor_counts_written_bytes() {
    let mut compressor = Compressor::new(Vec::new(), None);
    compressor.write_all(b"abc").unwrap();
    compressor.write_all(b"defg").unwrap();

    assert_eq!(compressor.written(), 7);
}
