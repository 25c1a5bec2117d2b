//! Tests for the store image format
//!
//! These tests verify:
//! - Buckets and entries survive a write/read cycle in order
//! - Empty stores have empty images
//! - Magic, version, checksum and truncation are validated

use gzkv::store::image::{read_image, write_image};
use gzkv::store::{BucketEntries, Buckets};

// =============================================================================
// Helper Functions
// =============================================================================

fn sample_buckets() -> Buckets {
    let mut buckets = Buckets::new();

    let mut users = BucketEntries::new();
    users.insert(b"alice".to_vec(), b"admin".to_vec());
    users.insert(b"bob".to_vec(), Vec::new());
    buckets.insert(b"users".to_vec(), users);

    let mut blobs = BucketEntries::new();
    for i in 0..100u32 {
        blobs.insert(format!("blob{:03}", i).into_bytes(), vec![i as u8; i as usize]);
    }
    buckets.insert(b"blobs".to_vec(), blobs);

    buckets.insert(b"empty".to_vec(), BucketEntries::new());
    buckets
}

fn encode(buckets: &Buckets) -> Vec<u8> {
    let mut out = Vec::new();
    let written = write_image(buckets, &mut out).unwrap();
    assert_eq!(written, out.len() as u64);
    out
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_image_roundtrip() {
    let buckets = sample_buckets();
    let image = encode(&buckets);

    let decoded = read_image(&image).unwrap();

    assert_eq!(decoded, buckets);
    assert!(decoded[&b"empty".to_vec()].is_empty());
    assert_eq!(decoded[&b"users".to_vec()][&b"bob".to_vec()], Vec::<u8>::new());
}

#[test]
fn test_image_starts_with_magic() {
    let image = encode(&sample_buckets());
    assert_eq!(&image[0..4], b"GZKV");
}

#[test]
fn test_empty_store_has_empty_image() {
    let image = encode(&Buckets::new());

    assert!(image.is_empty());
    assert!(read_image(&image).unwrap().is_empty());
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_flipped_byte_fails_checksum() {
    let mut image = encode(&sample_buckets());
    let middle = image.len() / 2;
    image[middle] ^= 0xFF;

    let err = read_image(&image).unwrap_err();
    assert!(err.contains("checksum"), "got {}", err);
}

#[test]
fn test_bad_magic_is_rejected() {
    let mut image = encode(&sample_buckets());
    image[0] = b'X';

    let err = read_image(&image).unwrap_err();
    assert!(err.contains("magic"), "got {}", err);
}

#[test]
fn test_truncated_image_is_rejected() {
    let image = encode(&sample_buckets());

    assert!(read_image(&image[..image.len() - 3]).is_err());
    assert!(read_image(&image[..10]).is_err());
}

#[test]
fn test_garbage_is_rejected() {
    assert!(read_image(b"this is not a store image at all").is_err());
}
