//! Store Image Module
//!
//! Single-file byte image of a whole store.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Header (14 bytes)                                            │
//! │   Magic: "GZKV" (4) | Version: u16 (2) | BucketCount: u64 (8)│
//! ├──────────────────────────────────────────────────────────────┤
//! │ Bucket Block (repeated, sorted by name)                      │
//! │   [NameLen: u32][EntryCount: u64][Name]                      │
//! │   [KeyLen: u32][ValLen: u32][Key][Value]  × EntryCount       │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Footer (8 bytes)                                             │
//! │   CRC32 of all preceding bytes (4) | Padding (4)             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A store without buckets has an empty (zero byte) image.

mod builder;
mod reader;

use std::io::Write;

pub use builder::ImageBuilder;
pub use reader::read_image;

use crate::error::Result;

use super::Buckets;

// =============================================================================
// Shared Constants (used by builder and reader)
// =============================================================================

/// Magic bytes identifying a gzkv store image
pub(crate) const MAGIC: &[u8; 4] = b"GZKV";

/// Current image format version
pub(crate) const VERSION: u16 = 1;

/// Header size: Magic (4) + Version (2) + BucketCount (8) = 14 bytes
pub(crate) const HEADER_SIZE: usize = 14;

/// Footer size: CRC (4) + Padding (4) = 8 bytes
pub(crate) const FOOTER_SIZE: usize = 8;

/// Serialize every bucket into `writer`, returning the number of bytes written.
///
/// Writes nothing and returns 0 for a store without buckets.
pub fn write_image<W: Write>(buckets: &Buckets, writer: W) -> Result<u64> {
    if buckets.is_empty() {
        return Ok(0);
    }

    let mut builder = ImageBuilder::new(writer, buckets.len() as u64)?;
    for (name, entries) in buckets {
        builder.add_bucket(name, entries.len() as u64)?;
        for (key, value) in entries {
            builder.add_entry(key, value)?;
        }
    }
    let (_, written) = builder.finish()?;
    Ok(written)
}
