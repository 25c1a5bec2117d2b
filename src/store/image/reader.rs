//! Image Reader
//!
//! Parses and validates a store image.

use std::collections::BTreeMap;

use super::{FOOTER_SIZE, HEADER_SIZE, MAGIC, VERSION};
use crate::store::Buckets;

/// Parse a complete store image.
///
/// An empty slice is an empty store. Errors are human-readable reasons;
/// the caller attaches the path.
pub fn read_image(data: &[u8]) -> std::result::Result<Buckets, String> {
    if data.is_empty() {
        return Ok(Buckets::new());
    }

    if data.len() < HEADER_SIZE + FOOTER_SIZE {
        return Err(format!("image too short: {} bytes", data.len()));
    }

    if &data[0..4] != MAGIC {
        return Err(format!(
            "invalid image magic: expected GZKV, got {:?}",
            &data[0..4]
        ));
    }

    let version = u16::from_le_bytes([data[4], data[5]]);
    if version != VERSION {
        return Err(format!("unsupported image version: {}", version));
    }

    // Validate checksum before trusting any length field
    let body_end = data.len() - FOOTER_SIZE;
    let stored_crc = u32::from_le_bytes([
        data[body_end],
        data[body_end + 1],
        data[body_end + 2],
        data[body_end + 3],
    ]);
    let actual_crc = crc32fast::hash(&data[..body_end]);
    if stored_crc != actual_crc {
        return Err(format!(
            "checksum mismatch: stored {:08x}, computed {:08x}",
            stored_crc, actual_crc
        ));
    }

    let mut cursor = Cursor {
        data: &data[..body_end],
        pos: 6,
    };
    let bucket_count = cursor.u64()?;

    let mut buckets = Buckets::new();
    for _ in 0..bucket_count {
        let name_len = cursor.u32()? as usize;
        let entry_count = cursor.u64()?;
        let name = cursor.bytes(name_len)?.to_vec();

        let mut entries = BTreeMap::new();
        for _ in 0..entry_count {
            let key_len = cursor.u32()? as usize;
            let val_len = cursor.u32()? as usize;
            let key = cursor.bytes(key_len)?.to_vec();
            let value = cursor.bytes(val_len)?.to_vec();
            entries.insert(key, value);
        }

        if buckets.insert(name, entries).is_some() {
            return Err("duplicate bucket name".to_string());
        }
    }

    if cursor.pos != body_end {
        return Err(format!(
            "{} trailing bytes before footer",
            body_end - cursor.pos
        ));
    }

    Ok(buckets)
}

/// Bounds-checked little-endian reader over the image body
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn bytes(&mut self, len: usize) -> std::result::Result<&'a [u8], String> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| format!("truncated image at offset {}", self.pos))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> std::result::Result<u32, String> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> std::result::Result<u64, String> {
        let b = self.bytes(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(u64::from_le_bytes(arr))
    }
}
