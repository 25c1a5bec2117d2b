//! Image Builder
//!
//! Streams buckets and entries into a store image.

use std::io::Write;

use super::{MAGIC, VERSION};
use crate::error::Result;

/// Writes a store image to any writer.
///
/// Call `add_bucket()` followed by that bucket's `add_entry()` calls, in
/// sorted order, then `finish()` to write the footer.
pub struct ImageBuilder<W: Write> {
    writer: W,
    /// Running CRC over everything written so far
    hasher: crc32fast::Hasher,
    /// Bytes written so far
    written: u64,
}

impl<W: Write> ImageBuilder<W> {
    /// Create a builder and write the header immediately
    pub fn new(writer: W, bucket_count: u64) -> Result<Self> {
        let mut builder = Self {
            writer,
            hasher: crc32fast::Hasher::new(),
            written: 0,
        };

        builder.put(MAGIC)?;
        builder.put(&VERSION.to_le_bytes())?;
        builder.put(&bucket_count.to_le_bytes())?;

        Ok(builder)
    }

    /// Start a bucket block
    pub fn add_bucket(&mut self, name: &[u8], entry_count: u64) -> Result<()> {
        self.put(&(name.len() as u32).to_le_bytes())?;
        self.put(&entry_count.to_le_bytes())?;
        self.put(name)
    }

    /// Add a key-value pair to the current bucket
    pub fn add_entry(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.put(&(key.len() as u32).to_le_bytes())?;
        self.put(&(value.len() as u32).to_le_bytes())?;
        self.put(key)?;
        self.put(value)
    }

    /// Write the footer and flush. Returns the writer and total image size.
    pub fn finish(mut self) -> Result<(W, u64)> {
        let crc = self.hasher.clone().finalize();
        self.writer.write_all(&crc.to_le_bytes())?;
        self.writer.write_all(&[0u8; 4])?;
        self.writer.flush()?;

        Ok((self.writer, self.written + super::FOOTER_SIZE as u64))
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.hasher.update(bytes);
        self.written += bytes.len() as u64;
        Ok(())
    }
}
