//! Transactions
//!
//! Scoped handles passed to `Store::view` and `Store::update`.

use std::io::Write;

use crate::error::{GzkvError, Result};

use super::{image, validate_key, Bucket, BucketMut, Buckets};

/// Read transaction over a consistent snapshot
pub struct ReadTx<'a> {
    buckets: &'a Buckets,
}

impl<'a> ReadTx<'a> {
    pub(crate) fn new(buckets: &'a Buckets) -> Self {
        Self { buckets }
    }

    /// Look up a bucket by name
    pub fn bucket(&self, name: impl AsRef<[u8]>) -> Option<Bucket<'a>> {
        let (name, entries) = self.buckets.get_key_value(name.as_ref())?;
        Some(Bucket::new(name, entries))
    }

    /// Bucket names in sorted order
    pub fn bucket_names(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.buckets.keys().map(Vec::as_slice)
    }

    /// True if the store holds no buckets
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Write the full store image to `writer`, returning its size.
    ///
    /// An empty store writes nothing and returns 0.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<u64> {
        image::write_image(self.buckets, writer)
    }
}

/// Write transaction over a private copy of the store
pub struct WriteTx<'a> {
    buckets: &'a mut Buckets,
}

impl<'a> WriteTx<'a> {
    pub(crate) fn new(buckets: &'a mut Buckets) -> Self {
        Self { buckets }
    }

    pub fn bucket(&self, name: impl AsRef<[u8]>) -> Option<Bucket<'_>> {
        let (name, entries) = self.buckets.get_key_value(name.as_ref())?;
        Some(Bucket::new(name, entries))
    }

    pub fn bucket_mut(&mut self, name: impl AsRef<[u8]>) -> Option<BucketMut<'_>> {
        let name = name.as_ref();
        let entries = self.buckets.get_mut(name)?;
        Some(BucketMut::new(name.to_vec(), entries))
    }

    /// Create a new bucket; fails with `BucketExists` if it is already there
    pub fn create_bucket(&mut self, name: impl AsRef<[u8]>) -> Result<BucketMut<'_>> {
        let name = name.as_ref();
        validate_bucket_name(name)?;

        if self.buckets.contains_key(name) {
            return Err(GzkvError::BucketExists(
                String::from_utf8_lossy(name).into_owned(),
            ));
        }
        Ok(BucketMut::new(
            name.to_vec(),
            self.buckets.entry(name.to_vec()).or_default(),
        ))
    }

    /// Open a bucket, creating it if absent
    pub fn create_bucket_if_not_exists(&mut self, name: impl AsRef<[u8]>) -> Result<BucketMut<'_>> {
        let name = name.as_ref();
        validate_bucket_name(name)?;

        Ok(BucketMut::new(
            name.to_vec(),
            self.buckets.entry(name.to_vec()).or_default(),
        ))
    }

    /// Remove a bucket and all its entries
    pub fn delete_bucket(&mut self, name: impl AsRef<[u8]>) -> Result<()> {
        let name = name.as_ref();
        self.buckets
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| GzkvError::NoSuchPartition(String::from_utf8_lossy(name).into_owned()))
    }

    pub fn bucket_names(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.buckets.keys().map(Vec::as_slice)
    }
}

fn validate_bucket_name(name: &[u8]) -> Result<()> {
    validate_key(name).map_err(|_| {
        GzkvError::InvalidKey(format!(
            "bucket name must be 1..={} bytes",
            super::MAX_KEY_SIZE
        ))
    })
}
