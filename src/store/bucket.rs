//! Buckets
//!
//! Read-only and mutable views of one named bucket.

use crate::error::Result;

use super::{validate_key, validate_value, BucketEntries};

/// Read-only view of a bucket
#[derive(Debug, Clone, Copy)]
pub struct Bucket<'a> {
    name: &'a [u8],
    entries: &'a BucketEntries,
}

impl<'a> Bucket<'a> {
    pub(crate) fn new(name: &'a [u8], entries: &'a BucketEntries) -> Self {
        Self { name, entries }
    }

    pub fn name(&self) -> &'a [u8] {
        self.name
    }

    /// Value stored under `key`, if any
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&'a [u8]> {
        let entries: &'a BucketEntries = self.entries;
        entries.get(key.as_ref()).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&'a [u8], &'a [u8])> + 'a {
        let entries: &'a BucketEntries = self.entries;
        entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice()))
    }

    /// Call `f` for every entry in key order, stopping at the first error
    pub fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]) -> Result<()>,
    {
        for (key, value) in self.iter() {
            f(key, value)?;
        }
        Ok(())
    }
}

/// Mutable view of a bucket inside a write transaction
#[derive(Debug)]
pub struct BucketMut<'a> {
    name: Vec<u8>,
    entries: &'a mut BucketEntries,
}

impl<'a> BucketMut<'a> {
    pub(crate) fn new(name: Vec<u8>, entries: &'a mut BucketEntries) -> Self {
        Self { name, entries }
    }

    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Insert or overwrite `key`
    pub fn put(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> Result<()> {
        let (key, value) = (key.as_ref(), value.as_ref());
        validate_key(key)?;
        validate_value(value)?;

        self.entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    /// Remove `key`. Removing a missing key is not an error.
    pub fn delete(&mut self, key: impl AsRef<[u8]>) -> Result<()> {
        let key = key.as_ref();
        validate_key(key)?;

        self.entries.remove(key);
        Ok(())
    }

    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.entries.get(key.as_ref()).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read-only view of the current (uncommitted) contents
    pub fn as_bucket(&self) -> Bucket<'_> {
        Bucket::new(&self.name, self.entries)
    }

    pub fn for_each<F>(&self, f: F) -> Result<()>
    where
        F: FnMut(&[u8], &[u8]) -> Result<()>,
    {
        self.as_bucket().for_each(f)
    }
}
