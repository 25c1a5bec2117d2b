//! Store Module
//!
//! Embedded single-file key-value store with named buckets.
//!
//! ## Responsibilities
//! - Load a store image from one file and keep it in ordered maps
//! - Scoped read (`view`) and write (`update`) transactions
//! - Persist every committed write transaction back to the file
//! - Produce the full image of a consistent snapshot (`ReadTx::write_to`)
//!
//! ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
//!
//! - **Writes** (`update`): exclusive `RwLock` write guard, acquired with a
//!   timeout (`StoreOptions::lock_timeout`), failing with `LockTimeout`
//! - **Reads** (`view`): shared read guard, same timeout; readers run
//!   concurrently with each other but never alongside a writer
//!
//! A write transaction mutates a copy of the bucket set. The copy is first
//! written to the file and only then swapped in, so an error from the
//! closure or from the disk leaves both memory and file unchanged.
//!
//! Locks are not reentrant: calling `view` or `update` from inside another
//! transaction on the same store waits for `lock_timeout` and fails.

mod bucket;
mod tx;

pub mod image;

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tempfile::NamedTempFile;

use crate::config::StoreOptions;
use crate::error::{GzkvError, Result};

pub use bucket::{Bucket, BucketMut};
pub use tx::{ReadTx, WriteTx};

/// Entries of one bucket, ordered by key
pub type BucketEntries = BTreeMap<Vec<u8>, Vec<u8>>;

/// All buckets of a store, ordered by name
pub type Buckets = BTreeMap<Vec<u8>, BucketEntries>;

/// Largest accepted key
pub const MAX_KEY_SIZE: usize = 32 * 1024;

/// Largest accepted value
pub const MAX_VALUE_SIZE: usize = (1 << 31) - 2;

/// An open store file
pub struct Store {
    /// Backing file
    path: PathBuf,

    options: StoreOptions,

    /// Committed state
    buckets: RwLock<Buckets>,
}

impl Store {
    /// Open the store at `path`, creating an empty file if none exists.
    ///
    /// Fails with `StoreOpenFailed` if the file cannot be read or does not
    /// hold a valid image.
    pub fn open(path: impl AsRef<Path>, options: &StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_failed = |reason: String| GzkvError::StoreOpenFailed {
            path: path.clone(),
            reason,
        };

        if !path.exists() {
            fs::File::create(&path).map_err(|e| open_failed(e.to_string()))?;
        }

        let data = fs::read(&path).map_err(|e| open_failed(e.to_string()))?;
        let buckets = image::read_image(&data).map_err(open_failed)?;

        tracing::debug!(
            "Opened store {} ({} bytes, {} buckets)",
            path.display(),
            data.len(),
            buckets.len()
        );

        Ok(Self {
            path,
            options: options.clone(),
            buckets: RwLock::new(buckets),
        })
    }

    /// Run `f` inside a read transaction
    pub fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadTx<'_>) -> Result<T>,
    {
        let timeout = self.options.lock_timeout;
        let guard = self
            .buckets
            .try_read_for(timeout)
            .ok_or(GzkvError::LockTimeout(timeout))?;

        f(&ReadTx::new(&guard))
    }

    /// Run `f` inside a write transaction.
    ///
    /// Commits if `f` returns `Ok`, rolls back otherwise.
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut WriteTx<'_>) -> Result<T>,
    {
        let timeout = self.options.lock_timeout;
        let mut guard = self
            .buckets
            .try_write_for(timeout)
            .ok_or(GzkvError::LockTimeout(timeout))?;

        let mut working = guard.clone();
        let out = f(&mut WriteTx::new(&mut working))?;

        let size = self.persist(&working)?;
        *guard = working;

        tracing::debug!("Committed {} ({} bytes)", self.path.display(), size);
        Ok(out)
    }

    /// Close the store. Committed data is already on disk.
    pub fn close(self) -> Result<()> {
        tracing::debug!("Closed store {}", self.path.display());
        Ok(())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Replace the backing file with the image of `buckets`
    fn persist(&self, buckets: &Buckets) -> Result<u64> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut staging = NamedTempFile::new_in(dir)?;
        let size = {
            let mut writer = BufWriter::new(staging.as_file_mut());
            let size = image::write_image(buckets, &mut writer)?;
            writer.flush()?;
            size
        };
        staging.as_file().sync_all()?;
        staging
            .persist(&self.path)
            .map_err(|e| GzkvError::Io(e.error))?;

        Ok(size)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store").field("path", &self.path).finish()
    }
}

/// Reject keys the image format or engine limits cannot hold
pub(crate) fn validate_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(GzkvError::InvalidKey("key required".to_string()));
    }
    if key.len() > MAX_KEY_SIZE {
        return Err(GzkvError::InvalidKey(format!(
            "key too large: {} bytes (max {})",
            key.len(),
            MAX_KEY_SIZE
        )));
    }
    Ok(())
}

pub(crate) fn validate_value(value: &[u8]) -> Result<()> {
    if value.len() > MAX_VALUE_SIZE {
        return Err(GzkvError::InvalidKey(format!(
            "value too large: {} bytes (max {})",
            value.len(),
            MAX_VALUE_SIZE
        )));
    }
    Ok(())
}
