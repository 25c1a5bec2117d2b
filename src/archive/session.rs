//! Archive Sessions
//!
//! Binds a store to its temporary working file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

use crate::codec::ArchiveHeader;
use crate::config::StoreOptions;
use crate::error::{GzkvError, Result};
use crate::store::{ReadTx, Store, WriteTx};

use super::loader::working_file;
use super::writer;

/// A store opened from (or destined for) an archive.
///
/// Owns the temporary working file. `close()` closes the store and removes
/// the file; dropping the session does the same, ignoring errors.
pub struct ArchiveStore {
    // Field order matters: the store is dropped before its file is removed
    store: Store,
    working: TempPath,
    source: Option<PathBuf>,
    header: Option<ArchiveHeader>,
}

impl ArchiveStore {
    pub(crate) fn new(
        store: Store,
        working: TempPath,
        source: Option<PathBuf>,
        header: Option<ArchiveHeader>,
    ) -> Self {
        Self {
            store,
            working,
            source,
            header,
        }
    }

    /// Create an empty store in a new temporary file, not bound to any archive
    pub fn create(options: &StoreOptions) -> Result<Self> {
        let working = working_file(options)?.into_temp_path();
        let store = Store::open(&working, options)?;

        tracing::debug!("Created empty store in {}", working.display());
        Ok(Self::new(store, working, None, None))
    }

    pub(crate) fn bind_source(mut self, source: &Path) -> Self {
        self.source = Some(source.to_path_buf());
        self
    }

    /// Run `f` inside a read transaction
    pub fn view<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&ReadTx<'_>) -> Result<T>,
    {
        self.store.view(f)
    }

    /// Run `f` inside a write transaction
    pub fn update<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut WriteTx<'_>) -> Result<T>,
    {
        self.store.update(f)
    }

    /// Compress the store into an open destination
    pub fn write<W: Write>(&self, dest: W, header: Option<&ArchiveHeader>) -> Result<u64> {
        writer::write(&self.store, dest, header)
    }

    /// Compress the store into the archive at `path`
    pub fn write_to_archive(
        &self,
        path: impl AsRef<Path>,
        permissions: Option<u32>,
        header: Option<&ArchiveHeader>,
    ) -> Result<u64> {
        writer::write_to_archive(&self.store, path, permissions, header)
    }

    /// Write back to the archive this session was opened from, keeping its header
    pub fn save(&self) -> Result<u64> {
        let source = self.source.as_deref().ok_or_else(|| {
            GzkvError::write_failed(
                "source archive",
                GzkvError::Storage("store was not opened from an archive".to_string()),
            )
        })?;
        self.write_to_archive(source, None, self.header.as_ref())
    }

    /// Close the store and remove the working file
    pub fn close(self) -> Result<()> {
        let ArchiveStore { store, working, .. } = self;
        let path = working.to_path_buf();

        let closed = store.close();
        working.close()?;
        tracing::debug!("Removed working file {}", path.display());

        closed
    }

    /// The underlying store
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Path of the temporary working file
    pub fn working_path(&self) -> &Path {
        &self.working
    }

    /// Archive this session was opened from
    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Header of the loaded archive. `None` for fresh stores.
    pub fn header(&self) -> Option<&ArchiveHeader> {
        self.header.as_ref()
    }
}

impl std::fmt::Debug for ArchiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveStore")
            .field("working", &self.working_path())
            .field("source", &self.source)
            .finish()
    }
}
