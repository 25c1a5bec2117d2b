//! Archive Loader
//!
//! Decompresses an archive into a private working file and opens it.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tempfile::TempPath;

use crate::codec::{decompress, ArchiveHeader};
use crate::config::StoreOptions;
use crate::error::{GzkvError, Result};
use crate::store::Store;

use super::ArchiveStore;

/// Open the archive at `archive_path` as a working store.
///
/// A missing or unreadable archive is a load failure. With `strict` set it
/// is returned as `ArchiveLoadFailed`; otherwise a fresh empty store is
/// created in a new temporary file and bound to `archive_path`, so that
/// `save()` creates the archive on first run.
///
/// A readable archive whose payload is not a store image fails with
/// `StoreOpenFailed` in both modes.
pub fn open(
    archive_path: impl AsRef<Path>,
    options: &StoreOptions,
    strict: bool,
) -> Result<ArchiveStore> {
    let archive_path = archive_path.as_ref();

    let (working, header) = match unpack_to_temp(archive_path, options) {
        Ok(unpacked) => unpacked,
        Err(e) if strict => {
            return Err(GzkvError::ArchiveLoadFailed {
                path: archive_path.to_path_buf(),
                source: Box::new(e),
            })
        }
        Err(e) => {
            tracing::warn!(
                "Could not load archive {} ({}), starting with an empty store",
                archive_path.display(),
                e
            );
            let store = ArchiveStore::create(options)?;
            return Ok(store.bind_source(archive_path));
        }
    };

    let store = Store::open(&working, options)?;

    tracing::debug!(
        "Loaded archive {} into {}",
        archive_path.display(),
        working.display()
    );

    Ok(ArchiveStore::new(
        store,
        working,
        Some(archive_path.to_path_buf()),
        Some(header),
    ))
}

/// Allocate a uniquely named working file
pub(crate) fn working_file(options: &StoreOptions) -> Result<tempfile::NamedTempFile> {
    let file = tempfile::Builder::new()
        .prefix("gzkv-")
        .suffix(".db")
        .tempfile_in(options.temp_dir())?;
    Ok(file)
}

/// Decompress `archive_path` into a fresh working file
fn unpack_to_temp(archive_path: &Path, options: &StoreOptions) -> Result<(TempPath, ArchiveHeader)> {
    let source = File::open(archive_path)?;

    let mut tmp = working_file(options)?;
    let unpacked = {
        let mut sink = BufWriter::new(tmp.as_file_mut());
        decompress(BufReader::new(source), &mut sink)?
    };
    tmp.as_file().sync_all()?;

    tracing::debug!(
        "Unpacked {} bytes from {}",
        unpacked.written,
        archive_path.display()
    );

    Ok((tmp.into_temp_path(), unpacked.header))
}
