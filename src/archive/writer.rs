//! Archive Writer
//!
//! Compresses a store snapshot into an archive.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::codec::{ArchiveHeader, Compressor};
use crate::error::{GzkvError, Result};
use crate::store::Store;

/// Compress the whole store into an already open destination.
///
/// The read transaction stays open for the entire stream. Returns the
/// uncompressed image size. Any failure, including an empty store, is
/// reported as `WriteFailed`.
pub fn write<W: Write>(store: &Store, dest: W, header: Option<&ArchiveHeader>) -> Result<u64> {
    compress_store(store, dest, header).map_err(|e| GzkvError::write_failed("destination", e))
}

/// Compress the whole store into the archive at `path`.
///
/// Output is staged in a temporary file next to `path`, synced, and renamed
/// over `path` only after the write fully succeeded. On failure `path` is
/// left untouched. `permissions` defaults to the mode of the file being
/// replaced, if any (Unix only).
pub fn write_to_archive(
    store: &Store,
    path: impl AsRef<Path>,
    permissions: Option<u32>,
    header: Option<&ArchiveHeader>,
) -> Result<u64> {
    let path = path.as_ref();
    let fail = |e: GzkvError| GzkvError::write_failed(path.display().to_string(), e);

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut staging = tempfile::Builder::new()
        .prefix(".gzkv-")
        .suffix(".gz.tmp")
        .tempfile_in(dir)
        .map_err(|e| fail(e.into()))?;

    let written =
        compress_store(store, BufWriter::new(staging.as_file_mut()), header).map_err(fail)?;
    staging
        .as_file()
        .sync_all()
        .map_err(|e| fail(e.into()))?;

    if let Some(mode) = permissions.or_else(|| existing_mode(path)) {
        set_mode(staging.path(), mode).map_err(|e| fail(e.into()))?;
    }

    staging
        .persist(path)
        .map_err(|e| fail(GzkvError::Io(e.error)))?;

    tracing::info!(
        "Wrote archive {} ({} bytes uncompressed)",
        path.display(),
        written
    );
    Ok(written)
}

fn compress_store<W: Write>(store: &Store, dest: W, header: Option<&ArchiveHeader>) -> Result<u64> {
    store.view(|tx| {
        let mut compressor = Compressor::new(dest, header);
        tx.write_to(&mut compressor)?;
        let (mut dest, written) = compressor.finish()?;
        dest.flush()?;
        Ok(written)
    })
}

#[cfg(unix)]
fn existing_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).ok().map(|m| m.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn existing_mode(_path: &Path) -> Option<u32> {
    None
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
