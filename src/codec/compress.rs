//! Compressor
//!
//! Gzip-compresses everything written through it.

use std::io::{self, Write};

use flate2::write::GzEncoder;
use flate2::{Compression, GzBuilder};

use crate::error::{GzkvError, Result};

use super::ArchiveHeader;

/// Write adaptor that gzip-compresses into `W` and counts payload bytes.
///
/// Call [`Compressor::finish`] to write the gzip trailer and learn whether
/// anything was compressed. If the compressor is dropped early (for example
/// when `?` bails out mid-stream) the encoder still attempts to flush its
/// trailer on drop.
pub struct Compressor<W: Write> {
    encoder: GzEncoder<W>,
    written: u64,
}

impl<W: Write> Compressor<W> {
    /// Start a gzip stream on `dest`, writing `header` fields if given
    pub fn new(dest: W, header: Option<&ArchiveHeader>) -> Self {
        let mut builder = GzBuilder::new();
        if let Some(header) = header {
            if let Some(comment) = &header.comment {
                builder = builder.comment(comment.as_bytes());
            }
            if let Some(filename) = &header.filename {
                builder = builder.filename(filename.as_bytes());
            }
            builder = builder.mtime(header.mtime);
        }

        Self {
            encoder: builder.write(dest, Compression::default()),
            written: 0,
        }
    }

    /// Uncompressed bytes accepted so far
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Finish the gzip stream and hand back the destination.
    ///
    /// Fails with `EmptyPayload` if nothing was written.
    pub fn finish(self) -> Result<(W, u64)> {
        let written = self.written;
        let dest = self.encoder.finish()?;

        if written == 0 {
            return Err(GzkvError::EmptyPayload(
                "nothing was compressed".to_string(),
            ));
        }

        Ok((dest, written))
    }
}

impl<W: Write> Write for Compressor<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.encoder.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.encoder.flush()
    }
}
