//! Stream Codec Module
//!
//! Gzip framing for store images.
//!
//! ## Responsibilities
//! - Drain a gzip stream into any writer, reporting the payload size
//! - Wrap a writer so that everything written to it is gzip-compressed
//! - Carry header metadata (comment, file name, mtime) through the frame
//! - Refuse empty payloads in both directions
//!
//! ## Archive Framing (RFC 1952)
//! ```text
//! ┌──────────┬────────┬──────────────────────┬───────────────┬──────────────┐
//! │ Magic(2) │ Flags  │ Optional name/comment│ Deflate body  │ CRC32 + ISIZE│
//! └──────────┴────────┴──────────────────────┴───────────────┴──────────────┘
//! ```

mod compress;
mod decompress;

pub use compress::Compressor;
pub use decompress::{decompress, Decompressed};

use flate2::GzHeader;

/// Metadata stored in the gzip header of an archive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Free-text comment
    pub comment: Option<String>,

    /// Original file name
    pub filename: Option<String>,

    /// Modification time (unix seconds, 0 = unset)
    pub mtime: u32,
}

impl ArchiveHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header carrying only a comment
    pub fn with_comment(comment: impl Into<String>) -> Self {
        Self::default().comment(comment)
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn mtime(mut self, mtime: u32) -> Self {
        self.mtime = mtime;
        self
    }

    /// Build from a parsed gzip header; non-UTF-8 fields are decoded lossily
    pub(crate) fn from_gz(header: &GzHeader) -> Self {
        Self {
            comment: header
                .comment()
                .map(|c| String::from_utf8_lossy(c).into_owned()),
            filename: header
                .filename()
                .map(|f| String::from_utf8_lossy(f).into_owned()),
            mtime: header.mtime(),
        }
    }
}
