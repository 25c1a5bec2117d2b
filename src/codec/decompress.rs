//! Decompression
//!
//! Drains a gzip stream into a writer.

use std::io::{self, Read, Write};

use flate2::read::MultiGzDecoder;

use crate::error::{GzkvError, Result};

use super::ArchiveHeader;

/// Copy buffer size for draining the decoder
const CHUNK_SIZE: usize = 64 * 1024;

/// Outcome of a successful decompression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    /// Payload bytes written to the sink
    pub written: u64,

    /// Header metadata found in the stream
    pub header: ArchiveHeader,
}

/// Decompress the whole gzip stream in `source` into `sink`.
///
/// Concatenated members are decoded back to back and their payloads
/// appended; the reported header is the first member's. The decoder is read
/// in a loop until EOF. Decoder errors (bad magic, bytes after a member that
/// do not start another member, truncated or corrupt deflate data, checksum
/// mismatch) become `CorruptArchive`; sink errors stay `Io`. Zero payload
/// bytes is `EmptyPayload`.
pub fn decompress<R: Read, W: Write>(source: R, sink: &mut W) -> Result<Decompressed> {
    let mut decoder = MultiGzDecoder::new(source);
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut written: u64 = 0;
    let mut header = None;

    loop {
        let n = match decoder.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(GzkvError::CorruptArchive(format!(
                    "could not read gz contents: {}",
                    e
                )))
            }
        };

        if header.is_none() {
            header = decoder.header().map(ArchiveHeader::from_gz);
        }
        sink.write_all(&buf[..n])?;
        written += n as u64;
    }
    sink.flush()?;

    // A stream that ends before a complete header leaves no header behind
    let header = header
        .or_else(|| decoder.header().map(ArchiveHeader::from_gz))
        .ok_or_else(|| GzkvError::CorruptArchive("missing gzip header".to_string()))?;

    if written == 0 {
        return Err(GzkvError::EmptyPayload(
            "nothing was uncompressed".to_string(),
        ));
    }

    Ok(Decompressed { written, header })
}
