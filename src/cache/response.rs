//! Responses
//!
//! [`Response`] is what the client hands back: its body may be a live
//! stream. [`ResponseRecord`] is the data-only projection that gets encoded
//! into the store; decoding rebuilds a `Response` whose body is an
//! in-memory buffer that is already complete.

use std::fmt;
use std::io::{self, Cursor, Read};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{GzkvError, Result};

use super::request::{Headers, Request};

/// Response body: a byte source read at most once
pub struct Body(Box<dyn Read + Send>);

impl Body {
    /// Wrap a live stream
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self(Box::new(reader))
    }

    /// In-memory body
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(Box::new(Cursor::new(bytes.into())))
    }

    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Body")
    }
}

/// An HTTP response
#[derive(Debug)]
pub struct Response {
    /// Status line, e.g. "200 OK"
    pub status: String,
    pub status_code: u16,
    /// Protocol, e.g. "HTTP/1.1"
    pub proto: String,
    pub proto_major: u8,
    pub proto_minor: u8,
    pub headers: Headers,
    pub body: Body,
    /// `None` when unknown
    pub content_length: Option<u64>,
    pub transfer_encoding: Vec<String>,
    /// Server asked to close the connection
    pub close: bool,
    /// Body was transparently decompressed by the client
    pub uncompressed: bool,
    pub trailer: Headers,
    /// Request that produced this response
    pub request: Request,
}

impl Response {
    /// An HTTP/1.1 response with the given status and an empty body
    pub fn new(status_code: u16, request: Request) -> Self {
        Self {
            status: status_line(status_code),
            status_code,
            proto: "HTTP/1.1".to_string(),
            proto_major: 1,
            proto_minor: 1,
            headers: Headers::new(),
            body: Body::empty(),
            content_length: Some(0),
            transfer_encoding: Vec::new(),
            close: false,
            uncompressed: false,
            trailer: Headers::new(),
            request,
        }
    }

    /// Append a header value
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .entry(name.as_ref().to_ascii_lowercase())
            .or_default()
            .push(value.into());
        self
    }

    /// Replace the body with in-memory bytes and set the content length
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.content_length = Some(body.len() as u64);
        self.body = Body::from_bytes(body);
        self
    }

    /// First value of a header
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Read the remaining body
    pub fn bytes(&mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.body.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read the remaining body as UTF-8
    pub fn text(&mut self) -> io::Result<String> {
        let mut buf = String::new();
        self.body.read_to_string(&mut buf)?;
        Ok(buf)
    }
}

/// "<code> <reason>", reason omitted for unregistered codes
pub fn status_line(status_code: u16) -> String {
    match reqwest::StatusCode::from_u16(status_code)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("{} {}", status_code, reason),
        None => status_code.to_string(),
    }
}

/// Data-only projection of a [`Response`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub status: String,
    pub status_code: u16,
    pub proto: String,
    pub proto_major: u8,
    pub proto_minor: u8,
    pub headers: Headers,
    pub body: Vec<u8>,
    pub content_length: Option<u64>,
    pub transfer_encoding: Vec<String>,
    pub close: bool,
    pub uncompressed: bool,
    pub trailer: Headers,
    pub request: Request,
}

impl ResponseRecord {
    /// Drain the body and copy every data field
    pub fn from_response(mut response: Response) -> Result<Self> {
        let body = response.bytes().map_err(|e| {
            GzkvError::EncodeFailed(format!(
                "couldn't read response body from '{}': {}",
                response.request.url, e
            ))
        })?;

        Ok(Self {
            status: response.status,
            status_code: response.status_code,
            proto: response.proto,
            proto_major: response.proto_major,
            proto_minor: response.proto_minor,
            headers: response.headers,
            body,
            content_length: response.content_length,
            transfer_encoding: response.transfer_encoding,
            close: response.close,
            uncompressed: response.uncompressed,
            trailer: response.trailer,
            request: response.request,
        })
    }

    /// Rebuild a response with an in-memory body
    pub fn into_response(self) -> Response {
        Response {
            status: self.status,
            status_code: self.status_code,
            proto: self.proto,
            proto_major: self.proto_major,
            proto_minor: self.proto_minor,
            headers: self.headers,
            body: Body::from_bytes(self.body),
            content_length: self.content_length,
            transfer_encoding: self.transfer_encoding,
            close: self.close,
            uncompressed: self.uncompressed,
            trailer: self.trailer,
            request: self.request,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| GzkvError::EncodeFailed(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| GzkvError::DecodeFailed(e.to_string()))
    }
}
