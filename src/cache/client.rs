//! HTTP Clients
//!
//! The pipeline talks to the network only through [`HttpClient`], so tests
//! and callers can inject their own transport.

use reqwest::Version;

use crate::error::{GzkvError, Result};

use super::request::{Headers, Request};
use super::response::{status_line, Body, Response};

/// Capability to perform a single HTTP request
pub trait HttpClient: Send + Sync {
    /// Perform `request`. Transport and protocol failures are `RequestFailed`.
    fn execute(&self, request: &Request) -> Result<Response>;
}

/// Production client backed by `reqwest::blocking`
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured reqwest client (timeouts, proxies, TLS)
    pub fn from_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl HttpClient for ReqwestClient {
    fn execute(&self, request: &Request) -> Result<Response> {
        let failed = |reason: String| GzkvError::RequestFailed {
            url: request.url.clone(),
            reason,
        };

        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|e| failed(e.to_string()))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, values) in &request.headers {
            for value in values {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send().map_err(|e| failed(e.to_string()))?;
        tracing::debug!("{} {} -> {}", request.method, request.url, response.status());

        Ok(into_response(response, request.clone()))
    }
}

/// Copy the data fields of a reqwest response; the body stays a live stream
fn into_response(response: reqwest::blocking::Response, request: Request) -> Response {
    let status_code = response.status().as_u16();
    let (proto_major, proto_minor) = match response.version() {
        Version::HTTP_09 => (0, 9),
        Version::HTTP_10 => (1, 0),
        Version::HTTP_2 => (2, 0),
        Version::HTTP_3 => (3, 0),
        _ => (1, 1),
    };

    let mut headers = Headers::new();
    for (name, value) in response.headers() {
        headers
            .entry(name.as_str().to_string())
            .or_default()
            .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    let transfer_encoding: Vec<String> = headers
        .get("transfer-encoding")
        .into_iter()
        .flatten()
        .flat_map(|v| v.split(','))
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
        .collect();

    let close = match headers.get("connection") {
        Some(values) => values.iter().any(|v| v.eq_ignore_ascii_case("close")),
        None => (proto_major, proto_minor) < (1, 1),
    };

    let content_length = response.content_length();

    Response {
        status: status_line(status_code),
        status_code,
        proto: format!("HTTP/{}.{}", proto_major, proto_minor),
        proto_major,
        proto_minor,
        headers,
        body: Body::from_reader(response),
        content_length,
        transfer_encoding,
        close,
        uncompressed: false,
        trailer: Headers::new(),
        request,
    }
}
