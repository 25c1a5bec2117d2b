//! Cache Module
//!
//! Fetches batches of HTTP requests and persists the responses in a store
//! bucket, keyed by a fingerprint of the request.
//!
//! ## Pipeline
//! ```text
//!   requests ──fetch_all()──▶ responses + errors
//!                 │  one thread per request, shared deadline
//!                 ▼
//!   filter ──▶ fingerprint(request) ─▶ ResponseRecord::encode()
//!                 │
//!                 ▼
//!   update(): bucket.put(fingerprint, record)   (all or nothing)
//!                 │
//!                 ▼
//!   write_to_archive()
//! ```
//!
//! ## Record Layout
//! - Key: SHA-256 of the bincode encoding of the request (32 bytes)
//! - Value: bincode encoding of [`ResponseRecord`], body fully materialized

mod client;
mod dump;
mod fetch;
mod filter;
mod request;
mod response;

pub use client::{HttpClient, ReqwestClient};
pub use dump::{dump_responses, get_response, get_responses_from_db, DumpReport};
pub use fetch::{fetch_all, FetchOutcome};
pub use filter::{filter_responses, status_ok};
pub use request::{Fingerprint, Headers, Request};
pub use response::{status_line, Body, Response, ResponseRecord};
