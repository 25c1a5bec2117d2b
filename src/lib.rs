//! # gzkv
//!
//! Gzip-compressed single-file key-value archives:
//! - Archives are decompressed into a private working file on open
//! - The working copy is an ordinary transactional store with named buckets
//! - Writes go back through gzip into a staged file renamed into place
//! - An HTTP response cache persists fetched responses keyed by request
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Fetch-and-Cache Pipeline                     │
//! │     fetch_all → fingerprint → encode → bucket.put            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    ArchiveStore                              │
//! │            (view / update / save / close)                    │
//! └──────────┬───────────────────────────────────┬──────────────┘
//!            │                                   │
//!            ▼                                   ▼
//!   ┌─────────────────┐                 ┌─────────────────┐
//!   │ Archive Loader  │                 │ Archive Writer  │
//!   │ (gunzip → tmp)  │                 │ (gzip → staged) │
//!   └────────┬────────┘                 └────────┬────────┘
//!            │                                   │
//!            ▼                                   ▼
//!   ┌─────────────────────────────────────────────────────┐
//!   │      Store (single-file image, SWMR transactions)    │
//!   └─────────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod store;
pub mod archive;
pub mod cache;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{GzkvError, Result};
pub use config::{DumpOptions, FetchConfig, StoreOptions};
pub use codec::ArchiveHeader;
pub use store::Store;
pub use archive::{open, write, write_to_archive, ArchiveStore};
pub use cache::{dump_responses, get_responses_from_db, Request, Response};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of gzkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
