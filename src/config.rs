//! Configuration for gzkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::Response;
use crate::codec::ArchiveHeader;

/// Options used whenever a store file is opened
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// How long `view`/`update` wait for the store lock before failing
    /// with `LockTimeout`
    pub lock_timeout: Duration,

    /// Directory for working copies. `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(1),
            temp_dir: None,
        }
    }
}

impl StoreOptions {
    pub fn builder() -> StoreOptionsBuilder {
        StoreOptionsBuilder::default()
    }

    /// Resolved directory for temporary files
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Builder for StoreOptions
#[derive(Default)]
pub struct StoreOptionsBuilder {
    options: StoreOptions,
}

impl StoreOptionsBuilder {
    /// Set the lock acquisition timeout
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.options.lock_timeout = timeout;
        self
    }

    /// Place working copies in `dir` instead of the system temp dir
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.temp_dir = Some(dir.into());
        self
    }

    pub fn build(self) -> StoreOptions {
        self.options
    }
}

/// Fetch pipeline configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Share of the batch deadline granted to each request.
    /// The whole batch waits at most `per_request_timeout * batch_len`.
    pub per_request_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            per_request_timeout: Duration::from_secs(3),
        }
    }
}

impl FetchConfig {
    pub fn new(per_request_timeout: Duration) -> Self {
        Self { per_request_timeout }
    }

    /// Total collection budget for a batch of `batch_len` requests
    pub fn budget(&self, batch_len: usize) -> Duration {
        self.per_request_timeout
            .saturating_mul(u32::try_from(batch_len).unwrap_or(u32::MAX))
    }
}

/// Predicate deciding whether a fetched response gets persisted
pub type ResponseFilter = Arc<dyn Fn(&Response) -> bool + Send + Sync>;

/// Options for `dump_responses`
#[derive(Clone)]
pub struct DumpOptions {
    pub store: StoreOptions,
    pub fetch: FetchConfig,
    /// Unix permission bits of the written archive
    pub permissions: Option<u32>,
    /// Header written into the archive
    pub header: Option<ArchiveHeader>,
    /// Responses rejected by the filter are not persisted
    pub filter: Option<ResponseFilter>,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            store: StoreOptions::default(),
            fetch: FetchConfig::default(),
            permissions: Some(0o644),
            header: None,
            filter: None,
        }
    }
}

impl std::fmt::Debug for DumpOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpOptions")
            .field("store", &self.store)
            .field("fetch", &self.fetch)
            .field("permissions", &self.permissions)
            .field("header", &self.header)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl DumpOptions {
    pub fn builder() -> DumpOptionsBuilder {
        DumpOptionsBuilder::default()
    }
}

/// Builder for DumpOptions
#[derive(Default)]
pub struct DumpOptionsBuilder {
    options: DumpOptions,
}

impl DumpOptionsBuilder {
    pub fn store(mut self, store: StoreOptions) -> Self {
        self.options.store = store;
        self
    }

    pub fn fetch(mut self, fetch: FetchConfig) -> Self {
        self.options.fetch = fetch;
        self
    }

    /// Set the archive's Unix permission bits (`None` keeps the staging default)
    pub fn permissions(mut self, mode: Option<u32>) -> Self {
        self.options.permissions = mode;
        self
    }

    pub fn header(mut self, header: ArchiveHeader) -> Self {
        self.options.header = Some(header);
        self
    }

    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Response) -> bool + Send + Sync + 'static,
    {
        self.options.filter = Some(Arc::new(filter));
        self
    }

    pub fn build(self) -> DumpOptions {
        self.options
    }
}
