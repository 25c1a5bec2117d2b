//! Archive Module
//!
//! Gzip archives of a store and the working sessions opened from them.
//!
//! ## Lifecycle
//! ```text
//!   archive.gz ──open()──▶ /tmp/gzkv-XXXX.db ──view()/update()──▶ ...
//!        ▲                                                        │
//!        └──────────── write_to_archive() / save() ◀──────────────┘
//!                      (staged file, renamed into place)
//! ```
//!
//! The working file lives as long as the [`ArchiveStore`] and is removed
//! by `close()` or on drop.

mod loader;
mod session;
mod writer;

pub use loader::open;
pub use session::ArchiveStore;
pub use writer::{write, write_to_archive};
