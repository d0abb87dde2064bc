#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Result caching for `gitpulse`.
//!
//! [`CacheLayer`] wraps a [`CacheStore`] with TTL entries and fail-open
//! semantics. Two stores ship here: an in-process map and a file store under
//! the XDG cache directory.

mod file;
mod key;
mod layer;
mod memory;
mod store;

pub use file::FileCacheStore;
pub use key::{COMMITS_NAMESPACE, build_key, tenant_prefix};
pub use layer::{
    CacheEntry, CacheLayer, Clock, DEFAULT_TTL_SECS, LARGE_RESULT_THRESHOLD,
    LARGE_RESULT_TTL_SECS, ttl_for_commit_count,
};
pub use memory::MemoryCacheStore;
pub use store::{CacheStore, CacheStoreError};
