#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Commit provider trait abstraction for `gitpulse`.
//!
//! Implementations talk to one upstream commit host. The fetcher and query
//! crates only see this trait.

mod provider;

pub use gitpulse_commit_provider_models::*;
pub use provider::CommitProvider;
