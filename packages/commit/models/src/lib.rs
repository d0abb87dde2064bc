#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared data model for `gitpulse`: commits, repository references, time
//! buckets and the query request/response payloads.

pub mod bucket;
pub mod commit;
pub mod query;
pub mod repo;

pub use bucket::{Granularity, SortField, SortOrder, TimeBucket};
pub use commit::Commit;
pub use query::{
    CommitQuery, CommitQueryResponse, DateRange, Pagination, QueryFilters, RepoFetchReport,
    RepoStatus,
};
pub use repo::{RepoRef, RepoRefError, RepoRefInput};
