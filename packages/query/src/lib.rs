#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Query orchestration for `gitpulse`.
//!
//! [`QueryService`] turns a tenant's [`CommitQuery`] into a
//! [`CommitQueryResponse`]: it checks the cache, fetches every tracked
//! repository on a miss, then filters, sorts and buckets the commits.
//!
//! [`CommitQuery`]: gitpulse_commit_models::CommitQuery
//! [`CommitQueryResponse`]: gitpulse_commit_models::CommitQueryResponse

mod error;
mod service;
mod tenant;

pub use error::QueryError;
pub use service::{DEFAULT_WINDOW_MONTHS, QueryService, cache_key, paginate};
pub use tenant::{StaticTenantDirectory, Tenant, TenantConfigError, TenantDirectory};
