#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! GitHub implementation of the `gitpulse` commit provider.
//!
//! Walks `GET /repos/{owner}/{repo}/commits` page by page through the `Link`
//! header, stopping early on rate limits and at a fixed page ceiling.

mod client;

pub use client::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, GitHubProvider};
pub use gitpulse_github_models as models;
