#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Time bucketing engine for `gitpulse`.
//!
//! Filtering and sorting run on the flat commit list first; grouping then
//! partitions the sorted list into day, week, month or year buckets. Weeks
//! always start on Monday.

pub mod group;
pub mod key;
pub mod sort;

pub use group::group_commits;
pub use key::{bucket_anchor, bucket_id, bucket_label, week_start};
pub use sort::{filter_commits, matches_search, sort_commits};
