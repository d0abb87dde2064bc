#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Request and result types shared by commit provider implementations.

use chrono::{Days, NaiveDate};
use gitpulse_commit_models::{Commit, RepoStatus};

/// Inclusive calendar-date window to fetch commits for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchWindow {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl FetchWindow {
    #[must_use]
    pub const fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        Self { since, until }
    }

    /// Lower bound as an upstream timestamp, start of the `since` day.
    #[must_use]
    pub fn since_param(&self) -> Option<String> {
        self.since.map(|date| format!("{date}T00:00:00Z"))
    }

    /// Upper bound as an upstream timestamp.
    ///
    /// `until` covers its whole day, so the bound is the start of the next
    /// day.
    #[must_use]
    pub fn until_param(&self) -> Option<String> {
        self.until.map(|date| {
            let next = date.checked_add_days(Days::new(1)).unwrap_or(date);
            format!("{next}T00:00:00Z")
        })
    }
}

/// Why pagination stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStop {
    /// Upstream had no more pages.
    Exhausted,
    /// The page ceiling was reached before upstream ran out.
    PageLimit,
    /// Upstream throttled the request.
    RateLimited { retry_after_secs: Option<u64> },
}

/// Commits collected for one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedCommits {
    pub commits: Vec<Commit>,
    pub stop: FetchStop,
    pub pages: usize,
}

impl FetchedCommits {
    #[must_use]
    pub fn status(&self) -> RepoStatus {
        match self.stop {
            FetchStop::Exhausted => RepoStatus::Ok,
            FetchStop::PageLimit => RepoStatus::PageLimitReached,
            FetchStop::RateLimited { retry_after_secs } => {
                RepoStatus::RateLimited { retry_after_secs }
            }
        }
    }
}

/// Errors a provider surfaces for a single repository.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(String),

    /// Upstream answered with a non-success status other than a rate limit.
    #[error("Upstream API error: {status}")]
    Status { status: u16, body: String },

    /// The response body was not the expected shape.
    #[error("Malformed upstream payload: {0}")]
    Decode(String),
}
