use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Granularity, SortField, SortOrder, TimeBucket};

/// Parameters of one commit history query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitQuery {
    /// Restrict to these configured repositories (bare name or `owner/name`).
    pub repos: Option<Vec<String>>,
    /// Inclusive start date.
    pub from: Option<NaiveDate>,
    /// Inclusive end date, covering the whole day.
    pub to: Option<NaiveDate>,
    pub group_by: Granularity,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    /// Case-insensitive substring over message, author and repo name.
    pub search: Option<String>,
    /// 1-based page of buckets to return.
    pub page: Option<usize>,
    /// Buckets per page. Paging only applies when this is set.
    pub per_page: Option<usize>,
}

impl CommitQuery {
    /// The search term with surrounding whitespace removed, if any is left.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Filter parameters echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    pub repos: Option<Vec<String>>,
    pub group_by: Granularity,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub search: Option<String>,
}

/// Outcome of fetching one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RepoStatus {
    /// Every page was fetched.
    Ok,
    /// The page ceiling was hit, older commits may be missing.
    PageLimitReached,
    /// Upstream throttled us, the commits collected before that are kept.
    RateLimited {
        #[serde(rename = "retryAfterSecs")]
        retry_after_secs: Option<u64>,
    },
    /// The repository contributed nothing.
    Error { reason: String },
}

impl RepoStatus {
    /// Whether the repository's commits may be incomplete.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        !matches!(self, Self::Ok)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoFetchReport {
    /// `owner/name`
    pub repo: String,
    #[serde(flatten)]
    pub status: RepoStatus,
    pub commit_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// Response payload of a commit history query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitQueryResponse {
    pub groups: Vec<TimeBucket>,
    pub total_commits: usize,
    /// Number of buckets before any paging.
    pub total_groups: usize,
    pub date_range: DateRange,
    pub filters: QueryFilters,
    pub sources: Vec<RepoFetchReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_status_is_flattened() {
        let report = RepoFetchReport {
            repo: "acme/web".to_string(),
            status: RepoStatus::RateLimited {
                retry_after_secs: Some(120),
            },
            commit_count: 100,
        };

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "repo": "acme/web",
                "status": "rate_limited",
                "retryAfterSecs": 120,
                "commitCount": 100
            })
        );
        assert_eq!(serde_json::from_value::<RepoFetchReport>(json).unwrap(), report);
    }

    #[test]
    fn test_error_report_carries_reason() {
        let report = RepoFetchReport {
            repo: "acme/api".to_string(),
            status: RepoStatus::Error {
                reason: "GitHub returned 404".to_string(),
            },
            commit_count: 0,
        };

        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["status"], "error");
        assert_eq!(json["reason"], "GitHub returned 404");
    }

    #[test]
    fn test_search_term_trims_blank() {
        let blank = CommitQuery {
            search: Some("   ".to_string()),
            ..CommitQuery::default()
        };
        let padded = CommitQuery {
            search: Some(" fix ".to_string()),
            ..CommitQuery::default()
        };

        assert_eq!(blank.search_term(), None);
        assert_eq!(padded.search_term(), Some("fix"));
    }
}
