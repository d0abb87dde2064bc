//! Partition a sorted commit list into time buckets.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use gitpulse_commit_models::{Commit, Granularity, SortOrder, TimeBucket};

use crate::key::{bucket_anchor, bucket_id, bucket_label};

/// Group `commits` by `granularity`.
///
/// Commits keep their input order inside each bucket. Buckets are emitted
/// in key order, reversed for descending `order`. Every commit lands in
/// exactly one bucket.
#[must_use]
pub fn group_commits(
    commits: Vec<Commit>,
    granularity: Granularity,
    order: SortOrder,
) -> Vec<TimeBucket> {
    let mut groups: BTreeMap<String, (NaiveDate, Vec<Commit>)> = BTreeMap::new();

    for commit in commits {
        let anchor = bucket_anchor(commit.date, granularity);
        groups
            .entry(bucket_id(anchor, granularity))
            .or_insert_with(|| (anchor, Vec::new()))
            .1
            .push(commit);
    }

    let mut buckets: Vec<TimeBucket> = groups
        .into_iter()
        .filter_map(|(id, (anchor, commits))| build_bucket(id, anchor, granularity, commits))
        .collect();

    if order.is_descending() {
        buckets.reverse();
    }

    buckets
}

/// `None` when `commits` is empty.
fn build_bucket(
    id: String,
    anchor: NaiveDate,
    granularity: Granularity,
    commits: Vec<Commit>,
) -> Option<TimeBucket> {
    let start_date = commits.iter().map(|c| c.date).min()?;
    let end_date = commits.iter().map(|c| c.date).max()?;

    let mut repos: Vec<String> = Vec::new();
    for commit in &commits {
        if !repos.contains(&commit.repo) {
            repos.push(commit.repo.clone());
        }
    }

    Some(TimeBucket {
        id,
        granularity,
        label: bucket_label(anchor, granularity),
        start_date,
        end_date,
        commit_count: commits.len(),
        repo_count: repos.len(),
        commits,
        repos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(sha: &str, repo: &str, date: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            message: "m".to_string(),
            author: "a".to_string(),
            author_email: String::new(),
            date: date.parse().unwrap(),
            repo: repo.to_string(),
            org: "octocat".to_string(),
            url: String::new(),
        }
    }

    #[test]
    fn test_single_week_bucket() {
        let commits = vec![
            commit("1", "api", "2025-01-06T09:00:00Z"),
            commit("2", "api", "2025-01-08T09:00:00Z"),
            commit("3", "web", "2025-01-10T09:00:00Z"),
        ];

        let buckets = group_commits(commits, Granularity::Week, SortOrder::Asc);

        assert_eq!(buckets.len(), 1);
        let bucket = &buckets[0];
        assert_eq!(bucket.id, "2025-01-06");
        assert_eq!(bucket.commit_count, 3);
        assert_eq!(bucket.repo_count, 2);
        assert_eq!(bucket.repos, vec!["api", "web"]);
        assert_eq!(
            bucket.start_date.date_naive(),
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
        );
        assert_eq!(
            bucket.end_date.date_naive(),
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
        );
        assert_eq!(bucket.label, "Week of Jan 6 - Jan 12, 2025");
    }

    #[test]
    fn test_bucket_order_follows_sort_order() {
        let commits = vec![
            commit("1", "api", "2025-01-01T00:00:00Z"),
            commit("2", "api", "2025-03-01T00:00:00Z"),
            commit("3", "api", "2025-02-01T00:00:00Z"),
        ];

        let asc = group_commits(commits.clone(), Granularity::Month, SortOrder::Asc);
        let desc = group_commits(commits, Granularity::Month, SortOrder::Desc);

        let ids = |b: &[TimeBucket]| b.iter().map(|b| b.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&asc), vec!["2025-01", "2025-02", "2025-03"]);
        assert_eq!(ids(&desc), vec!["2025-03", "2025-02", "2025-01"]);
    }

    #[test]
    fn test_commit_order_inside_bucket_is_preserved() {
        let commits = vec![
            commit("late", "api", "2025-01-02T20:00:00Z"),
            commit("early", "api", "2025-01-02T08:00:00Z"),
        ];

        let buckets = group_commits(commits, Granularity::Day, SortOrder::Desc);

        let shas: Vec<_> = buckets[0].commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec!["late", "early"]);
        assert_eq!(buckets[0].label, "Thursday, January 2, 2025");
    }

    #[test]
    fn test_empty_input_has_no_buckets() {
        assert!(group_commits(vec![], Granularity::Year, SortOrder::Asc).is_empty());
    }
}
