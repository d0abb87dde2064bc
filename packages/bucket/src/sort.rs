//! Search filtering and sorting of flat commit lists.

use std::cmp::Ordering;

use gitpulse_commit_models::{Commit, SortField, SortOrder};

/// Keep commits whose message, author or repo contains `search`,
/// ignoring case. A missing or blank term keeps everything.
#[must_use]
pub fn filter_commits(commits: Vec<Commit>, search: Option<&str>) -> Vec<Commit> {
    let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return commits;
    };
    let needle = needle.to_lowercase();

    commits
        .into_iter()
        .filter(|commit| matches_search(commit, &needle))
        .collect()
}

/// `needle` must already be lowercase.
#[must_use]
pub fn matches_search(commit: &Commit, needle: &str) -> bool {
    [&commit.message, &commit.author, &commit.repo]
        .into_iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Stable sort by `field`, ties broken by date, repo, then sha. Descending
/// reverses the whole comparator.
pub fn sort_commits(commits: &mut [Commit], field: SortField, order: SortOrder) {
    commits.sort_by(|a, b| {
        let ordering = compare(a, b, field);
        if order.is_descending() {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn compare(a: &Commit, b: &Commit, field: SortField) -> Ordering {
    let primary = match field {
        SortField::Date => Ordering::Equal,
        SortField::Repo => caseless_cmp(&a.repo, &b.repo),
        SortField::Author => caseless_cmp(&a.author, &b.author),
    };

    primary
        .then_with(|| a.date.cmp(&b.date))
        .then_with(|| a.repo.cmp(&b.repo))
        .then_with(|| a.sha.cmp(&b.sha))
}

fn caseless_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(sha: &str, repo: &str, author: &str, message: &str, date: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            message: message.to_string(),
            author: author.to_string(),
            author_email: String::new(),
            date: date.parse().unwrap(),
            repo: repo.to_string(),
            org: "octocat".to_string(),
            url: String::new(),
        }
    }

    fn shas(commits: &[Commit]) -> Vec<&str> {
        commits.iter().map(|c| c.sha.as_str()).collect()
    }

    #[test]
    fn test_search_keeps_only_matching_commits() {
        let commits = vec![
            commit("1", "api", "alice", "fix: login bug", "2025-01-06T00:00:00Z"),
            commit("2", "api", "bob", "feat: add export", "2025-01-07T00:00:00Z"),
        ];

        let filtered = filter_commits(commits, Some("fix"));

        assert_eq!(shas(&filtered), vec!["1"]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_author_and_repo() {
        let commits = vec![
            commit("1", "Frontend", "alice", "a", "2025-01-06T00:00:00Z"),
            commit("2", "api", "Bob Front", "b", "2025-01-07T00:00:00Z"),
            commit("3", "api", "carol", "c", "2025-01-08T00:00:00Z"),
        ];

        let filtered = filter_commits(commits, Some("FRONT"));

        assert_eq!(shas(&filtered), vec!["1", "2"]);
    }

    #[test]
    fn test_blank_search_keeps_everything() {
        let commits = vec![commit("1", "api", "alice", "a", "2025-01-06T00:00:00Z")];

        assert_eq!(filter_commits(commits.clone(), Some("   ")).len(), 1);
        assert_eq!(filter_commits(commits, None).len(), 1);
    }

    #[test]
    fn test_sort_by_date_both_orders() {
        let mut commits = vec![
            commit("b", "api", "x", "m", "2025-01-07T00:00:00Z"),
            commit("a", "api", "x", "m", "2025-01-06T00:00:00Z"),
            commit("c", "api", "x", "m", "2025-01-08T00:00:00Z"),
        ];

        sort_commits(&mut commits, SortField::Date, SortOrder::Asc);
        assert_eq!(shas(&commits), vec!["a", "b", "c"]);

        sort_commits(&mut commits, SortField::Date, SortOrder::Desc);
        assert_eq!(shas(&commits), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_by_repo_ignores_case() {
        let mut commits = vec![
            commit("1", "web", "x", "m", "2025-01-06T00:00:00Z"),
            commit("2", "Api", "x", "m", "2025-01-08T00:00:00Z"),
            commit("3", "api", "x", "m", "2025-01-07T00:00:00Z"),
        ];

        sort_commits(&mut commits, SortField::Repo, SortOrder::Asc);

        assert_eq!(shas(&commits), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_sort_by_author_descending() {
        let mut commits = vec![
            commit("1", "api", "alice", "m", "2025-01-06T00:00:00Z"),
            commit("2", "api", "carol", "m", "2025-01-06T00:00:00Z"),
            commit("3", "api", "bob", "m", "2025-01-06T00:00:00Z"),
        ];

        sort_commits(&mut commits, SortField::Author, SortOrder::Desc);

        assert_eq!(shas(&commits), vec!["2", "3", "1"]);
    }
}
