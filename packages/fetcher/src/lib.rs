#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Fan a [`CommitProvider`] out over many repositories.
//!
//! Every repository is fetched concurrently. A repository that fails
//! contributes no commits and an `error` report; the call as a whole never
//! fails.

use futures::future::join_all;
use gitpulse_commit_models::{Commit, RepoFetchReport, RepoRef, RepoStatus};
use gitpulse_commit_provider::{CommitProvider, FetchWindow};

/// Merged commits of every repository plus how each fetch went.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiRepoResult {
    /// Flattened commits, in repository order. Callers re-sort.
    pub commits: Vec<Commit>,
    /// One report per requested repository, same order as the input.
    pub reports: Vec<RepoFetchReport>,
}

impl MultiRepoResult {
    /// Reports of repositories whose commits may be incomplete.
    pub fn degraded(&self) -> impl Iterator<Item = &RepoFetchReport> {
        self.reports.iter().filter(|r| r.status.is_degraded())
    }
}

/// Fetch all `repos` in parallel and flatten the results.
pub async fn fetch_all(
    provider: &dyn CommitProvider,
    repos: &[RepoRef],
    token: &str,
    window: &FetchWindow,
) -> MultiRepoResult {
    let fetches = repos.iter().map(|repo| async move {
        let outcome = provider.fetch_commits(repo, token, window).await;
        (repo, outcome)
    });

    let mut result = MultiRepoResult::default();

    for (repo, outcome) in join_all(fetches).await {
        match outcome {
            Ok(fetched) => {
                let status = fetched.status();
                log::debug!(
                    "Fetched {} commits from {repo} in {} page(s)",
                    fetched.commits.len(),
                    fetched.pages
                );
                result.reports.push(RepoFetchReport {
                    repo: repo.full_name(),
                    status,
                    commit_count: fetched.commits.len(),
                });
                result.commits.extend(fetched.commits);
            }
            Err(e) => {
                log::error!(
                    "Failed to fetch commits for {repo} from {}: {e}",
                    provider.provider_name()
                );
                result.reports.push(RepoFetchReport {
                    repo: repo.full_name(),
                    status: RepoStatus::Error {
                        reason: e.to_string(),
                    },
                    commit_count: 0,
                });
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use gitpulse_commit_provider::{FetchStop, FetchedCommits, ProviderError};

    use super::*;

    enum Scripted {
        Commits(Vec<Commit>, FetchStop),
        Fail(u16),
        Slow(Duration, Vec<Commit>),
    }

    struct FakeProvider {
        script: Mutex<HashMap<String, Scripted>>,
    }

    impl FakeProvider {
        fn new(script: Vec<(&str, Scripted)>) -> Self {
            Self {
                script: Mutex::new(
                    script
                        .into_iter()
                        .map(|(name, s)| (name.to_string(), s))
                        .collect(),
                ),
            }
        }
    }

    #[async_trait::async_trait]
    impl CommitProvider for FakeProvider {
        async fn fetch_commits(
            &self,
            repo: &RepoRef,
            _token: &str,
            _window: &FetchWindow,
        ) -> Result<FetchedCommits, ProviderError> {
            let scripted = self
                .script
                .lock()
                .unwrap()
                .remove(&repo.full_name())
                .expect("unexpected repository");

            match scripted {
                Scripted::Commits(commits, stop) => Ok(FetchedCommits {
                    commits,
                    stop,
                    pages: 1,
                }),
                Scripted::Fail(status) => Err(ProviderError::Status {
                    status,
                    body: String::new(),
                }),
                Scripted::Slow(delay, commits) => {
                    tokio::time::sleep(delay).await;
                    Ok(FetchedCommits {
                        commits,
                        stop: FetchStop::Exhausted,
                        pages: 1,
                    })
                }
            }
        }

        fn provider_name(&self) -> &'static str {
            "fake"
        }
    }

    fn commit(repo: &str, sha: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            message: format!("commit {sha}"),
            author: "Octo Cat".to_string(),
            author_email: "octo@example.com".to_string(),
            date: "2025-01-06T10:00:00Z".parse().unwrap(),
            repo: repo.to_string(),
            org: "octocat".to_string(),
            url: String::new(),
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_failed_repository_is_contained() {
        let provider = FakeProvider::new(vec![
            ("octocat/a", Scripted::Fail(404)),
            (
                "octocat/b",
                Scripted::Commits(
                    vec![commit("b", "b1"), commit("b", "b2")],
                    FetchStop::Exhausted,
                ),
            ),
        ]);
        let repos = vec![RepoRef::new("octocat", "a"), RepoRef::new("octocat", "b")];

        let result = fetch_all(&provider, &repos, "token", &FetchWindow::default()).await;

        assert_eq!(result.commits.len(), 2);
        assert!(result.commits.iter().all(|c| c.repo == "b"));
        assert_eq!(result.reports.len(), 2);
        assert_eq!(result.reports[0].repo, "octocat/a");
        assert!(matches!(result.reports[0].status, RepoStatus::Error { .. }));
        assert_eq!(result.reports[1].status, RepoStatus::Ok);
        assert_eq!(result.reports[1].commit_count, 2);
        assert_eq!(result.degraded().count(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_rate_limited_repository_keeps_partial_commits() {
        let provider = FakeProvider::new(vec![(
            "octocat/a",
            Scripted::Commits(
                vec![commit("a", "a1")],
                FetchStop::RateLimited {
                    retry_after_secs: None,
                },
            ),
        )]);
        let repos = vec![RepoRef::new("octocat", "a")];

        let result = fetch_all(&provider, &repos, "token", &FetchWindow::default()).await;

        assert_eq!(result.commits.len(), 1);
        assert_eq!(
            result.reports[0].status,
            RepoStatus::RateLimited {
                retry_after_secs: None
            }
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_does_not_deduplicate_identical_shas_across_repos() {
        let provider = FakeProvider::new(vec![
            (
                "octocat/a",
                Scripted::Commits(vec![commit("a", "same")], FetchStop::Exhausted),
            ),
            (
                "octocat/b",
                Scripted::Commits(vec![commit("b", "same")], FetchStop::Exhausted),
            ),
        ]);
        let repos = vec![RepoRef::new("octocat", "a"), RepoRef::new("octocat", "b")];

        let result = fetch_all(&provider, &repos, "token", &FetchWindow::default()).await;

        assert_eq!(result.commits.len(), 2);
    }

    #[test_log::test(tokio::test(start_paused = true))]
    async fn test_fetches_run_concurrently() {
        let provider = FakeProvider::new(vec![
            (
                "octocat/a",
                Scripted::Slow(Duration::from_secs(10), vec![commit("a", "a1")]),
            ),
            (
                "octocat/b",
                Scripted::Slow(Duration::from_secs(10), vec![commit("b", "b1")]),
            ),
        ]);
        let repos = vec![RepoRef::new("octocat", "a"), RepoRef::new("octocat", "b")];

        let started = tokio::time::Instant::now();
        let result = fetch_all(&provider, &repos, "token", &FetchWindow::default()).await;

        assert_eq!(result.commits.len(), 2);
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[test_log::test(tokio::test)]
    async fn test_empty_repo_list() {
        let provider = FakeProvider::new(vec![]);

        let result = fetch_all(&provider, &[], "token", &FetchWindow::default()).await;

        assert!(result.commits.is_empty());
        assert!(result.reports.is_empty());
    }
}
