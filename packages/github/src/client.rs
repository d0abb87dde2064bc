use gitpulse_commit_models::{Commit, RepoRef};
use gitpulse_commit_provider::{
    CommitProvider, FetchStop, FetchWindow, FetchedCommits, ProviderError,
};
use gitpulse_github_models::GithubCommitResponse;
use reqwest::StatusCode;
use reqwest::header::{LINK, RETRY_AFTER};

/// Largest page the commits endpoint serves.
pub const DEFAULT_PAGE_SIZE: usize = 100;
/// Pages fetched per repository before giving up on older history.
pub const DEFAULT_MAX_PAGES: usize = 20;

pub struct GitHubProvider {
    http_client: reqwest::Client,
    base_url: String,
    page_size: usize,
    max_pages: usize,
}

enum Page {
    Commits {
        commits: Vec<GithubCommitResponse>,
        next: Option<String>,
    },
    RateLimited {
        retry_after_secs: Option<u64>,
    },
}

impl GitHubProvider {
    /// Create a new GitHub provider against the public API.
    ///
    /// # Panics
    ///
    /// * If the `reqwest::Client` fails to build.
    #[must_use]
    pub fn new() -> Self {
        let http_client = reqwest::Client::builder()
            .user_agent("gitpulse")
            .build()
            .unwrap();
        Self {
            http_client,
            base_url: "https://api.github.com".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, DEFAULT_PAGE_SIZE);
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    fn commits_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/repos/{}/{}/commits",
            self.base_url, repo.owner, repo.name
        )
    }

    async fn fetch_page(
        &self,
        url: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> Result<Page, ProviderError> {
        log::debug!("GET {url}");
        let mut request = self
            .http_client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json");

        if !query.is_empty() {
            request = request.query(query);
        }

        if !token.is_empty() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let status = response.status();

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Ok(Page::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("GitHub API error: {body}");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_next_link);

        let commits: Vec<GithubCommitResponse> = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        Ok(Page::Commits { commits, next })
    }
}

impl Default for GitHubProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CommitProvider for GitHubProvider {
    async fn fetch_commits(
        &self,
        repo: &RepoRef,
        token: &str,
        window: &FetchWindow,
    ) -> Result<FetchedCommits, ProviderError> {
        let first_url = self.commits_url(repo);
        let mut query = vec![
            ("per_page", self.page_size.to_string()),
            ("page", "1".to_string()),
        ];
        if let Some(since) = window.since_param() {
            query.push(("since", since));
        }
        if let Some(until) = window.until_param() {
            query.push(("until", until));
        }

        let mut commits = Vec::new();
        let mut next_url: Option<String> = None;

        for page in 1..=self.max_pages {
            let response = match next_url.take() {
                Some(url) => self.fetch_page(&url, &[], token).await?,
                None => self.fetch_page(&first_url, &query, token).await?,
            };

            let (entries, next) = match response {
                Page::RateLimited { retry_after_secs } => {
                    log::warn!(
                        "GitHub rate limit hit for {repo} on page {page}, keeping {} commits",
                        commits.len()
                    );
                    return Ok(FetchedCommits {
                        commits,
                        stop: FetchStop::RateLimited { retry_after_secs },
                        pages: page - 1,
                    });
                }
                Page::Commits { commits, next } => (commits, next),
            };

            let page_len = entries.len();
            for entry in entries {
                commits.push(to_commit(entry, repo)?);
            }

            if page_len < self.page_size || next.is_none() {
                return Ok(FetchedCommits {
                    commits,
                    stop: FetchStop::Exhausted,
                    pages: page,
                });
            }

            next_url = next;
        }

        log::warn!(
            "Stopped fetching {repo} after {} pages, older commits are not included",
            self.max_pages
        );

        Ok(FetchedCommits {
            commits,
            stop: FetchStop::PageLimit,
            pages: self.max_pages,
        })
    }

    fn provider_name(&self) -> &'static str {
        "github"
    }
}

/// Extract the `rel="next"` target from a `Link` header.
fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let url = segments
            .next()?
            .trim()
            .strip_prefix('<')?
            .strip_suffix('>')?;
        segments
            .any(|param| matches!(param.trim(), "rel=\"next\"" | "rel=next"))
            .then(|| url.to_string())
    })
}

fn to_commit(entry: GithubCommitResponse, repo: &RepoRef) -> Result<Commit, ProviderError> {
    let GithubCommitResponse {
        sha,
        html_url,
        commit,
    } = entry;

    // Author date first; the committer only fills gaps.
    let author = commit.author.as_ref();
    let committer = commit.committer.as_ref();

    let date = author
        .and_then(|a| a.date)
        .or_else(|| committer.and_then(|c| c.date))
        .ok_or_else(|| ProviderError::Decode(format!("commit {sha} has no author date")))?;
    let name = author
        .and_then(|a| a.name.clone())
        .or_else(|| committer.and_then(|c| c.name.clone()))
        .unwrap_or_else(|| "Unknown".to_string());
    let email = author
        .and_then(|a| a.email.clone())
        .or_else(|| committer.and_then(|c| c.email.clone()))
        .unwrap_or_default();

    Ok(Commit {
        sha,
        message: commit.message,
        author: name,
        author_email: email,
        date,
        repo: repo.name.clone(),
        org: repo.owner.clone(),
        url: html_url,
    })
}
