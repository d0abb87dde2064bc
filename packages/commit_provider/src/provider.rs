use gitpulse_commit_models::RepoRef;
use gitpulse_commit_provider_models::{FetchWindow, FetchedCommits, ProviderError};

#[async_trait::async_trait]
pub trait CommitProvider: Send + Sync {
    /// Fetch every commit of `repo` inside `window`, following pagination.
    ///
    /// Rate limiting is not an error: the commits gathered before it are
    /// returned with a [`gitpulse_commit_provider_models::FetchStop::RateLimited`] stop.
    ///
    /// # Errors
    ///
    /// * If upstream answers with any other non-success status
    /// * If a response cannot be decoded
    async fn fetch_commits(
        &self,
        repo: &RepoRef,
        token: &str,
        window: &FetchWindow,
    ) -> Result<FetchedCommits, ProviderError>;

    fn provider_name(&self) -> &str;
}
