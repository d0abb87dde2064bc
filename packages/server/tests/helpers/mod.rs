use std::sync::Arc;

use chrono::NaiveDate;
use gitpulse_cache::{CacheLayer, MemoryCacheStore};
use gitpulse_github::GitHubProvider;
use gitpulse_query::{QueryService, StaticTenantDirectory};
use gitpulse_server::state::AppState;
use gitpulse_server::{ServerConfig, run_server_with_handle};

pub struct TestServer {
    http_url: String,
    handle: actix_web::dev::ServerHandle,
}

impl TestServer {
    /// Serve `tenants` against a GitHub API at `github_url`, with a fresh
    /// in-memory cache and "today" pinned to 2025-01-31.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to start or no ports are available
    pub async fn start(
        github_url: &str,
        tenants: StaticTenantDirectory,
        webhook_secret: Option<String>,
    ) -> anyhow::Result<Self> {
        let tenants = Arc::new(tenants);
        let provider = GitHubProvider::new().with_base_url(github_url.to_string());
        let query = QueryService::new(
            Arc::new(provider),
            tenants.clone(),
            CacheLayer::new(Arc::new(MemoryCacheStore::new())),
        )
        .with_today(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap());

        let config = ServerConfig::new("127.0.0.1".to_string(), 0)
            .with_webhook_secret(webhook_secret.clone());
        let state = AppState::new(query, tenants, webhook_secret);

        let response = run_server_with_handle(&config, state)?;
        let port = response
            .addrs
            .first()
            .expect("Expected at least one address")
            .port();
        let http_url = format!("http://127.0.0.1:{port}");

        wait_for_server_ready(&http_url).await?;

        Ok(Self {
            http_url,
            handle: response.handle,
        })
    }

    #[must_use]
    pub fn http_url(&self) -> &str {
        &self.http_url
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let handle = self.handle.clone();
        tokio::spawn(async move {
            handle.stop(true).await;
        });
    }
}

async fn wait_for_server_ready(url: &str) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let health_url = format!("{url}/health");

    for _ in 0..30 {
        if let Ok(response) = client.get(&health_url).send().await
            && response.status().is_success()
        {
            return Ok(());
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }

    anyhow::bail!("Server failed to start within timeout")
}
