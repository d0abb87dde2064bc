use std::sync::Arc;

use gitpulse_cache::{CacheLayer, CacheStore, CacheStoreError, FileCacheStore, MemoryCacheStore};
use gitpulse_github::GitHubProvider;
use gitpulse_query::{QueryService, StaticTenantDirectory, TenantConfigError};

use crate::{CacheBackend, ServerConfig};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Tenants(#[from] TenantConfigError),
    #[error(transparent)]
    Cache(#[from] CacheStoreError),
}

pub struct AppState {
    pub query: QueryService,
    pub tenants: Arc<StaticTenantDirectory>,
    pub webhook_secret: Option<String>,
}

impl AppState {
    #[must_use]
    pub const fn new(
        query: QueryService,
        tenants: Arc<StaticTenantDirectory>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            query,
            tenants,
            webhook_secret,
        }
    }

    /// GitHub provider, tenants file and cache store as configured.
    ///
    /// # Errors
    ///
    /// * If the tenants file cannot be located, read or parsed
    /// * If the file cache has no directory to live in
    pub fn from_config(config: &ServerConfig) -> Result<Self, StateError> {
        let tenants_path = match &config.tenants_path {
            Some(path) => path.clone(),
            None => StaticTenantDirectory::default_path()?,
        };
        let tenants = Arc::new(StaticTenantDirectory::load(&tenants_path)?);

        let store: Arc<dyn CacheStore> = match &config.cache {
            CacheBackend::Memory => Arc::new(MemoryCacheStore::new()),
            CacheBackend::File { dir: Some(dir) } => Arc::new(FileCacheStore::new(dir.clone())),
            CacheBackend::File { dir: None } => Arc::new(FileCacheStore::in_user_cache_dir()?),
        };

        let mut provider = GitHubProvider::new();
        if !config.github_api_url.is_empty() {
            provider = provider.with_base_url(config.github_api_url.clone());
        }

        let query = QueryService::new(Arc::new(provider), tenants.clone(), CacheLayer::new(store));

        Ok(Self::new(query, tenants, config.webhook_secret.clone()))
    }
}
