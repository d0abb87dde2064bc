//! Tenant credentials and tracked repositories.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use gitpulse_commit_models::{RepoRef, RepoRefError, RepoRefInput};
use serde::Deserialize;

/// Errors that can occur when loading tenant configuration.
#[derive(Debug, thiserror::Error)]
pub enum TenantConfigError {
    /// The tenants file could not be opened.
    #[error("Failed to read tenants file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tenants file is not valid JSON of the expected shape.
    #[error("Failed to parse tenants file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A tracked repository could not be normalized to `owner/name`.
    #[error("Invalid repository for tenant '{tenant}': {source}")]
    InvalidRepo {
        tenant: String,
        #[source]
        source: RepoRefError,
    },

    /// No XDG config directory to look for the tenants file in.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Where a query gets a tenant's upstream credential and repository list.
#[async_trait::async_trait]
pub trait TenantDirectory: Send + Sync {
    /// The tenant's upstream access token, if it has one.
    ///
    /// # Errors
    ///
    /// * If the directory backing store fails
    async fn credential(&self, tenant: &str) -> Result<Option<String>, TenantConfigError>;

    /// Repositories the tenant tracks. Unknown tenants track nothing.
    ///
    /// # Errors
    ///
    /// * If the directory backing store fails
    async fn repositories(&self, tenant: &str) -> Result<Vec<RepoRef>, TenantConfigError>;
}

/// One tenant's entry in the tenants file.
///
/// ```json
/// {
///   "token": "ghp_...",
///   "owner": "octocat",
///   "repos": ["hello-world", "octocat/spoon-knife", { "full_name": "acme/api" }]
/// }
/// ```
///
/// Bare repository names are attached to `owner`.
#[derive(Debug, Clone, Deserialize)]
struct TenantFileEntry {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    repos: Vec<RepoRefInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tenant {
    pub token: Option<String>,
    pub repos: Vec<RepoRef>,
}

/// Tenant directory held in memory, usually loaded from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct StaticTenantDirectory {
    tenants: HashMap<String, Tenant>,
}

impl StaticTenantDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tenant(
        mut self,
        id: impl Into<String>,
        token: Option<String>,
        repos: Vec<RepoRef>,
    ) -> Self {
        self.tenants.insert(id.into(), Tenant { token, repos });
        self
    }

    /// Parse the tenants file format: an object keyed by tenant id.
    ///
    /// # Errors
    ///
    /// * If the JSON is malformed
    /// * If a repository reference cannot be normalized
    pub fn from_json_str(json: &str) -> Result<Self, TenantConfigError> {
        let raw: BTreeMap<String, TenantFileEntry> = serde_json::from_str(json)?;
        Self::from_entries(raw)
    }

    /// Load the tenants file at `path`.
    ///
    /// # Errors
    ///
    /// * If the file cannot be read or parsed
    /// * If a repository reference cannot be normalized
    pub fn load(path: &Path) -> Result<Self, TenantConfigError> {
        let file = File::open(path).map_err(|source| TenantConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: BTreeMap<String, TenantFileEntry> =
            serde_json::from_reader(BufReader::new(file))?;

        let directory = Self::from_entries(raw)?;
        log::info!(
            "Loaded {} tenant(s) from {}",
            directory.tenants.len(),
            path.display()
        );
        Ok(directory)
    }

    /// `$XDG_CONFIG_HOME/gitpulse/tenants.json`
    ///
    /// # Errors
    ///
    /// * If the XDG config directory cannot be determined
    pub fn default_path() -> Result<PathBuf, TenantConfigError> {
        let config_dir = dirs::config_dir().ok_or(TenantConfigError::NoConfigDir)?;
        Ok(config_dir.join("gitpulse").join("tenants.json"))
    }

    fn from_entries(raw: BTreeMap<String, TenantFileEntry>) -> Result<Self, TenantConfigError> {
        let mut tenants = HashMap::with_capacity(raw.len());

        for (id, entry) in raw {
            let repos = entry
                .repos
                .into_iter()
                .map(|input| input.normalize(entry.owner.as_deref()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| TenantConfigError::InvalidRepo {
                    tenant: id.clone(),
                    source,
                })?;

            tenants.insert(
                id,
                Tenant {
                    token: entry.token.filter(|token| !token.trim().is_empty()),
                    repos,
                },
            );
        }

        Ok(Self { tenants })
    }

    #[must_use]
    pub fn get(&self, tenant: &str) -> Option<&Tenant> {
        self.tenants.get(tenant)
    }

    /// Ids of every tenant tracking `repo`, sorted.
    #[must_use]
    pub fn tenants_tracking(&self, repo: &RepoRef) -> Vec<String> {
        let full_name = repo.full_name();
        let mut ids: Vec<String> = self
            .tenants
            .iter()
            .filter(|(_, tenant)| tenant.repos.iter().any(|r| r.matches(&full_name)))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

#[async_trait::async_trait]
impl TenantDirectory for StaticTenantDirectory {
    async fn credential(&self, tenant: &str) -> Result<Option<String>, TenantConfigError> {
        Ok(self.get(tenant).and_then(|t| t.token.clone()))
    }

    async fn repositories(&self, tenant: &str) -> Result<Vec<RepoRef>, TenantConfigError> {
        Ok(self.get(tenant).map(|t| t.repos.clone()).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TENANTS_JSON: &str = r#"{
        "alice": {
            "token": "ghp_alice",
            "owner": "octocat",
            "repos": ["hello-world", "acme/api", { "full_name": "acme/web" }]
        },
        "bob": {
            "token": "  ",
            "repos": [{ "owner": "acme", "name": "api" }]
        }
    }"#;

    #[test]
    fn test_from_json_normalizes_repos() {
        let directory = StaticTenantDirectory::from_json_str(TENANTS_JSON).unwrap();
        let alice = directory.get("alice").unwrap();

        assert_eq!(alice.token.as_deref(), Some("ghp_alice"));
        assert_eq!(
            alice.repos,
            vec![
                RepoRef::new("octocat", "hello-world"),
                RepoRef::new("acme", "api"),
                RepoRef::new("acme", "web"),
            ]
        );
    }

    #[test]
    fn test_blank_token_is_no_token() {
        let directory = StaticTenantDirectory::from_json_str(TENANTS_JSON).unwrap();

        assert_eq!(directory.get("bob").unwrap().token, None);
    }

    #[test]
    fn test_bare_name_without_owner_is_rejected() {
        let err = StaticTenantDirectory::from_json_str(r#"{"carol": {"repos": ["lonely"]}}"#)
            .unwrap_err();

        assert!(matches!(
            err,
            TenantConfigError::InvalidRepo { ref tenant, source: RepoRefError::MissingOwner(_) }
                if tenant == "carol"
        ));
    }

    #[test]
    fn test_tenants_tracking() {
        let directory = StaticTenantDirectory::from_json_str(TENANTS_JSON).unwrap();

        assert_eq!(
            directory.tenants_tracking(&RepoRef::new("acme", "api")),
            vec!["alice".to_string(), "bob".to_string()]
        );
        assert_eq!(
            directory.tenants_tracking(&RepoRef::new("ACME", "Web")),
            vec!["alice".to_string()]
        );
        assert!(
            directory
                .tenants_tracking(&RepoRef::new("acme", "other"))
                .is_empty()
        );
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join(format!("gitpulse-{}.json", uuid::Uuid::new_v4()));

        let err = StaticTenantDirectory::load(&path).unwrap_err();

        assert!(matches!(err, TenantConfigError::Read { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("gitpulse-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, TENANTS_JSON).unwrap();

        let directory = StaticTenantDirectory::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(directory.get("alice").is_some());
        assert!(directory.get("nobody").is_none());
    }

    #[tokio::test]
    async fn test_unknown_tenant_has_nothing() {
        let directory = StaticTenantDirectory::new();

        assert_eq!(directory.credential("ghost").await.unwrap(), None);
        assert!(directory.repositories("ghost").await.unwrap().is_empty());
    }
}
