use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when normalizing a repository reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepoRefError {
    /// The reference was an empty string.
    #[error("Repository reference is empty")]
    Empty,

    /// A bare repository name was given with no owner to attach it to.
    #[error("Repository reference '{0}' has no owner")]
    MissingOwner(String),

    /// The reference had more than one `/` or an empty segment.
    #[error("Invalid repository reference '{0}'")]
    Invalid(String),
}

/// A repository on the upstream commit host, normalized to `owner/name`.
///
/// Serialized as the `"owner/name"` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RepoRefInput", into = "String")]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Whether a user-supplied filter entry refers to this repository.
    ///
    /// Accepts either the bare name or `owner/name`, compared
    /// case-insensitively since the upstream host treats them that way.
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.trim();
        filter.eq_ignore_ascii_case(&self.name) || filter.eq_ignore_ascii_case(&self.full_name())
    }

    /// Parse `owner/name`, or a bare `name` when a default owner is known.
    ///
    /// # Errors
    ///
    /// * If the value is empty or malformed
    /// * If the value is a bare name and `default_owner` is `None`
    pub fn parse(value: &str, default_owner: Option<&str>) -> Result<Self, RepoRefError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RepoRefError::Empty);
        }

        match value.split_once('/') {
            Some((owner, name)) => {
                if owner.is_empty() || name.is_empty() || name.contains('/') {
                    return Err(RepoRefError::Invalid(value.to_string()));
                }
                Ok(Self::new(owner, name))
            }
            None => default_owner
                .filter(|owner| !owner.is_empty())
                .map(|owner| Self::new(owner, value))
                .ok_or_else(|| RepoRefError::MissingOwner(value.to_string())),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = RepoRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, None)
    }
}

impl From<RepoRef> for String {
    fn from(value: RepoRef) -> Self {
        value.full_name()
    }
}

/// The shapes a repository reference shows up in from configuration and
/// upstream payloads.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RepoRefInput {
    /// `"owner/name"` or a bare `"name"`.
    Slug(String),
    /// `{ "owner": "...", "name": "..." }`
    Parts { owner: String, name: String },
    /// `{ "full_name": "owner/name" }`
    FullName { full_name: String },
}

impl RepoRefInput {
    /// # Errors
    ///
    /// * If the reference cannot be resolved to an `owner/name` pair
    pub fn normalize(self, default_owner: Option<&str>) -> Result<RepoRef, RepoRefError> {
        match self {
            Self::Slug(slug) => RepoRef::parse(&slug, default_owner),
            Self::Parts { owner, name } => {
                if name.trim().is_empty() {
                    return Err(RepoRefError::Empty);
                }
                let owner = if owner.trim().is_empty() {
                    default_owner
                        .ok_or_else(|| RepoRefError::MissingOwner(name.clone()))?
                        .to_string()
                } else {
                    owner
                };
                Ok(RepoRef::new(owner.trim(), name.trim()))
            }
            Self::FullName { full_name } => RepoRef::parse(&full_name, default_owner),
        }
    }
}

impl TryFrom<RepoRefInput> for RepoRef {
    type Error = RepoRefError;

    fn try_from(value: RepoRefInput) -> Result<Self, Self::Error> {
        value.normalize(None)
    }
}
