#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of `GET /repos/{owner}/{repo}/commits`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubCommitResponse {
    pub sha: String,
    pub html_url: String,
    pub commit: GithubCommitDetail,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubCommitDetail {
    pub message: String,
    pub author: Option<GithubGitActor>,
    pub committer: Option<GithubGitActor>,
}

/// Git-level identity attached to a commit (not the GitHub account).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubGitActor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// The subset of a `push` webhook payload needed to find affected caches.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubPushEvent {
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub repository: GithubRepository,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubRepository {
    pub name: String,
    pub full_name: String,
    pub owner: GithubOwner,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GithubOwner {
    /// Push payloads carry `name` for the owner, other events `login`.
    #[serde(default)]
    pub login: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
