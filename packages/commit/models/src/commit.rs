use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// A normalized upstream commit.
///
/// `sha` + `repo` identify a commit within one query result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub sha: String,
    /// Full commit message, may span several lines.
    pub message: String,
    pub author: String,
    pub author_email: String,
    /// Author date as reported upstream. All bucketing and sorting uses it.
    pub date: DateTime<Utc>,
    /// Short repository name.
    pub repo: String,
    /// Owning organization or account.
    pub org: String,
    /// Permalink to the commit on the upstream host.
    pub url: String,
}

impl Commit {
    /// First 7 characters of the sha.
    #[must_use]
    pub fn short_sha(&self) -> &str {
        self.sha
            .char_indices()
            .nth(7)
            .map_or(self.sha.as_str(), |(idx, _)| &self.sha[..idx])
    }

    /// Message text up to the first newline.
    #[must_use]
    pub fn message_first_line(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CommitWire<'a> {
    sha: &'a str,
    short_sha: &'a str,
    message: &'a str,
    message_first_line: &'a str,
    author: &'a str,
    author_email: &'a str,
    date: &'a DateTime<Utc>,
    repo: &'a str,
    org: &'a str,
    url: &'a str,
}

impl Serialize for Commit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CommitWire {
            sha: &self.sha,
            short_sha: self.short_sha(),
            message: &self.message,
            message_first_line: self.message_first_line(),
            author: &self.author,
            author_email: &self.author_email,
            date: &self.date,
            repo: &self.repo,
            org: &self.org,
            url: &self.url,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(sha: &str, message: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            message: message.to_string(),
            author: "Octo Cat".to_string(),
            author_email: "octo@example.com".to_string(),
            date: "2025-01-06T10:00:00Z".parse().unwrap(),
            repo: "hello-world".to_string(),
            org: "octocat".to_string(),
            url: format!("https://github.com/octocat/hello-world/commit/{sha}"),
        }
    }

    #[test]
    fn test_short_sha() {
        assert_eq!(commit("abcdef1234567", "x").short_sha(), "abcdef1");
        assert_eq!(commit("abc", "x").short_sha(), "abc");
    }

    #[test]
    fn test_message_first_line() {
        assert_eq!(
            commit("a", "fix: login bug\n\nLonger body").message_first_line(),
            "fix: login bug"
        );
        assert_eq!(commit("a", "").message_first_line(), "");
    }

    #[test]
    fn test_serialize_includes_derived_fields() {
        let value = serde_json::to_value(commit("abcdef1234567", "feat: x\nbody")).unwrap();

        assert_eq!(value["shortSha"], "abcdef1");
        assert_eq!(value["messageFirstLine"], "feat: x");
        assert_eq!(value["authorEmail"], "octo@example.com");
        assert_eq!(value["date"], "2025-01-06T10:00:00Z");
    }

    #[test]
    fn test_deserialize_ignores_derived_fields() {
        let original = commit("abcdef1234567", "feat: x\nbody");
        let json = serde_json::to_string(&original).unwrap();
        let parsed: Commit = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, original);
    }
}
