use chrono::NaiveDate;

/// Failures a commit query surfaces to its caller.
///
/// Upstream rate limits and per-repository failures are not errors here;
/// they show up as degraded entries in the response's `sources`.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The tenant has no usable upstream credential.
    #[error("No upstream credential for tenant")]
    NoCredential,

    /// The tenant tracks no repositories, or the repo filter matched none.
    #[error("No repositories configured")]
    NoRepositoriesConfigured,

    /// `from` is after `to`.
    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    /// The caller gave up on the query before it finished.
    #[error("Query cancelled")]
    Cancelled,

    /// The tenant directory could not be consulted.
    #[error("Tenant lookup failed: {0}")]
    Tenant(String),
}
