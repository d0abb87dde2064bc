use std::collections::BTreeMap;

/// Namespace for commit history query results.
pub const COMMITS_NAMESPACE: &str = "commits";

/// `"{tenant}:{namespace}:"`, the prefix shared by all of a tenant's keys
/// in one namespace.
#[must_use]
pub fn tenant_prefix(tenant: &str, namespace: &str) -> String {
    format!("{}:{namespace}:", urlencoding::encode(tenant))
}

/// Build `"{tenant}:{namespace}:{k1=v1&k2=v2...}"` with parameters sorted by
/// name and values URL-encoded, so two tenants never share a key and
/// parameter order never matters.
#[must_use]
pub fn build_key<'a, I>(tenant: &str, namespace: &str, params: I) -> String
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    let sorted: BTreeMap<&str, String> = params.into_iter().collect();
    let joined = sorted
        .iter()
        .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}{joined}", tenant_prefix(tenant, namespace))
}
