use actix_web::{HttpRequest, HttpResponse, web};
use gitpulse_cache::{COMMITS_NAMESPACE, tenant_prefix};
use gitpulse_commit_models::RepoRef;
use gitpulse_github::models::GithubPushEvent;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

/// Why a delivery's `X-Hub-Signature-256` was refused.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("missing X-Hub-Signature-256 header")]
    Missing,

    #[error("signature is not of the form sha256=<hex>")]
    Malformed,

    #[error("webhook secret rejected by HMAC")]
    InvalidSecret,

    #[error("signature does not match payload")]
    Mismatch,
}

/// Drops cached query results of every tenant tracking a pushed repository.
///
/// Best effort: anything that goes wrong past signature checking is logged
/// and the delivery is still acknowledged.
#[allow(clippy::future_not_send)]
pub async fn handler(req: HttpRequest, body: web::Bytes, state: web::Data<AppState>) -> HttpResponse {
    if let Some(secret) = state.webhook_secret.as_deref() {
        let header = req
            .headers()
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok());
        if let Err(e) = verify_signature(header, &body, secret) {
            log::warn!("Rejected webhook delivery: {e}");
            return HttpResponse::Unauthorized().finish();
        }
    } else {
        log::warn!("GITHUB_WEBHOOK_SECRET not set, skipping signature verification");
    }

    let event_type = req
        .headers()
        .get("X-GitHub-Event")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    drop(req);

    if event_type.as_deref() != Some("push") {
        log::debug!("Ignoring {} webhook", event_type.as_deref().unwrap_or("untyped"));
        return HttpResponse::Ok().json(serde_json::json!({ "invalidated": 0 }));
    }

    let repo = match parse_push_repository(&body) {
        Ok(repo) => repo,
        Err(e) => {
            log::error!("Failed to parse push webhook: {e}");
            return HttpResponse::BadRequest().body(format!("Failed to parse webhook: {e}"));
        }
    };

    let tenants = state.tenants.tenants_tracking(&repo);
    let mut invalidated = 0;
    for tenant in &tenants {
        invalidated += state
            .query
            .cache()
            .invalidate_prefix(&tenant_prefix(tenant, COMMITS_NAMESPACE))
            .await;
    }

    log::info!(
        "Push to {repo} invalidated {invalidated} cache entries across {} tenant(s)",
        tenants.len()
    );

    HttpResponse::Ok().json(serde_json::json!({
        "repo": repo.full_name(),
        "tenants": tenants.len(),
        "invalidated": invalidated,
    }))
}

/// Check a `sha256=<hex>` signature header against the HMAC of `body`.
fn verify_signature(header: Option<&str>, body: &[u8], secret: &str) -> Result<(), SignatureError> {
    let hex_digest = header
        .ok_or(SignatureError::Missing)?
        .strip_prefix("sha256=")
        .ok_or(SignatureError::Malformed)?;
    let expected = hex::decode(hex_digest).map_err(|_| SignatureError::Malformed)?;

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(body);
    let computed = mac.finalize().into_bytes();

    if bool::from(computed.as_slice().ct_eq(&expected)) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}

fn parse_push_repository(body: &[u8]) -> Result<RepoRef, String> {
    let event: GithubPushEvent = serde_json::from_slice(body).map_err(|e| e.to_string())?;
    RepoRef::parse(&event.repository.full_name, None).map_err(|e| e.to_string())
}
