use actix_web::{HttpRequest, HttpResponse, web};
use chrono::NaiveDate;
use gitpulse_commit_models::CommitQuery;
use gitpulse_query::QueryError;
use serde::Deserialize;

use crate::state::AppState;

pub const TENANT_HEADER: &str = "X-Tenant-Id";

/// Raw `/api/commits` query string. Everything stays a string until
/// [`CommitsParams::into_query`] so bad values get a 400 with a reason.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitsParams {
    pub from: Option<String>,
    pub to: Option<String>,
    /// Comma-separated repository names.
    pub repo: Option<String>,
    pub group_by: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value '{value}' for {name}")]
pub struct ParamError {
    pub name: &'static str,
    pub value: String,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_param<T: std::str::FromStr>(
    name: &'static str,
    value: Option<&str>,
) -> Result<Option<T>, ParamError> {
    non_empty(value)
        .map(|raw| {
            raw.parse().map_err(|_| ParamError {
                name,
                value: raw.to_string(),
            })
        })
        .transpose()
}

fn parse_date(name: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, ParamError> {
    non_empty(value)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ParamError {
                name,
                value: raw.to_string(),
            })
        })
        .transpose()
}

impl CommitsParams {
    /// # Errors
    ///
    /// * If a date is not `YYYY-MM-DD`
    /// * If `groupBy`, `sortBy` or `sortOrder` is not a known value
    /// * If `page` or `perPage` is not a positive integer
    pub fn into_query(self) -> Result<CommitQuery, ParamError> {
        let repos = non_empty(self.repo.as_deref()).map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        });

        let positive = |name, value: Option<&str>| -> Result<Option<usize>, ParamError> {
            match parse_param::<usize>(name, value)? {
                Some(0) => Err(ParamError {
                    name,
                    value: "0".to_string(),
                }),
                other => Ok(other),
            }
        };

        Ok(CommitQuery {
            repos,
            from: parse_date("from", self.from.as_deref())?,
            to: parse_date("to", self.to.as_deref())?,
            group_by: parse_param("groupBy", self.group_by.as_deref())?.unwrap_or_default(),
            sort_by: parse_param("sortBy", self.sort_by.as_deref())?.unwrap_or_default(),
            sort_order: parse_param("sortOrder", self.sort_order.as_deref())?.unwrap_or_default(),
            search: non_empty(self.search.as_deref()).map(str::to_string),
            page: positive("page", self.page.as_deref())?,
            per_page: positive("perPage", self.per_page.as_deref())?,
        })
    }
}

fn error_body(code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({ "error": code, "message": message })
}

/// Map a query failure onto a transport response.
#[must_use]
pub fn query_error_response(error: &QueryError) -> HttpResponse {
    let message = error.to_string();
    match error {
        QueryError::NoCredential => {
            HttpResponse::Unauthorized().json(error_body("no_credential", &message))
        }
        QueryError::NoRepositoriesConfigured => {
            HttpResponse::NotFound().json(error_body("no_repositories", &message))
        }
        QueryError::InvalidDateRange { .. } => {
            HttpResponse::BadRequest().json(error_body("invalid_date_range", &message))
        }
        QueryError::Cancelled | QueryError::Tenant(_) => {
            log::error!("Commit query failed: {error}");
            HttpResponse::InternalServerError().json(error_body("internal", &message))
        }
    }
}

#[allow(clippy::future_not_send)]
pub async fn commits(
    req: HttpRequest,
    params: web::Query<CommitsParams>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let Some(tenant) = req
        .headers()
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
    else {
        return HttpResponse::Unauthorized().json(error_body(
            "missing_tenant",
            &format!("Missing {TENANT_HEADER} header"),
        ));
    };

    drop(req);

    let query = match params.into_inner().into_query() {
        Ok(query) => query,
        Err(e) => {
            return HttpResponse::BadRequest().json(error_body("invalid_parameter", &e.to_string()));
        }
    };

    match state.query.query_commits(&tenant, &query).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => query_error_response(&e),
    }
}
