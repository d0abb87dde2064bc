use std::future::Future;
use std::sync::Arc;

use chrono::{Months, NaiveDate, Utc};
use gitpulse_bucket::{filter_commits, group_commits, sort_commits};
use gitpulse_cache::{COMMITS_NAMESPACE, CacheLayer, build_key, ttl_for_commit_count};
use gitpulse_commit_models::{
    CommitQuery, CommitQueryResponse, DateRange, Pagination, QueryFilters, RepoRef,
};
use gitpulse_commit_provider::{CommitProvider, FetchWindow};
use gitpulse_fetcher::fetch_all;

use crate::error::QueryError;
use crate::tenant::TenantDirectory;

/// Months covered when the caller gives no `from`.
pub const DEFAULT_WINDOW_MONTHS: u32 = 24;

/// The repo filter as it enters the cache key and the echoed filters:
/// trimmed, lowercased, sorted and de-duplicated. Blank entries are dropped
/// and an empty filter is `None`.
fn normalized_repo_filter(query: &CommitQuery) -> Option<Vec<String>> {
    let mut repos: Vec<String> = query
        .repos
        .as_ref()?
        .iter()
        .map(|r| r.trim().to_ascii_lowercase())
        .filter(|r| !r.is_empty())
        .collect();
    repos.sort();
    repos.dedup();

    (!repos.is_empty()).then_some(repos)
}

/// Cache key for `query` under `tenant`.
///
/// Built from the request as given, not the resolved date window, so a
/// defaulted window keeps hitting the same entry until it expires. Paging
/// parameters are left out since paging is applied after the cache.
#[must_use]
pub fn cache_key(tenant: &str, query: &CommitQuery) -> String {
    let repos = normalized_repo_filter(query)
        .map(|repos| repos.join(","))
        .unwrap_or_default();

    build_key(
        tenant,
        COMMITS_NAMESPACE,
        [
            ("from", query.from.map(|d| d.to_string()).unwrap_or_default()),
            ("to", query.to.map(|d| d.to_string()).unwrap_or_default()),
            ("repo", repos),
            ("groupBy", query.group_by.to_string()),
            ("sortBy", query.sort_by.to_string()),
            ("sortOrder", query.sort_order.to_string()),
            ("search", query.search_term().unwrap_or_default().to_string()),
        ],
    )
}

/// Runs commit history queries: cache, fetch, filter, sort, bucket.
#[derive(Clone)]
pub struct QueryService {
    provider: Arc<dyn CommitProvider>,
    tenants: Arc<dyn TenantDirectory>,
    cache: CacheLayer,
    today: Option<NaiveDate>,
}

impl QueryService {
    #[must_use]
    pub fn new(
        provider: Arc<dyn CommitProvider>,
        tenants: Arc<dyn TenantDirectory>,
        cache: CacheLayer,
    ) -> Self {
        Self {
            provider,
            tenants,
            cache,
            today: None,
        }
    }

    /// Pin "today" for the default date window.
    #[must_use]
    pub const fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    #[must_use]
    pub const fn cache(&self) -> &CacheLayer {
        &self.cache
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// The date window a query covers once defaults are filled in.
    ///
    /// `to` defaults to today and `from` to [`DEFAULT_WINDOW_MONTHS`] before
    /// `to`.
    ///
    /// # Errors
    ///
    /// * [`QueryError::InvalidDateRange`] if `from` ends up after `to`
    pub fn resolve_range(&self, query: &CommitQuery) -> Result<DateRange, QueryError> {
        let to = query.to.unwrap_or_else(|| self.today());
        let from = query.from.unwrap_or_else(|| {
            to.checked_sub_months(Months::new(DEFAULT_WINDOW_MONTHS))
                .unwrap_or(NaiveDate::MIN)
        });

        if from > to {
            return Err(QueryError::InvalidDateRange { from, to });
        }

        Ok(DateRange { from, to })
    }

    /// Run `query` for `tenant`.
    ///
    /// A cached result is returned as is. Otherwise every tracked repository
    /// matching the filter is fetched and the result is cached.
    ///
    /// # Errors
    ///
    /// * [`QueryError::InvalidDateRange`] if `from` is after `to`
    /// * [`QueryError::NoRepositoriesConfigured`] if no repository is left
    ///   to query
    /// * [`QueryError::NoCredential`] if the tenant has no token
    /// * [`QueryError::Tenant`] if the tenant directory fails
    pub async fn query_commits(
        &self,
        tenant: &str,
        query: &CommitQuery,
    ) -> Result<CommitQueryResponse, QueryError> {
        let range = self.resolve_range(query)?;
        let key = cache_key(tenant, query);

        let response = if let Some(cached) = self.cache.get::<CommitQueryResponse>(&key).await {
            log::debug!("Cache hit for {key}");
            cached
        } else {
            log::debug!("Cache miss for {key}");
            let response = self.run(tenant, query, range).await?;
            self.cache
                .set(&key, &response, ttl_for_commit_count(response.total_commits))
                .await;
            response
        };

        Ok(paginate(response, query.page, query.per_page))
    }

    /// [`Self::query_commits`], abandoned as soon as `cancel` completes.
    ///
    /// Dropping the in-flight query drops its upstream requests with it.
    ///
    /// # Errors
    ///
    /// * [`QueryError::Cancelled`] if `cancel` completes first
    /// * Any error of [`Self::query_commits`]
    pub async fn query_commits_cancellable<C>(
        &self,
        tenant: &str,
        query: &CommitQuery,
        cancel: C,
    ) -> Result<CommitQueryResponse, QueryError>
    where
        C: Future<Output = ()> + Send,
    {
        tokio::select! {
            result = self.query_commits(tenant, query) => result,
            () = cancel => {
                log::debug!("Query for tenant {tenant} cancelled");
                Err(QueryError::Cancelled)
            }
        }
    }

    async fn run(
        &self,
        tenant: &str,
        query: &CommitQuery,
        range: DateRange,
    ) -> Result<CommitQueryResponse, QueryError> {
        let repos = self.resolve_repositories(tenant, query).await?;
        if repos.is_empty() {
            return Err(QueryError::NoRepositoriesConfigured);
        }

        let token = self
            .tenants
            .credential(tenant)
            .await
            .map_err(|e| QueryError::Tenant(e.to_string()))?
            .ok_or(QueryError::NoCredential)?;

        log::debug!(
            "Fetching {} repositories for tenant {tenant} from {} to {}",
            repos.len(),
            range.from,
            range.to
        );

        let window = FetchWindow::new(Some(range.from), Some(range.to));
        let fetched = fetch_all(self.provider.as_ref(), &repos, &token, &window).await;

        for report in fetched.degraded() {
            log::warn!("Results for {} may be incomplete: {:?}", report.repo, report.status);
        }

        let mut commits = filter_commits(fetched.commits, query.search_term());
        sort_commits(&mut commits, query.sort_by, query.sort_order);
        let total_commits = commits.len();

        let groups = group_commits(commits, query.group_by, query.sort_order);

        Ok(CommitQueryResponse {
            total_commits,
            total_groups: groups.len(),
            groups,
            date_range: range,
            filters: QueryFilters {
                repos: normalized_repo_filter(query),
                group_by: query.group_by,
                sort_by: query.sort_by,
                sort_order: query.sort_order,
                search: query.search_term().map(str::to_string),
            },
            sources: fetched.reports,
            pagination: None,
        })
    }

    /// The tenant's repositories, narrowed to the query's repo filter.
    async fn resolve_repositories(
        &self,
        tenant: &str,
        query: &CommitQuery,
    ) -> Result<Vec<RepoRef>, QueryError> {
        let mut repos = self
            .tenants
            .repositories(tenant)
            .await
            .map_err(|e| QueryError::Tenant(e.to_string()))?;

        if let Some(filter) = normalized_repo_filter(query) {
            repos.retain(|repo| filter.iter().any(|entry| repo.matches(entry)));
        }

        Ok(repos)
    }
}

/// Slice the bucket list to one page when `per_page` is given.
///
/// `page` is 1-based and defaults to the first page. A page past the end is
/// empty.
#[must_use]
pub fn paginate(
    mut response: CommitQueryResponse,
    page: Option<usize>,
    per_page: Option<usize>,
) -> CommitQueryResponse {
    let Some(per_page) = per_page.map(|n| n.max(1)) else {
        response.pagination = None;
        return response;
    };
    let page = page.unwrap_or(1).max(1);

    let total_pages = response.total_groups.div_ceil(per_page);
    let skip = (page - 1).saturating_mul(per_page);

    response.groups = response
        .groups
        .into_iter()
        .skip(skip)
        .take(per_page)
        .collect();
    response.pagination = Some(Pagination {
        page,
        per_page,
        total_pages,
    });

    response
}
