#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

pub mod api;
pub mod state;
pub mod webhook;

use std::path::PathBuf;

use actix_web::{App, HttpServer, middleware, web};
use state::AppState;
use tokio::task::JoinHandle;

/// Where query results are cached.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CacheBackend {
    /// Process-local, lost on restart.
    #[default]
    Memory,
    /// JSON files under `dir`, or the XDG cache directory when `None`.
    File { dir: Option<PathBuf> },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub webhook_secret: Option<String>,
    /// Tenants file, `$XDG_CONFIG_HOME/gitpulse/tenants.json` when `None`.
    pub tenants_path: Option<PathBuf>,
    pub cache: CacheBackend,
    pub github_api_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0".to_string(), 8080)
    }
}

impl ServerConfig {
    #[must_use]
    pub const fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            webhook_secret: None,
            tenants_path: None,
            cache: CacheBackend::Memory,
            github_api_url: String::new(),
        }
    }

    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_host(mut self, host: String) -> Self {
        self.host = host;
        self
    }

    #[must_use]
    pub fn with_webhook_secret(mut self, secret: Option<String>) -> Self {
        self.webhook_secret = secret;
        self
    }

    #[must_use]
    pub fn with_tenants_path(mut self, path: Option<PathBuf>) -> Self {
        self.tenants_path = path;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: CacheBackend) -> Self {
        self.cache = cache;
        self
    }

    /// Empty keeps the provider's default, the public GitHub API.
    #[must_use]
    pub fn with_github_api_url(mut self, url: String) -> Self {
        self.github_api_url = url;
        self
    }
}

/// Build the real dependencies from `config` and serve until shut down.
///
/// # Errors
///
/// * If the tenants file or cache directory cannot be set up
/// * If the server fails to bind or run
#[allow(clippy::future_not_send)]
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let RunServerResponse { join_handle, .. } = run_server_with_handle(&config, state)?;

    join_handle.await??;
    Ok(())
}

/// A bound, running server.
pub struct RunServerResponse {
    pub handle: actix_web::dev::ServerHandle,
    /// Addresses actually bound, so port 0 resolves to the chosen port.
    pub addrs: Vec<std::net::SocketAddr>,
    pub join_handle: JoinHandle<Result<(), std::io::Error>>,
}

/// Register the gitpulse endpoints.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").route("/commits", web::get().to(api::commits)))
        .route("/webhook", web::post().to(webhook::handler))
        .route("/health", web::get().to(health));
}

async fn health() -> &'static str {
    "OK"
}

/// Bind and spawn the server with an already built `state`.
///
/// # Errors
///
/// Returns an error if the server fails to bind
pub fn run_server_with_handle(
    config: &ServerConfig,
    state: AppState,
) -> std::io::Result<RunServerResponse> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind((config.host.as_str(), config.port))?;

    let addrs = server.addrs();
    log::info!("gitpulse serving commit history on {addrs:?}");

    let server = server.run();
    Ok(RunServerResponse {
        handle: server.handle(),
        addrs,
        join_handle: tokio::spawn(server),
    })
}
