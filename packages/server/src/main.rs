#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use gitpulse_server::{CacheBackend, ServerConfig, run_server};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CacheKind {
    Memory,
    File,
}

#[derive(Parser)]
#[command(name = "gitpulse-server")]
#[command(about = "Serve grouped GitHub commit history for configured tenants", long_about = None)]
struct Cli {
    #[arg(long, env = "GITPULSE_HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(short, long, env = "GITPULSE_PORT", default_value_t = 8080)]
    port: u16,

    /// Tenants file, defaults to `$XDG_CONFIG_HOME/gitpulse/tenants.json`
    #[arg(short, long, env = "GITPULSE_TENANTS")]
    tenants: Option<PathBuf>,

    /// Secret for verifying `X-Hub-Signature-256` on `/webhook`
    #[arg(long, env = "GITHUB_WEBHOOK_SECRET", hide_env_values = true)]
    webhook_secret: Option<String>,

    #[arg(long, env = "GITPULSE_CACHE_BACKEND", value_enum, default_value_t = CacheKind::Memory)]
    cache: CacheKind,

    /// File cache directory, defaults to `$XDG_CACHE_HOME/gitpulse/cache`
    #[arg(long, env = "GITPULSE_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    github_api_url: String,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let cache = match cli.cache {
        CacheKind::Memory => CacheBackend::Memory,
        CacheKind::File => CacheBackend::File { dir: cli.cache_dir },
    };

    let config = ServerConfig::new(cli.host, cli.port)
        .with_webhook_secret(cli.webhook_secret)
        .with_tenants_path(cli.tenants)
        .with_cache(cache)
        .with_github_api_url(cli.github_api_url);

    run_server(config).await
}
