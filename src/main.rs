//! Yardim reference API server.

use tracing::info;
use tracing_subscriber::EnvFilter;

use yardim::config::Config;
use yardim::database::Database;
use yardim::i18n;
use yardim::server::{self, AppState};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("yardim=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Yardim API...");

    let config = Config::from_env()?;
    info!("Configuration loaded successfully");

    i18n::init();

    let db = Database::new();
    let state = AppState::new(db, config.default_locale.as_str());

    server::serve(config.server_addr, state).await?;

    info!("Server stopped");
    Ok(())
}
