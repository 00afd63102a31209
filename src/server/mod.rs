//! Reference HTTP API serving every entity under `/api/<name>`.
//!
//! ## Routes
//!
//! - `GET /api/health`
//! - `GET /api/csrf` - issue a CSRF token (also set as a cookie)
//! - `GET|POST /api/:entity`
//! - `GET|PUT|PATCH|DELETE /api/:entity/:id`
//!
//! Mutations pass through the CSRF guard first.

mod csrf;
mod error;
mod handlers;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::http::HeaderMap;
use axum::http::header::ACCEPT_LANGUAGE;
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::info;

use crate::database::Database;
use crate::i18n;

pub use error::ServerError;
pub use handlers::{DEFAULT_LIMIT, MAX_LIMIT, parse_list_query};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub default_locale: Arc<str>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(db: Database, default_locale: impl Into<Arc<str>>) -> Self {
        Self {
            db,
            default_locale: default_locale.into(),
            started_at: Instant::now(),
        }
    }

    /// Locale for this request's messages.
    pub fn locale(&self, headers: &HeaderMap) -> &'static str {
        let accept = headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok());
        i18n::resolve_locale(accept, &self.default_locale)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/csrf", get(csrf::issue_token))
        .route("/api/:entity", get(handlers::list).post(handlers::create))
        .route(
            "/api/:entity/:id",
            get(handlers::get_one)
                .put(handlers::update)
                .patch(handlers::update)
                .delete(handlers::delete),
        )
        .layer(axum::middleware::from_fn_with_state(state.clone(), csrf::csrf_guard))
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("API listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
