//! Transport that dispatches straight into an axum router.

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use futures::future::BoxFuture;
use tower::ServiceExt;
use tracing::debug;

use super::error::{ApiError, Result};
use super::transport::{HttpRequest, HttpResponse, Transport};

/// Sends requests through a [`Router`] without opening a socket.
///
/// Used by the end-to-end tests and by embedders that host the API in the
/// same process.
#[derive(Clone)]
pub struct InProcessTransport {
    router: Router,
}

impl InProcessTransport {
    pub fn new(router: Router) -> Self {
        Self { router }
    }
}

impl Transport for InProcessTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse>> {
        Box::pin(async move {
            debug!("{} {} (in-process)", request.method, request.path);

            let mut http_request = Request::builder()
                .method(request.method)
                .uri(&request.path)
                .body(request.body.map(Body::from).unwrap_or_else(Body::empty))
                .map_err(|e| ApiError::Transport(e.to_string()))?;
            *http_request.headers_mut() = request.headers;

            let response = match self.router.clone().oneshot(http_request).await {
                Ok(response) => response,
                Err(never) => match never {},
            };

            let (parts, body) = response.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX)
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            Ok(HttpResponse {
                status: parts.status,
                headers: parts.headers,
                body: body.to_vec(),
            })
        })
    }
}
