//! CSRF token primitives and client-side token providers.
//!
//! The server mirrors a random token into the `csrf-token` cookie and
//! expects the same value back in the `x-csrf-token` header on every
//! mutating request. Clients obtain the token through a
//! [`CsrfTokenProvider`] injected into the dispatcher.

use std::sync::Arc;

use futures::future::BoxFuture;
use parking_lot::RwLock;
use rand::RngCore;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::error::{ApiError, Result};
use super::transport::{HttpRequest, Transport};
use crate::utils::cookie_value;

/// Request header carrying the token.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Cookie the token is mirrored into.
pub const CSRF_COOKIE: &str = "csrf-token";

/// Endpoint that issues tokens.
pub const CSRF_ENDPOINT: &str = "/api/csrf";

/// Generate a fresh token: 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Constant-time token comparison.
///
/// Empty tokens never match.
pub fn tokens_match(provided: &str, expected: &str) -> bool {
    if provided.is_empty() || expected.is_empty() || provided.len() != expected.len() {
        return false;
    }
    provided
        .bytes()
        .zip(expected.bytes())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Supplies the token attached to mutating requests.
pub trait CsrfTokenProvider: Send + Sync {
    /// The current token, or `None` if there is none to send.
    fn token(&self) -> BoxFuture<'_, Result<Option<String>>>;

    /// Forget any memoised token so the next call obtains a fresh one.
    fn reset(&self) {}
}

/// A fixed token.
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CsrfTokenProvider for StaticToken {
    fn token(&self) -> BoxFuture<'_, Result<Option<String>>> {
        let token = Some(self.0.clone()).filter(|t| !t.is_empty());
        Box::pin(async move { Ok(token) })
    }
}

/// Reads the token out of a cookie string, the way a browser page would
/// read `document.cookie`.
#[derive(Debug, Clone, Default)]
pub struct CookieJarToken {
    cookies: Arc<RwLock<String>>,
}

impl CookieJarToken {
    pub fn new(cookie_header: impl Into<String>) -> Self {
        Self {
            cookies: Arc::new(RwLock::new(cookie_header.into())),
        }
    }

    /// Replace the cookie string.
    pub fn set_cookies(&self, cookie_header: impl Into<String>) {
        *self.cookies.write() = cookie_header.into();
    }
}

impl CsrfTokenProvider for CookieJarToken {
    fn token(&self) -> BoxFuture<'_, Result<Option<String>>> {
        let token = cookie_value(&self.cookies.read(), CSRF_COOKIE);
        Box::pin(async move { Ok(token) })
    }
}

/// Fetches a token from `GET /api/csrf` on first use and memoises it.
///
/// Concurrent first callers wait on the same fetch. [`reset`] forgets the
/// token; the dispatcher calls it when the server answers `INVALID_CSRF`.
///
/// [`reset`]: CsrfTokenProvider::reset
pub struct FetchedToken {
    transport: Arc<dyn Transport>,
    token: RwLock<Option<String>>,
    fetching: Mutex<()>,
}

impl FetchedToken {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            token: RwLock::new(None),
            fetching: Mutex::new(()),
        }
    }

    fn memoised(&self) -> Option<String> {
        self.token.read().clone()
    }

    async fn fetch(&self) -> Result<String> {
        let response = self
            .transport
            .send(HttpRequest {
                method: Method::GET,
                path: CSRF_ENDPOINT.to_string(),
                headers: HeaderMap::new(),
                body: None,
            })
            .await?;

        let body: Option<Value> = serde_json::from_slice(&response.body).ok();
        if !response.status.is_success() {
            return Err(ApiError::from_status(response.status, body.as_ref()));
        }

        body.as_ref()
            .and_then(|b| b.get("token"))
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Csrf(format!("{CSRF_ENDPOINT} returned no token")))
    }
}

impl CsrfTokenProvider for FetchedToken {
    fn token(&self) -> BoxFuture<'_, Result<Option<String>>> {
        Box::pin(async move {
            if let Some(token) = self.memoised() {
                return Ok(Some(token));
            }

            let _fetching = self.fetching.lock().await;
            if let Some(token) = self.memoised() {
                return Ok(Some(token));
            }
            let token = self.fetch().await?;
            debug!("Fetched CSRF token");
            *self.token.write() = Some(token.clone());
            Ok(Some(token))
        })
    }

    fn reset(&self) {
        *self.token.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::StatusCode;

    use super::*;
    use crate::api::transport::HttpResponse;

    #[test]
    fn test_generated_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(token, generate_token());
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("secure-token-12345", "secure-token-12345"));
        assert!(!tokens_match("secure-token-12345", "secure-token-12346"));
        assert!(!tokens_match("", "abc123"));
        assert!(!tokens_match("abc123", ""));
        assert!(!tokens_match("short", "muchlongertoken"));
    }

    #[tokio::test]
    async fn test_cookie_jar_token() {
        let jar = CookieJarToken::new("other=1; csrf-token=test-csrf-token");
        assert_eq!(jar.token().await.unwrap().as_deref(), Some("test-csrf-token"));

        jar.set_cookies("other=1");
        assert_eq!(jar.token().await.unwrap(), None);
    }

    /// Answers `/api/csrf` from a queue of canned replies and counts calls.
    struct CannedCsrf {
        replies: parking_lot::Mutex<Vec<(StatusCode, &'static str)>>,
        calls: AtomicUsize,
    }

    impl CannedCsrf {
        fn new(replies: Vec<(StatusCode, &'static str)>) -> Arc<Self> {
            Arc::new(Self {
                replies: parking_lot::Mutex::new(replies),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl Transport for CannedCsrf {
        fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse>> {
            assert_eq!(request.path, CSRF_ENDPOINT);
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (status, body) = self.replies.lock().remove(0);
            Box::pin(async move {
                Ok(HttpResponse {
                    status,
                    headers: HeaderMap::new(),
                    body: body.as_bytes().to_vec(),
                })
            })
        }
    }

    #[tokio::test]
    async fn test_fetched_token_is_memoised_until_reset() {
        let transport = CannedCsrf::new(vec![
            (StatusCode::OK, r#"{"success":true,"token":"first"}"#),
            (StatusCode::OK, r#"{"success":true,"token":"second"}"#),
        ]);
        let provider = FetchedToken::new(transport.clone());

        assert_eq!(provider.token().await.unwrap().as_deref(), Some("first"));
        assert_eq!(provider.token().await.unwrap().as_deref(), Some("first"));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        provider.reset();
        assert_eq!(provider.token().await.unwrap().as_deref(), Some("second"));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetched_token_error_status() {
        let transport = CannedCsrf::new(vec![(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"success":false,"error":"Sunucu hatası"}"#,
        )]);
        let err = FetchedToken::new(transport).token().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, ref message, .. } if message == "Sunucu hatası"));

        let transport = CannedCsrf::new(vec![(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>")]);
        let err = FetchedToken::new(transport).token().await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.to_string(), "API Error: 502 Bad Gateway");
    }

    #[tokio::test]
    async fn test_fetched_token_missing_or_empty() {
        for body in [
            r#"{"success":true}"#,
            r#"{"success":true,"token":""}"#,
            r#"{"success":true,"token":42}"#,
            "not json",
        ] {
            let transport = CannedCsrf::new(vec![(StatusCode::OK, body)]);
            let err = FetchedToken::new(transport).token().await.unwrap_err();
            assert!(matches!(err, ApiError::Csrf(_)), "{body}: {err:?}");
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_memoised() {
        let transport = CannedCsrf::new(vec![
            (StatusCode::SERVICE_UNAVAILABLE, r#"{"success":false,"error":"Sunucu hatası"}"#),
            (StatusCode::OK, r#"{"success":true,"token":"late"}"#),
        ]);
        let provider = FetchedToken::new(transport.clone());

        assert!(provider.token().await.is_err());
        assert_eq!(provider.token().await.unwrap().as_deref(), Some("late"));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_static_token_is_absent() {
        assert_eq!(StaticToken::new("").token().await.unwrap(), None);
        assert_eq!(StaticToken::new("t").token().await.unwrap().as_deref(), Some("t"));
    }
}
