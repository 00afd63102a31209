//! Request dispatcher: cache check, CSRF, send, envelope parsing.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::csrf::{CSRF_COOKIE, CSRF_HEADER, CsrfTokenProvider};
use super::envelope::ApiResponse;
use super::error::{ApiError, Result};
use super::transport::{HttpRequest, Transport};
use crate::cache::{CacheCategory, ResponseStore};
use crate::utils::cookie_value;

/// Per-request options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Merged over the default `Content-Type: application/json`.
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Where a GET response is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSpec {
    pub key: String,
    pub category: CacheCategory,
}

impl CacheSpec {
    pub fn new(key: impl Into<String>, category: CacheCategory) -> Self {
        Self {
            key: key.into(),
            category,
        }
    }
}

/// POST, PUT, PATCH and DELETE carry the CSRF token.
pub fn is_mutation(method: &Method) -> bool {
    [Method::POST, Method::PUT, Method::PATCH, Method::DELETE].contains(method)
}

/// Performs API calls and turns responses into [`ApiResponse`]s.
///
/// Cheap to clone; every clone shares the transport, token provider and
/// cache.
#[derive(Clone)]
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    csrf: Arc<dyn CsrfTokenProvider>,
    cache: Option<Arc<dyn ResponseStore>>,
}

impl RequestDispatcher {
    pub fn new(transport: Arc<dyn Transport>, csrf: Arc<dyn CsrfTokenProvider>) -> Self {
        Self {
            transport,
            csrf,
            cache: None,
        }
    }

    /// Cache successful GET responses in `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResponseStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Issue a request.
    ///
    /// GETs with a [`CacheSpec`] are answered from the cache while the entry
    /// is live. Non-2xx responses become [`ApiError::Status`] carrying the
    /// envelope's `error`, or a generic status line when the body is not an
    /// envelope.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        cache: Option<&CacheSpec>,
    ) -> Result<ApiResponse<T>> {
        let is_get = options.method == Method::GET;
        let cache = cache
            .filter(|_| is_get)
            .map(|spec| (spec.category, localized_key(&spec.key, &options.headers)));

        if let Some((category, key)) = &cache
            && let Some(cached) = self.cached(*category, key)
        {
            match ApiResponse::from_value(cached) {
                Ok(response) => {
                    debug!("Cache hit: {}", key);
                    return Ok(response);
                }
                Err(e) => warn!("Ignoring undecodable cache entry {}: {}", key, e),
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for name in options.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in &options.headers {
            headers.append(name.clone(), value.clone());
        }

        if is_mutation(&options.method) {
            self.attach_csrf(&mut headers).await?;
        }

        let body = options.body.as_ref().map(serde_json::to_vec).transpose()?;
        let response = self
            .transport
            .send(HttpRequest {
                method: options.method,
                path: endpoint.to_string(),
                headers,
                body,
            })
            .await?;

        let parsed: std::result::Result<Value, _> = serde_json::from_slice(&response.body);
        if !response.status.is_success() {
            let err = ApiError::from_status(response.status, parsed.as_ref().ok());
            if err.is_csrf_rejection() {
                // The next mutation asks the provider for a fresh token.
                warn!("CSRF token rejected for {}; resetting provider", endpoint);
                self.csrf.reset();
            }
            return Err(err);
        }
        let value = parsed.map_err(|e| ApiError::InvalidBody {
            status: response.status.as_u16(),
            reason: e.to_string(),
        })?;

        if let Some((category, key)) = &cache
            && value.get("success").and_then(Value::as_bool) == Some(true)
        {
            self.remember(*category, key, value.clone());
        }

        ApiResponse::from_value(value).map_err(|e| ApiError::InvalidBody {
            status: response.status.as_u16(),
            reason: e.to_string(),
        })
    }

    /// Drop every cached key in `category` starting with `prefix`.
    pub fn invalidate(&self, category: CacheCategory, prefix: &str) {
        let Some(cache) = &self.cache else {
            return;
        };
        match cache.invalidate_prefix(category, prefix) {
            Ok(()) => debug!("Invalidated {} entries with prefix {:?}", category, prefix),
            Err(e) => warn!("Cache invalidation failed for {:?}: {}", prefix, e),
        }
    }

    fn cached(&self, category: CacheCategory, key: &str) -> Option<Value> {
        let cache = self.cache.as_ref()?;
        match cache.lookup(category, key) {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Cache lookup failed, treating as miss: {}", e);
                None
            }
        }
    }

    fn remember(&self, category: CacheCategory, key: &str, value: Value) {
        let Some(cache) = &self.cache else {
            return;
        };
        let ttl = cache.ttl_for(category);
        if let Err(e) = cache.store(category, key, value, ttl) {
            warn!("Cache store failed for {}: {}", key, e);
        }
    }

    async fn attach_csrf(&self, headers: &mut HeaderMap) -> Result<()> {
        let Some(token) = self.csrf.token().await? else {
            warn!("No CSRF token available; sending mutation without {}", CSRF_HEADER);
            return Ok(());
        };

        let value = HeaderValue::from_str(&token).map_err(|e| ApiError::Csrf(e.to_string()))?;
        headers.insert(HeaderName::from_static(CSRF_HEADER), value);

        // Double-submit: the cookie rides along with whatever cookies the
        // caller already sends, unless the caller set one itself.
        let existing: Vec<&str> = headers.get_all(COOKIE).iter().filter_map(|v| v.to_str().ok()).collect();
        if existing.iter().all(|c| cookie_value(c, CSRF_COOKIE).is_none()) {
            let pair = format!("{}={}", CSRF_COOKIE, urlencoding::encode(&token));
            let cookie = existing
                .into_iter()
                .chain(std::iter::once(pair.as_str()))
                .collect::<Vec<_>>()
                .join("; ");
            let cookie = HeaderValue::from_str(&cookie).map_err(|e| ApiError::Csrf(e.to_string()))?;
            headers.insert(COOKIE, cookie);
        }
        Ok(())
    }
}

/// Cached envelopes carry localized messages, so a request naming a locale
/// gets its own entry. The suffix keeps the `<entity>:` prefix intact.
fn localized_key(key: &str, headers: &HeaderMap) -> String {
    match headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()).map(str::trim) {
        Some(lang) if !lang.is_empty() => format!("{key}#{lang}"),
        _ => key.to_string(),
    }
}

impl std::fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}
