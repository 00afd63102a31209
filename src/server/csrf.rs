//! Double-submit CSRF protection.
//!
//! `GET /api/csrf` issues a token and mirrors it into the `csrf-token`
//! cookie. Every mutating `/api/*` request must echo the cookie's value in
//! the `x-csrf-token` header.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::AppState;
use super::error::ServerError;
use crate::api::csrf::{CSRF_COOKIE, CSRF_ENDPOINT, CSRF_HEADER, generate_token, tokens_match};
use crate::api::{is_mutation, success_object};
use crate::utils::cookie_value;

/// Lifetime of the token cookie.
const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24;

/// `GET /api/csrf`
pub(crate) async fn issue_token(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = generate_token();
    let cookie = format!(
        "{CSRF_COOKIE}={token}; Path=/; Max-Age={COOKIE_MAX_AGE_SECS}; SameSite=Strict"
    );
    let Ok(cookie) = HeaderValue::from_str(&cookie) else {
        return ServerError::internal(state.locale(&headers), "CSRF cookie is not a valid header").into_response();
    };

    let mut fields = Map::new();
    fields.insert("token".to_string(), Value::String(token));
    ([(SET_COOKIE, cookie)], Json(success_object(fields))).into_response()
}

/// Reject mutating API calls whose header token does not match the cookie.
pub(crate) async fn csrf_guard(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if !is_mutation(request.method()) || !path.starts_with("/api/") || path == CSRF_ENDPOINT {
        return next.run(request).await;
    }

    let headers = request.headers();
    let provided = headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let expected = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookies| cookie_value(cookies, CSRF_COOKIE))
        .unwrap_or_default();

    if tokens_match(provided, &expected) {
        debug!("CSRF token accepted for {} {}", request.method(), path);
        return next.run(request).await;
    }

    warn!("CSRF validation failed for {} {}", request.method(), path);
    ServerError::csrf(state.locale(headers)).into_response()
}
