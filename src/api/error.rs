//! Error types for the CRUD client layer.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use super::envelope::Failure;

/// Client error
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered non-2xx. `message` is the envelope's `error`
    /// when one was sent, else `"API Error: <status> <statusText>"`.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        details: Vec<String>,
        code: Option<String>,
    },

    /// A 2xx response whose body is not a usable envelope.
    #[error("Invalid JSON response from API")]
    InvalidBody { status: u16, reason: String },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-reqwest transport failure (in-process dispatch, request building)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request body could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSRF token could not be obtained or attached
    #[error("CSRF token error: {0}")]
    Csrf(String),
}

impl ApiError {
    /// Build the error for a non-2xx response.
    pub fn from_status(status: StatusCode, body: Option<&Value>) -> Self {
        match body.and_then(Failure::from_body) {
            Some(failure) => Self::Status {
                status: status.as_u16(),
                message: failure.error,
                details: failure.details,
                code: failure.code,
            },
            None => Self::Status {
                status: status.as_u16(),
                message: generic_status_message(status),
                details: Vec::new(),
                code: None,
            },
        }
    }

    /// HTTP status, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::InvalidBody { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Field-level details from a validation failure.
    pub fn details(&self) -> &[String] {
        match self {
            Self::Status { details, .. } => details,
            _ => &[],
        }
    }

    /// The error envelope the server sent, reconstructed.
    pub fn failure(&self) -> Option<Failure> {
        match self {
            Self::Status {
                message,
                details,
                code,
                ..
            } => {
                let failure = Failure::new(message.clone()).with_details(details.clone());
                Some(match code {
                    Some(code) => failure.with_code(code.clone()),
                    None => failure,
                })
            }
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    pub fn is_validation(&self) -> bool {
        self.status() == Some(400)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// The server refused the request's CSRF token (`403 INVALID_CSRF`).
    pub fn is_csrf_rejection(&self) -> bool {
        matches!(self, Self::Status { status: 403, code: Some(code), .. } if code == "INVALID_CSRF")
    }
}

/// `"API Error: 500 Internal Server Error"`
pub fn generic_status_message(status: StatusCode) -> String {
    format!(
        "API Error: {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string()
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_error_prefers_envelope_message() {
        let body = json!({"success": false, "error": "Not found"});
        let err = ApiError::from_status(StatusCode::NOT_FOUND, Some(&body));
        assert_eq!(err.to_string(), "Not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_status_error_falls_back_to_status_line() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, Some(&json!({})));
        assert_eq!(err.to_string(), "API Error: 500 Internal Server Error");

        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, None);
        assert_eq!(err.to_string(), "API Error: 502 Bad Gateway");
    }

    #[test]
    fn test_failure_roundtrip_keeps_details() {
        let body = json!({"success": false, "error": "Doğrulama hatası", "details": ["a", "b"]});
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, Some(&body));
        assert!(err.is_validation());
        assert_eq!(err.details(), ["a".to_string(), "b".to_string()]);
        assert_eq!(err.failure().unwrap().error, "Doğrulama hatası");
    }
}
