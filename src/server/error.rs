//! Error responses for the reference API.
//!
//! Every failure leaves the server as a `{success:false, error, ...}`
//! envelope with a status matching its category.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use super::validation::Rejection;
use crate::api::Failure;
use crate::database::StoreError;
use crate::i18n;

/// A handler failure: a status and the envelope body.
#[derive(Debug)]
pub struct ServerError {
    pub status: StatusCode,
    pub body: Failure,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl ServerError {
    pub fn new(status: StatusCode, body: Failure) -> Self {
        Self { status, body }
    }

    pub fn rejected(lang: &str, rejection: Rejection) -> Self {
        let (key, details) = match rejection {
            Rejection::Invalid(details) => ("errors.validation", details),
            Rejection::MissingFields(details) => ("errors.required_fields", details),
        };
        Self::new(
            StatusCode::BAD_REQUEST,
            Failure::new(i18n::get_text(lang, key))
                .with_details(details)
                .with_code("VALIDATION_ERROR"),
        )
    }

    /// Malformed or non-object request body.
    pub fn invalid_body(lang: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            Failure::new(i18n::get_text(lang, "errors.invalid_body")).with_code("INVALID_BODY"),
        )
    }

    pub fn not_found(lang: &str, entity: &str) -> Self {
        let resource = i18n::resource_name(lang, entity);
        Self::new(
            StatusCode::NOT_FOUND,
            Failure::new(i18n::format_text(lang, "errors.not_found", &[("resource", &resource)]))
                .with_code("NOT_FOUND"),
        )
    }

    /// No such entity route.
    pub fn unknown_resource(lang: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            Failure::new(i18n::get_text(lang, "errors.unknown_resource")).with_code("NOT_FOUND"),
        )
    }

    pub fn csrf(lang: &str) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            Failure::new(i18n::get_text(lang, "errors.csrf")).with_code("INVALID_CSRF"),
        )
    }

    pub fn duplicate(lang: &str, field: &str) -> Self {
        let key = match field {
            "tc_no" | "receipt_number" | "email" => format!("errors.duplicate.{field}"),
            _ => "errors.duplicate.default".to_string(),
        };
        Self::new(
            StatusCode::CONFLICT,
            Failure::new(i18n::get_text(lang, &key)).with_code("DUPLICATE_ENTRY"),
        )
    }

    /// Log the cause; the client only sees the generic message.
    pub fn internal(lang: &str, cause: impl std::fmt::Display) -> Self {
        error!("Internal error: {}", cause);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            Failure::new(i18n::get_text(lang, "errors.internal")).with_code("INTERNAL_ERROR"),
        )
    }

    /// Map a store failure for `entity`.
    pub fn from_store(lang: &str, entity: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::not_found(lang, entity),
            StoreError::Duplicate { field, .. } => Self::duplicate(lang, &field),
            StoreError::Malformed { reason, .. } => {
                Self::rejected(lang, Rejection::Invalid(vec![format!("Geçersiz alan değeri: {reason}")]))
            }
            StoreError::UnknownCollection(name) => Self::internal(lang, format!("collection {name} missing")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_status() {
        let not_found = ServerError::from_store(
            "tr",
            "beneficiaries",
            StoreError::NotFound {
                collection: "beneficiaries".into(),
                id: "x".into(),
            },
        );
        assert_eq!(not_found.status, StatusCode::NOT_FOUND);
        assert_eq!(not_found.body.error, "İhtiyaç sahibi bulunamadı");

        let duplicate = ServerError::from_store(
            "tr",
            "donations",
            StoreError::Duplicate {
                collection: "donations".into(),
                field: "receipt_number".into(),
            },
        );
        assert_eq!(duplicate.status, StatusCode::CONFLICT);
        assert_eq!(duplicate.body.error, "Bu makbuz numarası zaten kullanılmış");

        let malformed = ServerError::from_store(
            "tr",
            "beneficiaries",
            StoreError::Malformed {
                collection: "beneficiaries".into(),
                reason: "invalid type: floating point `2.5`, expected u32".into(),
            },
        );
        assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
        assert_eq!(malformed.body.error, "Doğrulama hatası");
        assert_eq!(malformed.body.code.as_deref(), Some("VALIDATION_ERROR"));
        assert!(malformed.body.details[0].starts_with("Geçersiz alan değeri: invalid type"));
    }

    #[test]
    fn test_rejection_carries_details() {
        let err = ServerError::rejected("en", Rejection::MissingFields(vec!["Makbuz numarası".into()]));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.error, "Required fields are missing");
        assert_eq!(err.body.details, vec!["Makbuz numarası"]);
    }
}
