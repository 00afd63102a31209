//! The `{success, ...}` response envelope shared by every endpoint.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A decoded API response.
///
/// Consumers branch on the variant before touching `data`; there is no way
/// to read a payload out of a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success(Success<T>),
    Failure(Failure),
}

/// Payload half of the envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Success<T> {
    pub data: T,
    pub message: Option<String>,
    /// Pre-pagination record count on list responses.
    pub total: Option<u64>,
}

/// Error half of the envelope.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Failure {
    /// Human-readable, already localized summary.
    pub error: String,
    /// Per-field problems, when the server enumerated them.
    pub details: Vec<String>,
    /// Machine-readable code (`INVALID_CSRF`, `NOT_FOUND`, ...) if sent.
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::Success(Success {
            data,
            message: None,
            total: None,
        })
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure(Failure::new(error))
    }

    /// Attach a message. No-op on failures.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        if let Self::Success(success) = &mut self {
            success.message = Some(message.into());
        }
        self
    }

    /// Attach a total count. No-op on failures.
    #[must_use]
    pub fn with_total(mut self, total: u64) -> Self {
        if let Self::Success(success) = &mut self {
            success.total = Some(total);
        }
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success(success) => Some(&success.data),
            Self::Failure(_) => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Success(success) => Some(success.data),
            Self::Failure(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(success) => success.message.as_deref(),
            Self::Failure(failure) => Some(&failure.error),
        }
    }

    pub fn total(&self) -> Option<u64> {
        match self {
            Self::Success(success) => success.total,
            Self::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<Success<T>, Failure> {
        match self {
            Self::Success(success) => Ok(success),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl Failure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Vec::new(),
            code: None,
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Pull whatever error information a body carries, without requiring a
    /// well-formed envelope. Returns `None` when there is no error message.
    ///
    /// `error` may be a plain string or an object with `message`/`code`.
    pub fn from_body(body: &Value) -> Option<Self> {
        let object = body.as_object()?;
        let (error, nested_code) = match object.get("error")? {
            Value::String(message) => (message.clone(), None),
            Value::Object(inner) => (
                inner.get("message").and_then(Value::as_str)?.to_string(),
                inner.get("code").and_then(Value::as_str).map(str::to_string),
            ),
            _ => return None,
        };
        if error.is_empty() {
            return None;
        }

        let code = object
            .get("code")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or(nested_code);

        Some(Self {
            error,
            details: decode_details(object.get("details")),
            code,
        })
    }
}

fn decode_details(details: Option<&Value>) -> Vec<String> {
    match details {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        Some(other) => vec![other.to_string()],
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decode an envelope from parsed JSON.
    ///
    /// A success envelope without `data` decodes only when `T` accepts
    /// `null` (e.g. `()` for deletes).
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(de::Error::custom("response envelope must be a JSON object"));
        };

        let success = match object.get("success") {
            Some(Value::Bool(flag)) => *flag,
            _ => return Err(de::Error::custom("response envelope is missing the boolean `success` tag")),
        };

        if !success {
            let body = Value::Object(object);
            return Ok(Self::Failure(
                Failure::from_body(&body).unwrap_or_else(|| Failure::new("")),
            ));
        }

        let data = serde_json::from_value(object.remove("data").unwrap_or(Value::Null))?;
        let message = match object.remove("message") {
            Some(Value::String(message)) => Some(message),
            _ => None,
        };
        let total = object.get("total").and_then(Value::as_u64);

        Ok(Self::Success(Success { data, message, total }))
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Self::Success(success) => {
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", &success.data)?;
                if let Some(message) = &success.message {
                    map.serialize_entry("message", message)?;
                }
                if let Some(total) = success.total {
                    map.serialize_entry("total", &total)?;
                }
            }
            Self::Failure(failure) => {
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", &failure.error)?;
                if !failure.details.is_empty() {
                    map.serialize_entry("details", &failure.details)?;
                }
                if let Some(code) = &failure.code {
                    map.serialize_entry("code", code)?;
                }
            }
        }
        map.end()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ApiResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(de::Error::custom)
    }
}

impl Serialize for Failure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ApiResponse::<()>::Failure(self.clone()).serialize(serializer)
    }
}

/// Build a bare success object for endpoints that return extra top-level
/// fields (e.g. `/api/csrf`'s `token`).
pub fn success_object(fields: Map<String, Value>) -> Value {
    let mut object = Map::with_capacity(fields.len() + 1);
    object.insert("success".to_string(), Value::Bool(true));
    object.extend(fields);
    Value::Object(object)
}
