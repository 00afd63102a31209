//! List query parameters and their query-string form.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<u32> for FilterValue {
    fn from(v: u32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// Parameters for a list read.
///
/// `filters` keeps insertion order; a `None` value is carried but never
/// serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub filters: Vec<(String, Option<FilterValue>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    #[must_use]
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.push((key.into(), Some(value.into())));
        self
    }

    /// Add a filter that may be absent; `None` is dropped at serialization.
    #[must_use]
    pub fn filter_opt<V: Into<FilterValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        self.filters.push((key.into(), value.map(Into::into)));
        self
    }

    /// Encode as `application/x-www-form-urlencoded`.
    ///
    /// Zero `page`/`limit` and empty `search` are skipped. Setting a key
    /// twice keeps its first position and its last value.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut set = |key: &str, value: String| match pairs.iter_mut().find(|(k, _)| k == key) {
            Some(existing) => existing.1 = value,
            None => pairs.push((key.to_string(), value)),
        };

        if let Some(page) = self.page.filter(|p| *p > 0) {
            set("page", page.to_string());
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            set("limit", limit.to_string());
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            set("search", search.to_string());
        }
        for (key, value) in &self.filters {
            if let Some(value) = value {
                set(key, value.to_string());
            }
        }

        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params() {
        assert_eq!(QueryParams::new().to_query_string(), "");
    }

    #[test]
    fn test_page_limit_search_order() {
        let query = QueryParams::new().search("ali veli").limit(20).page(2).to_query_string();
        assert_eq!(query, "page=2&limit=20&search=ali+veli");
    }

    #[test]
    fn test_none_filters_are_omitted() {
        let query = QueryParams::new()
            .filter_opt::<&str>("city", None)
            .filter("status", "active")
            .to_query_string();
        assert_eq!(query, "status=active");
        assert!(!query.contains("city"));
    }

    #[test]
    fn test_zero_and_empty_are_skipped() {
        let query = QueryParams::new().page(0).limit(0).search("").to_query_string();
        assert_eq!(query, "");
    }

    #[test]
    fn test_repeated_key_keeps_last_value() {
        let query = QueryParams::new()
            .page(1)
            .filter("status", "pending")
            .filter("page", 3)
            .filter("status", "completed")
            .to_query_string();
        assert_eq!(query, "page=3&status=completed");
    }

    #[test]
    fn test_scalar_filters() {
        let query = QueryParams::new()
            .filter("is_read", false)
            .filter("amount", 12.5)
            .filter("family_size", 4)
            .to_query_string();
        assert_eq!(query, "is_read=false&amount=12.5&family_size=4");
    }
}
