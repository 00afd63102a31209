//! Generic CRUD handlers for `/api/:entity[/:id]`.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use serde_json::{Value, json};
use tracing::debug;

use super::AppState;
use super::error::ServerError;
use super::validation::{self, Mode};
use crate::api::ApiResponse;
use crate::database::{Collection, Document, ListQuery};
use crate::i18n;
use crate::models::descriptor_for;

/// Page size when the request names none.
pub const DEFAULT_LIMIT: usize = 20;

/// Largest page a single request may ask for.
pub const MAX_LIMIT: usize = 100;

type HandlerResult<T> = Result<T, ServerError>;

/// Translate list query parameters.
///
/// `limit` defaults to 20 and is capped at 100; `skip` wins over `page`;
/// `search` is free text; anything else is an equality filter. Empty values
/// are ignored.
pub fn parse_list_query(raw: Option<&str>) -> ListQuery {
    let mut query = ListQuery {
        limit: DEFAULT_LIMIT,
        ..Default::default()
    };
    let mut page: Option<usize> = None;
    let mut skip: Option<usize> = None;

    for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "limit" => {
                if let Ok(limit) = value.parse::<usize>()
                    && limit > 0
                {
                    query.limit = limit.min(MAX_LIMIT);
                }
            }
            "page" => page = value.parse().ok().filter(|p| *p > 0),
            "skip" | "offset" => skip = value.parse().ok(),
            "search" => query.search = Some(value.to_string()),
            _ => query.filters.push((key.into_owned(), value.to_string())),
        }
    }

    query.offset = skip.unwrap_or_else(|| page.map_or(0, |p| (p - 1).saturating_mul(query.limit)));
    query
}

fn collection(state: &AppState, lang: &str, entity: &str) -> HandlerResult<Arc<Collection>> {
    let descriptor = descriptor_for(entity).ok_or_else(|| ServerError::unknown_resource(lang))?;
    state
        .db
        .collection(descriptor.name)
        .map_err(|e| ServerError::from_store(lang, entity, e))
}

/// Parse a request body into a JSON object.
fn parse_object(lang: &str, body: &[u8]) -> HandlerResult<Document> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        _ => Err(ServerError::invalid_body(lang)),
    }
}

/// `GET /api/:entity`
pub(crate) async fn list(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    RawQuery(raw): RawQuery,
    headers: HeaderMap,
) -> HandlerResult<Json<ApiResponse<Vec<Document>>>> {
    let lang = state.locale(&headers);
    let collection = collection(&state, lang, &entity)?;
    let query = parse_list_query(raw.as_deref());

    let (documents, total) = collection.list(&query);
    debug!("Listed {} {} of {}", documents.len(), entity, total);

    let message = i18n::format_text(lang, "messages.listed", &[("total", &total.to_string())]);
    Ok(Json(ApiResponse::success(documents).with_total(total).with_message(message)))
}

/// `GET /api/:entity/:id`
pub(crate) async fn get_one(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> HandlerResult<Json<ApiResponse<Document>>> {
    let lang = state.locale(&headers);
    let document = collection(&state, lang, &entity)?
        .get(&id)
        .map_err(|e| ServerError::from_store(lang, &entity, e))?;
    Ok(Json(ApiResponse::success(document)))
}

/// `POST /api/:entity`
pub(crate) async fn create(
    State(state): State<AppState>,
    Path(entity): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> HandlerResult<(StatusCode, Json<ApiResponse<Document>>)> {
    let lang = state.locale(&headers);
    let collection = collection(&state, lang, &entity)?;
    let mut fields = parse_object(lang, &body)?;

    validation::validate(&entity, Mode::Create, &mut fields).map_err(|r| ServerError::rejected(lang, r))?;
    let document = collection
        .create(fields)
        .map_err(|e| ServerError::from_store(lang, &entity, e))?;

    let message = entity_message(lang, &entity, "messages.created");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(document).with_message(message))))
}

/// `PUT|PATCH /api/:entity/:id`; both merge the supplied fields.
pub(crate) async fn update(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> HandlerResult<Json<ApiResponse<Document>>> {
    let lang = state.locale(&headers);
    let collection = collection(&state, lang, &entity)?;
    let mut fields = parse_object(lang, &body)?;

    validation::validate(&entity, Mode::Update, &mut fields).map_err(|r| ServerError::rejected(lang, r))?;
    let document = collection
        .update(&id, fields)
        .map_err(|e| ServerError::from_store(lang, &entity, e))?;

    let message = entity_message(lang, &entity, "messages.updated");
    Ok(Json(ApiResponse::success(document).with_message(message)))
}

/// `DELETE /api/:entity/:id`
pub(crate) async fn delete(
    State(state): State<AppState>,
    Path((entity, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> HandlerResult<Json<Value>> {
    let lang = state.locale(&headers);
    collection(&state, lang, &entity)?
        .delete(&id)
        .map_err(|e| ServerError::from_store(lang, &entity, e))?;

    let message = entity_message(lang, &entity, "messages.deleted");
    Ok(Json(json!({"success": true, "message": message})))
}

/// `GET /api/health`
pub(crate) async fn health(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime": state.started_at.elapsed().as_secs(),
    })))
}

fn entity_message(lang: &str, entity: &str, key: &str) -> String {
    let resource = i18n::resource_name(lang, entity);
    i18n::format_text(lang, key, &[("resource", &resource)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_defaults() {
        let query = parse_list_query(None);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.offset, 0);
        assert!(query.filters.is_empty());
    }

    #[test]
    fn test_page_maps_to_offset() {
        let query = parse_list_query(Some("page=3&limit=20&search=ali+veli&city=Van&status="));
        assert_eq!(query.offset, 40);
        assert_eq!(query.search.as_deref(), Some("ali veli"));
        assert_eq!(query.filters, vec![("city".to_string(), "Van".to_string())]);
    }

    #[test]
    fn test_limit_is_capped_and_skip_wins() {
        let query = parse_list_query(Some("limit=500&page=2&skip=7"));
        assert_eq!(query.limit, MAX_LIMIT);
        assert_eq!(query.offset, 7);

        let query = parse_list_query(Some("limit=0&page=0"));
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.offset, 0);
    }
}
