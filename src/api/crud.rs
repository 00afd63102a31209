//! Generic create/read/update/delete client bound to one entity.

use std::fmt;
use std::marker::PhantomData;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::dispatcher::{CacheSpec, RequestDispatcher, RequestOptions};
use super::envelope::ApiResponse;
use super::error::Result;
use super::query::QueryParams;
use crate::models::EntityDescriptor;

/// The five standard operations against `/api/<entity>[/<id>]`.
///
/// Reads are cached under `<entity>:<query>` and `<entity>:<id>` in the
/// entity's category. A successful mutation drops every `<entity>:` key
/// from that category, so the next read goes to the server.
pub struct CrudClient<T> {
    entity: EntityDescriptor,
    base_endpoint: String,
    dispatcher: RequestDispatcher,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for CrudClient<T> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity,
            base_endpoint: self.base_endpoint.clone(),
            dispatcher: self.dispatcher.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for CrudClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudClient")
            .field("entity", &self.entity.name)
            .field("cache_category", &self.entity.cache_category)
            .finish()
    }
}

impl<T: DeserializeOwned> CrudClient<T> {
    pub fn new(entity: EntityDescriptor, dispatcher: RequestDispatcher) -> Self {
        Self {
            entity,
            base_endpoint: entity.endpoint(),
            dispatcher,
            _marker: PhantomData,
        }
    }

    pub fn entity(&self) -> EntityDescriptor {
        self.entity
    }

    /// List documents.
    pub async fn get_all(&self, params: &QueryParams) -> Result<ApiResponse<Vec<T>>> {
        let query = params.to_query_string();
        let endpoint = if query.is_empty() {
            self.base_endpoint.clone()
        } else {
            format!("{}?{}", self.base_endpoint, query)
        };
        let cache = self.cache_spec(&query);

        self.dispatcher
            .request(&endpoint, RequestOptions::get(), Some(&cache))
            .await
    }

    /// Fetch one document.
    pub async fn get_by_id(&self, id: &str) -> Result<ApiResponse<T>> {
        let cache = self.cache_spec(id);
        self.dispatcher
            .request(&self.item_endpoint(id), RequestOptions::get(), Some(&cache))
            .await
    }

    /// `POST /api/<entity>`
    pub async fn create<D: Serialize + ?Sized>(&self, data: &D) -> Result<ApiResponse<T>> {
        let options = RequestOptions::method(Method::POST).body(serde_json::to_value(data)?);
        let response = self.dispatcher.request(&self.base_endpoint, options, None).await?;
        self.invalidate();
        Ok(response)
    }

    /// `PUT /api/<entity>/<id>`
    pub async fn update<D: Serialize + ?Sized>(&self, id: &str, data: &D) -> Result<ApiResponse<T>> {
        let options = RequestOptions::method(Method::PUT).body(serde_json::to_value(data)?);
        let response = self.dispatcher.request(&self.item_endpoint(id), options, None).await?;
        self.invalidate();
        Ok(response)
    }

    /// `DELETE /api/<entity>/<id>`
    pub async fn delete(&self, id: &str) -> Result<ApiResponse<()>> {
        let response = self
            .dispatcher
            .request(&self.item_endpoint(id), RequestOptions::method(Method::DELETE), None)
            .await?;
        self.invalidate();
        Ok(response)
    }

    /// Drop every cached read of this entity.
    pub fn invalidate(&self) {
        self.dispatcher
            .invalidate(self.entity.cache_category, &self.cache_key(""));
    }

    fn item_endpoint(&self, id: &str) -> String {
        format!("{}/{}", self.base_endpoint, urlencoding::encode(id))
    }

    fn cache_key(&self, suffix: &str) -> String {
        format!("{}:{}", self.entity.name, suffix)
    }

    fn cache_spec(&self, suffix: &str) -> CacheSpec {
        CacheSpec::new(self.cache_key(suffix), self.entity.cache_category)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::BoxFuture;
    use parking_lot::Mutex;
    use reqwest::StatusCode;
    use reqwest::header::HeaderMap;
    use serde_json::{Value, json};

    use super::*;
    use crate::api::csrf::StaticToken;
    use crate::api::transport::{HttpRequest, HttpResponse, Transport};
    use crate::cache::{CacheCategory, CacheRegistry};

    /// Answers every request with `{success:true, data: []}` and records paths.
    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<(Method, String)>>,
    }

    impl Transport for Recorder {
        fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse>> {
            self.requests.lock().push((request.method.clone(), request.path.clone()));
            let body = if request.method == Method::GET && !request.path.contains("/api/tasks/") {
                json!({"success": true, "data": []})
            } else {
                json!({"success": true, "data": null})
            };
            Box::pin(async move {
                Ok(HttpResponse {
                    status: StatusCode::OK,
                    headers: HeaderMap::new(),
                    body: serde_json::to_vec(&body)?,
                })
            })
        }
    }

    fn client() -> (CrudClient<Value>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let dispatcher = RequestDispatcher::new(recorder.clone(), Arc::new(StaticToken::new("t")))
            .with_cache(Arc::new(CacheRegistry::new()));
        let entity = EntityDescriptor::new("tasks", CacheCategory::Tasks);
        (CrudClient::new(entity, dispatcher), recorder)
    }

    #[tokio::test]
    async fn test_endpoints() {
        let (tasks, recorder) = client();

        tasks.get_all(&QueryParams::new()).await.unwrap();
        tasks.get_all(&QueryParams::new().page(2).limit(20)).await.unwrap();
        tasks.get_by_id("a b").await.unwrap();
        tasks.create(&json!({"title": "x"})).await.unwrap();
        tasks.update("42", &json!({"title": "y"})).await.unwrap();
        tasks.delete("42").await.unwrap();

        let requests = recorder.requests.lock();
        let seen: Vec<_> = requests.iter().map(|(m, p)| format!("{m} {p}")).collect();
        assert_eq!(
            seen,
            vec![
                "GET /api/tasks",
                "GET /api/tasks?page=2&limit=20",
                "GET /api/tasks/a%20b",
                "POST /api/tasks",
                "PUT /api/tasks/42",
                "DELETE /api/tasks/42",
            ]
        );
    }

    #[tokio::test]
    async fn test_mutation_invalidates_cached_reads() {
        let (tasks, recorder) = client();
        let params = QueryParams::new().filter("status", "pending");

        tasks.get_all(&params).await.unwrap();
        tasks.get_all(&params).await.unwrap();
        assert_eq!(recorder.requests.lock().len(), 1);

        tasks.create(&json!({"title": "x"})).await.unwrap();
        tasks.get_all(&params).await.unwrap();
        assert_eq!(recorder.requests.lock().len(), 3);
    }
}
