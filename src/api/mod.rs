//! Typed CRUD client layer.
//!
//! ## Architecture
//!
//! - `ApiResponse` - the `{success, ...}` envelope every endpoint returns
//! - `RequestDispatcher` - cache check, CSRF for mutations, envelope parsing
//! - `CrudClient` - `get_all`/`get_by_id`/`create`/`update`/`delete` for one entity
//! - `ApiClient` - a `CrudClient` per entity over a shared dispatcher
//! - `Transport` - the network seam (reqwest, or an in-process axum router)

mod client;
mod crud;
pub mod csrf;
mod dispatcher;
mod envelope;
mod error;
mod inprocess;
mod query;
mod transport;

pub use client::ApiClient;
pub use crud::CrudClient;
pub use csrf::{CookieJarToken, CsrfTokenProvider, FetchedToken, StaticToken};
pub use dispatcher::{CacheSpec, RequestDispatcher, RequestOptions, is_mutation};
pub use envelope::{ApiResponse, Failure, Success, success_object};
pub use error::{ApiError, Result, generic_status_message};
pub use inprocess::InProcessTransport;
pub use query::{FilterValue, QueryParams};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
