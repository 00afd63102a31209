//! Per-entity clients bundled behind one handle.

use std::sync::Arc;

use axum::Router;

use super::crud::CrudClient;
use super::csrf::{CsrfTokenProvider, FetchedToken};
use super::dispatcher::RequestDispatcher;
use super::error::Result;
use super::inprocess::InProcessTransport;
use super::transport::{ReqwestTransport, Transport};
use crate::cache::{ResponseStore, SystemClock};
use crate::config::Config;
use crate::models::{
    AidApplication, Beneficiary, Donation, Entity, Meeting, MeetingActionItem, MeetingDecision, Message, Partner,
    Scholarship, Task, Todo, User, WorkflowNotification,
};

/// Typed clients for every entity, sharing one dispatcher.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub beneficiaries: CrudClient<Beneficiary>,
    pub donations: CrudClient<Donation>,
    pub tasks: CrudClient<Task>,
    pub todos: CrudClient<Todo>,
    pub users: CrudClient<User>,
    pub meetings: CrudClient<Meeting>,
    pub messages: CrudClient<Message>,
    pub aid_applications: CrudClient<AidApplication>,
    pub partners: CrudClient<Partner>,
    pub scholarships: CrudClient<Scholarship>,
    pub meeting_decisions: CrudClient<MeetingDecision>,
    pub meeting_action_items: CrudClient<MeetingActionItem>,
    pub workflow_notifications: CrudClient<WorkflowNotification>,
    dispatcher: RequestDispatcher,
}

impl ApiClient {
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        Self {
            beneficiaries: resource(&dispatcher),
            donations: resource(&dispatcher),
            tasks: resource(&dispatcher),
            todos: resource(&dispatcher),
            users: resource(&dispatcher),
            meetings: resource(&dispatcher),
            messages: resource(&dispatcher),
            aid_applications: resource(&dispatcher),
            partners: resource(&dispatcher),
            scholarships: resource(&dispatcher),
            meeting_decisions: resource(&dispatcher),
            meeting_action_items: resource(&dispatcher),
            workflow_notifications: resource(&dispatcher),
            dispatcher,
        }
    }

    /// HTTP client against `API_BASE_URL`, fetching its CSRF token from
    /// `/api/csrf` and caching reads on the system clock.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::from_config(config)?);
        let csrf = Arc::new(FetchedToken::new(Arc::clone(&transport)));
        let cache = Arc::new(config.cache_registry(Arc::new(SystemClock)));
        Ok(Self::new(RequestDispatcher::new(transport, csrf).with_cache(cache)))
    }

    /// Client that talks to `router` in-process.
    pub fn in_process(
        router: Router,
        cache: Option<Arc<dyn ResponseStore>>,
        csrf: Arc<dyn CsrfTokenProvider>,
    ) -> Self {
        let dispatcher = RequestDispatcher::new(Arc::new(InProcessTransport::new(router)), csrf);
        Self::new(match cache {
            Some(cache) => dispatcher.with_cache(cache),
            None => dispatcher,
        })
    }

    /// A client for any entity type, sharing this handle's dispatcher.
    pub fn resource<T: Entity>(&self) -> CrudClient<T> {
        resource(&self.dispatcher)
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }
}

fn resource<T: Entity>(dispatcher: &RequestDispatcher) -> CrudClient<T> {
    CrudClient::new(T::descriptor(), dispatcher.clone())
}
