//! Workflow notifications sent to staff.

use serde::{Deserialize, Serialize};

use super::{DocumentMeta, Entity};
use crate::cache::CacheCategory;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowNotification {
    #[serde(flatten)]
    pub meta: DocumentMeta,

    pub recipient: String,

    /// `meeting`, `gorev` or `rapor`.
    pub category: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// `beklemede`, `gonderildi` or `okundu`.
    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
}

fn default_status() -> String {
    "beklemede".to_string()
}

impl Entity for WorkflowNotification {
    const NAME: &'static str = "workflow-notifications";
    const CACHE_CATEGORY: CacheCategory = CacheCategory::Default;
}
