//! Internal messages and SMS/e-mail records.

use serde::{Deserialize, Serialize};

use super::{DocumentMeta, Entity};
use crate::cache::CacheCategory;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(flatten)]
    pub meta: DocumentMeta,

    /// `sms`, `email` or `internal`.
    pub message_type: String,

    pub sender: String,

    #[serde(default)]
    pub recipients: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    pub content: String,

    /// `draft`, `sent` or `failed`.
    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default)]
    pub is_read: bool,
}

fn default_status() -> String {
    "draft".to_string()
}

impl Entity for Message {
    const NAME: &'static str = "messages";
    const CACHE_CATEGORY: CacheCategory = CacheCategory::Messages;
}
