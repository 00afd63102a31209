//! Aid applications.

use serde::{Deserialize, Serialize};

use super::{DocumentMeta, Entity};
use crate::cache::CacheCategory;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AidApplication {
    #[serde(flatten)]
    pub meta: DocumentMeta,

    pub applicant_name: String,

    /// `person` or `organization`.
    #[serde(default = "default_applicant_type")]
    pub applicant_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beneficiary_id: Option<String>,

    pub application_date: String,

    /// `draft`, `under_review`, `approved`, `ongoing`, `completed`.
    #[serde(default = "default_stage")]
    pub stage: String,

    /// `open` or `closed`.
    #[serde(default = "default_status")]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_time_aid: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_applicant_type() -> String {
    "person".to_string()
}

fn default_stage() -> String {
    "draft".to_string()
}

fn default_status() -> String {
    "open".to_string()
}

impl Entity for AidApplication {
    const NAME: &'static str = "aid-applications";
    const CACHE_CATEGORY: CacheCategory = CacheCategory::Default;
}
