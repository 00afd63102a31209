//! Student scholarships (burslar).

use serde::{Deserialize, Serialize};

use super::{DocumentMeta, Entity};
use crate::cache::CacheCategory;

value_enum! {
    #[derive(Default)]
    pub enum ScholarshipType {
        #[default]
        Monthly => "monthly",
        OneTime => "one-time",
        Annual => "annual",
    }
}

value_enum! {
    #[derive(Default)]
    pub enum ScholarshipStatus {
        #[default]
        Active => "active",
        Paused => "paused",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scholarship {
    #[serde(flatten)]
    pub meta: DocumentMeta,

    pub student_name: String,
    pub tc_no: String,
    pub school_name: String,

    /// 1 through 12.
    pub grade: u8,

    pub scholarship_amount: f64,
    pub scholarship_type: ScholarshipType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    #[serde(default)]
    pub status: ScholarshipStatus,
}

impl Entity for Scholarship {
    const NAME: &'static str = "scholarships";
    const CACHE_CATEGORY: CacheCategory = CacheCategory::Default;
}
