//! Partners and sponsors.

use serde::{Deserialize, Serialize};

use super::{DocumentMeta, Entity};
use crate::cache::CacheCategory;

value_enum! {
    #[derive(Default)]
    pub enum PartnerType {
        #[default]
        Organization => "organization",
        Individual => "individual",
        Sponsor => "sponsor",
    }
}

value_enum! {
    #[derive(Default)]
    pub enum PartnershipType {
        #[default]
        Donor => "donor",
        Supplier => "supplier",
        Volunteer => "volunteer",
        Sponsor => "sponsor",
        ServiceProvider => "service_provider",
    }
}

value_enum! {
    #[derive(Default)]
    pub enum PartnerStatus {
        Active => "active",
        Inactive => "inactive",
        #[default]
        Pending => "pending",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Partner {
    #[serde(flatten)]
    pub meta: DocumentMeta,

    pub name: String,

    #[serde(rename = "type")]
    pub partner_type: PartnerType,

    pub partnership_type: PartnershipType,

    #[serde(default)]
    pub status: PartnerStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaboration_start_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaboration_end_date: Option<String>,
}

impl Entity for Partner {
    const NAME: &'static str = "partners";
    const CACHE_CATEGORY: CacheCategory = CacheCategory::Default;
}
