//! Donations (bağışlar).

use serde::{Deserialize, Serialize};

use super::{DocumentMeta, Entity};
use crate::cache::CacheCategory;

value_enum! {
    #[derive(Default)]
    pub enum Currency {
        #[default]
        Try => "TRY",
        Usd => "USD",
        Eur => "EUR",
    }
}

value_enum! {
    #[derive(Default)]
    pub enum DonationStatus {
        #[default]
        Pending => "pending",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

/// A recorded donation. `receipt_number` is unique across donations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    #[serde(flatten)]
    pub meta: DocumentMeta,

    pub donor_name: String,
    pub amount: f64,

    #[serde(default)]
    pub currency: Currency,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor_email: Option<String>,

    /// Turkish mobile number, `5XXXXXXXXX` once non-digits are removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub donor_phone: Option<String>,

    pub donation_type: String,
    pub donation_purpose: String,
    pub receipt_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,

    #[serde(default)]
    pub status: DonationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Donation {
    const NAME: &'static str = "donations";
    const CACHE_CATEGORY: CacheCategory = CacheCategory::Donations;
}
