//! Beneficiaries (ihtiyaç sahipleri).

use serde::{Deserialize, Serialize};

use super::{DocumentMeta, Entity};
use crate::cache::CacheCategory;

value_enum! {
    /// Record lifecycle. New records start as drafts.
    #[derive(Default)]
    pub enum BeneficiaryStatus {
        #[default]
        Draft => "TASLAK",
        Active => "AKTIF",
        Passive => "PASIF",
        Deleted => "SILINDI",
    }
}

/// A person or household receiving aid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Beneficiary {
    #[serde(flatten)]
    pub meta: DocumentMeta,

    pub name: String,

    /// 11-digit national id; unique across beneficiaries.
    pub tc_no: String,

    pub phone: String,
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default)]
    pub status: BeneficiaryStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Beneficiary {
    const NAME: &'static str = "beneficiaries";
    const CACHE_CATEGORY: CacheCategory = CacheCategory::Beneficiaries;
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_value(BeneficiaryStatus::Active).unwrap(), json!("AKTIF"));
        assert_eq!(BeneficiaryStatus::default().as_str(), "TASLAK");
        assert_eq!(BeneficiaryStatus::VALUES, &["TASLAK", "AKTIF", "PASIF", "SILINDI"]);
    }

    #[test]
    fn test_payload_omits_unset_fields() {
        let beneficiary = Beneficiary {
            name: "Ayşe Yılmaz".into(),
            tc_no: "12345678901".into(),
            phone: "0532 123 45 67".into(),
            address: "Atatürk Cad. No:1 Kadıköy".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&beneficiary).unwrap();

        assert_eq!(value["status"], "TASLAK");
        assert!(value.get("$id").is_none());
        assert!(value.get("email").is_none());
    }
}
