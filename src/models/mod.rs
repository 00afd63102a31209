//! Typed documents for every entity served under `/api/<name>`.
//!
//! Each document carries the store's metadata (`$id`, `$createdAt`,
//! `$updatedAt`) through [`DocumentMeta`]; the fields are absent on
//! payloads the client builds and filled in on documents the server echoes.

/// Declare a string-valued enum with its wire names.
///
/// Generates the serde renames, `as_str`, `VALUES` (wire names in
/// declaration order) and `Display`.
macro_rules! value_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($wire),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod aid_application;
pub mod beneficiary;
pub mod donation;
pub mod meeting;
pub mod message;
pub mod partner;
pub mod scholarship;
pub mod task;
pub mod user;
pub mod workflow_notification;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cache::CacheCategory;

pub use aid_application::AidApplication;
pub use beneficiary::{Beneficiary, BeneficiaryStatus};
pub use donation::{Currency, Donation, DonationStatus};
pub use meeting::{ActionItemStatus, Meeting, MeetingActionItem, MeetingDecision, MeetingStatus, MeetingType};
pub use message::Message;
pub use partner::{Partner, PartnerStatus, PartnerType, PartnershipType};
pub use scholarship::{Scholarship, ScholarshipStatus, ScholarshipType};
pub use task::{Priority, Task, TaskStatus, Todo};
pub use user::{User, UserRole};
pub use workflow_notification::WorkflowNotification;

/// Identifies a REST resource family and the cache bucket its reads use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityDescriptor {
    /// Path segment and cache-key prefix, e.g. `"aid-applications"`.
    pub name: &'static str,
    pub cache_category: CacheCategory,
}

impl EntityDescriptor {
    pub const fn new(name: &'static str, cache_category: CacheCategory) -> Self {
        Self { name, cache_category }
    }

    /// `/api/<name>`
    pub fn endpoint(&self) -> String {
        format!("/api/{}", self.name)
    }
}

/// A document type bound to its endpoint.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const NAME: &'static str;
    const CACHE_CATEGORY: CacheCategory;

    fn descriptor() -> EntityDescriptor {
        EntityDescriptor::new(Self::NAME, Self::CACHE_CATEGORY)
    }
}

/// Store-assigned metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(rename = "$updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Every descriptor the API serves, in route order.
pub const ALL_ENTITIES: [EntityDescriptor; 13] = [
    EntityDescriptor::new(Beneficiary::NAME, Beneficiary::CACHE_CATEGORY),
    EntityDescriptor::new(Donation::NAME, Donation::CACHE_CATEGORY),
    EntityDescriptor::new(Task::NAME, Task::CACHE_CATEGORY),
    EntityDescriptor::new(Todo::NAME, Todo::CACHE_CATEGORY),
    EntityDescriptor::new(User::NAME, User::CACHE_CATEGORY),
    EntityDescriptor::new(Meeting::NAME, Meeting::CACHE_CATEGORY),
    EntityDescriptor::new(Message::NAME, Message::CACHE_CATEGORY),
    EntityDescriptor::new(AidApplication::NAME, AidApplication::CACHE_CATEGORY),
    EntityDescriptor::new(Partner::NAME, Partner::CACHE_CATEGORY),
    EntityDescriptor::new(Scholarship::NAME, Scholarship::CACHE_CATEGORY),
    EntityDescriptor::new(MeetingDecision::NAME, MeetingDecision::CACHE_CATEGORY),
    EntityDescriptor::new(MeetingActionItem::NAME, MeetingActionItem::CACHE_CATEGORY),
    EntityDescriptor::new(WorkflowNotification::NAME, WorkflowNotification::CACHE_CATEGORY),
];

/// Look up a descriptor by path segment.
pub fn descriptor_for(name: &str) -> Option<EntityDescriptor> {
    ALL_ENTITIES.iter().copied().find(|d| d.name == name)
}
