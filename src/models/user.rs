//! Staff users.

use serde::{Deserialize, Serialize};

use super::{DocumentMeta, Entity};
use crate::cache::CacheCategory;

value_enum! {
    #[derive(Default)]
    pub enum UserRole {
        Admin => "admin",
        #[default]
        User => "user",
        Viewer => "viewer",
        Moderator => "moderator",
    }
}

/// A staff account. `email` is unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(flatten)]
    pub meta: DocumentMeta,

    pub name: String,
    pub email: String,

    #[serde(default)]
    pub role: UserRole,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Entity for User {
    const NAME: &'static str = "users";
    const CACHE_CATEGORY: CacheCategory = CacheCategory::Users;
}
