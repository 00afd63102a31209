//! Meetings with their decisions and action items.

use serde::{Deserialize, Serialize};

use super::{DocumentMeta, Entity};
use crate::cache::CacheCategory;

value_enum! {
    #[derive(Default)]
    pub enum MeetingStatus {
        #[default]
        Scheduled => "scheduled",
        Ongoing => "ongoing",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

value_enum! {
    #[derive(Default)]
    pub enum MeetingType {
        #[default]
        General => "general",
        Committee => "committee",
        Board => "board",
        Other => "other",
    }
}

value_enum! {
    #[derive(Default)]
    pub enum ActionItemStatus {
        #[default]
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(flatten)]
    pub meta: DocumentMeta,

    pub title: String,
    pub meeting_date: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<String>,

    #[serde(default)]
    pub participants: Vec<String>,

    #[serde(default)]
    pub status: MeetingStatus,

    #[serde(default)]
    pub meeting_type: MeetingType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agenda: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Meeting {
    const NAME: &'static str = "meetings";
    const CACHE_CATEGORY: CacheCategory = CacheCategory::Meetings;
}

/// A decision recorded in a meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingDecision {
    #[serde(flatten)]
    pub meta: DocumentMeta,

    pub meeting_id: String,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl Entity for MeetingDecision {
    const NAME: &'static str = "meeting-decisions";
    const CACHE_CATEGORY: CacheCategory = CacheCategory::Default;
}

/// Follow-up work assigned in a meeting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingActionItem {
    #[serde(flatten)]
    pub meta: DocumentMeta,

    pub meeting_id: String,
    pub title: String,
    pub assigned_to: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_id: Option<String>,

    #[serde(default)]
    pub status: ActionItemStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Entity for MeetingActionItem {
    const NAME: &'static str = "meeting-action-items";
    const CACHE_CATEGORY: CacheCategory = CacheCategory::Default;
}
