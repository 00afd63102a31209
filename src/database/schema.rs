//! Collection definitions for every entity.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::Document;
use crate::models::{
    AidApplication, Beneficiary, Donation, Entity, Meeting, MeetingActionItem, MeetingDecision, Message, Partner,
    Scholarship, Task, Todo, User, WorkflowNotification,
};

/// Checks a document about to be stored; `Err` carries the reason.
pub type ShapeCheck = fn(&Document) -> Result<(), String>;

/// Accepts the document when it decodes as `T`.
pub fn decodes_as<T: DeserializeOwned>(document: &Document) -> Result<(), String> {
    serde_json::from_value::<T>(Value::Object(document.clone()))
        .map(drop)
        .map_err(|e| e.to_string())
}

fn any_shape(_: &Document) -> Result<(), String> {
    Ok(())
}

/// Static shape of a collection.
#[derive(Debug, Clone, Copy)]
pub struct CollectionSpec {
    pub name: &'static str,
    /// Fields whose non-empty values may appear on one document only.
    pub unique_fields: &'static [&'static str],
    /// Fields `search` matches against.
    pub search_fields: &'static [&'static str],
    /// Run on the final document of every create and update.
    pub shape: ShapeCheck,
}

impl CollectionSpec {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            unique_fields: &[],
            search_fields: &[],
            shape: any_shape,
        }
    }

    #[must_use]
    pub const fn unique(mut self, fields: &'static [&'static str]) -> Self {
        self.unique_fields = fields;
        self
    }

    #[must_use]
    pub const fn search(mut self, fields: &'static [&'static str]) -> Self {
        self.search_fields = fields;
        self
    }

    #[must_use]
    pub const fn shape(mut self, check: ShapeCheck) -> Self {
        self.shape = check;
        self
    }
}

pub const COLLECTIONS: [CollectionSpec; 13] = [
    CollectionSpec::new(Beneficiary::NAME)
        .unique(&["tc_no"])
        .search(&["name", "tc_no", "phone", "city"])
        .shape(decodes_as::<Beneficiary>),
    CollectionSpec::new(Donation::NAME)
        .unique(&["receipt_number"])
        .search(&["donor_name", "receipt_number", "donation_purpose"])
        .shape(decodes_as::<Donation>),
    CollectionSpec::new(Task::NAME)
        .search(&["title", "description"])
        .shape(decodes_as::<Task>),
    CollectionSpec::new(Todo::NAME)
        .search(&["title", "description"])
        .shape(decodes_as::<Todo>),
    CollectionSpec::new(User::NAME)
        .unique(&["email"])
        .search(&["name", "email"])
        .shape(decodes_as::<User>),
    CollectionSpec::new(Meeting::NAME)
        .search(&["title", "description", "location"])
        .shape(decodes_as::<Meeting>),
    CollectionSpec::new(Message::NAME)
        .search(&["subject", "content"])
        .shape(decodes_as::<Message>),
    CollectionSpec::new(AidApplication::NAME)
        .search(&["applicant_name", "description"])
        .shape(decodes_as::<AidApplication>),
    CollectionSpec::new(Partner::NAME)
        .search(&["name", "contact_person", "email"])
        .shape(decodes_as::<Partner>),
    CollectionSpec::new(Scholarship::NAME)
        .search(&["student_name", "school_name"])
        .shape(decodes_as::<Scholarship>),
    CollectionSpec::new(MeetingDecision::NAME)
        .search(&["title", "summary"])
        .shape(decodes_as::<MeetingDecision>),
    CollectionSpec::new(MeetingActionItem::NAME)
        .search(&["title", "description"])
        .shape(decodes_as::<MeetingActionItem>),
    CollectionSpec::new(WorkflowNotification::NAME)
        .search(&["title", "body"])
        .shape(decodes_as::<WorkflowNotification>),
];
