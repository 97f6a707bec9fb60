use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Shown wherever a task points at a customer that no longer exists.
pub const UNKNOWN_CUSTOMER: &str = "unknown customer";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerInput {
    pub name: String,
    pub tags: Vec<String>,
    pub contact_note: Option<String>,
    pub locations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub contact_note: Option<Option<String>>,
    pub locations: Option<Option<Vec<String>>>,
}

impl Customer {
    pub fn apply(&mut self, update: CustomerUpdate, now: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(contact_note) = update.contact_note {
            self.contact_note = contact_note;
        }
        if let Some(locations) = update.locations {
            self.locations = locations;
        }
        self.updated_at = now;
    }
}

/// Per-location status for a customer. At most one exists per
/// (customer, location) pair.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationNote {
    pub id: String,
    pub customer_id: String,
    pub location: String,
    #[serde(default)]
    pub has_content: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationNoteUpdate {
    pub has_content: Option<bool>,
    pub date: Option<Option<NaiveDate>>,
    pub comment: Option<Option<String>>,
}

impl LocationNote {
    pub fn apply(&mut self, update: LocationNoteUpdate) {
        if let Some(has_content) = update.has_content {
            self.has_content = has_content;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(comment) = update.comment {
            self.comment = comment;
        }
    }
}
