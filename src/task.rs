use crate::dates::{self, hhmm};
use crate::ids::new_id;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Minutes added to a start time when a task is created without an end time.
pub const DEFAULT_BLOCK_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    #[serde(rename = "ikke begynt")]
    NotStarted,
    #[serde(rename = "gjort")]
    Done,
    #[serde(rename = "holder på")]
    InProgress,
    #[serde(rename = "står ikke på meg")]
    WaitingOnOthers,
    #[serde(rename = "ferdig")]
    Finished,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Status::NotStarted => "ikke begynt",
            Status::Done => "gjort",
            Status::InProgress => "holder på",
            Status::WaitingOnOthers => "står ikke på meg",
            Status::Finished => "ferdig",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    #[serde(rename = "Lav")]
    Low,
    #[default]
    Medium,
    #[serde(rename = "Høy")]
    High,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Lav",
            Priority::Medium => "Medium",
            Priority::High => "Høy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }

    /// Next value in the none → daily → weekly → monthly → none cycle.
    pub fn cycle(&self) -> Self {
        match self {
            Recurrence::None => Recurrence::Daily,
            Recurrence::Daily => Recurrence::Weekly,
            Recurrence::Weekly => Recurrence::Monthly,
            Recurrence::Monthly => Recurrence::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recurrence::None => "none",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub customer_id: String,
    pub date: NaiveDate,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm", skip_serializing_if = "Option::is_none")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_note: Option<String>,
    #[serde(default)]
    pub blocked_now: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Root of the recurrence chain this task was generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_source_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn from_input(input: TaskInput, now: DateTime<Utc>) -> Self {
        let end_time = match (input.start_time, input.end_time) {
            (Some(start), None) => Some(dates::add_minutes_to_time(start, DEFAULT_BLOCK_MINUTES)),
            (_, end) => end,
        };
        Self {
            id: new_id("task"),
            title: input.title,
            customer_id: input.customer_id,
            date: input.date,
            start_time: input.start_time,
            end_time,
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            deadline: input.deadline,
            note: input.note,
            blocked_note: input.blocked_note,
            blocked_now: input.blocked_now.unwrap_or(false),
            location: input.location,
            recurrence: input.recurrence,
            recurrence_source_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Key shared by every instance of this task's recurrence chain.
    pub fn lineage_key(&self) -> &str {
        self.recurrence_source_id.as_deref().unwrap_or(&self.id)
    }

    /// Merges a partial update. `updated_at` is stamped with `now` unless
    /// the update carries its own value.
    pub fn apply(&mut self, update: TaskUpdate, now: DateTime<Utc>) {
        let TaskUpdate {
            title,
            customer_id,
            date,
            start_time,
            end_time,
            status,
            priority,
            deadline,
            note,
            blocked_note,
            blocked_now,
            location,
            recurrence,
            updated_at,
        } = update;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(customer_id) = customer_id {
            self.customer_id = customer_id;
        }
        if let Some(date) = date {
            self.date = date;
        }
        if let Some(start_time) = start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = end_time {
            self.end_time = end_time;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(deadline) = deadline {
            self.deadline = deadline;
        }
        if let Some(note) = note {
            self.note = note;
        }
        if let Some(blocked_note) = blocked_note {
            self.blocked_note = blocked_note;
        }
        if let Some(blocked_now) = blocked_now {
            self.blocked_now = blocked_now;
        }
        if let Some(location) = location {
            self.location = location;
        }
        if let Some(recurrence) = recurrence {
            self.recurrence = recurrence;
        }
        self.updated_at = updated_at.unwrap_or(now);
    }
}

/// Already-structured creation input, as produced by a form or the quick-add parser.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskInput {
    pub title: String,
    pub customer_id: String,
    pub date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub deadline: Option<NaiveDate>,
    pub note: Option<String>,
    pub blocked_note: Option<String>,
    pub blocked_now: Option<bool>,
    pub location: Option<String>,
    pub recurrence: Recurrence,
}

impl TaskInput {
    pub fn new(title: impl Into<String>, customer_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            customer_id: customer_id.into(),
            date,
            start_time: None,
            end_time: None,
            status: None,
            priority: None,
            deadline: None,
            note: None,
            blocked_note: None,
            blocked_now: None,
            location: None,
            recurrence: Recurrence::None,
        }
    }
}

/// Field-level partial update. `None` leaves a field untouched; for optional
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub customer_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<Option<NaiveTime>>,
    pub end_time: Option<Option<NaiveTime>>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub deadline: Option<Option<NaiveDate>>,
    pub note: Option<Option<String>>,
    pub blocked_note: Option<Option<String>>,
    pub blocked_now: Option<bool>,
    pub location: Option<Option<String>>,
    pub recurrence: Option<Recurrence>,
    pub updated_at: Option<DateTime<Utc>>,
}
