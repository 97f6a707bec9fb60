//! Status and priority policy.
//!
//! Every ordering and the open/completed split live here; views and engine
//! passes call into this module rather than comparing statuses themselves.

use crate::dates;
use crate::task::{Priority, Status, Task};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Canonical display order of statuses.
pub const STATUS_ORDER: [Status; 5] = [
    Status::NotStarted,
    Status::Done,
    Status::InProgress,
    Status::WaitingOnOthers,
    Status::Finished,
];

/// Order the status toggle steps through, which differs from display order.
pub const STATUS_CYCLE: [Status; 5] = [
    Status::NotStarted,
    Status::InProgress,
    Status::Done,
    Status::Finished,
    Status::WaitingOnOthers,
];

/// Ranking order of priorities: most urgent first.
pub const PRIORITY_ORDER: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

/// Days ahead within which an open deadline turns a customer yellow.
pub const DEADLINE_WARNING_DAYS: i64 = 3;

pub fn is_completed(status: Status) -> bool {
    matches!(status, Status::Done | Status::Finished)
}

pub fn is_open(status: Status) -> bool {
    !is_completed(status)
}

pub fn status_rank(status: Status) -> usize {
    STATUS_ORDER
        .iter()
        .position(|s| *s == status)
        .unwrap_or(STATUS_ORDER.len())
}

pub fn priority_rank(priority: Priority) -> usize {
    PRIORITY_ORDER
        .iter()
        .position(|p| *p == priority)
        .unwrap_or(PRIORITY_ORDER.len())
}

/// Status that follows `status` in the toggle cycle, wrapping around.
pub fn next_status(status: Status) -> Status {
    let position = STATUS_CYCLE
        .iter()
        .position(|s| *s == status)
        .unwrap_or(0);
    STATUS_CYCLE[(position + 1) % STATUS_CYCLE.len()]
}

/// Priority first, then start time (untimed tasks last), then title.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    priority_rank(a.priority)
        .cmp(&priority_rank(b.priority))
        .then_with(|| match (a.start_time, b.start_time) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.title.cmp(&b.title))
}

pub fn sort_tasks(tasks: &mut [&Task]) {
    tasks.sort_by(|a, b| compare_tasks(a, b));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Green,
    Yellow,
    Red,
}

impl Health {
    pub fn label(&self) -> &'static str {
        match self {
            Health::Green => "Stabil",
            Health::Yellow => "Følg med",
            Health::Red => "Trenger tiltak",
        }
    }
}

/// Health of a customer judged from its open tasks only.
pub fn customer_health<'a>(tasks: impl IntoIterator<Item = &'a Task>, today: NaiveDate) -> Health {
    let open: Vec<&Task> = tasks.into_iter().filter(|t| is_open(t.status)).collect();

    if open.iter().any(|t| t.blocked_now) {
        return Health::Red;
    }
    if open.iter().filter_map(|t| t.deadline).any(|d| d < today) {
        return Health::Red;
    }
    let horizon = dates::add_days(today, DEADLINE_WARNING_DAYS).unwrap_or(today);
    if open.iter().filter_map(|t| t.deadline).any(|d| d <= horizon) {
        return Health::Yellow;
    }
    Health::Green
}

/// Partition used by the all-tasks view.
#[derive(Debug, Default)]
pub struct TimeBuckets<'a> {
    pub today: Vec<&'a Task>,
    pub later: Vec<&'a Task>,
    pub earlier: Vec<&'a Task>,
}

pub fn bucket_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>, today: NaiveDate) -> TimeBuckets<'a> {
    let mut buckets = TimeBuckets::default();
    for task in tasks {
        if is_completed(task.status) || task.date < today {
            buckets.earlier.push(task);
        } else if task.date == today {
            buckets.today.push(task);
        } else {
            buckets.later.push(task);
        }
    }
    buckets
}
