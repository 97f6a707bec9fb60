//! Recurrence engine: spawns the next dated occurrence of every due template.

use crate::clock::Clock;
use crate::dates;
use crate::ids::new_id;
use crate::task::{Recurrence, Status, Task};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

/// Target date of the next occurrence.
///
/// Daily tasks always target tomorrow relative to `today`, so a daily task
/// left in the past does not walk forward one day at a time. Weekly and
/// monthly tasks step from their own date.
pub fn next_occurrence(task: &Task, today: NaiveDate) -> Option<NaiveDate> {
    match task.recurrence {
        Recurrence::None => None,
        Recurrence::Daily => dates::add_days(today, 1),
        Recurrence::Weekly => dates::add_days(task.date, 7),
        Recurrence::Monthly => dates::add_months(task.date, 1),
    }
}

/// Appends one new occurrence for every recurring task dated today or
/// earlier, unless its lineage already has a task on the target date.
/// Existing tasks are never modified. Returns the number generated.
pub fn generate_recurring_tasks(tasks: &mut Vec<Task>, clock: &dyn Clock) -> usize {
    let today = clock.today();
    let now = clock.now();
    let mut generated: Vec<Task> = Vec::new();

    for source in tasks
        .iter()
        .filter(|t| t.recurrence.is_recurring() && t.date <= today)
    {
        let Some(target) = next_occurrence(source, today) else {
            warn!(task_id = %source.id, date = %source.date, "next occurrence out of range");
            continue;
        };
        let lineage = source.lineage_key();

        let occupied = tasks
            .iter()
            .chain(generated.iter())
            .any(|existing| occupies(existing, target, lineage, source));
        if occupied {
            continue;
        }

        debug!(source_id = %source.id, lineage, %target, "generating occurrence");
        generated.push(spawn_occurrence(source, target, lineage, now));
    }

    let count = generated.len();
    tasks.extend(generated);
    if count > 0 {
        info!(count, "generated recurring tasks");
    }
    count
}

fn occupies(existing: &Task, target: NaiveDate, lineage: &str, source: &Task) -> bool {
    existing.date == target
        && (existing.id == lineage
            || existing.recurrence_source_id.as_deref() == Some(lineage)
            || existing.id == source.id)
}

fn spawn_occurrence(source: &Task, date: NaiveDate, lineage: &str, now: DateTime<Utc>) -> Task {
    Task {
        id: new_id("task"),
        date,
        status: Status::default(),
        recurrence_source_id: Some(lineage.to_string()),
        created_at: now,
        updated_at: now,
        ..source.clone()
    }
}
