use crate::task::Task;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Collapses recurring tasks that share title, customer and date, keeping the
/// one created first. Non-recurring tasks are never touched, and a task alone
/// in its group always survives. Returns the number removed.
pub fn deduplicate_recurring_tasks(tasks: &mut Vec<Task>) -> usize {
    let mut earliest: HashMap<(&str, &str, NaiveDate), (DateTime<Utc>, usize)> = HashMap::new();

    for (index, task) in tasks.iter().enumerate() {
        if !task.recurrence.is_recurring() {
            continue;
        }
        let key = (task.title.as_str(), task.customer_id.as_str(), task.date);
        earliest
            .entry(key)
            .and_modify(|kept| {
                if task.created_at < kept.0 {
                    *kept = (task.created_at, index);
                }
            })
            .or_insert((task.created_at, index));
    }

    let survivors: HashSet<usize> = earliest.into_values().map(|(_, index)| index).collect();

    let before = tasks.len();
    let mut index = 0;
    tasks.retain(|task| {
        let keep = !task.recurrence.is_recurring() || survivors.contains(&index);
        if !keep {
            debug!(task_id = %task.id, title = %task.title, date = %task.date, "dropping duplicate");
        }
        index += 1;
        keep
    });
    let removed = before - tasks.len();

    if removed > 0 {
        info!(count = removed, "removed duplicate recurring tasks");
    }
    removed
}
