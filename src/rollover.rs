use crate::clock::Clock;
use crate::task::{Status, Task};
use tracing::{debug, info};

/// Moves every non-recurring task dated before today that is not "gjort" onto
/// today. Only `Status::Done` stops a task here; "ferdig" tasks move too.
///
/// Recurring tasks are left alone; the recurrence engine carries them forward
/// instead. Only `date` and `updated_at` change. Returns the number moved.
pub fn rollover_incomplete_tasks(tasks: &mut [Task], clock: &dyn Clock) -> usize {
    let today = clock.today();
    let now = clock.now();
    let mut moved = 0;

    for task in tasks.iter_mut().filter(|t| {
        t.date < today && t.status != Status::Done && !t.recurrence.is_recurring()
    }) {
        debug!(task_id = %task.id, from = %task.date, "rolling task over to today");
        task.date = today;
        task.updated_at = now;
        moved += 1;
    }

    if moved > 0 {
        info!(count = moved, %today, "rolled over incomplete tasks");
    }
    moved
}
