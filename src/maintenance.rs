//! Load-time maintenance: deduplicate, roll over, then generate recurrences,
//! at most once per calendar day.

use crate::clock::Clock;
use crate::planner::Planner;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub duplicates_removed: usize,
    pub rolled_over: usize,
    pub generated: usize,
}

/// Persisted marker recording the last day maintenance ran on this device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyGuard {
    #[serde(default)]
    pub last_run: Option<NaiveDate>,
}

impl DailyGuard {
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.last_run != Some(today)
    }

    pub fn mark(&mut self, today: NaiveDate) {
        self.last_run = Some(today);
    }
}

/// Runs the three passes in their required order. Each pass sees the
/// result of the previous one.
pub fn run_maintenance(planner: &mut Planner, clock: &dyn Clock) -> MaintenanceReport {
    let duplicates_removed = planner.deduplicate_recurring_tasks();
    let rolled_over = planner.rollover_incomplete_tasks(clock);
    let generated = planner.generate_recurring_tasks(clock);
    MaintenanceReport {
        duplicates_removed,
        rolled_over,
        generated,
    }
}

/// Runs maintenance unless the guard shows it already ran today. Returns
/// `None` when skipped; otherwise marks the guard for today.
pub fn run_daily_maintenance(
    planner: &mut Planner,
    guard: &mut DailyGuard,
    clock: &dyn Clock,
) -> Option<MaintenanceReport> {
    let today = clock.today();
    if !guard.is_due(today) {
        debug!(%today, "maintenance already ran today");
        return None;
    }

    let report = run_maintenance(planner, clock);
    guard.mark(today);
    info!(
        %today,
        duplicates_removed = report.duplicates_removed,
        rolled_over = report.rolled_over,
        generated = report.generated,
        "daily maintenance finished"
    );
    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::dates;
    use crate::task::{Recurrence, Task, TaskInput};

    fn date(s: &str) -> NaiveDate {
        dates::parse_iso(s).unwrap()
    }

    #[test]
    fn guard_allows_one_run_per_day() {
        let today = FixedClock::on(date("2024-06-10"));
        let mut planner = Planner::new(today.today);
        let mut guard = DailyGuard::default();

        assert!(run_daily_maintenance(&mut planner, &mut guard, &today).is_some());
        assert_eq!(guard.last_run, Some(today.today));
        assert!(run_daily_maintenance(&mut planner, &mut guard, &today).is_none());

        let tomorrow = FixedClock::on(date("2024-06-11"));
        assert!(run_daily_maintenance(&mut planner, &mut guard, &tomorrow).is_some());
    }

    #[test]
    fn passes_run_in_order() {
        let clock = FixedClock::on(date("2024-06-10"));
        let created = FixedClock::on(date("2024-06-01"));
        let mut planner = Planner::new(clock.today);

        let mut recurring = TaskInput::new("Standup", "c1", date("2024-06-05"));
        recurring.recurrence = Recurrence::Daily;
        let first = Task::from_input(recurring.clone(), created.now);
        let duplicate = Task::from_input(recurring, created.advanced(chrono::Duration::minutes(1)).now);
        let stale = Task::from_input(TaskInput::new("Invoice", "c1", date("2024-06-01")), created.now);
        planner.tasks = vec![first, duplicate, stale];

        let report = run_maintenance(&mut planner, &clock);
        assert_eq!(
            report,
            MaintenanceReport {
                duplicates_removed: 1,
                rolled_over: 1,
                generated: 1,
            }
        );
        // recurring task kept its date, the plain one moved to today
        assert_eq!(planner.tasks[0].date, date("2024-06-05"));
        assert_eq!(planner.tasks[1].date, date("2024-06-10"));
        assert_eq!(planner.tasks[2].date, date("2024-06-11"));
    }

    #[test]
    fn guard_serializes_as_last_run() {
        let guard = DailyGuard {
            last_run: Some(date("2024-06-10")),
        };
        let json = serde_json::to_string(&guard).unwrap();
        assert_eq!(json, r#"{"lastRun":"2024-06-10"}"#);
    }
}
