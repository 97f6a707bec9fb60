use chrono::{Duration, NaiveDate, TimeZone, Utc};
use dayplanner::dates::parse_iso;
use dayplanner::maintenance::{run_daily_maintenance, DailyGuard};
use dayplanner::planner::SNAPSHOT_TTL_MINUTES;
use dayplanner::{FixedClock, Planner, Recurrence, Status, Task, TaskInput};
use std::collections::HashMap;

fn date(s: &str) -> NaiveDate {
    parse_iso(s).unwrap()
}

#[test]
fn daily_task_generates_tomorrow_once() {
    let clock = FixedClock::on(date("2024-06-10"));
    let mut planner = Planner::new(clock.today);
    let mut input = TaskInput::new("Standup", "c1", date("2024-06-05"));
    input.recurrence = Recurrence::Daily;
    let task_a = Task::from_input(input, clock.now);
    let a_id = task_a.id.clone();
    planner.tasks.push(task_a);

    assert_eq!(planner.generate_recurring_tasks(&clock), 1);
    let generated: Vec<_> = planner.tasks.iter().filter(|t| t.id != a_id).collect();
    assert_eq!(generated.len(), 1);
    assert_eq!(generated[0].date, date("2024-06-11"));
    assert_eq!(generated[0].recurrence_source_id.as_deref(), Some(a_id.as_str()));

    assert_eq!(planner.generate_recurring_tasks(&clock), 0);
}

#[test]
fn stale_plain_task_rolls_over() {
    let clock = FixedClock::on(date("2024-06-10"));
    let mut planner = Planner::new(clock.today);
    let task_b = Task::from_input(TaskInput::new("Invoice", "c1", date("2024-06-01")), clock.now);
    planner.tasks.push(task_b);

    assert_eq!(planner.rollover_incomplete_tasks(&clock), 1);
    assert_eq!(planner.tasks[0].date, date("2024-06-10"));
    assert_eq!(planner.tasks[0].status, Status::NotStarted);
}

#[test]
fn later_duplicate_is_removed() {
    let mut planner = Planner::new(date("2024-06-10"));
    let mut input = TaskInput::new("Call", "c1", date("2024-06-10"));
    input.recurrence = Recurrence::Weekly;
    let t1 = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
    let t2 = t1 + Duration::seconds(30);
    let first = Task::from_input(input.clone(), t1);
    let second = Task::from_input(input, t2);
    let first_id = first.id.clone();
    planner.tasks = vec![first, second];

    assert_eq!(planner.deduplicate_recurring_tasks(), 1);
    assert_eq!(planner.tasks.len(), 1);
    assert_eq!(planner.tasks[0].id, first_id);
    assert_eq!(planner.tasks[0].created_at, t1);
}

#[test]
fn undo_window_is_five_minutes() {
    let clock = FixedClock::on(date("2024-06-10"));
    let mut planner = Planner::seeded(&clock);
    planner.add_task(TaskInput::new("Call", "c1", clock.today), &clock);
    let before = (planner.customers.clone(), planner.tasks.clone());

    planner.reset_to_seed(&clock);
    let just_before = clock.advanced(Duration::minutes(SNAPSHOT_TTL_MINUTES) - Duration::seconds(1));
    assert!(planner.restore_snapshot(&just_before));
    assert_eq!((planner.customers.clone(), planner.tasks.clone()), before);

    planner.clear_tasks(&clock);
    let expired = clock.advanced(Duration::minutes(SNAPSHOT_TTL_MINUTES));
    assert!(!planner.restore_snapshot(&expired));
    assert!(planner.tasks.is_empty());
}

#[test]
fn month_of_daily_runs_keeps_one_task_per_lineage_and_date() {
    let start = date("2024-01-29");
    let mut planner = Planner::new(start);
    let mut guard = DailyGuard::default();

    for (title, recurrence) in [
        ("Standup", Recurrence::Daily),
        ("Review", Recurrence::Weekly),
        ("Billing", Recurrence::Monthly),
    ] {
        let mut input = TaskInput::new(title, "c1", start);
        input.recurrence = recurrence;
        planner.add_task(input, &FixedClock::on(start));
    }
    let mut plain = TaskInput::new("Write report", "c1", start);
    plain.status = Some(Status::InProgress);
    planner.add_task(plain, &FixedClock::on(start));

    for offset in 0..45 {
        let clock = FixedClock::on(start + Duration::days(offset));
        run_daily_maintenance(&mut planner, &mut guard, &clock);
        // a second load on the same day is a no-op
        assert!(run_daily_maintenance(&mut planner, &mut guard, &clock).is_none());
    }

    let mut per_lineage_date: HashMap<(String, NaiveDate), usize> = HashMap::new();
    for task in planner.tasks.iter().filter(|t| t.recurrence.is_recurring()) {
        *per_lineage_date
            .entry((task.lineage_key().to_string(), task.date))
            .or_default() += 1;
    }
    assert!(per_lineage_date.values().all(|count| *count == 1));

    // monthly: Jan 29 -> Feb 29 (leap year) -> Mar 29
    let billing: Vec<NaiveDate> = planner
        .tasks
        .iter()
        .filter(|t| t.title == "Billing")
        .map(|t| t.date)
        .collect();
    assert!(billing.contains(&date("2024-02-29")));
    assert!(billing.contains(&date("2024-03-29")));

    let report = planner.tasks.iter().find(|t| t.title == "Write report").unwrap();
    assert_eq!(report.date, start + Duration::days(44));
    assert_eq!(report.status, Status::InProgress);
}

#[test]
fn rollover_never_moves_recurring_tasks() {
    let clock = FixedClock::on(date("2024-06-10"));
    let mut planner = Planner::new(clock.today);
    for recurrence in [Recurrence::Daily, Recurrence::Weekly, Recurrence::Monthly] {
        let mut input = TaskInput::new("Routine", "c1", date("2024-06-01"));
        input.recurrence = recurrence;
        planner.tasks.push(Task::from_input(input, clock.now));
    }

    assert_eq!(planner.rollover_incomplete_tasks(&clock), 0);
    assert!(planner.tasks.iter().all(|t| t.date == date("2024-06-01")));
}
