use crate::clock::Clock;
use crate::customer::{
    Customer, CustomerInput, CustomerUpdate, LocationNote, LocationNoteUpdate, UNKNOWN_CUSTOMER,
};
use crate::dates;
use crate::ids::new_id;
use crate::policy;
use crate::seed::seed_customers;
use crate::task::{Recurrence, Status, Task, TaskInput, TaskUpdate};
use crate::{dedup, recurrence, rollover};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info};

/// How long, in minutes, a snapshot can be restored after it was taken.
pub const SNAPSHOT_TTL_MINUTES: i64 = 5;

/// Copy of customers and tasks taken before a destructive bulk operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub customers: Vec<Customer>,
    pub tasks: Vec<Task>,
    pub taken_at: DateTime<Utc>,
}

/// The single in-memory store. The shell owns one instance and persists it
/// after every mutation; the snapshot slot is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Planner {
    pub customers: Vec<Customer>,
    pub tasks: Vec<Task>,
    pub location_notes: Vec<LocationNote>,
    pub selected_date: NaiveDate,
    pub selected_task_id: Option<String>,
    pub quick_add_customer_id: Option<String>,
    last_snapshot: Option<Snapshot>,
}

impl Planner {
    pub fn new(selected_date: NaiveDate) -> Self {
        Self {
            customers: Vec::new(),
            tasks: Vec::new(),
            location_notes: Vec::new(),
            selected_date,
            selected_task_id: None,
            quick_add_customer_id: None,
            last_snapshot: None,
        }
    }

    pub fn seeded(clock: &dyn Clock) -> Self {
        let mut planner = Self::new(clock.today());
        planner.customers = seed_customers(clock.now());
        planner
    }

    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }

    fn take_snapshot(&mut self, clock: &dyn Clock) {
        self.last_snapshot = Some(Snapshot {
            customers: self.customers.clone(),
            tasks: self.tasks.clone(),
            taken_at: clock.now(),
        });
    }

    pub fn reset_to_seed(&mut self, clock: &dyn Clock) {
        self.take_snapshot(clock);
        self.customers = seed_customers(clock.now());
        self.tasks.clear();
        self.location_notes.clear();
        self.selected_date = clock.today();
        self.selected_task_id = None;
        self.quick_add_customer_id = None;
        info!("store reset to seed data");
    }

    pub fn clear_tasks(&mut self, clock: &dyn Clock) {
        self.take_snapshot(clock);
        let count = self.tasks.len();
        self.tasks.clear();
        self.selected_task_id = None;
        info!(count, "cleared all tasks");
    }

    /// Restores customers and tasks from the snapshot. Returns `false` without
    /// touching anything when there is no snapshot or it is too old.
    pub fn restore_snapshot(&mut self, clock: &dyn Clock) -> bool {
        let Some(snapshot) = self.last_snapshot.as_ref() else {
            return false;
        };
        if clock.now() - snapshot.taken_at >= Duration::minutes(SNAPSHOT_TTL_MINUTES) {
            debug!(taken_at = %snapshot.taken_at, "snapshot expired");
            return false;
        }
        self.customers = snapshot.customers.clone();
        self.tasks = snapshot.tasks.clone();
        self.selected_task_id = None;
        info!("restored snapshot");
        true
    }

    pub fn upsert_location_note(
        &mut self,
        customer_id: &str,
        location: &str,
        update: LocationNoteUpdate,
    ) {
        if let Some(note) = self
            .location_notes
            .iter_mut()
            .find(|n| n.customer_id == customer_id && n.location == location)
        {
            note.apply(update);
            return;
        }
        let mut note = LocationNote {
            id: new_id("loc"),
            customer_id: customer_id.to_string(),
            location: location.to_string(),
            has_content: false,
            date: None,
            comment: None,
        };
        note.apply(update);
        self.location_notes.push(note);
    }

    pub fn location_note(&self, customer_id: &str, location: &str) -> Option<&LocationNote> {
        self.location_notes
            .iter()
            .find(|n| n.customer_id == customer_id && n.location == location)
    }

    pub fn add_customer(&mut self, input: CustomerInput, clock: &dyn Clock) -> String {
        let now = clock.now();
        let customer = Customer {
            id: new_id("cust"),
            name: input.name,
            tags: input.tags,
            contact_note: input.contact_note,
            locations: input.locations,
            created_at: now,
            updated_at: now,
        };
        let id = customer.id.clone();
        self.customers.push(customer);
        id
    }

    pub fn update_customer(&mut self, id: &str, update: CustomerUpdate, clock: &dyn Clock) -> bool {
        match self.customers.iter_mut().find(|c| c.id == id) {
            Some(customer) => {
                customer.apply(update, clock.now());
                true
            }
            None => false,
        }
    }

    /// Removes a customer. Its tasks are kept and keep pointing at the old id.
    pub fn delete_customer(&mut self, id: &str) -> bool {
        let before = self.customers.len();
        self.customers.retain(|c| c.id != id);
        if self.quick_add_customer_id.as_deref() == Some(id) {
            self.quick_add_customer_id = None;
        }
        self.customers.len() != before
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// Display name for a customer id; dangling references read as unknown.
    pub fn customer_name(&self, id: &str) -> &str {
        self.customer(id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_CUSTOMER)
    }

    /// Adds a task and selects it. A recurring task immediately gets its next
    /// occurrence generated.
    pub fn add_task(&mut self, input: TaskInput, clock: &dyn Clock) -> String {
        let task = Task::from_input(input, clock.now());
        let id = task.id.clone();
        let recurring = task.recurrence.is_recurring();
        debug!(task_id = %id, date = %task.date, "adding task");
        self.tasks.push(task);
        self.selected_task_id = Some(id.clone());
        if recurring {
            self.generate_recurring_tasks(clock);
        }
        id
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn update_task(&mut self, id: &str, update: TaskUpdate, clock: &dyn Clock) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(task) => {
                task.apply(update, clock.now());
                true
            }
            None => false,
        }
    }

    /// Changes a task's recurrence; turning recurrence on runs the recurrence
    /// engine right away. Returns the number of tasks generated, or `None`
    /// when the id is unknown.
    pub fn set_recurrence(
        &mut self,
        id: &str,
        recurrence: Recurrence,
        clock: &dyn Clock,
    ) -> Option<usize> {
        let update = TaskUpdate {
            recurrence: Some(recurrence),
            ..TaskUpdate::default()
        };
        if !self.update_task(id, update, clock) {
            return None;
        }
        if recurrence.is_recurring() {
            Some(self.generate_recurring_tasks(clock))
        } else {
            Some(0)
        }
    }

    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.selected_task_id.as_deref() == Some(id) {
            self.selected_task_id = None;
        }
        self.tasks.len() != before
    }

    pub fn set_selected_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
    }

    pub fn set_selected_task_id(&mut self, id: Option<String>) {
        self.selected_task_id = id;
    }

    pub fn set_quick_add_customer_id(&mut self, id: Option<String>) {
        self.quick_add_customer_id = id;
    }

    /// Clones the plan for `date` onto the following day as one-off tasks.
    /// Completed tasks come back as in progress. Selects the following day.
    pub fn copy_plan_to_tomorrow(&mut self, date: NaiveDate, clock: &dyn Clock) -> usize {
        let Some(tomorrow) = dates::add_days(date, 1) else {
            return 0;
        };
        let now = clock.now();
        let clones: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.date == date)
            .map(|t| Task {
                id: new_id("task"),
                date: tomorrow,
                status: if policy::is_completed(t.status) {
                    Status::InProgress
                } else {
                    t.status
                },
                recurrence: Recurrence::None,
                recurrence_source_id: None,
                created_at: now,
                updated_at: now,
                ..t.clone()
            })
            .collect();
        let count = clones.len();
        self.tasks.extend(clones);
        self.selected_date = tomorrow;
        info!(count, from = %date, to = %tomorrow, "copied plan");
        count
    }

    /// Tasks on `date` in ranking order.
    pub fn tasks_on(&self, date: NaiveDate) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().filter(|t| t.date == date).collect();
        policy::sort_tasks(&mut tasks);
        tasks
    }

    pub fn tasks_for_customer(&self, customer_id: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.customer_id == customer_id)
            .collect()
    }

    pub fn customer_health(&self, customer_id: &str, today: NaiveDate) -> policy::Health {
        policy::customer_health(self.tasks_for_customer(customer_id), today)
    }

    pub fn generate_recurring_tasks(&mut self, clock: &dyn Clock) -> usize {
        recurrence::generate_recurring_tasks(&mut self.tasks, clock)
    }

    pub fn rollover_incomplete_tasks(&mut self, clock: &dyn Clock) -> usize {
        rollover::rollover_incomplete_tasks(&mut self.tasks, clock)
    }

    pub fn deduplicate_recurring_tasks(&mut self) -> usize {
        let removed = dedup::deduplicate_recurring_tasks(&mut self.tasks);
        if let Some(selected) = self.selected_task_id.as_deref() {
            if !self.tasks.iter().any(|t| t.id == selected) {
                self.selected_task_id = None;
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveTime;

    fn date(s: &str) -> NaiveDate {
        dates::parse_iso(s).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::on(date("2024-06-10"))
    }

    fn planner_with_task(clock: &FixedClock) -> (Planner, String) {
        let mut planner = Planner::seeded(clock);
        let customer = planner.customers[0].id.clone();
        let id = planner.add_task(TaskInput::new("Call", customer, clock.today), clock);
        (planner, id)
    }

    #[test]
    fn seeded_store_has_customers_and_no_tasks() {
        let planner = Planner::seeded(&clock());
        assert_eq!(planner.customers.len(), 5);
        assert!(planner.tasks.is_empty());
        assert_eq!(planner.selected_date, date("2024-06-10"));
    }

    #[test]
    fn add_task_selects_it() {
        let clock = clock();
        let (planner, id) = planner_with_task(&clock);
        assert_eq!(planner.selected_task_id.as_deref(), Some(id.as_str()));
        assert_eq!(planner.task(&id).map(|t| t.status), Some(Status::NotStarted));
    }

    #[test]
    fn adding_recurring_task_generates_next_occurrence() {
        let clock = clock();
        let mut planner = Planner::seeded(&clock);
        let mut input = TaskInput::new("Standup", "c1", clock.today);
        input.recurrence = Recurrence::Weekly;
        let id = planner.add_task(input, &clock);

        assert_eq!(planner.tasks.len(), 2);
        assert_eq!(planner.tasks[1].date, date("2024-06-17"));
        assert_eq!(planner.tasks[1].recurrence_source_id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn set_recurrence_triggers_generation() {
        let clock = clock();
        let (mut planner, id) = planner_with_task(&clock);

        assert_eq!(planner.set_recurrence(&id, Recurrence::Daily, &clock), Some(1));
        assert_eq!(planner.set_recurrence(&id, Recurrence::Daily, &clock), Some(0));
        assert_eq!(planner.set_recurrence(&id, Recurrence::None, &clock), Some(0));
        assert_eq!(planner.set_recurrence("missing", Recurrence::Daily, &clock), None);
    }

    #[test]
    fn update_and_delete_task() {
        let clock = clock();
        let (mut planner, id) = planner_with_task(&clock);
        let later = clock.advanced(Duration::minutes(3));

        let update = TaskUpdate {
            start_time: Some(NaiveTime::from_hms_opt(8, 0, 0)),
            ..TaskUpdate::default()
        };
        assert!(planner.update_task(&id, update, &later));
        assert_eq!(planner.task(&id).map(|t| t.updated_at), Some(later.now));
        assert!(!planner.update_task("missing", TaskUpdate::default(), &later));

        assert!(planner.delete_task(&id));
        assert!(planner.selected_task_id.is_none());
        assert!(!planner.delete_task(&id));
    }

    #[test]
    fn snapshot_restores_within_window() {
        let clock = clock();
        let (mut planner, _) = planner_with_task(&clock);
        let before_customers = planner.customers.clone();
        let before_tasks = planner.tasks.clone();

        planner.clear_tasks(&clock);
        assert!(planner.tasks.is_empty());

        let soon = clock.advanced(Duration::minutes(4));
        assert!(planner.restore_snapshot(&soon));
        assert_eq!(planner.customers, before_customers);
        assert_eq!(planner.tasks, before_tasks);
        assert!(planner.selected_task_id.is_none());
    }

    #[test]
    fn snapshot_expires_after_five_minutes() {
        let clock = clock();
        let (mut planner, _) = planner_with_task(&clock);

        planner.reset_to_seed(&clock);
        let late = clock.advanced(Duration::minutes(SNAPSHOT_TTL_MINUTES));
        assert!(!planner.restore_snapshot(&late));
        assert!(planner.tasks.is_empty());
    }

    #[test]
    fn restore_without_snapshot_fails() {
        let clock = clock();
        let (mut planner, _) = planner_with_task(&clock);
        let before = planner.clone();
        assert!(!planner.restore_snapshot(&clock));
        assert_eq!(planner, before);
    }

    #[test]
    fn only_latest_snapshot_is_kept() {
        let clock = clock();
        let (mut planner, _) = planner_with_task(&clock);

        planner.clear_tasks(&clock);
        planner.clear_tasks(&clock);
        assert!(planner.restore_snapshot(&clock));
        assert!(planner.tasks.is_empty());
    }

    #[test]
    fn location_notes_are_unique_per_pair() {
        let mut planner = Planner::new(date("2024-06-10"));
        planner.upsert_location_note("c1", "Bergen", LocationNoteUpdate::default());
        assert_eq!(planner.location_notes.len(), 1);
        assert!(!planner.location_notes[0].has_content);

        planner.upsert_location_note(
            "c1",
            "Bergen",
            LocationNoteUpdate {
                has_content: Some(true),
                comment: Some(Some("new signage".into())),
                ..LocationNoteUpdate::default()
            },
        );
        planner.upsert_location_note("c1", "Oslo", LocationNoteUpdate::default());

        assert_eq!(planner.location_notes.len(), 2);
        let note = planner.location_note("c1", "Bergen").unwrap();
        assert!(note.has_content);
        assert_eq!(note.comment.as_deref(), Some("new signage"));
    }

    #[test]
    fn deleted_customer_leaves_tasks_dangling() {
        let clock = clock();
        let (mut planner, id) = planner_with_task(&clock);
        let customer_id = planner.customers[0].id.clone();

        assert!(planner.delete_customer(&customer_id));
        assert_eq!(planner.tasks.len(), 1);
        let task = planner.task(&id).unwrap();
        assert_eq!(planner.customer_name(&task.customer_id), UNKNOWN_CUSTOMER);
    }

    #[test]
    fn generation_after_customer_delete_keeps_old_id() {
        let clock = clock();
        let mut planner = Planner::seeded(&clock);
        let customer_id = planner.customers[0].id.clone();
        let mut input = TaskInput::new("Standup", customer_id.clone(), clock.today);
        input.recurrence = Recurrence::Daily;
        let template = Task::from_input(input, clock.now);
        let template_id = template.id.clone();
        planner.tasks.push(template);

        assert!(planner.delete_customer(&customer_id));
        assert_eq!(planner.generate_recurring_tasks(&clock), 1);

        let spawned = planner
            .tasks
            .iter()
            .find(|t| t.recurrence_source_id.as_deref() == Some(template_id.as_str()))
            .unwrap();
        assert_eq!(spawned.date, date("2024-06-11"));
        assert_eq!(spawned.customer_id, customer_id);
        assert_eq!(planner.customer_name(&spawned.customer_id), UNKNOWN_CUSTOMER);
    }

    #[test]
    fn customer_crud() {
        let clock = clock();
        let mut planner = Planner::new(clock.today);
        let id = planner.add_customer(
            CustomerInput {
                name: "Acme".into(),
                tags: vec!["Oslo".into()],
                ..CustomerInput::default()
            },
            &clock,
        );
        let later = clock.advanced(Duration::minutes(1));
        assert!(planner.update_customer(
            &id,
            CustomerUpdate {
                name: Some("Acme AS".into()),
                ..CustomerUpdate::default()
            },
            &later,
        ));
        let customer = planner.customer(&id).unwrap();
        assert_eq!(customer.name, "Acme AS");
        assert_eq!(customer.updated_at, later.now);
        assert_eq!(customer.created_at, clock.now);
    }

    #[test]
    fn copy_plan_reopens_completed_tasks() {
        let clock = clock();
        let (mut planner, id) = planner_with_task(&clock);
        planner.update_task(
            &id,
            TaskUpdate {
                status: Some(Status::Done),
                ..TaskUpdate::default()
            },
            &clock,
        );

        assert_eq!(planner.copy_plan_to_tomorrow(clock.today, &clock), 1);
        assert_eq!(planner.selected_date, date("2024-06-11"));
        let copies = planner.tasks_on(date("2024-06-11"));
        let copy = copies[0];
        assert_eq!(copy.status, Status::InProgress);
        assert_ne!(copy.id, id);
        assert_eq!(copy.title, "Call");
    }

    #[test]
    fn dedup_clears_stale_selection() {
        let clock = clock();
        let mut planner = Planner::new(clock.today);
        let mut input = TaskInput::new("Call", "c1", date("2024-06-20"));
        input.recurrence = Recurrence::Weekly;
        planner.add_task(input.clone(), &clock);
        let later = clock.advanced(Duration::seconds(1));
        let second = planner.add_task(input, &later);

        assert_eq!(planner.selected_task_id.as_deref(), Some(second.as_str()));
        assert_eq!(planner.deduplicate_recurring_tasks(), 1);
        assert!(planner.selected_task_id.is_none());
    }
}
