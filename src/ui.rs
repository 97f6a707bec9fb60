use crate::clock::Clock;
use crate::dates;
use crate::planner::Planner;
use crate::policy::{self, Health, STATUS_ORDER};
use crate::storage;
use crate::task::{Task, TaskInput, TaskUpdate};
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Terminal shell around the planner: one column per status for the
/// selected day. Every mutation is written straight back to the store file.
pub struct App {
    pub planner: Planner,
    store_path: PathBuf,
    clock: Box<dyn Clock>,
    selected_status: usize,
    selected_task: usize,
    message: String,
}

impl App {
    pub fn new(planner: Planner, store_path: PathBuf, clock: Box<dyn Clock>) -> Self {
        Self {
            planner,
            store_path,
            clock,
            selected_status: 0,
            selected_task: 0,
            message: String::new(),
        }
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    fn persist(&mut self) {
        if let Err(err) = storage::save(&self.store_path, &self.planner) {
            warn!(%err, "failed to save store");
            self.message = format!("Failed to save: {}", err);
        }
    }

    fn column(&self, index: usize) -> Vec<&Task> {
        self.planner
            .tasks_on(self.planner.selected_date)
            .into_iter()
            .filter(|t| t.status == STATUS_ORDER[index])
            .collect()
    }

    fn current_task_id(&self) -> Option<String> {
        self.column(self.selected_status)
            .get(self.selected_task)
            .map(|t| t.id.clone())
    }

    fn clamp_selection(&mut self) {
        let len = self.column(self.selected_status).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }

    fn shift_day(&mut self, days: i64) {
        if let Some(date) = dates::add_days(self.planner.selected_date, days) {
            self.planner.set_selected_date(date);
            self.selected_task = 0;
            self.persist();
        }
    }

    fn advance_status(&mut self) {
        let Some(id) = self.current_task_id() else {
            return;
        };
        let next = policy::next_status(STATUS_ORDER[self.selected_status]);
        let update = TaskUpdate {
            status: Some(next),
            ..TaskUpdate::default()
        };
        if self.planner.update_task(&id, update, self.clock.as_ref()) {
            self.selected_status = policy::status_rank(next);
            let position = self
                .column(self.selected_status)
                .iter()
                .position(|t| t.id == id)
                .unwrap_or(0);
            self.selected_task = position;
            self.persist();
        }
    }

    fn cycle_recurrence(&mut self) {
        let Some(id) = self.current_task_id() else {
            return;
        };
        let Some(next) = self.planner.task(&id).map(|t| t.recurrence.cycle()) else {
            return;
        };
        if let Some(generated) = self.planner.set_recurrence(&id, next, self.clock.as_ref()) {
            self.message = format!("Recurrence: {} ({} generated)", next.label(), generated);
            self.persist();
        }
    }

    fn delete_current(&mut self) {
        if let Some(id) = self.current_task_id() {
            if self.planner.delete_task(&id) {
                self.clamp_selection();
                self.persist();
            }
        }
    }

    fn add_task(&mut self) {
        let Some(title) = prompt("Task title").filter(|t| !t.is_empty()) else {
            return;
        };
        let customer_hint = prompt("Customer (blank for default)").unwrap_or_default();
        let Some(customer_id) = self.resolve_customer(&customer_hint) else {
            self.message = "No customers to attach the task to".to_string();
            return;
        };
        let mut input = TaskInput::new(title, customer_id.clone(), self.planner.selected_date);
        if let Some(raw) = prompt("Start time HH[:MM] (blank for none)").filter(|t| !t.is_empty()) {
            let mut parts = raw.splitn(2, ':');
            let hours = parts.next().unwrap_or_default();
            input.start_time = dates::parse_time_parts(hours, parts.next());
            if input.start_time.is_none() {
                self.message = format!("Ignored invalid time '{}'", raw);
            }
        }
        self.planner.add_task(input, self.clock.as_ref());
        self.planner.set_quick_add_customer_id(Some(customer_id));
        self.selected_status = 0;
        self.persist();
    }

    fn export_backup(&mut self) {
        let dir = self.store_path.parent().map(Path::to_path_buf).unwrap_or_default();
        match storage::export_backup(&self.planner, &dir, self.clock.today()) {
            Ok(path) => self.message = format!("Exported backup to {}", path.display()),
            Err(err) => {
                warn!(%err, "export failed");
                self.message = format!("Export failed: {}", err);
            }
        }
    }

    fn import_backup(&mut self) {
        let Some(raw) = prompt("Backup file to import").filter(|p| !p.is_empty()) else {
            return;
        };
        match storage::import_backup(Path::new(&raw), self.clock.as_ref()) {
            Ok(planner) => {
                self.planner = planner;
                self.selected_task = 0;
                self.message = format!("Imported {} task(s)", self.planner.tasks.len());
                self.persist();
            }
            Err(err) => {
                warn!(%err, path = %raw, "import failed");
                self.message = format!("Import failed: {}", err);
            }
        }
    }

    /// Bucket counts across all tasks plus each customer's health.
    fn summary(&self) -> Line<'static> {
        let today = self.clock.today();
        let buckets = policy::bucket_tasks(&self.planner.tasks, today);
        let mut spans = vec![Span::raw(format!(
            "today {}  later {}  earlier {}  |",
            buckets.today.len(),
            buckets.later.len(),
            buckets.earlier.len()
        ))];
        for customer in &self.planner.customers {
            let health = self.planner.customer_health(&customer.id, today);
            let color = match health {
                Health::Green => Color::Green,
                Health::Yellow => Color::Yellow,
                Health::Red => Color::Red,
            };
            spans.push(Span::styled(
                format!(" {}: {}", customer.name, health.label()),
                Style::default().fg(color),
            ));
        }
        Line::from(spans)
    }

    fn resolve_customer(&self, hint: &str) -> Option<String> {
        let hint = hint.trim().to_lowercase();
        if !hint.is_empty() {
            if let Some(customer) = self
                .planner
                .customers
                .iter()
                .find(|c| c.name.to_lowercase().starts_with(&hint))
            {
                return Some(customer.id.clone());
            }
        }
        self.planner
            .quick_add_customer_id
            .clone()
            .filter(|id| self.planner.customer(id).is_some())
            .or_else(|| self.planner.customers.first().map(|c| c.id.clone()))
    }

    fn render(&self, f: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(f.area());

        let today = self.clock.today();
        let date = self.planner.selected_date;
        let mut header = vec![Span::styled(
            date.format("%A %Y-%m-%d").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if date == today {
            header.push(Span::styled(" (today)", Style::default().fg(Color::Green)));
        }
        if self.planner.last_snapshot().is_some() {
            header.push(Span::raw("  [u] undo available"));
        }
        if !self.message.is_empty() {
            header.push(Span::styled(
                format!("  {}", self.message),
                Style::default().fg(Color::Yellow),
            ));
        }
        f.render_widget(
            Paragraph::new(Line::from(header)).block(Block::default().borders(Borders::ALL)),
            rows[0],
        );

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(20); STATUS_ORDER.len()])
            .split(rows[1]);

        for (i, status) in STATUS_ORDER.iter().enumerate() {
            let items: Vec<ListItem> = self
                .column(i)
                .iter()
                .enumerate()
                .map(|(j, t)| {
                    let mut spans = Vec::new();
                    if let Some(start) = t.start_time {
                        spans.push(Span::raw(format!("{} ", dates::format_time(start))));
                    }
                    let title_style = if i == self.selected_status && j == self.selected_task {
                        Style::default().fg(Color::Black).bg(Color::Cyan)
                    } else if t.blocked_now {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default().fg(Color::White)
                    };
                    spans.push(Span::styled(t.title.clone(), title_style));
                    if t.recurrence.is_recurring() {
                        spans.push(Span::raw(format!(" ↻{}", t.recurrence.label())));
                    }
                    spans.push(Span::raw(format!(
                        " [{}] ({})",
                        t.priority.label(),
                        self.planner.customer_name(&t.customer_id)
                    )));
                    ListItem::new(Line::from(spans))
                })
                .collect();

            let list = List::new(items).block(
                Block::default()
                    .title(status.label())
                    .borders(Borders::ALL)
                    .border_style(if self.selected_status == i {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            );
            f.render_widget(list, chunks[i]);
        }

        f.render_widget(Paragraph::new(self.summary()), rows[2]);
        f.render_widget(
            Paragraph::new(
                "q quit  a add  enter status  r recur  d delete  [ ] day  t today  c copy  u undo  X clear  R reset  e export  i import",
            )
            .style(Style::default().fg(Color::DarkGray)),
            rows[3],
        );
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if let Event::Key(key) = event::read()? {
            app.message.clear();
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Char('a') => app.add_task(),
                KeyCode::Enter => app.advance_status(),
                KeyCode::Char('r') => app.cycle_recurrence(),
                KeyCode::Char('d') => app.delete_current(),
                KeyCode::Char('e') => app.export_backup(),
                KeyCode::Char('i') => app.import_backup(),
                KeyCode::Char('[') => app.shift_day(-1),
                KeyCode::Char(']') => app.shift_day(1),
                KeyCode::Char('t') => {
                    let today = app.clock.today();
                    app.planner.set_selected_date(today);
                    app.selected_task = 0;
                    app.persist();
                }
                KeyCode::Char('c') => {
                    let date = app.planner.selected_date;
                    let count = app.planner.copy_plan_to_tomorrow(date, app.clock.as_ref());
                    app.message = format!("Copied {} task(s) to tomorrow", count);
                    app.selected_task = 0;
                    app.persist();
                }
                KeyCode::Char('u') => {
                    if app.planner.restore_snapshot(app.clock.as_ref()) {
                        app.message = "Restored previous data".to_string();
                        app.clamp_selection();
                        app.persist();
                    } else {
                        app.message = "Nothing to undo (or more than 5 minutes ago)".to_string();
                    }
                }
                KeyCode::Char('X') => {
                    app.planner.clear_tasks(app.clock.as_ref());
                    app.message = "Cleared all tasks, press u to undo".to_string();
                    app.selected_task = 0;
                    app.persist();
                }
                KeyCode::Char('R') => {
                    app.planner.reset_to_seed(app.clock.as_ref());
                    app.message = "Reset to seed data, press u to undo".to_string();
                    app.selected_task = 0;
                    app.persist();
                }
                KeyCode::Left => {
                    if app.selected_status > 0 {
                        app.selected_status -= 1;
                        app.clamp_selection();
                    }
                }
                KeyCode::Right => {
                    if app.selected_status < STATUS_ORDER.len() - 1 {
                        app.selected_status += 1;
                        app.clamp_selection();
                    }
                }
                KeyCode::Up => {
                    if app.selected_task > 0 {
                        app.selected_task -= 1;
                    }
                }
                KeyCode::Down => {
                    let max_tasks = app.column(app.selected_status).len();
                    if app.selected_task + 1 < max_tasks {
                        app.selected_task += 1;
                    }
                }
                _ => {}
            }
        }
    }
}

fn prompt(message: &str) -> Option<String> {
    disable_raw_mode().ok();
    println!("{}", message);
    let mut input = String::new();
    let result = io::stdin().read_line(&mut input);
    enable_raw_mode().ok();
    result.ok().map(|_| input.trim().to_string())
}
