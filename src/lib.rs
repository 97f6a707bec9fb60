//! Personal day planner: tasks per customer, recurring task generation,
//! rollover of unfinished work and single-step undo.

pub mod clock;
pub mod config;
pub mod customer;
pub mod dates;
pub mod dedup;
pub mod error;
pub mod ids;
pub mod maintenance;
pub mod planner;
pub mod policy;
pub mod recurrence;
pub mod rollover;
pub mod seed;
pub mod storage;
pub mod task;
pub mod ui;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{PlannerError, Result};
pub use planner::Planner;
pub use task::{Priority, Recurrence, Status, Task, TaskInput, TaskUpdate};
