//! JSON persistence for the planner state and the daily maintenance marker.
//!
//! The store file is an envelope `{"state": {...}, "version": 0}`. Loading is
//! forgiving: a missing or unreadable file falls back to seed data, and single
//! records that fail to decode are skipped while the rest loads.

use crate::clock::Clock;
use crate::customer::{Customer, LocationNote};
use crate::dates;
use crate::error::{PlannerError, Result};
use crate::maintenance::DailyGuard;
use crate::planner::Planner;
use crate::seed::seed_customers;
use crate::task::Task;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const STORE_VERSION: u32 = 0;

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    state: StateRef<'a>,
    version: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateRef<'a> {
    customers: &'a [Customer],
    tasks: &'a [Task],
    location_notes: &'a [LocationNote],
    selected_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_task_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    quick_add_customer_id: Option<&'a str>,
}

#[derive(Deserialize)]
struct RawEnvelope {
    state: RawState,
    #[serde(default)]
    version: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawState {
    #[serde(default)]
    customers: Option<Vec<Value>>,
    tasks: Vec<Value>,
    #[serde(default)]
    location_notes: Vec<Value>,
    #[serde(default)]
    selected_date: Option<String>,
    #[serde(default)]
    selected_task_id: Option<String>,
    #[serde(default)]
    quick_add_customer_id: Option<String>,
}

pub fn to_json(planner: &Planner) -> Result<String> {
    let envelope = EnvelopeRef {
        state: StateRef {
            customers: &planner.customers,
            tasks: &planner.tasks,
            location_notes: &planner.location_notes,
            selected_date: planner.selected_date,
            selected_task_id: planner.selected_task_id.as_deref(),
            quick_add_customer_id: planner.quick_add_customer_id.as_deref(),
        },
        version: STORE_VERSION,
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Parses a store blob. The envelope must hold a `state.tasks` array;
/// individual records that do not decode are dropped with a warning, and a
/// missing `customers` key is filled from the seed list.
pub fn from_json(text: &str, clock: &dyn Clock) -> Result<Planner> {
    let raw: RawEnvelope = serde_json::from_str(text)?;
    if raw.version != STORE_VERSION {
        debug!(version = raw.version, "reading store written by another version");
    }
    let state = raw.state;

    let selected_date = state
        .selected_date
        .as_deref()
        .and_then(dates::parse_iso)
        .unwrap_or_else(|| clock.today());

    let mut planner = Planner::new(selected_date);
    // an older blob without a customers key starts from the seed list
    planner.customers = match state.customers {
        Some(values) => decode_records(values, "customer"),
        None => seed_customers(clock.now()),
    };
    planner.tasks = decode_records(state.tasks, "task");
    planner.location_notes = decode_records(state.location_notes, "location note");
    planner.selected_task_id = state.selected_task_id;
    planner.quick_add_customer_id = state.quick_add_customer_id;
    Ok(planner)
}

fn decode_records<T: DeserializeOwned>(values: Vec<Value>, kind: &str) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(kind, %err, "skipping malformed record");
                None
            }
        })
        .collect()
}

/// Loads the store, falling back to seed data when the file is missing or
/// cannot be parsed. Never fails.
pub fn load_or_seed(path: &Path, clock: &dyn Clock) -> Planner {
    if !path.exists() {
        info!(path = %path.display(), "no store file, starting from seed data");
        return Planner::seeded(clock);
    }
    let loaded = fs::read_to_string(path)
        .map_err(|err| PlannerError::io(path, err))
        .and_then(|text| from_json(&text, clock));
    match loaded {
        Ok(planner) => {
            info!(
                path = %path.display(),
                tasks = planner.tasks.len(),
                customers = planner.customers.len(),
                "loaded store"
            );
            planner
        }
        Err(err) => {
            warn!(path = %path.display(), %err, "store unreadable, starting from seed data");
            Planner::seeded(clock)
        }
    }
}

pub fn save(path: &Path, planner: &Planner) -> Result<()> {
    let json = to_json(planner)?;
    fs::write(path, json).map_err(|err| PlannerError::io(path, err))?;
    debug!(path = %path.display(), tasks = planner.tasks.len(), "saved store");
    Ok(())
}

/// Reads the maintenance marker. A missing or malformed marker means
/// maintenance has never run.
pub fn load_guard(path: &Path) -> DailyGuard {
    fs::read_to_string(path)
        .ok()
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or_default()
}

pub fn save_guard(path: &Path, guard: &DailyGuard) -> Result<()> {
    let json = serde_json::to_string(guard)?;
    fs::write(path, json).map_err(|err| PlannerError::io(path, err))
}

pub fn backup_file_name(today: NaiveDate) -> String {
    format!("dayplanner-backup-{}.json", dates::format_iso(today))
}

/// Writes the current store as a dated backup file in `dir`.
pub fn export_backup(planner: &Planner, dir: &Path, today: NaiveDate) -> Result<PathBuf> {
    let path = dir.join(backup_file_name(today));
    let json = to_json(planner)?;
    fs::write(&path, json).map_err(|err| PlannerError::io(&path, err))?;
    info!(path = %path.display(), "exported backup");
    Ok(path)
}

/// Reads a backup file. Anything that is not an envelope with a
/// `state.tasks` array is rejected.
pub fn import_backup(path: &Path, clock: &dyn Clock) -> Result<Planner> {
    let text = fs::read_to_string(path).map_err(|err| PlannerError::io(path, err))?;
    let value: Value = serde_json::from_str(&text).map_err(|err| PlannerError::InvalidBackup {
        reason: err.to_string(),
    })?;
    if !value
        .get("state")
        .and_then(|state| state.get("tasks"))
        .is_some_and(Value::is_array)
    {
        return Err(PlannerError::InvalidBackup {
            reason: "missing state.tasks array".to_string(),
        });
    }
    let planner = from_json(&text, clock)?;
    info!(path = %path.display(), tasks = planner.tasks.len(), "imported backup");
    Ok(planner)
}
