use uuid::Uuid;

/// Prefixed unique id, e.g. `task_6f1c...`.
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4())
}
