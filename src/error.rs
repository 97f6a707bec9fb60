use std::path::PathBuf;

/// Errors surfaced by the planner library.
///
/// Routine outcomes such as an expired undo window are plain return
/// values, not errors.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode or decode planner data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid backup file: {reason}")]
    InvalidBackup { reason: String },
}

impl PlannerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
