use std::path::PathBuf;

pub const STORE_FILE: &str = "dayplanner_store.json";
pub const GUARD_FILE: &str = "dayplanner_last_run.json";
pub const LOG_FILE: &str = "dayplanner.log";
pub const DEFAULT_LOG_FILTER: &str = "dayplanner=info";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Reads `DAYPLANNER_DATA_DIR` and `DAYPLANNER_LOG`, keeping defaults for
    /// anything unset or blank.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup("DAYPLANNER_DATA_DIR").filter(|v| !v.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(filter) = lookup("DAYPLANNER_LOG").filter(|v| !v.trim().is_empty()) {
            config.log_filter = filter.trim().to_string();
        }
        config
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    pub fn guard_path(&self) -> PathBuf {
        self.data_dir.join(GUARD_FILE)
    }
}
