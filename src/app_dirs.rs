use directories::ProjectDirs;
use std::path::PathBuf;

/// One place that knows where on disk the app keeps its files.
pub struct AppDirs;

impl AppDirs {
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "typedrill").map(|pd| pd.config_dir().to_path_buf())
    }

    /// Persisted application settings.
    pub fn config_file() -> PathBuf {
        Self::config_dir()
            .map(|dir| dir.join("config.json"))
            .unwrap_or_else(|| PathBuf::from("typedrill_config.json"))
    }

    /// Best-record book.
    pub fn records_file() -> PathBuf {
        Self::config_dir()
            .map(|dir| dir.join("records.json"))
            .unwrap_or_else(|| PathBuf::from("typedrill_records.json"))
    }

    /// Per-session CSV history log.
    pub fn log_file() -> PathBuf {
        Self::config_dir()
            .map(|dir| dir.join("log.csv"))
            .unwrap_or_else(|| PathBuf::from("typedrill_log.csv"))
    }
}
