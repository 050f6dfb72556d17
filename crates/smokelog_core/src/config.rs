//! Core configuration defaults.
//!
//! # Responsibility
//! - Centralize storage naming and expiry defaults.
//! - Resolve on-disk locations under one data directory.

use chrono::Duration;
use std::path::{Path, PathBuf};

pub const DEFAULT_STORAGE_PREFIX: &str = "smokelog-";
pub const DEFAULT_DB_FILE_NAME: &str = "smokelog.db";
const LOG_DIR_NAME: &str = "logs";

/// Storage and layout settings shared by core callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Key prefix for the key/value store.
    pub storage_prefix: String,
    /// Expiry applied to the stored record list. `None` keeps it forever.
    pub default_ttl: Option<Duration>,
    pub db_file_name: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            default_ttl: None,
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
        }
    }
}

impl CoreConfig {
    pub fn db_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.db_file_name)
    }

    pub fn log_dir(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(LOG_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::CoreConfig;
    use std::path::Path;

    #[test]
    fn paths_resolve_under_data_dir() {
        let config = CoreConfig::default();
        let data_dir = Path::new("/var/lib/smokelog");

        assert_eq!(
            config.db_path(data_dir),
            Path::new("/var/lib/smokelog/smokelog.db")
        );
        assert_eq!(config.log_dir(data_dir), Path::new("/var/lib/smokelog/logs"));
        assert_eq!(config.default_ttl, None);
    }
}
