use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ServerSection;

/// One stored backup row as persisted on disk (`<data_dir>/<name>.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredBackup {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub device_info: Option<String>,
    #[serde(default)]
    pub is_auto_backup: bool,
    pub data: serde_json::Value,
}

/// Shared application state, wrapped in Arc for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub config: ServerSection,
    pub data_dir: PathBuf,
}

impl AppState {
    pub fn new(config: ServerSection) -> Self {
        let configured = PathBuf::from(&config.data_dir);
        let data_dir = configured.canonicalize().unwrap_or(configured);
        Self {
            inner: Arc::new(AppStateInner { config, data_dir }),
        }
    }

    /// Resolve a backup name to its row file, rejecting anything that could
    /// escape the data directory.
    pub fn row_path(&self, name: &str) -> Option<PathBuf> {
        if !is_valid_backup_name(name) {
            return None;
        }
        Some(self.inner.data_dir.join(format!("{name}.json")))
    }
}

/// Backup names are flat identifiers: letters, digits, '-', '_', '.', and
/// bounded length. Anything else (separators, traversal) is rejected.
pub fn is_valid_backup_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 128
        && name != "."
        && name != ".."
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
}
