use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::manager::BackupManager;
use crate::snapshot::{is_backup_key, sort_newest_first, BackupInfo};

/// Reconcile the local and server backup sets into one merged listing.
///
/// Local backups with no server counterpart were never mirrored; they are
/// removed from the local store as part of the listing call. That cleanup
/// runs only when the server listing actually succeeded: after retry
/// exhaustion the engine degrades to the local-only view and deletes
/// nothing, so a transient outage cannot wipe unmirrored backups.
///
/// When a name exists on both sides the local entry wins: the merged view
/// carries its timestamp and drops the server duplicate. Entries are
/// returned newest-first; entries with no parsable timestamp sort last.
pub fn run(mgr: &BackupManager) -> Result<Vec<BackupInfo>> {
    let remote = match mgr.remote().list() {
        Ok(entries) => Some(entries),
        Err(e) => {
            tracing::warn!(error = %e, "server listing unavailable; skipping unsynced cleanup");
            None
        }
    };

    let mut merged = collect_local(mgr)?;

    if let Some(ref remote) = remote {
        let remote_names: HashSet<&str> = remote.iter().map(|b| b.name.as_str()).collect();
        merged.retain(|info| {
            if remote_names.contains(info.name.as_str()) {
                return true;
            }
            tracing::info!(backup = %info.name, "removing local backup with no server counterpart");
            if let Err(e) = mgr.store().remove(&info.name) {
                tracing::warn!(backup = %info.name, error = %e, "could not remove unsynced local backup");
            }
            false
        });
    }

    let local_names: HashSet<String> = merged.iter().map(|b| b.name.clone()).collect();
    if let Some(remote) = remote {
        for info in remote {
            if !local_names.contains(&info.name) {
                merged.push(info);
            }
        }
    }

    sort_newest_first(&mut merged);
    Ok(merged)
}

/// Enumerate local backup entries, reading each one's embedded timestamp.
///
/// A malformed (unparsable JSON) entry is logged and skipped; an entry
/// whose timestamp field is missing or not a datetime is listed with an
/// unknown timestamp.
fn collect_local(mgr: &BackupManager) -> Result<Vec<BackupInfo>> {
    let mut entries = Vec::new();
    for key in mgr.store().keys()? {
        if !is_backup_key(&key) {
            continue;
        }
        let raw = match mgr.store().get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(backup = %key, error = %e, "unreadable local backup entry, skipping");
                continue;
            }
        };
        let timestamp = match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => extract_timestamp(&value),
            Err(e) => {
                tracing::warn!(backup = %key, error = %e, "malformed local backup entry, skipping");
                continue;
            }
        };
        entries.push(BackupInfo {
            name: key,
            timestamp,
            is_local_backup: true,
            is_server_backup: false,
            device_info: None,
            size: Some(raw.len() as u64),
        });
    }
    Ok(entries)
}

fn extract_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    value
        .get("timestamp")
        .and_then(|t| t.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}
