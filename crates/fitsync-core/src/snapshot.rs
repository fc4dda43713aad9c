use std::collections::BTreeMap;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Domain;

/// Fixed prefix distinguishing backup entries from ordinary app-state keys
/// in the local store. Also the leading part of every backup name.
pub const BACKUP_PREFIX: &str = "fitness-app-backup";

/// A point-in-time capture of all application state domains.
///
/// Each captured domain holds the serialized string form of that domain's
/// local state at snapshot time. A domain whose local state was absent is
/// simply absent from the map; capture never fails as a whole because one
/// domain is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSnapshot {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "deviceInfo", default)]
    pub device_info: String,
    /// Provenance: created through the administrative backup subsystem.
    #[serde(rename = "isAdminBackup", default)]
    pub is_admin_backup: bool,
    #[serde(flatten)]
    pub domains: BTreeMap<Domain, String>,
}

/// One entry in the merged backup listing.
///
/// A backup may be known locally, remotely, or both. `timestamp` is `None`
/// when the stored entry carries no parsable timestamp; such entries sort
/// after every dated entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupInfo {
    pub name: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_local_backup: bool,
    #[serde(default)]
    pub is_server_backup: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Compute the backup name for the given local wall-clock time.
///
/// Minute granularity: two snapshots within the same minute share a name,
/// and the later write overwrites the earlier one, locally and remotely.
pub fn backup_name_at(time: DateTime<Local>) -> String {
    format!("{BACKUP_PREFIX}-{}", time.format("%Y-%m-%d_%H-%M"))
}

/// Whether a local store key names a backup entry (vs ordinary app state).
pub fn is_backup_key(key: &str) -> bool {
    key.starts_with(BACKUP_PREFIX)
}

/// Normalize a caller-supplied backup name to its canonical (full) form.
///
/// The remote service keys rows by the full name. Callers may pass either
/// the full name or just the timestamp part; both resolve to the same row.
pub fn canonical_name(name: &str) -> String {
    if name.starts_with(BACKUP_PREFIX) {
        name.to_string()
    } else {
        format!("{BACKUP_PREFIX}-{name}")
    }
}

/// Sort a listing newest-first; entries without a timestamp sort last.
pub fn sort_newest_first(entries: &mut [BackupInfo]) {
    entries.sort_by(|a, b| match (a.timestamp, b.timestamp) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn name_is_zero_padded_minute_granular() {
        let t = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 42).unwrap();
        assert_eq!(backup_name_at(t), "fitness-app-backup-2024-03-07_09-05");
    }

    #[test]
    fn lexicographic_name_order_is_chronological() {
        let a = backup_name_at(Local.with_ymd_and_hms(2024, 9, 30, 23, 59, 0).unwrap());
        let b = backup_name_at(Local.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap());
        assert!(a < b);
    }

    #[test]
    fn canonical_name_accepts_both_forms() {
        assert_eq!(
            canonical_name("fitness-app-backup-2024-01-01_00-00"),
            "fitness-app-backup-2024-01-01_00-00"
        );
        assert_eq!(
            canonical_name("2024-01-01_00-00"),
            "fitness-app-backup-2024-01-01_00-00"
        );
    }

    #[test]
    fn snapshot_serializes_domains_as_flat_fields() {
        let mut domains = BTreeMap::new();
        domains.insert(Domain::Posts, "[]".to_string());
        let snap = BackupSnapshot {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            device_info: "test".into(),
            is_admin_backup: true,
            domains,
        };
        let value = serde_json::to_value(&snap).unwrap();
        assert_eq!(value["posts"], "[]");
        assert_eq!(value["isAdminBackup"], true);
        assert!(value.get("currentUser").is_none());
    }

    #[test]
    fn undated_entries_sort_last() {
        let dated = |name: &str, ts| BackupInfo {
            name: name.into(),
            timestamp: ts,
            is_local_backup: true,
            is_server_backup: false,
            device_info: None,
            size: None,
        };
        let mut entries = vec![
            dated("unknown", None),
            dated("old", Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())),
            dated("new", Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())),
        ];
        sort_newest_first(&mut entries);
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["new", "old", "unknown"]);
    }
}
