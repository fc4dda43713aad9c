use crate::commands::list;
use crate::snapshot::BACKUP_PREFIX;
use crate::store::StateStore;
use crate::testutil::{json_response, manager_for, manager_without_server, mock_server, MemoryStore};

fn seed_local(store: &MemoryStore, name: &str, timestamp: &str) {
    store
        .set(
            name,
            &format!("{{\"timestamp\":\"{timestamp}\",\"deviceInfo\":\"d\",\"isAdminBackup\":true}}"),
        )
        .unwrap();
}

fn server_listing(entries: &[(&str, &str)]) -> String {
    let items: Vec<String> = entries
        .iter()
        .map(|(name, ts)| {
            format!(
                "{{\"name\":\"{name}\",\"timestamp\":\"{ts}\",\"isServerBackup\":true,\
                 \"deviceInfo\":\"srv\",\"isAutoBackup\":false,\"size\":64}}"
            )
        })
        .collect();
    format!("[{}]", items.join(","))
}

#[test]
fn duplicate_names_resolve_to_the_local_entry() {
    let name = format!("{BACKUP_PREFIX}-2024-07-01_10-00");
    let store = MemoryStore::new();
    seed_local(&store, &name, "2024-07-01T10:00:00Z");

    // Server knows the same name with a different timestamp.
    let body = server_listing(&[(&name, "2024-07-01T09:00:00Z")]);
    let (url, handle) = mock_server(vec![json_response(200, "OK", &body)]);

    let mgr = manager_for(store, &url);
    let merged = list::run(&mgr).unwrap();
    handle.join().unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].name, name);
    assert!(merged[0].is_local_backup);
    assert_eq!(
        merged[0].timestamp.unwrap().to_rfc3339(),
        "2024-07-01T10:00:00+00:00"
    );
}

#[test]
fn unsynced_local_backups_are_pruned_on_listing() {
    let synced = format!("{BACKUP_PREFIX}-2024-07-02_10-00");
    let orphan = format!("{BACKUP_PREFIX}-2024-07-02_11-00");
    let store = MemoryStore::new();
    seed_local(&store, &synced, "2024-07-02T10:00:00Z");
    seed_local(&store, &orphan, "2024-07-02T11:00:00Z");

    let body = server_listing(&[(&synced, "2024-07-02T10:00:00Z")]);
    let (url, handle) = mock_server(vec![json_response(200, "OK", &body)]);

    let mgr = manager_for(store.clone(), &url);
    let merged = list::run(&mgr).unwrap();
    handle.join().unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].name, synced);
    assert!(store.get(&orphan).unwrap().is_none());
    assert!(store.get(&synced).unwrap().is_some());
}

#[test]
fn listing_twice_is_idempotent() {
    let name = format!("{BACKUP_PREFIX}-2024-07-03_10-00");
    let store = MemoryStore::new();
    seed_local(&store, &name, "2024-07-03T10:00:00Z");

    let body = server_listing(&[(&name, "2024-07-03T10:00:00Z")]);
    let (url, handle) = mock_server(vec![
        json_response(200, "OK", &body),
        json_response(200, "OK", &body),
    ]);

    let mgr = manager_for(store, &url);
    let first = list::run(&mgr).unwrap();
    let second = list::run(&mgr).unwrap();
    handle.join().unwrap();

    let names = |v: &[crate::snapshot::BackupInfo]| {
        v.iter().map(|b| b.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&first), names(&second));
}

#[test]
fn retry_exhaustion_degrades_to_local_view_without_cleanup() {
    let local_only = format!("{BACKUP_PREFIX}-2024-07-04_10-00");
    let store = MemoryStore::new();
    seed_local(&store, &local_only, "2024-07-04T10:00:00Z");

    // Every attempt fails: 1 initial + 3 retries.
    let failures = vec![json_response(500, "Internal Server Error", "{}"); 4];
    let (url, handle) = mock_server(failures);

    let mgr = manager_for(store.clone(), &url);
    let merged = list::run(&mgr).unwrap();
    handle.join().unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].name, local_only);
    assert!(merged[0].is_local_backup);
    // The outage must not trigger unsynced cleanup.
    assert!(store.get(&local_only).unwrap().is_some());
}

#[test]
fn merged_view_sorts_newest_first_with_unknown_last() {
    let undated = format!("{BACKUP_PREFIX}-undated");
    let old = format!("{BACKUP_PREFIX}-2024-01-01_00-00");
    let new = format!("{BACKUP_PREFIX}-2024-07-05_00-00");
    let store = MemoryStore::new();
    seed_local(&store, &old, "2024-01-01T00:00:00Z");
    seed_local(&store, &new, "2024-07-05T00:00:00Z");
    // Valid JSON but no usable timestamp: listed with an unknown timestamp.
    store.set(&undated, "{\"deviceInfo\":\"d\"}").unwrap();

    let body = server_listing(&[
        (&old, "2024-01-01T00:00:00Z"),
        (&new, "2024-07-05T00:00:00Z"),
        (&undated, "2024-03-01T00:00:00Z"),
    ]);
    let (url, handle) = mock_server(vec![json_response(200, "OK", &body)]);

    let mgr = manager_for(store, &url);
    let merged = list::run(&mgr).unwrap();
    handle.join().unwrap();

    let names: Vec<&str> = merged.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, [new.as_str(), old.as_str(), undated.as_str()]);
}

#[test]
fn malformed_local_entries_are_skipped_not_fatal() {
    let good = format!("{BACKUP_PREFIX}-2024-07-06_10-00");
    let bad = format!("{BACKUP_PREFIX}-2024-07-06_11-00");
    let store = MemoryStore::new();
    seed_local(&store, &good, "2024-07-06T10:00:00Z");
    store.set(&bad, "{not json at all").unwrap();

    // Remote unreachable: local-only view.
    let mgr = manager_without_server(store);
    let merged = list::run(&mgr).unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].name, good);
}

#[test]
fn server_only_entries_appear_in_the_merged_view() {
    let remote_only = format!("{BACKUP_PREFIX}-2024-07-07_10-00");
    let store = MemoryStore::new();

    let body = server_listing(&[(&remote_only, "2024-07-07T10:00:00Z")]);
    let (url, handle) = mock_server(vec![json_response(200, "OK", &body)]);

    let mgr = manager_for(store, &url);
    let merged = list::run(&mgr).unwrap();
    handle.join().unwrap();

    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].name, remote_only);
    assert!(merged[0].is_server_backup);
    assert!(!merged[0].is_local_backup);
}
