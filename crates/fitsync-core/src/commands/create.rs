use std::collections::BTreeMap;

use chrono::{Local, Utc};

use crate::domain::Domain;
use crate::error::Result;
use crate::manager::BackupManager;
use crate::prune;
use crate::snapshot::{backup_name_at, BackupSnapshot};

/// Create a snapshot of all state domains and persist it.
///
/// The local write is the durability guarantee: it either succeeds and the
/// backup name is returned, or the whole operation fails. Mirroring to the
/// server is best-effort, and a warning is the only trace of a failed upload.
/// The retention cap is enforced afterward.
///
/// `auto` marks scheduler-triggered runs on the server side; snapshots are
/// administrative-origin either way.
pub fn run(mgr: &BackupManager, auto: bool) -> Result<String> {
    let name = backup_name_at(Local::now());

    // Capture each domain independently: a domain with no local state is
    // skipped, and a read failure on one domain does not block the rest.
    let mut domains = BTreeMap::new();
    for domain in Domain::ALL {
        match mgr.store().get(domain.store_key()) {
            Ok(Some(value)) => {
                domains.insert(domain, value);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    domain = domain.store_key(),
                    error = %e,
                    "skipping unreadable domain during snapshot capture"
                );
            }
        }
    }

    let snapshot = BackupSnapshot {
        timestamp: Utc::now(),
        device_info: mgr.config().device_info.clone(),
        is_admin_backup: true,
        domains,
    };

    let payload = serde_json::to_string(&snapshot)?;
    mgr.store().set(&name, &payload)?;
    tracing::info!(backup = %name, domains = snapshot.domains.len(), "local backup written");

    if let Err(e) = mgr.remote().create(&name, &snapshot, auto) {
        tracing::warn!(backup = %name, error = %e, "server mirror failed; local copy is authoritative");
    }

    if let Err(e) = prune::enforce(mgr.store(), mgr.config().max_local_backups) {
        tracing::warn!(error = %e, "retention enforcement failed after backup");
    }

    Ok(name)
}
