use crate::error::{Result, SyncError};
use crate::manager::BackupManager;
use crate::snapshot::{canonical_name, BackupSnapshot};

/// Rehydrate every state domain from a named backup.
///
/// Resolution is local-first with remote fallback. When neither source
/// yields a snapshot the operation fails without touching any state. A
/// remote-only hit is cached back into the local store so repeated
/// restores become local hits.
///
/// Domains absent from the snapshot are left untouched. There is no
/// rollback: a write failure partway through aborts the remaining writes,
/// and domains already rehydrated stay rehydrated.
pub fn run(mgr: &BackupManager, name: &str) -> Result<()> {
    let name = canonical_name(name);

    let snapshot = match mgr.store().get(&name)? {
        Some(raw) => serde_json::from_str::<BackupSnapshot>(&raw)?,
        None => match mgr.remote().fetch(&name) {
            Ok(Some(snapshot)) => {
                // Cache the fetched snapshot under its own name.
                match serde_json::to_string(&snapshot) {
                    Ok(raw) => {
                        if let Err(e) = mgr.store().set(&name, &raw) {
                            tracing::warn!(backup = %name, error = %e, "could not cache fetched backup locally");
                        }
                    }
                    Err(e) => {
                        tracing::warn!(backup = %name, error = %e, "could not re-serialize fetched backup");
                    }
                }
                snapshot
            }
            Ok(None) => return Err(SyncError::BackupNotFound(name)),
            Err(e) => {
                tracing::warn!(backup = %name, error = %e, "server lookup failed during restore");
                return Err(SyncError::BackupNotFound(name));
            }
        },
    };

    for (domain, value) in &snapshot.domains {
        mgr.store().set(domain.store_key(), value)?;
    }

    tracing::info!(backup = %name, domains = snapshot.domains.len(), "restore complete");
    Ok(())
}
