use crate::error::Result;
use crate::manager::BackupManager;
use crate::snapshot::canonical_name;

/// Delete a backup locally and, best-effort, on the server.
///
/// A failed server delete does not fail the operation; the next listing
/// will show the entry as server-only and it can be deleted again.
pub fn run(mgr: &BackupManager, name: &str) -> Result<()> {
    let name = canonical_name(name);

    mgr.store().remove(&name)?;

    if let Err(e) = mgr.remote().delete(&name) {
        tracing::warn!(backup = %name, error = %e, "server delete failed; local copy removed");
    }

    tracing::info!(backup = %name, "backup deleted");
    Ok(())
}
