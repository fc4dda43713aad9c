use crate::error::Result;
use crate::snapshot::is_backup_key;
use crate::store::StateStore;

/// Enforce the local retention cap, evicting the oldest backups first.
///
/// Recency is the timestamp embedded in the backup name; names are
/// zero-padded, so lexicographic order on names is chronological order.
/// Eviction touches only the local store; server-side copies have their
/// own cap, enforced by the create endpoint on each insert.
///
/// Returns the names that were evicted.
pub fn enforce(store: &dyn StateStore, max_backups: usize) -> Result<Vec<String>> {
    let mut backups: Vec<String> = store
        .keys()?
        .into_iter()
        .filter(|k| is_backup_key(k))
        .collect();

    if backups.len() <= max_backups {
        return Ok(Vec::new());
    }

    backups.sort_unstable();
    let excess = backups.len() - max_backups;
    let mut evicted = Vec::with_capacity(excess);
    for name in backups.drain(..excess) {
        store.remove(&name)?;
        tracing::info!(backup = %name, "evicted local backup beyond retention cap");
        evicted.push(name);
    }
    Ok(evicted)
}
