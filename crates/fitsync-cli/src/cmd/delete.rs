use fitsync_core::commands;
use fitsync_core::manager::BackupManager;

pub(crate) fn run(manager: &BackupManager, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    commands::delete::run(manager, name)?;
    println!("Deleted backup {}", fitsync_core::snapshot::canonical_name(name));
    Ok(())
}
