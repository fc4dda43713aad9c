use fitsync_core::commands;
use fitsync_core::manager::BackupManager;

pub(crate) fn run(manager: &BackupManager) -> Result<(), Box<dyn std::error::Error>> {
    let name = commands::create::run(manager, false)?;
    println!("Created backup {name}");
    Ok(())
}
