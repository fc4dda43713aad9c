use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, Table};

use fitsync_core::commands;
use fitsync_core::manager::BackupManager;

pub(crate) fn run(manager: &BackupManager) -> Result<(), Box<dyn std::error::Error>> {
    let backups = commands::list::run(manager)?;

    if backups.is_empty() {
        println!("No backups found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(["Name", "Date", "Local", "Server"]);

    for entry in &backups {
        let date = entry
            .timestamp
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        table.add_row(vec![
            Cell::new(&entry.name),
            Cell::new(date),
            Cell::new(if entry.is_local_backup { "yes" } else { "-" }),
            Cell::new(if entry.is_server_backup { "yes" } else { "-" }),
        ]);
    }
    println!("{table}");

    Ok(())
}
