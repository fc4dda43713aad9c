use std::io::Write;
use std::path::Path;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};

use crate::error::ServerError;
use crate::state::{is_valid_backup_name, AppState, StoredBackup};

/// GET /api/backups/list: all stored rows, newest first.
pub async fn list_backups(State(state): State<AppState>) -> Result<Response, ServerError> {
    let data_dir = state.inner.data_dir.clone();
    let mut rows = tokio::task::spawn_blocking(move || read_rows(&data_dir))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;

    rows.sort_by(|a, b| b.0.timestamp.cmp(&a.0.timestamp));

    let items: Vec<serde_json::Value> = rows
        .into_iter()
        .map(|(row, size)| {
            serde_json::json!({
                "name": row.name,
                "timestamp": row.timestamp,
                "isServerBackup": true,
                "deviceInfo": row.device_info,
                "isAutoBackup": row.is_auto_backup,
                "size": size,
            })
        })
        .collect();

    Ok(Json(items).into_response())
}

/// POST /api/backups/create: upsert one row per unique name, then drop
/// every row beyond the `max_backups` most recent by timestamp.
pub async fn create_backup(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, ServerError> {
    let name = body
        .get("name")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    if name.is_empty() {
        return Err(ServerError::BadRequest("missing backup name".into()));
    }
    if !is_valid_backup_name(&name) {
        return Err(ServerError::BadRequest(format!(
            "invalid backup name: '{name}'"
        )));
    }
    let data = match body.get("data") {
        Some(d) if !d.is_null() => d.clone(),
        _ => return Err(ServerError::BadRequest("missing backup data".into())),
    };

    let timestamp = body
        .get("timestamp")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);
    let device_info = body
        .get("deviceInfo")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let is_auto_backup = body
        .get("isAutoBackup")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    let row = StoredBackup {
        name: name.clone(),
        timestamp,
        device_info,
        is_auto_backup,
        data,
    };

    let path = state
        .row_path(&name)
        .ok_or_else(|| ServerError::BadRequest(format!("invalid backup name: '{name}'")))?;
    let data_dir = state.inner.data_dir.clone();
    let max_backups = state.inner.config.max_backups;

    tokio::task::spawn_blocking(move || -> Result<(), ServerError> {
        write_row(&path, &row)?;
        enforce_cap(&data_dir, max_backups)
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))??;

    tracing::info!(backup = %name, "backup stored");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "name": name,
            "timestamp": timestamp,
            "stored": true,
        })),
    )
        .into_response())
}

/// GET /api/backups/{name}: one row, or 404.
pub async fn fetch_backup(
    State(state): State<AppState>,
    UrlPath(name): UrlPath<String>,
) -> Result<Response, ServerError> {
    let path = state
        .row_path(&name)
        .ok_or_else(|| ServerError::NotFound(format!("backup '{name}'")))?;

    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServerError::NotFound(format!("backup '{name}'")));
        }
        Err(e) => return Err(e.into()),
    };
    let row: StoredBackup = serde_json::from_str(&raw)
        .map_err(|e| ServerError::Internal(format!("corrupt row '{name}': {e}")))?;

    Ok(Json(serde_json::json!({
        "name": row.name,
        "data": row.data,
        "timestamp": row.timestamp,
    }))
    .into_response())
}

/// DELETE /api/backups/{name}: 204 on success, 404 when absent.
pub async fn delete_backup(
    State(state): State<AppState>,
    UrlPath(name): UrlPath<String>,
) -> Result<Response, ServerError> {
    let path = state
        .row_path(&name)
        .ok_or_else(|| ServerError::NotFound(format!("backup '{name}'")))?;

    match tokio::fs::remove_file(&path).await {
        Ok(()) => {
            tracing::info!(backup = %name, "backup deleted");
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ServerError::NotFound(format!("backup '{name}'")))
        }
        Err(e) => Err(e.into()),
    }
}

/// Read every row file with its size. Corrupt rows are logged and skipped.
fn read_rows(data_dir: &Path) -> Result<Vec<(StoredBackup, u64)>, ServerError> {
    let mut rows = Vec::new();
    let entries = match std::fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(rows),
        Err(e) => return Err(e.into()),
    };
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let raw = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<StoredBackup>(&raw) {
            Ok(row) => rows.push((row, raw.len() as u64)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping corrupt backup row");
            }
        }
    }
    Ok(rows)
}

/// Temp-file-and-rename write so readers never see a partial row.
fn write_row(path: &Path, row: &StoredBackup) -> Result<(), ServerError> {
    let dir = path
        .parent()
        .ok_or_else(|| ServerError::Internal("row path has no parent".into()))?;
    std::fs::create_dir_all(dir)?;
    let raw = serde_json::to_string(row).map_err(|e| ServerError::Internal(e.to_string()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(raw.as_bytes())?;
    tmp.persist(path)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(())
}

/// Remove every row beyond the `max_backups` most recent by timestamp.
fn enforce_cap(data_dir: &Path, max_backups: usize) -> Result<(), ServerError> {
    let mut rows = read_rows(data_dir)?;
    if rows.len() <= max_backups {
        return Ok(());
    }
    rows.sort_by(|a, b| b.0.timestamp.cmp(&a.0.timestamp));
    for (row, _) in rows.drain(max_backups..) {
        let path = data_dir.join(format!("{}.json", row.name));
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!(backup = %row.name, error = %e, "could not remove row beyond cap");
        } else {
            tracing::info!(backup = %row.name, "removed row beyond retention cap");
        }
    }
    Ok(())
}
