pub mod retry;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::RetryConfig;
use crate::error::{Result, SyncError};
use crate::snapshot::{canonical_name, BackupInfo, BackupSnapshot};

/// Request body for `POST /api/backups/create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackupRequest {
    pub name: String,
    pub data: BackupSnapshot,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<String>,
    #[serde(default)]
    pub is_auto_backup: bool,
}

/// Response body for `GET /api/backups/{name}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchBackupResponse {
    pub name: String,
    pub data: BackupSnapshot,
    pub timestamp: DateTime<Utc>,
}

/// HTTP client for the remote backup service.
pub struct RemoteClient {
    base_url: String,
    agent: ureq::Agent,
    token: Option<String>,
    retry: RetryConfig,
}

impl RemoteClient {
    pub fn new(base_url: &str, token: Option<&str>, retry: RetryConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(60))
            .timeout_write(Duration::from_secs(60))
            .build();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
            token: token.map(|t| t.to_string()),
            retry,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/backups/{path}", self.base_url)
    }

    fn apply_auth(&self, req: ureq::Request) -> ureq::Request {
        if let Some(ref token) = self.token {
            req.set("Authorization", &format!("Bearer {token}"))
        } else {
            req
        }
    }

    /// Mirror a snapshot to the server. The server keeps one row per unique
    /// name, so re-sending a name replaces the earlier upload.
    pub fn create(&self, name: &str, snapshot: &BackupSnapshot, auto: bool) -> Result<()> {
        let body = CreateBackupRequest {
            name: name.to_string(),
            data: snapshot.clone(),
            timestamp: snapshot.timestamp,
            device_info: Some(snapshot.device_info.clone()),
            is_auto_backup: auto,
        };
        let req = self.apply_auth(self.agent.post(&self.url("create")));
        req.send_json(&body)
            .map_err(|e| SyncError::Remote(format!("create '{name}': {e}")))?;
        Ok(())
    }

    /// List all server-side backups. Retries with exponential backoff on any
    /// failure; after the attempt budget is exhausted the error surfaces to
    /// the caller, which decides how to degrade.
    pub fn list(&self) -> Result<Vec<BackupInfo>> {
        let url = self.url("list");
        let resp = retry::retry_call(&self.retry, "list", || {
            let req = self
                .apply_auth(self.agent.get(&url))
                .set("Cache-Control", "no-cache")
                .set("Pragma", "no-cache");
            req.call()
        })
        .map_err(|e| SyncError::Remote(format!("list: {e}")))?;

        let mut entries: Vec<BackupInfo> = resp
            .into_json()
            .map_err(|e| SyncError::Remote(format!("list parse: {e}")))?;
        for entry in &mut entries {
            entry.is_server_backup = true;
        }
        Ok(entries)
    }

    /// Fetch a single backup by name (full or bare form). `Ok(None)` when the
    /// server has no row under that name.
    pub fn fetch(&self, name: &str) -> Result<Option<BackupSnapshot>> {
        let name = canonical_name(name);
        let url = self.url(&name);
        let req = self.apply_auth(self.agent.get(&url));
        match req.call() {
            Ok(resp) => {
                let body: FetchBackupResponse = resp
                    .into_json()
                    .map_err(|e| SyncError::Remote(format!("fetch '{name}' parse: {e}")))?;
                Ok(Some(body.data))
            }
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(SyncError::Remote(format!("fetch '{name}': {e}"))),
        }
    }

    /// Delete a server-side backup. A missing row counts as deleted.
    pub fn delete(&self, name: &str) -> Result<()> {
        let name = canonical_name(name);
        let url = self.url(&name);
        let req = self.apply_auth(self.agent.delete(&url));
        match req.call() {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(404, _)) => Ok(()),
            Err(e) => Err(SyncError::Remote(format!("delete '{name}': {e}"))),
        }
    }
}
