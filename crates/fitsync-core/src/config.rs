use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};

/// Top-level configuration for the backup subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Base URL of the remote backup service, e.g. "https://fit.example.com".
    pub server_url: String,
    /// Bearer token for the backup API, when the server requires one.
    #[serde(default)]
    pub token: Option<String>,
    /// Free-text client identification string embedded in every snapshot.
    #[serde(default = "default_device_info")]
    pub device_info: String,
    /// Maximum number of backups retained in the local store.
    #[serde(default = "default_max_local_backups")]
    pub max_local_backups: usize,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl BackupConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            token: None,
            device_info: default_device_info(),
            max_local_backups: default_max_local_backups(),
            retry: RetryConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

/// Retry settings for the remote listing call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first failure (0 = none).
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// Initial delay between retries in milliseconds; doubles per attempt.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Upper bound on the per-attempt delay in milliseconds.
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

/// Recurring backup schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Interval between automatic backups, e.g. "30m", "24h", "2d".
    #[serde(default = "default_schedule_every")]
    pub every: String,
    /// Fire one backup immediately on activation.
    #[serde(default = "default_on_startup")]
    pub on_startup: bool,
    /// Random extra delay added to each interval, in seconds.
    #[serde(default)]
    pub jitter_seconds: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            every: default_schedule_every(),
            on_startup: default_on_startup(),
            jitter_seconds: 0,
        }
    }
}

impl ScheduleConfig {
    pub fn every_duration(&self) -> Result<Duration> {
        parse_human_duration(&self.every)
    }
}

/// Parse a simple duration string like "30m", "4h", or "2d".
/// A bare number is read as days.
pub fn parse_human_duration(raw: &str) -> Result<Duration> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(SyncError::Config("duration must not be empty".into()));
    }

    let (num_part, unit) = match input.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => (&input[..input.len() - 1], Some(c)),
        _ => (input, None),
    };

    let value: u64 = num_part
        .parse()
        .map_err(|_| SyncError::Config(format!("invalid duration value: '{raw}'")))?;

    let secs = match unit {
        Some('m') | Some('M') => value.saturating_mul(60),
        Some('h') | Some('H') => value.saturating_mul(60 * 60),
        Some('d') | Some('D') => value.saturating_mul(60 * 60 * 24),
        Some(other) => {
            return Err(SyncError::Config(format!(
                "unsupported duration suffix '{other}' in '{raw}' (use m/h/d)"
            )));
        }
        None => value.saturating_mul(60 * 60 * 24),
    };

    if secs == 0 {
        return Err(SyncError::Config("duration must be greater than zero".into()));
    }

    Ok(Duration::from_secs(secs))
}

fn default_device_info() -> String {
    format!(
        "fitsync/{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

fn default_max_local_backups() -> usize {
    5
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_retry_max_delay_ms() -> u64 {
    60_000
}

fn default_schedule_every() -> String {
    "24h".to_string()
}

fn default_on_startup() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_human_duration_units() {
        assert_eq!(parse_human_duration("30m").unwrap().as_secs(), 30 * 60);
        assert_eq!(parse_human_duration("24h").unwrap().as_secs(), 24 * 60 * 60);
        assert_eq!(parse_human_duration("2d").unwrap().as_secs(), 2 * 24 * 60 * 60);
    }

    #[test]
    fn parse_human_duration_bare_number_is_days() {
        assert_eq!(parse_human_duration("1").unwrap().as_secs(), 24 * 60 * 60);
    }

    #[test]
    fn parse_human_duration_rejects_garbage() {
        assert!(parse_human_duration("").is_err());
        assert!(parse_human_duration("soon").is_err());
        assert!(parse_human_duration("5x").is_err());
        assert!(parse_human_duration("0h").is_err());
    }

    #[test]
    fn defaults_match_policy() {
        let cfg = BackupConfig::new("http://localhost:8686");
        assert_eq!(cfg.max_local_backups, 5);
        assert_eq!(cfg.retry.max_retries, 3);
        assert_eq!(cfg.retry.retry_delay_ms, 500);
        assert_eq!(cfg.schedule.every, "24h");
        assert!(cfg.schedule.on_startup);
    }
}
