use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("state store error: {0}")]
    Store(String),

    #[error("unsafe store key: '{0}'")]
    InvalidKey(String),

    #[error("backup not found: '{0}'")]
    BackupNotFound(String),

    #[error("remote backup service error: {0}")]
    Remote(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
