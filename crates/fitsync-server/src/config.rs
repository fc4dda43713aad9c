/// Resolved server configuration, assembled from CLI flags and environment.
#[derive(Debug, Clone)]
pub struct ServerSection {
    /// Address to listen on.
    pub listen: String,
    /// Directory where backup rows are stored, one JSON file per name.
    pub data_dir: String,
    /// Bearer token for the /api routes; empty disables authentication.
    pub token: String,
    /// Log output format: "json" or "pretty".
    pub log_format: String,
    /// Rows retained per insert: everything beyond the N most recent by
    /// timestamp is removed when a new backup is stored.
    pub max_backups: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: "localhost:8686".to_string(),
            data_dir: "/var/lib/fitsync".to_string(),
            token: String::new(),
            log_format: "pretty".to_string(),
            max_backups: 5,
        }
    }
}
