use crate::config::BackupConfig;
use crate::remote::RemoteClient;
use crate::store::StateStore;

/// Wires the local state store, the remote backup client, and the policy
/// configuration together. Constructed once at startup and passed by
/// reference to every backup operation, with no ambient globals.
pub struct BackupManager {
    store: Box<dyn StateStore>,
    remote: RemoteClient,
    config: BackupConfig,
}

impl BackupManager {
    pub fn new(store: Box<dyn StateStore>, config: BackupConfig) -> Self {
        let remote = RemoteClient::new(
            &config.server_url,
            config.token.as_deref(),
            config.retry.clone(),
        );
        Self {
            store,
            remote,
            config,
        }
    }

    pub fn store(&self) -> &dyn StateStore {
        self.store.as_ref()
    }

    pub fn remote(&self) -> &RemoteClient {
        &self.remote
    }

    pub fn config(&self) -> &BackupConfig {
        &self.config
    }
}
