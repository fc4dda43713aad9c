use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use crate::config::{BackupConfig, RetryConfig};
use crate::error::{Result, SyncError};
use crate::manager::BackupManager;
use crate::store::StateStore;

/// In-memory state store for tests. Clones share the same map, so a test
/// can keep a handle for assertions while the manager owns another.
/// BTreeMap keeps enumeration deterministic.
#[derive(Clone)]
pub struct MemoryStore {
    data: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Full copy of the store contents, for byte-for-byte comparisons.
    pub fn dump(&self) -> BTreeMap<String, String> {
        self.data.lock().unwrap().clone()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.data.lock().unwrap().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.data.lock().unwrap().keys().cloned().collect())
    }
}

/// Store wrapper that fails `set` for keys starting with a given prefix.
/// Reads and removes pass through.
pub struct FailingStore {
    inner: MemoryStore,
    fail_set_prefix: String,
}

impl FailingStore {
    pub fn new(inner: MemoryStore, fail_set_prefix: &str) -> Self {
        Self {
            inner,
            fail_set_prefix: fail_set_prefix.to_string(),
        }
    }
}

impl StateStore for FailingStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if key.starts_with(&self.fail_set_prefix) {
            return Err(SyncError::Store(format!("write refused for '{key}'")));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }
}

/// Retry settings that keep failing tests fast.
pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        retry_delay_ms: 1,
        retry_max_delay_ms: 1,
    }
}

/// A manager whose remote calls all fail fast (nothing listens on port 1).
pub fn manager_without_server(store: impl StateStore + 'static) -> BackupManager {
    manager_for(store, "http://127.0.0.1:1")
}

pub fn manager_for(store: impl StateStore + 'static, server_url: &str) -> BackupManager {
    let mut config = BackupConfig::new(server_url);
    config.retry = fast_retry();
    config.device_info = "test-device".to_string();
    BackupManager::new(Box::new(store), config)
}

/// Spin up a TCP listener that serves one canned HTTP response per request,
/// in order, then return its URL and join handle. Request bodies are
/// consumed (Content-Length) so clients never block on writes.
pub fn mock_server(responses: Vec<String>) -> (String, std::thread::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let url = format!("http://127.0.0.1:{port}");
    let handle = std::thread::spawn(move || {
        for response in &responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut content_length = 0usize;
            let mut line = String::new();
            loop {
                line.clear();
                reader.read_line(&mut line).unwrap();
                let lower = line.to_ascii_lowercase();
                if let Some(rest) = lower.strip_prefix("content-length:") {
                    content_length = rest.trim().parse().unwrap_or(0);
                }
                if line.trim().is_empty() {
                    break;
                }
            }
            if content_length > 0 {
                let mut body = vec![0u8; content_length];
                reader.read_exact(&mut body).unwrap();
            }
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
    });
    (url, handle)
}

/// Build a canned HTTP response with a JSON body.
pub fn json_response(status: u16, reason: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

/// Build a canned empty HTTP response.
pub fn empty_response(status: u16, reason: &str) -> String {
    format!("HTTP/1.1 {status} {reason}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
}
