use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::store::StateStore;

/// File-backed state store: one UTF-8 file per key under a root directory.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open (creating if needed) a store rooted at the given directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        // Canonicalize for correct behavior under symlinked roots.
        let root = fs::canonicalize(&root)?;
        Ok(Self { root })
    }

    /// Keys are a flat namespace; anything path-like could escape the root.
    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(SyncError::InvalidKey("empty".into()));
        }
        if key == "." || key == ".." {
            return Err(SyncError::InvalidKey(key.into()));
        }
        if key.contains('/') || key.contains('\\') || key.contains('\0') {
            return Err(SyncError::InvalidKey(key.into()));
        }
        Ok(())
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        Self::validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Write via a temp file in the same directory, then atomically rename
    /// into place so readers never observe a partial value.
    fn atomic_write(&self, path: &Path, value: &str) -> Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(path).map_err(|e| SyncError::Io(e.error))?;
        Ok(())
    }
}

impl StateStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.resolve(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.resolve(key)?;
        self.atomic_write(&path, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                if let Some(name) = entry.file_name().to_str() {
                    keys.push(name.to_string());
                }
            }
        }
        Ok(keys)
    }
}
