use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::KvError;
use crate::traits::KvStore;

/// Two-layer KV store.
///
/// The file layer holds entries seeded from the config directory at
/// startup and is read-only for the life of the process; the writable
/// layer is whatever backend sits underneath (redb in production). On
/// reads and scans the file layer shadows the backend for the same key.
pub struct OverlayStore<B: KvStore> {
    files: RwLock<BTreeMap<String, Vec<u8>>>,
    backend: B,
}

impl<B: KvStore> OverlayStore<B> {
    pub fn new(backend: B) -> Self {
        Self { files: RwLock::new(BTreeMap::new()), backend }
    }

    /// Seed one read-only entry. Called by the file loader at startup.
    pub fn seed(&self, key: String, value: Vec<u8>) {
        self.files.write().unwrap().insert(key, value);
    }

    /// Number of seeded file-layer entries.
    pub fn seeded(&self) -> usize {
        self.files.read().unwrap().len()
    }
}

impl<B: KvStore> KvStore for OverlayStore<B> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        if let Some(value) = self.files.read().unwrap().get(key) {
            return Ok(Some(value.clone()));
        }
        self.backend.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        if self.is_readonly(key) {
            return Err(KvError::ReadOnly(key.to_string()));
        }
        self.backend.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), KvError> {
        if self.is_readonly(key) {
            return Err(KvError::ReadOnly(key.to_string()));
        }
        self.backend.delete(key)
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KvError> {
        let files = self.files.read().unwrap();

        let mut merged: BTreeMap<String, Vec<u8>> = self.backend.scan(prefix)?.into_iter().collect();
        for (key, value) in files.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            merged.insert(key.clone(), value.clone());
        }

        Ok(merged.into_iter().collect())
    }

    fn is_readonly(&self, key: &str) -> bool {
        self.files.read().unwrap().contains_key(key)
    }
}
