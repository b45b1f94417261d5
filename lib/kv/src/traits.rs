use crate::error::KvError;

/// Key-value storage with a read-only layer.
///
/// Keys are namespaced with `:`-separated segments, e.g.
/// `config:qc_reasons:dhaka-1` or `config:ai:optimize_schedule`.
/// Entries seeded from config files cannot be written or deleted.
pub trait KvStore: Send + Sync {
    /// Value for `key`, or `None`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    /// Write `key`. Fails with [`KvError::ReadOnly`] for file-layer keys.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError>;

    /// Remove `key`. Fails with [`KvError::ReadOnly`] for file-layer keys.
    fn delete(&self, key: &str) -> Result<(), KvError>;

    /// All `(key, value)` pairs under `prefix`, sorted by key, both
    /// layers merged.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KvError>;

    /// Whether `key` lives in the read-only layer.
    fn is_readonly(&self, key: &str) -> bool;
}
