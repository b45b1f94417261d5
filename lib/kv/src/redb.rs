use std::path::Path;

use redb::{Database, TableDefinition};

use crate::error::KvError;
use crate::traits::KvStore;

const SETTINGS: TableDefinition<&str, &[u8]> = TableDefinition::new("settings");

fn backend(e: impl std::fmt::Display) -> KvError {
    KvError::Backend(e.to_string())
}

/// [`KvStore`] over a redb file. Every key is writable; the read-only
/// file layer is stacked on top by [`crate::OverlayStore`].
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at `path` and make sure the
    /// settings table exists.
    pub fn open(path: &Path) -> Result<Self, KvError> {
        let db = Database::create(path).map_err(backend)?;
        let init = db.begin_write().map_err(backend)?;
        init.open_table(SETTINGS).map(drop).map_err(backend)?;
        init.commit().map_err(backend)?;
        Ok(Self { db })
    }
}

impl KvStore for RedbStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = txn.open_table(SETTINGS).map_err(backend)?;
        let hit = table.get(key).map_err(backend)?;
        Ok(hit.map(|v| v.value().to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        let txn = self.db.begin_write().map_err(backend)?;
        {
            let mut table = txn.open_table(SETTINGS).map_err(backend)?;
            table.insert(key, value).map_err(backend)?;
        }
        txn.commit().map_err(backend)
    }

    fn delete(&self, key: &str) -> Result<(), KvError> {
        let txn = self.db.begin_write().map_err(backend)?;
        {
            let mut table = txn.open_table(SETTINGS).map_err(backend)?;
            table.remove(key).map_err(backend)?;
        }
        txn.commit().map_err(backend)
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KvError> {
        let txn = self.db.begin_read().map_err(backend)?;
        let table = txn.open_table(SETTINGS).map_err(backend)?;

        let mut hits = Vec::new();
        for entry in table.range(prefix..).map_err(backend)? {
            let (k, v) = entry.map_err(backend)?;
            let key = k.value().to_string();
            if !key.starts_with(prefix) {
                break;
            }
            hits.push((key, v.value().to_vec()));
        }
        Ok(hits)
    }

    fn is_readonly(&self, _key: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (RedbStore, tempfile::NamedTempFile) {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        (RedbStore::open(tmp.path()).unwrap(), tmp)
    }

    #[test]
    fn set_get_delete() {
        let (kv, _tmp) = store();
        assert!(kv.get("session:abc").unwrap().is_none());
        kv.set("session:abc", b"live").unwrap();
        assert_eq!(kv.get("session:abc").unwrap().as_deref(), Some(&b"live"[..]));
        kv.delete("session:abc").unwrap();
        assert!(kv.get("session:abc").unwrap().is_none());
    }

    #[test]
    fn scan_stops_at_the_prefix_boundary() {
        let (kv, _tmp) = store();
        kv.set("config:qc_reasons:dhaka-1", b"x").unwrap();
        kv.set("config:qc_reasons:dhaka-2", b"y").unwrap();
        kv.set("config:zz", b"z").unwrap();

        let hits = kv.scan("config:qc_reasons:").unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|(k, _)| k.starts_with("config:qc_reasons:")));
    }
}
