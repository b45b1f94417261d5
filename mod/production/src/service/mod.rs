pub mod checkpoint;
pub mod dashboard;
pub mod instruction;
pub mod lifecycle;
pub mod machine;
pub mod qc;
pub mod qrcode;
pub mod schema;
pub mod worker;
pub mod workorder;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use stitchline_core::{Page, ServiceError, merge_patch, now_rfc3339};
use stitchline_kv::KvStore;
use stitchline_search::SearchEngine;
use stitchline_sql::{SqlError, SqlStore, Value};

#[derive(Debug, Error)]
pub enum ProductionError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    /// The record exists but is in the wrong state for the operation
    /// (e.g. scanning an unassigned bundle).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A QR code references a work order that no longer resolves — a
    /// data inconsistency, not an operator error.
    #[error("work order missing: {0}")]
    WorkOrderMissing(String),

    #[error("store: {0}")]
    Store(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<ProductionError> for ServiceError {
    fn from(e: ProductionError) -> Self {
        use ProductionError as P;
        match e {
            P::NotFound(m) => Self::NotFound(m),
            P::Conflict(m) => Self::Conflict(m),
            P::Validation(m) => Self::Validation(m),
            P::InvalidState(m) => Self::InvalidState(m),
            P::WorkOrderMissing(m) => Self::Internal(m),
            P::Store(m) => Self::Dependency(m),
            P::Internal(m) => Self::Internal(m),
        }
    }
}

pub(crate) fn store_err(e: SqlError) -> ProductionError {
    ProductionError::Store(e.to_string())
}

pub(crate) fn internal(e: impl std::fmt::Display) -> ProductionError {
    ProductionError::Internal(e.to_string())
}

/// Production service for ONE factory — holds the storage backends and
/// the factory identifier. There is no shared global instance: the
/// binary constructs one service per configured factory and routes
/// requests to it explicitly (see `FactoryRegistry`).
///
/// Every row this service writes carries an indexed `factory` column,
/// and every read filters on it.
pub struct ProductionService {
    pub(crate) sql: Arc<dyn SqlStore>,
    pub(crate) kv: Arc<dyn KvStore>,
    pub(crate) search: Arc<dyn SearchEngine>,
    pub(crate) factory: String,
}

impl ProductionService {
    pub fn new(
        sql: Arc<dyn SqlStore>,
        kv: Arc<dyn KvStore>,
        search: Arc<dyn SearchEngine>,
        factory: impl Into<String>,
    ) -> Result<Self, ProductionError> {
        let factory = factory.into();
        if factory.trim().is_empty() {
            return Err(ProductionError::Validation("factory id cannot be empty".into()));
        }
        schema::init_schema(sql.as_ref())?;
        Ok(Self { sql, kv, search, factory })
    }

    /// The factory this service instance is scoped to.
    pub fn factory(&self) -> &str {
        &self.factory
    }

    /// Search collection name for a table, namespaced per factory.
    pub(crate) fn collection(&self, table: &str) -> String {
        format!("{}_{}", table, self.factory)
    }

    // ── JSON-document row helpers ──
    //
    // Documents are stored as JSON in a `data` column with extracted
    // indexed columns. The factory column is stamped on insert and
    // filtered on every read and write.

    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ProductionError> {
        let json = serde_json::to_string(record).map_err(internal)?;

        let mut cols = String::from("id, factory, data");
        let mut marks = String::from("?1, ?2, ?3");
        let mut params = vec![Value::from(id), Value::Text(self.factory.clone()), Value::Text(json)];
        for (col, val) in indexes {
            params.push(val.clone());
            cols.push_str(", ");
            cols.push_str(col);
            marks.push_str(&format!(", ?{}", params.len()));
        }

        let stmt = format!("INSERT INTO {table} ({cols}) VALUES ({marks})");
        self.sql.exec(&stmt, &params).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("UNIQUE constraint") {
                ProductionError::Conflict(msg)
            } else {
                ProductionError::Store(msg)
            }
        })?;
        Ok(())
    }

    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, ProductionError> {
        let rows = self
            .sql
            .query(
                &format!("SELECT data FROM {table} WHERE id = ?1 AND factory = ?2"),
                &[Value::from(id), Value::Text(self.factory.clone())],
            )
            .map_err(store_err)?;
        let data = rows
            .first()
            .and_then(|row| row.get_str("data"))
            .ok_or_else(|| ProductionError::NotFound(format!("{table}/{id}")))?;
        serde_json::from_str(data).map_err(internal)
    }

    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), ProductionError> {
        let json = serde_json::to_string(record).map_err(internal)?;

        let mut sets = String::from("data = ?1");
        let mut params = vec![Value::Text(json)];
        for (col, val) in indexes {
            params.push(val.clone());
            sets.push_str(&format!(", {col} = ?{}", params.len()));
        }
        params.push(Value::from(id));
        params.push(Value::Text(self.factory.clone()));

        let stmt = format!(
            "UPDATE {table} SET {sets} WHERE id = ?{} AND factory = ?{}",
            params.len() - 1,
            params.len(),
        );
        match self.sql.exec(&stmt, &params).map_err(store_err)? {
            0 => Err(ProductionError::NotFound(format!("{table}/{id}"))),
            _ => Ok(()),
        }
    }

    pub(crate) fn delete_record(&self, table: &str, id: &str) -> Result<(), ProductionError> {
        let stmt = format!("DELETE FROM {table} WHERE id = ?1 AND factory = ?2");
        let params = [Value::from(id), Value::Text(self.factory.clone())];
        match self.sql.exec(&stmt, &params).map_err(store_err)? {
            0 => Err(ProductionError::NotFound(format!("{table}/{id}"))),
            _ => Ok(()),
        }
    }

    /// WHERE clause + params for the factory filter plus `filters`.
    fn where_sql(&self, filters: &[(&str, Value)]) -> (String, Vec<Value>) {
        let mut clauses = vec!["factory = ?1".to_string()];
        let mut params = vec![Value::Text(self.factory.clone())];
        for (col, val) in filters {
            params.push(val.clone());
            clauses.push(format!("{col} = ?{}", params.len()));
        }
        (clauses.join(" AND "), params)
    }

    /// List with optional filters, pagination, and total count. The
    /// factory filter is always applied.
    pub(crate) fn list_records<T: DeserializeOwned + Serialize>(
        &self,
        table: &str,
        filters: &[(&str, Value)],
        limit: usize,
        offset: usize,
    ) -> Result<Page<T>, ProductionError> {
        let (where_sql, mut params) = self.where_sql(filters);

        let total = self
            .sql
            .query(&format!("SELECT COUNT(*) AS n FROM {table} WHERE {where_sql}"), &params)
            .map_err(store_err)?
            .first()
            .and_then(|row| row.get_i64("n"))
            .unwrap_or(0) as usize;

        params.push(Value::Integer(limit as i64));
        params.push(Value::Integer(offset as i64));
        let stmt = format!(
            "SELECT data FROM {table} WHERE {where_sql} \
             ORDER BY created_at DESC LIMIT ?{} OFFSET ?{}",
            params.len() - 1,
            params.len(),
        );

        let rows = self.sql.query(&stmt, &params).map_err(store_err)?;
        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| ProductionError::Internal("missing data column".into()))?;
            items.push(serde_json::from_str(data).map_err(internal)?);
        }
        Ok(Page { items, total })
    }

    /// Count rows matching `filters` (factory filter always applied).
    pub(crate) fn count_records(
        &self,
        table: &str,
        filters: &[(&str, Value)],
    ) -> Result<i64, ProductionError> {
        let (where_sql, params) = self.where_sql(filters);
        let rows = self
            .sql
            .query(&format!("SELECT COUNT(*) AS n FROM {table} WHERE {where_sql}"), &params)
            .map_err(store_err)?;
        Ok(rows.first().and_then(|row| row.get_i64("n")).unwrap_or(0))
    }

    /// Apply a JSON merge-patch to a record, protecting immutable fields.
    pub(crate) fn apply_patch<T: Serialize + DeserializeOwned>(
        current: &T,
        patch: serde_json::Value,
    ) -> Result<T, ProductionError> {
        let mut json = serde_json::to_value(current).map_err(internal)?;

        let mut patch = patch;
        if let Some(obj) = patch.as_object_mut() {
            obj.remove("id");
            obj.remove("factory");
            obj.remove("createdAt");
            obj.insert("updatedAt".into(), serde_json::json!(now_rfc3339()));
        }

        merge_patch(&mut json, &patch);
        serde_json::from_value(json).map_err(internal)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use stitchline_kv::{OverlayStore, RedbStore};
    use stitchline_search::TantivyEngine;
    use stitchline_sql::sqlite::SqliteStore;

    use super::ProductionService;

    /// A fresh single-factory service over in-memory / tempdir stores.
    /// The tempdir must outlive the service — return it alongside.
    pub(crate) fn test_service() -> (ProductionService, tempfile::TempDir) {
        test_service_for("dhaka-1")
    }

    pub(crate) fn test_service_for(factory: &str) -> (ProductionService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        let kv = Arc::new(OverlayStore::new(
            RedbStore::open(&dir.path().join("kv.redb")).unwrap(),
        ));
        let search = Arc::new(TantivyEngine::open(&dir.path().join("search")).unwrap());
        let svc = ProductionService::new(sql, kv, search, factory).unwrap();
        (svc, dir)
    }

    /// Same stores, two factories — for isolation tests.
    pub(crate) fn test_service_pair() -> (ProductionService, ProductionService, tempfile::TempDir)
    {
        let dir = tempfile::tempdir().unwrap();
        let sql: Arc<SqliteStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        let kv = Arc::new(OverlayStore::new(
            RedbStore::open(&dir.path().join("kv.redb")).unwrap(),
        ));
        let search = Arc::new(TantivyEngine::open(&dir.path().join("search")).unwrap());
        let a = ProductionService::new(sql.clone(), kv.clone(), search.clone(), "dhaka-1").unwrap();
        let b = ProductionService::new(sql, kv, search, "dhaka-2").unwrap();
        (a, b, dir)
    }
}
