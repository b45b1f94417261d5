pub mod gate;
pub mod schema;
pub mod session;
pub mod user;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use stitchline_core::ServiceError;
use stitchline_sql::{SqlError, SqlStore, Value};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("store: {0}")]
    Store(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        use AuthError as A;
        match e {
            A::NotFound(m) => Self::NotFound(m),
            A::Conflict(m) => Self::Conflict(m),
            A::Validation(m) => Self::Validation(m),
            A::Unauthorized(m) => Self::Unauthorized(m),
            A::Forbidden(m) => Self::PermissionDenied(m),
            A::Store(m) => Self::Dependency(m),
            A::Internal(m) => Self::Internal(m),
        }
    }
}

pub(crate) fn store_err(e: SqlError) -> AuthError {
    AuthError::Store(e.to_string())
}

pub(crate) fn internal(e: impl std::fmt::Display) -> AuthError {
    AuthError::Internal(e.to_string())
}

/// Auth service configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds.
    pub refresh_token_ttl: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "stitchline-dev-secret-change-me".to_string(),
            access_token_ttl: 86400,   // 24h
            refresh_token_ttl: 604800, // 7d
        }
    }
}

/// Users, credentials, sessions, and the User/Role Gate.
pub struct AuthService {
    pub(crate) sql: Arc<dyn SqlStore>,
    pub(crate) config: AuthConfig,
}

impl AuthService {
    pub fn new(sql: Arc<dyn SqlStore>, config: AuthConfig) -> Result<Arc<Self>, AuthError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql, config }))
    }

    // ── JSON-document row helpers ──
    //
    // Rows hold the full record as JSON in `data`, plus whatever
    // columns the table extracts for indexing and filtering.

    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AuthError> {
        let json = serde_json::to_string(record).map_err(internal)?;

        let mut cols = String::from("id, data");
        let mut marks = String::from("?1, ?2");
        let mut params = vec![Value::from(id), Value::Text(json)];
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
                AuthError::Conflict(msg)
            } else {
                AuthError::Store(msg)
            }
        })?;
        Ok(())
    }

    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, AuthError> {
        let rows = self
            .sql
            .query(&format!("SELECT data FROM {table} WHERE id = ?1"), &[Value::from(id)])
            .map_err(store_err)?;
        let data = rows
            .first()
            .and_then(|row| row.get_str("data"))
            .ok_or_else(|| AuthError::NotFound(format!("{table}/{id}")))?;
        serde_json::from_str(data).map_err(internal)
    }

    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), AuthError> {
        let json = serde_json::to_string(record).map_err(internal)?;

        let mut sets = String::from("data = ?1");
        let mut params = vec![Value::Text(json)];
        for (col, val) in indexes {
            params.push(val.clone());
            sets.push_str(&format!(", {col} = ?{}", params.len()));
        }
        params.push(Value::from(id));

        let stmt = format!("UPDATE {table} SET {sets} WHERE id = ?{}", params.len());
        match self.sql.exec(&stmt, &params).map_err(store_err)? {
            0 => Err(AuthError::NotFound(format!("{table}/{id}"))),
            _ => Ok(()),
        }
    }

    pub(crate) fn delete_record(&self, table: &str, id: &str) -> Result<(), AuthError> {
        let stmt = format!("DELETE FROM {table} WHERE id = ?1");
        match self.sql.exec(&stmt, &[Value::from(id)]).map_err(store_err)? {
            0 => Err(AuthError::NotFound(format!("{table}/{id}"))),
            _ => Ok(()),
        }
    }

    pub(crate) fn list_records<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, Value)],
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<T>, usize), AuthError> {
        let mut params: Vec<Value> = filters.iter().map(|(_, v)| v.clone()).collect();
        let where_sql = if filters.is_empty() {
            String::new()
        } else {
            let clauses: Vec<String> = filters
                .iter()
                .enumerate()
                .map(|(i, (col, _))| format!("{col} = ?{}", i + 1))
                .collect();
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let total = self
            .sql
            .query(&format!("SELECT COUNT(*) AS n FROM {table}{where_sql}"), &params)
            .map_err(store_err)?
            .first()
            .and_then(|row| row.get_i64("n"))
            .unwrap_or(0) as usize;

        params.push(Value::Integer(limit as i64));
        params.push(Value::Integer(offset as i64));
        let stmt = format!(
            "SELECT data FROM {table}{where_sql} ORDER BY created_at DESC LIMIT ?{} OFFSET ?{}",
            params.len() - 1,
            params.len(),
        );

        let rows = self.sql.query(&stmt, &params).map_err(store_err)?;
        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| AuthError::Internal("missing data column".into()))?;
            items.push(serde_json::from_str(data).map_err(internal)?);
        }
        Ok((items, total))
    }
}
