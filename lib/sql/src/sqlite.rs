use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, params_from_iter};

use crate::error::SqlError;
use crate::traits::{Row, SqlStore, Statement, Value};

/// [`SqlStore`] over a single rusqlite connection (bundled SQLite).
///
/// One `Mutex<Connection>` serializes writers; WAL keeps concurrent
/// readers from blocking on them.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database file at `path` in WAL mode.
    pub fn open(path: &Path) -> Result<Self, SqlError> {
        let conn = Connection::open(path).map_err(|e| SqlError::Open(e.to_string()))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| SqlError::Open(e.to_string()))?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self, SqlError> {
        let conn = Connection::open_in_memory().map_err(|e| SqlError::Open(e.to_string()))?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::Owned((*i).into()),
            Value::Real(f) => ToSqlOutput::Owned((*f).into()),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

fn decode(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}

impl SqlStore for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SqlError> {
        let conn = self.conn.lock().map_err(|_| SqlError::Lock)?;
        let mut stmt = conn.prepare(sql).map_err(|e| SqlError::Statement(e.to_string()))?;
        let names: Vec<String> = stmt.column_names().iter().map(|n| n.to_string()).collect();

        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(|e| SqlError::Statement(e.to_string()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|e| SqlError::Statement(e.to_string()))? {
            let mut cells = Vec::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                let cell = row.get_ref(i).map_err(|e| SqlError::Statement(e.to_string()))?;
                cells.push((name.clone(), decode(cell)));
            }
            out.push(Row(cells));
        }
        Ok(out)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SqlError> {
        let conn = self.conn.lock().map_err(|_| SqlError::Lock)?;
        let n = conn
            .execute(sql, params_from_iter(params.iter()))
            .map_err(|e| SqlError::Statement(e.to_string()))?;
        Ok(n as u64)
    }

    fn exec_all(&self, statements: &[Statement<'_>]) -> Result<u64, SqlError> {
        let mut conn = self.conn.lock().map_err(|_| SqlError::Lock)?;
        let tx = conn.transaction().map_err(|e| SqlError::Statement(e.to_string()))?;

        let mut affected = 0u64;
        for (sql, params) in statements {
            // A failure here drops `tx` un-committed and rolls back
            // every statement before it.
            let n = tx
                .execute(sql, params_from_iter(params.iter()))
                .map_err(|e| SqlError::Statement(e.to_string()))?;
            affected += n as u64;
        }

        tx.commit().map_err(|e| SqlError::Statement(e.to_string()))?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        let s = SqliteStore::open_in_memory().unwrap();
        s.exec("CREATE TABLE bundles (id TEXT PRIMARY KEY, qty INTEGER)", &[]).unwrap();
        s
    }

    #[test]
    fn write_then_read_back() {
        let s = store();
        let n = s
            .exec(
                "INSERT INTO bundles (id, qty) VALUES (?1, ?2)",
                &[Value::from("QR1"), Value::from(24)],
            )
            .unwrap();
        assert_eq!(n, 1);

        let rows = s.query("SELECT id, qty FROM bundles", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("id"), Some("QR1"));
        assert_eq!(rows[0].get_i64("qty"), Some(24));
    }

    #[test]
    fn null_round_trips_as_null() {
        let s = store();
        s.exec("INSERT INTO bundles (id, qty) VALUES (?1, ?2)", &[Value::from("QR1"), Value::Null])
            .unwrap();
        let rows = s.query("SELECT qty FROM bundles", &[]).unwrap();
        assert_eq!(rows[0].get("qty"), Some(&Value::Null));
    }

    #[test]
    fn real_columns_decode_as_f64() {
        let s = SqliteStore::open_in_memory().unwrap();
        s.exec("CREATE TABLE ops (id TEXT, smv REAL)", &[]).unwrap();
        s.exec("INSERT INTO ops VALUES (?1, ?2)", &[Value::from("OP-1"), Value::Real(0.45)])
            .unwrap();
        let rows = s.query("SELECT smv FROM ops", &[]).unwrap();
        assert_eq!(rows[0].get_f64("smv"), Some(0.45));
    }

    #[test]
    fn exec_all_is_one_transaction() {
        let s = store();
        let a = [Value::from("QR1"), Value::from(1)];
        let b = [Value::from("QR2"), Value::from(2)];
        let n = s
            .exec_all(&[
                ("INSERT INTO bundles (id, qty) VALUES (?1, ?2)", &a[..]),
                ("INSERT INTO bundles (id, qty) VALUES (?1, ?2)", &b[..]),
            ])
            .unwrap();
        assert_eq!(n, 2);
    }

    #[test]
    fn exec_all_rolls_back_the_earlier_statements() {
        let s = store();
        let first = [Value::from("QR1"), Value::from(1)];
        let dup = [Value::from("QR1"), Value::from(9)];
        let result = s.exec_all(&[
            ("INSERT INTO bundles (id, qty) VALUES (?1, ?2)", &first[..]),
            ("INSERT INTO bundles (id, qty) VALUES (?1, ?2)", &dup[..]),
        ]);
        assert!(result.is_err());
        assert!(s.query("SELECT id FROM bundles", &[]).unwrap().is_empty());
    }

    #[test]
    fn nocase_compare_matches_either_case() {
        let s = store();
        s.exec("INSERT INTO bundles (id, qty) VALUES (?1, 1)", &[Value::from("QRAbC")]).unwrap();
        let rows = s
            .query("SELECT id FROM bundles WHERE id = ?1 COLLATE NOCASE", &[Value::from("qrabc")])
            .unwrap();
        assert_eq!(rows.len(), 1);
    }
}
