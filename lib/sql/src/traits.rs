use crate::error::SqlError;

/// A dynamically-typed SQL parameter or column value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

/// One result row, column name to value in select order.
#[derive(Debug, Clone)]
pub struct Row(pub Vec<(String, Value)>);

impl Row {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(Value::Integer(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(Value::Real(f)) => Some(*f),
            _ => None,
        }
    }
}

/// One statement plus its bound parameters, for [`SqlStore::exec_all`].
pub type Statement<'a> = (&'a str, &'a [Value]);

/// Execution interface over an embedded SQL database.
pub trait SqlStore: Send + Sync {
    /// Run a SELECT and collect its rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SqlError>;

    /// Run a single INSERT/UPDATE/DELETE; returns the affected row count.
    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SqlError>;

    /// Run several statements in one transaction. Either every statement
    /// commits or none of them took effect. Returns the summed affected
    /// row count.
    fn exec_all(&self, statements: &[Statement<'_>]) -> Result<u64, SqlError>;
}
