use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlError {
    #[error("sqlite open: {0}")]
    Open(String),

    #[error("sql: {0}")]
    Statement(String),

    #[error("connection lock poisoned")]
    Lock,
}
