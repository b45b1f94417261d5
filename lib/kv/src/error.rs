use thiserror::Error;

#[derive(Error, Debug)]
pub enum KvError {
    #[error("key '{0}' is read-only")]
    ReadOnly(String),

    #[error("kv backend: {0}")]
    Backend(String),
}
