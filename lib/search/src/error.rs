use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("index: {0}")]
    Index(String),

    #[error("query: {0}")]
    Query(String),
}
