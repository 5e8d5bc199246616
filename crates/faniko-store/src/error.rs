use thiserror::Error;

/// Failures of store operations. Each variant maps onto one HTTP status in
/// the API layer; the message is what the client sees.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Invalid(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
