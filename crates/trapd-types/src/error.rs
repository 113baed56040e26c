use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object identifier: {0:?}")]
    InvalidOid(String),

    #[error("OID arc out of range: {0}")]
    ArcOutOfRange(String),
}
