use thiserror::Error;

/// Errors produced while decoding or encoding SNMP messages.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("SNMP message error: {0}")]
    Snmp(#[from] Box<async_snmp::Error>),

    #[error("malformed object identifier: {0}")]
    InvalidOid(String),

    #[error("unsupported SNMP version: {0}")]
    UnsupportedVersion(i32),

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

pub type CodecResult<T> = Result<T, CodecError>;
