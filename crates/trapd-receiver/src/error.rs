use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReceiverError {
    /// The trap socket could not be bound. Fatal at startup.
    #[error("failed to bind trap socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("MIB error: {0}")]
    Mib(#[from] trapd_mib::MibError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] trapd_pipeline::PipelineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ReceiverResult<T> = Result<T, ReceiverError>;
