use std::io;
use std::path::PathBuf;

/// Errors produced while loading a MIB.
#[derive(Debug, thiserror::Error)]
pub enum MibError {
    /// The MIB file could not be read.
    #[error("failed to read MIB file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The MIB text is structurally broken.
    #[error("MIB parse error at line {line}: {message}")]
    Parse { line: u32, message: String },
}

/// Convenience alias used throughout the MIB crate.
pub type MibResult<T> = std::result::Result<T, MibError>;
