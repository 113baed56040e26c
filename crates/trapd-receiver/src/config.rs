use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trapd_pipeline::PipelineConfig;

use crate::error::{ReceiverError, ReceiverResult};

/// Standard SNMP trap port.
pub const DEFAULT_TRAP_PORT: u16 = 162;

/// Largest UDP payload.
pub const MAX_DATAGRAM_SIZE: usize = 65_535;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    pub bind_addr: SocketAddr,
    pub max_datagram_size: usize,
    /// Accepted community strings. Empty accepts every community.
    pub communities: Vec<String>,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_TRAP_PORT)),
            max_datagram_size: MAX_DATAGRAM_SIZE,
            communities: Vec::new(),
        }
    }
}

impl ReceiverConfig {
    pub fn accepts(&self, community: &str) -> bool {
        self.communities.is_empty() || self.communities.iter().any(|c| c == community)
    }

    pub fn validate(&self) -> ReceiverResult<()> {
        if self.max_datagram_size == 0 {
            return Err(ReceiverError::Config("max_datagram_size must be positive".into()));
        }
        Ok(())
    }
}

/// How processed trap records are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty JSON through the `tracing` log.
    #[default]
    Log,
    /// One JSON object per line on stdout.
    Json,
}

/// Top-level daemon configuration, usually read from a TOML file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub mib_path: PathBuf,
    pub output: OutputFormat,
    pub receiver: ReceiverConfig,
    pub pipeline: PipelineConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            mib_path: PathBuf::from("mibs/TRAP-MIB.mib"),
            output: OutputFormat::Log,
            receiver: ReceiverConfig::default(),
            pipeline: PipelineConfig::default(),
        }
    }
}

impl DaemonConfig {
    pub fn load(path: &Path) -> ReceiverResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ReceiverError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> ReceiverResult<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> ReceiverResult<String> {
        toml::to_string_pretty(self).map_err(|e| ReceiverError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ReceiverResult<()> {
        self.receiver.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }
}
