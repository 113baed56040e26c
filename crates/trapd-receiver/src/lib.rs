//! Network front end and daemon lifecycle for trapd.
//!
//! # Key Types
//!
//! - [`TrapReceiver`] -- Owns the UDP socket and feeds the trap queue
//! - [`DaemonConfig`] -- TOML configuration for the whole daemon
//! - [`TrapDaemon`] -- Wires MIB, queue, workers and receiver together

pub mod config;
pub mod daemon;
pub mod error;
pub mod receiver;

pub use config::{DaemonConfig, OutputFormat, ReceiverConfig, DEFAULT_TRAP_PORT, MAX_DATAGRAM_SIZE};
pub use daemon::{DaemonReport, TrapDaemon};
pub use error::{ReceiverError, ReceiverResult};
pub use receiver::{ReceiverStats, TrapReceiver};
