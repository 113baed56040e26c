//! SNMP trap adapter for trapd.
//!
//! Wire parsing and encoding are done by `async-snmp`. This crate maps its
//! v1/v2c PDUs onto [`TrapEvent`](trapd_types::TrapEvent)s with stringified
//! variable bindings, and builds SNMPv2c traps for `trapd send`. SNMPv3 is
//! not supported.

pub mod decode;
pub mod encode;
pub mod error;
pub mod value;

pub use decode::decode;
pub use encode::{encode_v2c_trap, TrapBinding};
pub use error::{CodecError, CodecResult};
pub use value::{render, TrapValue};
