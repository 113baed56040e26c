//! Foundation types for trapd.
//!
//! This crate provides the data model shared by every stage of the trap
//! pipeline: the decoded unit handed from the network front end to the
//! workers, and the record the workers emit.
//!
//! # Key Types
//!
//! - [`VarBind`] -- A single `(oid, value)` pair decoded from a trap PDU
//! - [`TrapPdu`] -- The ordered variable bindings of one notification
//! - [`TrapEvent`] -- A received datagram after decoding, owned by one worker at a time
//! - [`TrapRecord`] -- The resolved, per-trap output artifact
//! - [`ProcessedTrap`] -- A record tagged with its worker and processing time

pub mod binding;
pub mod error;
pub mod event;
pub mod oid;
pub mod record;

pub use binding::VarBind;
pub use error::TypeError;
pub use event::{EventId, PduKind, SnmpVersion, TrapEvent, TrapPdu};
pub use oid::{
    GENERIC_TRAP_PREFIX, SNMP_TRAP_ADDRESS_OID, SNMP_TRAP_ENTERPRISE_OID, SNMP_TRAP_OID,
    SYS_UPTIME_NAME, SYS_UPTIME_OID,
};
pub use record::{ProcessedTrap, TrapRecord, TRAP_NAME_KEY, UNKNOWN_TRAP};
