use std::fmt;
use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::binding::VarBind;

/// Time-ordered identifier assigned to each received trap (UUID v7).
///
/// Used to correlate the receiver's log lines with the worker that
/// eventually processes the event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(uuid::Uuid);

impl EventId {
    /// Generate a new time-ordered event ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 hex characters).
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trap:{}", self.0)
    }
}

/// SNMP message version carried by a trap datagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnmpVersion {
    V1,
    V2c,
}

impl fmt::Display for SnmpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::V1 => "v1",
            Self::V2c => "v2c",
        };
        write!(f, "{s}")
    }
}

/// The notification PDU type the bindings came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PduKind {
    /// SNMPv1 Trap-PDU, translated to SNMPv2 binding layout.
    TrapV1,
    /// SNMPv2-Trap-PDU.
    TrapV2,
    /// InformRequest-PDU.
    Inform,
}

impl fmt::Display for PduKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::TrapV1 => "Trap-v1",
            Self::TrapV2 => "SNMPv2-Trap",
            Self::Inform => "InformRequest",
        };
        write!(f, "{s}")
    }
}

/// The decoded PDU of a notification: an ordered list of bindings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapPdu {
    pub kind: PduKind,
    pub request_id: i32,
    /// Variable bindings in wire order.
    pub bindings: Vec<VarBind>,
}

impl TrapPdu {
    pub fn new(kind: PduKind, request_id: i32, bindings: Vec<VarBind>) -> Self {
        Self {
            kind,
            request_id,
            bindings,
        }
    }

    /// Convenience constructor for an SNMPv2-Trap PDU.
    pub fn v2(bindings: Vec<VarBind>) -> Self {
        Self::new(PduKind::TrapV2, 0, bindings)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A received trap after decoding, handed from the receiver to the queue.
///
/// Ownership moves into the queue on enqueue and then to exactly one worker.
/// `pdu` is `None` when the datagram carried no notification payload; such
/// events are discarded by the workers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapEvent {
    pub id: EventId,
    pub received_at: DateTime<Utc>,
    pub source: Option<SocketAddr>,
    pub version: SnmpVersion,
    pub community: String,
    pub pdu: Option<TrapPdu>,
}

impl TrapEvent {
    /// Create an event stamped with a fresh ID and the current time.
    pub fn new(
        source: Option<SocketAddr>,
        version: SnmpVersion,
        community: impl Into<String>,
        pdu: Option<TrapPdu>,
    ) -> Self {
        Self {
            id: EventId::generate(),
            received_at: Utc::now(),
            source,
            version,
            community: community.into(),
            pdu,
        }
    }

    /// An SNMPv2c event with no source address, mainly for tests and
    /// embedding the pipeline without a socket.
    pub fn from_bindings<I, B>(bindings: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<VarBind>,
    {
        let bindings = bindings.into_iter().map(Into::into).collect();
        Self::new(None, SnmpVersion::V2c, "public", Some(TrapPdu::v2(bindings)))
    }

    /// An event that carries no PDU.
    pub fn empty() -> Self {
        Self::new(None, SnmpVersion::V2c, "public", None)
    }

    /// Number of bindings, zero when there is no PDU.
    pub fn binding_count(&self) -> usize {
        self.pdu.as_ref().map_or(0, TrapPdu::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ids_are_unique() {
        let a = EventId::generate();
        let b = EventId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn event_id_display() {
        let id = EventId::from_uuid(uuid::Uuid::nil());
        assert_eq!(id.to_string(), "trap:00000000-0000-0000-0000-000000000000");
        assert_eq!(id.short(), "00000000");
    }

    #[test]
    fn from_bindings_builds_v2_pdu() {
        let event = TrapEvent::from_bindings([("1.3.6.1.2.1.1.3.0", "42"), ("1.3.6.1", "x")]);
        let pdu = event.pdu.as_ref().unwrap();
        assert_eq!(pdu.kind, PduKind::TrapV2);
        assert_eq!(pdu.bindings[0], VarBind::new("1.3.6.1.2.1.1.3.0", "42"));
        assert_eq!(event.binding_count(), 2);
        assert_eq!(event.version, SnmpVersion::V2c);
    }

    #[test]
    fn empty_event_has_no_bindings() {
        let event = TrapEvent::empty();
        assert!(event.pdu.is_none());
        assert_eq!(event.binding_count(), 0);
    }

    #[test]
    fn display_names() {
        assert_eq!(SnmpVersion::V1.to_string(), "v1");
        assert_eq!(PduKind::Inform.to_string(), "InformRequest");
    }

    #[test]
    fn serde_roundtrip() {
        let event = TrapEvent::from_bindings([("1.3.6.1.4.1.9.9.2.0", "critical")]);
        let json = serde_json::to_string(&event).unwrap();
        let decoded: TrapEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, decoded);
    }
}
