use async_snmp::message::CommunityMessage;
use async_snmp::{Pdu, PduType, Version};
use bytes::Bytes;

use crate::error::CodecResult;
use crate::value::{to_oid, TrapValue};

/// A typed binding for an outgoing trap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrapBinding {
    pub oid: String,
    pub value: TrapValue,
}

impl TrapBinding {
    pub fn new(oid: impl Into<String>, value: TrapValue) -> Self {
        Self {
            oid: oid.into(),
            value,
        }
    }
}

pub(crate) fn encode_pdu(
    community: &str,
    pdu_type: PduType,
    request_id: i32,
    varbinds: Vec<async_snmp::VarBind>,
) -> Vec<u8> {
    let pdu = Pdu {
        pdu_type,
        request_id,
        error_status: 0,
        error_index: 0,
        varbinds,
    };
    CommunityMessage::new(Version::V2c, Bytes::copy_from_slice(community.as_bytes()), pdu)
        .encode()
        .to_vec()
}

/// Encode an SNMPv2c message carrying an SNMPv2-Trap-PDU.
///
/// Bindings are written in the given order; callers are expected to lead
/// with `sysUpTime.0` and `snmpTrapOID.0`.
pub fn encode_v2c_trap(
    community: &str,
    request_id: i32,
    bindings: &[TrapBinding],
) -> CodecResult<Vec<u8>> {
    let varbinds = bindings
        .iter()
        .map(|b| Ok(async_snmp::VarBind::new(to_oid(&b.oid)?, b.value.to_value()?)))
        .collect::<CodecResult<Vec<_>>>()?;
    Ok(encode_pdu(community, PduType::TrapV2, request_id, varbinds))
}
