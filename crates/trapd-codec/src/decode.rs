use std::net::{Ipv4Addr, SocketAddr};

use async_snmp::ber::Decoder;
use async_snmp::{Pdu, PduType, TrapV1Pdu, Version};
use bytes::Bytes;
use tracing::debug;
use trapd_types::oid::{
    GENERIC_TRAP_PREFIX, SNMP_TRAP_ADDRESS_OID, SNMP_TRAP_ENTERPRISE_OID, SNMP_TRAP_OID,
    SYS_UPTIME_OID,
};
use trapd_types::{PduKind, SnmpVersion, TrapEvent, TrapPdu, VarBind};

use crate::error::{CodecError, CodecResult};
use crate::value::render;

/// Context tag of the SNMPv1 Trap-PDU.
const TRAP_V1_TAG: u8 = 0xa4;

/// Generic trap number for enterprise-specific SNMPv1 traps.
const ENTERPRISE_SPECIFIC: i32 = 6;

/// Decode one UDP datagram into a [`TrapEvent`].
///
/// Notification PDUs (SNMPv1 Trap, SNMPv2-Trap, InformRequest) produce an
/// event with a PDU. Any other well-formed PDU produces an event with
/// `pdu == None`, which the workers discard.
pub fn decode(datagram: &[u8], source: Option<SocketAddr>) -> CodecResult<TrapEvent> {
    let target = source.unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 0)));
    let mut decoder = Decoder::with_target(Bytes::copy_from_slice(datagram), target);
    let mut message = decoder.read_sequence()?;

    let version_num = message.read_integer()?;
    let version = match Version::from_i32(version_num) {
        Some(Version::V1) => SnmpVersion::V1,
        Some(Version::V2c) => SnmpVersion::V2c,
        _ => return Err(CodecError::UnsupportedVersion(version_num)),
    };
    let community = String::from_utf8_lossy(&message.read_octet_string()?).into_owned();

    let pdu = if message.peek_tag() == Some(TRAP_V1_TAG) {
        Some(translate_v1(TrapV1Pdu::decode(&mut message)?)?)
    } else {
        notification(Pdu::decode(&mut message)?, source)
    };

    Ok(TrapEvent::new(source, version, community, pdu))
}

fn bindings(varbinds: &[async_snmp::VarBind]) -> impl Iterator<Item = VarBind> + '_ {
    varbinds
        .iter()
        .map(|vb| VarBind::new(vb.oid.to_string(), render(&vb.value)))
}

fn notification(pdu: Pdu, source: Option<SocketAddr>) -> Option<TrapPdu> {
    let kind = match &pdu.pdu_type {
        PduType::TrapV2 => PduKind::TrapV2,
        PduType::InformRequest => PduKind::Inform,
        other => {
            debug!(pdu_type = ?other, ?source, "ignoring non-notification PDU");
            return None;
        }
    };
    Some(TrapPdu::new(kind, pdu.request_id, bindings(&pdu.varbinds).collect()))
}

/// Translate an SNMPv1 Trap-PDU to the SNMPv2 binding layout (RFC 3584,
/// section 3.1).
fn translate_v1(trap: TrapV1Pdu) -> CodecResult<TrapPdu> {
    let enterprise = trap.enterprise.to_string();
    let trap_oid = match trap.generic_trap {
        ENTERPRISE_SPECIFIC => format!("{enterprise}.0.{}", trap.specific_trap),
        generic @ 0..=5 => format!("{GENERIC_TRAP_PREFIX}.{}", generic + 1),
        other => return Err(CodecError::InvalidValue(format!("generic-trap {other}"))),
    };
    let agent_addr = Ipv4Addr::from(trap.agent_addr);

    let mut out = Vec::with_capacity(trap.varbinds.len() + 4);
    out.push(VarBind::new(SYS_UPTIME_OID, trap.time_stamp.to_string()));
    out.push(VarBind::new(SNMP_TRAP_OID, trap_oid));
    out.extend(bindings(&trap.varbinds));
    out.push(VarBind::new(SNMP_TRAP_ADDRESS_OID, agent_addr.to_string()));
    out.push(VarBind::new(SNMP_TRAP_ENTERPRISE_OID, enterprise));

    Ok(TrapPdu::new(PduKind::TrapV1, 0, out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{encode_pdu, encode_v2c_trap, TrapBinding};
    use crate::value::TrapValue;

    /// v1 trap from enterprise 1.3.6.1.4.1.8164, agent 10.1.2.3, time-stamp
    /// 4200, with no bindings.
    fn v1_trap(generic: u8, specific: u8) -> Vec<u8> {
        hex::decode(format!(
            "302802010004067075626c6963a41b06072b06010401bf6440040a010203\
             0201{generic:02x}0201{specific:02x}430210683000"
        ))
        .unwrap()
    }

    #[test]
    fn decodes_v2c_trap() {
        let bytes = encode_v2c_trap(
            "public",
            7,
            &[
                TrapBinding::new(SYS_UPTIME_OID, TrapValue::TimeTicks(123456)),
                TrapBinding::new(SNMP_TRAP_OID, TrapValue::ObjectIdentifier("1.3.6.1.4.1.9.9.1".into())),
                TrapBinding::new("1.3.6.1.4.1.9.9.2.0", TrapValue::OctetString(b"critical".to_vec())),
            ],
        )
        .unwrap();
        let source: SocketAddr = "192.0.2.1:40000".parse().unwrap();
        let event = decode(&bytes, Some(source)).unwrap();

        assert_eq!(event.version, SnmpVersion::V2c);
        assert_eq!(event.community, "public");
        assert_eq!(event.source, Some(source));
        let pdu = event.pdu.unwrap();
        assert_eq!(pdu.kind, PduKind::TrapV2);
        assert_eq!(pdu.request_id, 7);
        assert_eq!(
            pdu.bindings,
            vec![
                VarBind::new(SYS_UPTIME_OID, "123456"),
                VarBind::new(SNMP_TRAP_OID, "1.3.6.1.4.1.9.9.1"),
                VarBind::new("1.3.6.1.4.1.9.9.2.0", "critical"),
            ]
        );
    }

    #[test]
    fn decodes_inform() {
        let bytes = encode_pdu("private", PduType::InformRequest, 99, Vec::new());
        let event = decode(&bytes, None).unwrap();
        let pdu = event.pdu.unwrap();
        assert_eq!(pdu.kind, PduKind::Inform);
        assert_eq!(pdu.request_id, 99);
        assert!(pdu.bindings.is_empty());
        assert_eq!(event.community, "private");
    }

    #[test]
    fn v1_enterprise_specific_translation() {
        // generic 6, specific 17, one binding 1.3.6.1.4.1.8164.2.1 = INTEGER 3
        let bytes = hex::decode(
            "303802010004067075626c6963a42b06072b06010401bf6440040a010203\
             020106020111430210683010300e06092b06010401bf640201020103",
        )
        .unwrap();

        let event = decode(&bytes, None).unwrap();
        assert_eq!(event.version, SnmpVersion::V1);
        let pdu = event.pdu.unwrap();
        assert_eq!(pdu.kind, PduKind::TrapV1);
        assert_eq!(
            pdu.bindings,
            vec![
                VarBind::new(SYS_UPTIME_OID, "4200"),
                VarBind::new(SNMP_TRAP_OID, "1.3.6.1.4.1.8164.0.17"),
                VarBind::new("1.3.6.1.4.1.8164.2.1", "3"),
                VarBind::new(SNMP_TRAP_ADDRESS_OID, "10.1.2.3"),
                VarBind::new(SNMP_TRAP_ENTERPRISE_OID, "1.3.6.1.4.1.8164"),
            ]
        );
    }

    #[test]
    fn v1_generic_trap_translation() {
        // linkDown is generic 2 -> snmpTraps.3
        let event = decode(&v1_trap(2, 0), None).unwrap();
        let pdu = event.pdu.unwrap();
        assert_eq!(pdu.bindings[1], VarBind::new(SNMP_TRAP_OID, "1.3.6.1.6.3.1.1.5.3"));
        assert_eq!(pdu.bindings.len(), 4);
    }

    #[test]
    fn v1_invalid_generic_rejected() {
        let err = decode(&v1_trap(9, 0), None).unwrap_err();
        assert!(matches!(err, CodecError::InvalidValue(_)));
    }

    #[test]
    fn non_notification_pdu_has_no_payload() {
        let bytes = encode_pdu("public", PduType::GetRequest, 1, Vec::new());
        let event = decode(&bytes, None).unwrap();
        assert!(event.pdu.is_none());
    }

    #[test]
    fn snmpv3_rejected() {
        let bytes = hex::decode("3003020103").unwrap();
        let err = decode(&bytes, None).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedVersion(3)));
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode(&[], None).is_err());
        assert!(decode(b"hello world", None).is_err());
        let bytes = encode_v2c_trap("public", 1, &[]).unwrap();
        assert!(decode(&bytes[..bytes.len() - 1], None).is_err());
    }
}
