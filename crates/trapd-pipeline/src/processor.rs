use tracing::debug;
use trapd_mib::OidResolver;
use trapd_types::{TrapEvent, TrapRecord, SNMP_TRAP_OID, UNKNOWN_TRAP};

/// Turns one decoded trap into a [`TrapRecord`].
///
/// Bindings are visited in order. The `snmpTrapOID.0` binding names the
/// trap: its *value* is resolved and becomes `trapName`. Every other
/// binding is stored under its resolved name, or under the raw OID when it
/// does not resolve.
#[derive(Clone, Debug)]
pub struct TrapProcessor {
    resolver: OidResolver,
}

impl TrapProcessor {
    pub fn new(resolver: OidResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &OidResolver {
        &self.resolver
    }

    /// Returns `None` for an event without a PDU.
    pub fn process(&self, event: &TrapEvent) -> Option<TrapRecord> {
        let pdu = event.pdu.as_ref()?;
        let mut record = TrapRecord::new();

        for binding in &pdu.bindings {
            if binding.oid == SNMP_TRAP_OID {
                let name = self
                    .resolver
                    .resolve(&binding.value)
                    .unwrap_or_else(|| UNKNOWN_TRAP.to_string());
                record.set_trap_name(name);
                continue;
            }

            let key = self.resolver.display_name(&binding.oid);
            if let Some(previous) = record.insert(key.as_str(), binding.value.as_str()) {
                debug!(
                    event_id = %event.id,
                    key = %key,
                    previous = %previous,
                    "record key collision; keeping last value"
                );
            }
        }

        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use serde_json::json;
    use trapd_mib::MibSymbolIndex;
    use trapd_types::{TrapPdu, PduKind, SnmpVersion, VarBind, SYS_UPTIME_OID};

    fn processor() -> TrapProcessor {
        let index = MibSymbolIndex::from_pairs([
            ("1.3.6.1.4.1.9.9.1", "myAlarm"),
            ("1.3.6.1.4.1.9.9.3", "alarmSeverity"),
            ("1.3.6.1.4.1.9.9.4", "alarmSeverity"),
        ]);
        TrapProcessor::new(OidResolver::new(Arc::new(index)))
    }

    #[test]
    fn named_trap_with_raw_parameter() {
        let event = TrapEvent::from_bindings([
            (SNMP_TRAP_OID, "1.3.6.1.4.1.9.9.1"),
            ("1.3.6.1.4.1.9.9.2.0", "critical"),
        ]);
        let record = processor().process(&event).unwrap();
        assert_eq!(
            record.to_json(),
            json!({"1.3.6.1.4.1.9.9.2.0": "critical", "trapName": "myAlarm"})
        );
    }

    #[test]
    fn sys_uptime_binding_is_named() {
        let event = TrapEvent::from_bindings([(SYS_UPTIME_OID, "123456")]);
        let record = processor().process(&event).unwrap();
        assert_eq!(record.get("sysUpTime"), Some("123456"));
        assert_eq!(record.trap_name(), UNKNOWN_TRAP);
    }

    #[test]
    fn missing_trap_oid_is_unknown() {
        let event = TrapEvent::from_bindings([("1.3.6.1.4.1.9.9.3.0", "major")]);
        let record = processor().process(&event).unwrap();
        assert_eq!(record.trap_name(), "Unknown Trap");
        assert_eq!(record.get("alarmSeverity"), Some("major"));
    }

    #[test]
    fn unresolved_trap_oid_is_unknown() {
        let event = TrapEvent::from_bindings([(SNMP_TRAP_OID, "1.3.6.1.4.1.77.0.1")]);
        let record = processor().process(&event).unwrap();
        assert_eq!(record.trap_name(), UNKNOWN_TRAP);
        assert!(record.is_empty());
    }

    #[test]
    fn colliding_names_keep_first_position_last_value() {
        let event = TrapEvent::from_bindings([
            ("1.3.6.1.4.1.9.9.3.0", "major"),
            ("1.3.6.1.4.1.5.1", "x"),
            ("1.3.6.1.4.1.9.9.4.0", "minor"),
        ]);
        let record = processor().process(&event).unwrap();
        let params: Vec<_> = record.params().collect();
        assert_eq!(params, vec![("alarmSeverity", "minor"), ("1.3.6.1.4.1.5.1", "x")]);
    }

    #[test]
    fn event_without_pdu_is_skipped() {
        assert!(processor().process(&TrapEvent::empty()).is_none());
    }

    #[test]
    fn empty_pdu_still_yields_a_record() {
        let event = TrapEvent::new(
            None,
            SnmpVersion::V2c,
            "public",
            Some(TrapPdu::new(PduKind::Inform, 9, Vec::<VarBind>::new())),
        );
        let record = processor().process(&event).unwrap();
        assert!(record.is_empty());
        assert_eq!(record.trap_name(), UNKNOWN_TRAP);
    }
}
