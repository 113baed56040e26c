//! Dotted-string object identifier helpers and well-known OIDs.
//!
//! OIDs travel through the pipeline as canonical dotted strings
//! (`"1.3.6.1.2.1.1.3.0"`): numeric arcs separated by single dots, with no
//! leading or trailing dot.

use crate::error::TypeError;

/// `sysUpTime.0`, the first binding of every SNMPv2 notification.
pub const SYS_UPTIME_OID: &str = "1.3.6.1.2.1.1.3.0";

/// Display name reported for [`SYS_UPTIME_OID`].
pub const SYS_UPTIME_NAME: &str = "sysUpTime";

/// `snmpTrapOID.0`, whose value identifies the notification.
pub const SNMP_TRAP_OID: &str = "1.3.6.1.6.3.1.1.4.1.0";

/// `snmpTrapEnterprise.0`, appended when translating SNMPv1 traps.
pub const SNMP_TRAP_ENTERPRISE_OID: &str = "1.3.6.1.6.3.1.1.4.3.0";

/// `snmpTrapAddress.0`, appended when translating SNMPv1 traps.
pub const SNMP_TRAP_ADDRESS_OID: &str = "1.3.6.1.6.3.18.1.3.0";

/// `snmpTraps`: generic SNMPv1 trap `n` maps to `snmpTraps.(n + 1)`.
pub const GENERIC_TRAP_PREFIX: &str = "1.3.6.1.6.3.1.1.5";

/// Suffix marking a scalar instance.
pub const INSTANCE_SUFFIX: &str = ".0";

/// Returns `true` if `oid` is in canonical dotted form.
pub fn is_canonical(oid: &str) -> bool {
    !oid.is_empty()
        && oid
            .split('.')
            .all(|arc| !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit()))
}

/// Parse a dotted OID string into numeric arcs.
pub fn parse_arcs(oid: &str) -> Result<Vec<u32>, TypeError> {
    if !is_canonical(oid) {
        return Err(TypeError::InvalidOid(oid.to_string()));
    }
    oid.split('.')
        .map(|arc| {
            arc.parse::<u32>()
                .map_err(|_| TypeError::ArcOutOfRange(arc.to_string()))
        })
        .collect()
}

/// Join numeric arcs into a dotted OID string.
pub fn join_arcs<I, T>(arcs: I) -> String
where
    I: IntoIterator<Item = T>,
    T: std::fmt::Display,
{
    let mut out = String::new();
    for (i, arc) in arcs.into_iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&arc.to_string());
    }
    out
}

/// Strip exactly one trailing `.0` instance suffix.
///
/// Returns `None` when the OID does not end with `.0`.
pub fn strip_instance_suffix(oid: &str) -> Option<&str> {
    oid.strip_suffix(INSTANCE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn canonical_forms() {
        assert!(is_canonical("1.3.6.1"));
        assert!(is_canonical("0"));
        assert!(!is_canonical(""));
        assert!(!is_canonical(".1.3"));
        assert!(!is_canonical("1.3."));
        assert!(!is_canonical("1..3"));
        assert!(!is_canonical("1.3.a"));
    }

    #[test]
    fn parse_rejects_overflow() {
        let err = parse_arcs("1.3.99999999999").unwrap_err();
        assert_eq!(err, TypeError::ArcOutOfRange("99999999999".into()));
    }

    #[test]
    fn parse_and_join() {
        let arcs = parse_arcs(SNMP_TRAP_OID).unwrap();
        assert_eq!(arcs, vec![1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0]);
        assert_eq!(join_arcs(&arcs), SNMP_TRAP_OID);
        assert_eq!(join_arcs(Vec::<u32>::new()), "");
    }

    #[test]
    fn strip_suffix_only_once() {
        assert_eq!(strip_instance_suffix("1.3.6.1.0"), Some("1.3.6.1"));
        assert_eq!(strip_instance_suffix("1.3.6.1.0.0"), Some("1.3.6.1.0"));
        assert_eq!(strip_instance_suffix("1.3.6.10"), None);
        assert_eq!(strip_instance_suffix("1.3.6.1"), None);
    }

    proptest! {
        #[test]
        fn joined_arcs_are_canonical(arcs in proptest::collection::vec(any::<u32>(), 1..16)) {
            let dotted = join_arcs(&arcs);
            prop_assert!(is_canonical(&dotted));
            prop_assert_eq!(parse_arcs(&dotted).unwrap(), arcs);
        }
    }
}
