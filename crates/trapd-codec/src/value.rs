use std::net::Ipv4Addr;
use std::str::FromStr;

use async_snmp::{Oid, Value};
use bytes::Bytes;
use trapd_types::oid::{is_canonical, parse_arcs};

use crate::error::{CodecError, CodecResult};

/// Render a decoded SNMP value the way trap records carry it.
///
/// Printable octet strings come through as text, binary ones as
/// colon-separated hex. Numbers are plain decimal.
pub fn render(value: &Value) -> String {
    match value {
        Value::Integer(v) => v.to_string(),
        Value::OctetString(bytes) => match std::str::from_utf8(bytes) {
            Ok(s) if is_printable(s) => s.to_string(),
            _ => colon_hex(bytes),
        },
        Value::Null => "Null".to_string(),
        Value::ObjectIdentifier(oid) => oid.to_string(),
        Value::IpAddress(addr) => Ipv4Addr::from(*addr).to_string(),
        Value::Counter32(v) => v.to_string(),
        Value::Gauge32(v) => v.to_string(),
        Value::TimeTicks(v) => v.to_string(),
        Value::Counter64(v) => v.to_string(),
        Value::Opaque(bytes) => colon_hex(bytes),
        other => other.to_string(),
    }
}

fn colon_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| hex::encode([*b]))
        .collect::<Vec<_>>()
        .join(":")
}

fn is_printable(s: &str) -> bool {
    s.chars().all(|c| !c.is_control() || matches!(c, '\t' | '\r' | '\n'))
}

/// Convert a dotted OID string into an [`Oid`].
pub fn to_oid(oid: &str) -> CodecResult<Oid> {
    let arcs = parse_arcs(oid).map_err(|_| CodecError::InvalidOid(oid.to_string()))?;
    Ok(Oid::from_slice(&arcs))
}

/// A typed value for an outgoing trap binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrapValue {
    Integer(i32),
    OctetString(Vec<u8>),
    Null,
    ObjectIdentifier(String),
    IpAddress(Ipv4Addr),
    Counter32(u32),
    Gauge32(u32),
    TimeTicks(u32),
    Counter64(u64),
}

impl TrapValue {
    pub fn to_value(&self) -> CodecResult<Value> {
        let value = match self {
            Self::Integer(v) => Value::Integer(*v),
            Self::OctetString(b) => Value::OctetString(Bytes::copy_from_slice(b)),
            Self::Null => Value::Null,
            Self::ObjectIdentifier(oid) => Value::ObjectIdentifier(to_oid(oid)?),
            Self::IpAddress(ip) => Value::IpAddress(ip.octets()),
            Self::Counter32(v) => Value::Counter32(*v),
            Self::Gauge32(v) => Value::Gauge32(*v),
            Self::TimeTicks(v) => Value::TimeTicks(*v),
            Self::Counter64(v) => Value::Counter64(*v),
        };
        Ok(value)
    }
}

/// Parse `type:value` notation, as accepted by `trapd send --var`.
///
/// Recognised prefixes: `int`, `str`, `hex`, `oid`, `ip`, `counter`,
/// `gauge`, `ticks`, `counter64`, and the bare word `null`. Anything else is
/// taken as an octet string.
impl FromStr for TrapValue {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "null" {
            return Ok(Self::Null);
        }
        let Some((kind, raw)) = s.split_once(':') else {
            return Ok(Self::OctetString(s.as_bytes().to_vec()));
        };
        let invalid = |what: &str| CodecError::InvalidValue(format!("{what}: {raw:?}"));
        let value = match kind {
            "int" => Self::Integer(raw.parse().map_err(|_| invalid("integer"))?),
            "str" => Self::OctetString(raw.as_bytes().to_vec()),
            "hex" => Self::OctetString(hex::decode(raw.replace(':', "")).map_err(|_| invalid("hex"))?),
            "oid" => {
                if !is_canonical(raw) {
                    return Err(invalid("object identifier"));
                }
                Self::ObjectIdentifier(raw.to_string())
            }
            "ip" => Self::IpAddress(raw.parse().map_err(|_| invalid("IPv4 address"))?),
            "counter" => Self::Counter32(raw.parse().map_err(|_| invalid("Counter32"))?),
            "gauge" => Self::Gauge32(raw.parse().map_err(|_| invalid("Gauge32"))?),
            "ticks" => Self::TimeTicks(raw.parse().map_err(|_| invalid("TimeTicks"))?),
            "counter64" => Self::Counter64(raw.parse().map_err(|_| invalid("Counter64"))?),
            _ => Self::OctetString(s.as_bytes().to_vec()),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderings() {
        assert_eq!(render(&Value::Integer(-5)), "-5");
        assert_eq!(render(&Value::OctetString(Bytes::from_static(b"critical"))), "critical");
        assert_eq!(render(&Value::OctetString(Bytes::from_static(&[0x00, 0x1b, 0xff]))), "00:1b:ff");
        assert_eq!(render(&Value::OctetString(Bytes::new())), "");
        assert_eq!(render(&Value::Null), "Null");
        assert_eq!(render(&Value::TimeTicks(123456)), "123456");
        assert_eq!(render(&Value::Counter64(u64::MAX)), u64::MAX.to_string());
        assert_eq!(
            render(&Value::ObjectIdentifier(Oid::from_slice(&[1, 3, 6, 1, 4, 1, 9, 9, 1]))),
            "1.3.6.1.4.1.9.9.1"
        );
    }

    #[test]
    fn ip_address_renders_dotted() {
        let value = TrapValue::IpAddress(Ipv4Addr::new(10, 0, 0, 1)).to_value().unwrap();
        assert_eq!(render(&value), "10.0.0.1");
    }

    #[test]
    fn oid_strings_are_checked() {
        assert_eq!(to_oid("1.3.6.1.4.1.9").unwrap(), Oid::from_slice(&[1, 3, 6, 1, 4, 1, 9]));
        assert!(matches!(to_oid("1..3"), Err(CodecError::InvalidOid(_))));
        assert!(matches!(to_oid("sysName"), Err(CodecError::InvalidOid(_))));
    }

    #[test]
    fn parse_typed_notation() {
        assert_eq!("int:42".parse::<TrapValue>().unwrap(), TrapValue::Integer(42));
        assert_eq!("ticks:100".parse::<TrapValue>().unwrap(), TrapValue::TimeTicks(100));
        assert_eq!(
            "oid:1.3.6.1.4.1.9.9.1".parse::<TrapValue>().unwrap(),
            TrapValue::ObjectIdentifier("1.3.6.1.4.1.9.9.1".into())
        );
        assert_eq!("hex:de:ad".parse::<TrapValue>().unwrap(), TrapValue::OctetString(vec![0xde, 0xad]));
        assert_eq!("null".parse::<TrapValue>().unwrap(), TrapValue::Null);
        assert_eq!("critical".parse::<TrapValue>().unwrap(), TrapValue::OctetString(b"critical".to_vec()));
        assert_eq!("url:http".parse::<TrapValue>().unwrap(), TrapValue::OctetString(b"url:http".to_vec()));
        assert!("int:abc".parse::<TrapValue>().is_err());
        assert!("int:99999999999".parse::<TrapValue>().is_err());
        assert!("oid:1..2".parse::<TrapValue>().is_err());
    }
}
