use std::fmt;

use serde::{Deserialize, Serialize};

/// A single variable binding decoded from a trap PDU.
///
/// The value has already been rendered to a string by the decoder, so the
/// pipeline never needs to know about BER value types.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VarBind {
    /// Dotted object identifier of the bound variable.
    pub oid: String,
    /// Stringified value.
    pub value: String,
}

impl VarBind {
    pub fn new(oid: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            oid: oid.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for VarBind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

impl<O, V> From<(O, V)> for VarBind
where
    O: Into<String>,
    V: Into<String>,
{
    fn from((oid, value): (O, V)) -> Self {
        Self::new(oid, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        let vb = VarBind::new("1.3.6.1.2.1.1.3.0", "123456");
        assert_eq!(vb.to_string(), "1.3.6.1.2.1.1.3.0 = 123456");
    }

    #[test]
    fn from_tuple() {
        let vb: VarBind = ("1.3.6.1", "x").into();
        assert_eq!(vb.oid, "1.3.6.1");
        assert_eq!(vb.value, "x");
    }
}
