use std::fmt;

/// What kind of definition a MIB symbol came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// `name OBJECT IDENTIFIER ::= { ... }`
    ObjectIdentifier,
    ObjectType,
    NotificationType,
    /// SMIv1 `TRAP-TYPE`, bound to `enterprise.0.specific`.
    TrapType,
    ModuleIdentity,
    ObjectIdentity,
    /// `OBJECT-GROUP` / `NOTIFICATION-GROUP`.
    Group,
    /// `MODULE-COMPLIANCE` / `AGENT-CAPABILITIES`.
    Compliance,
    /// A type assignment; never carries an OID.
    Type,
}

impl SymbolKind {
    /// Map a macro keyword to its symbol kind.
    pub fn from_macro(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "OBJECT-TYPE" => Self::ObjectType,
            "NOTIFICATION-TYPE" => Self::NotificationType,
            "TRAP-TYPE" => Self::TrapType,
            "MODULE-IDENTITY" => Self::ModuleIdentity,
            "OBJECT-IDENTITY" => Self::ObjectIdentity,
            "OBJECT-GROUP" | "NOTIFICATION-GROUP" => Self::Group,
            "MODULE-COMPLIANCE" | "AGENT-CAPABILITIES" => Self::Compliance,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ObjectIdentifier => "OBJECT IDENTIFIER",
            Self::ObjectType => "OBJECT-TYPE",
            Self::NotificationType => "NOTIFICATION-TYPE",
            Self::TrapType => "TRAP-TYPE",
            Self::ModuleIdentity => "MODULE-IDENTITY",
            Self::ObjectIdentity => "OBJECT-IDENTITY",
            Self::Group => "GROUP",
            Self::Compliance => "COMPLIANCE",
            Self::Type => "TYPE",
        };
        write!(f, "{s}")
    }
}

/// One named definition from a loaded MIB.
///
/// Immutable once the MIB is loaded. `oid` is the canonical dotted form, or
/// `None` for type definitions and values whose parent could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MibSymbol {
    pub name: String,
    pub oid: Option<String>,
    pub kind: SymbolKind,
}

impl MibSymbol {
    pub fn new(name: impl Into<String>, oid: Option<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            oid,
            kind,
        }
    }
}

/// A loaded MIB module: its name and symbols in definition order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mib {
    pub module: String,
    pub symbols: Vec<MibSymbol>,
}

impl Mib {
    pub fn new(module: impl Into<String>, symbols: Vec<MibSymbol>) -> Self {
        Self {
            module: module.into(),
            symbols,
        }
    }

    /// Symbols that carry an OID value.
    pub fn oid_symbols(&self) -> impl Iterator<Item = &MibSymbol> {
        self.symbols.iter().filter(|s| s.oid.is_some())
    }

    pub fn symbol(&self, name: &str) -> Option<&MibSymbol> {
        self.symbols.iter().rev().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_keywords() {
        assert_eq!(SymbolKind::from_macro("OBJECT-TYPE"), Some(SymbolKind::ObjectType));
        assert_eq!(SymbolKind::from_macro("NOTIFICATION-GROUP"), Some(SymbolKind::Group));
        assert_eq!(SymbolKind::from_macro("TEXTUAL-CONVENTION"), None);
    }

    #[test]
    fn oid_symbols_skip_types() {
        let mib = Mib::new(
            "TEST-MIB",
            vec![
                MibSymbol::new("DisplayString", None, SymbolKind::Type),
                MibSymbol::new("myAlarm", Some("1.3.6.1.4.1.9.9.1".into()), SymbolKind::NotificationType),
            ],
        );
        let names: Vec<&str> = mib.oid_symbols().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["myAlarm"]);
        assert_eq!(mib.symbol("DisplayString").unwrap().kind, SymbolKind::Type);
    }
}
