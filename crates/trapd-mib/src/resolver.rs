//! OID -> display name resolution.
//!
//! Rules, first match wins:
//!
//! 1. `sysUpTime.0` always resolves to `sysUpTime`, without consulting the index.
//! 2. Exact lookup of the OID as given.
//! 3. If the OID ends in `.0`, exact lookup of the OID with that one suffix removed.
//! 4. Otherwise unresolved.
//!
//! There is no ancestor walk beyond the single `.0` trim.

use std::sync::Arc;

use tracing::info;
use trapd_types::oid::strip_instance_suffix;
use trapd_types::{SYS_UPTIME_NAME, SYS_UPTIME_OID};

use crate::index::MibSymbolIndex;

/// Which rule produced a resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    WellKnown(&'static str),
    Exact(&'a str),
    /// Matched after stripping the `.0` instance suffix.
    Instance(&'a str),
    Unresolved,
}

impl<'a> Resolution<'a> {
    pub fn name(&self) -> Option<&'a str> {
        match *self {
            Self::WellKnown(name) => Some(name),
            Self::Exact(name) | Self::Instance(name) => Some(name),
            Self::Unresolved => None,
        }
    }

    pub fn rule(&self) -> &'static str {
        match self {
            Self::WellKnown(_) => "well-known",
            Self::Exact(_) => "exact",
            Self::Instance(_) => "instance",
            Self::Unresolved => "unresolved",
        }
    }
}

/// Stateless resolver over a shared, read-only index. Cheap to clone.
#[derive(Clone, Debug)]
pub struct OidResolver {
    index: Arc<MibSymbolIndex>,
}

impl OidResolver {
    pub fn new(index: Arc<MibSymbolIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &MibSymbolIndex {
        &self.index
    }

    /// Apply the resolution rules without logging.
    pub fn explain(&self, oid: &str) -> Resolution<'_> {
        if oid == SYS_UPTIME_OID {
            return Resolution::WellKnown(SYS_UPTIME_NAME);
        }
        if let Some(name) = self.index.lookup(oid) {
            return Resolution::Exact(name);
        }
        if let Some(name) = strip_instance_suffix(oid).and_then(|base| self.index.lookup(base)) {
            return Resolution::Instance(name);
        }
        Resolution::Unresolved
    }

    /// Resolve `oid` to a display name. Unresolved OIDs are logged at `info`
    /// and return `None`; callers fall back to the raw OID.
    pub fn resolve(&self, oid: &str) -> Option<String> {
        let name = self.explain(oid).name().map(str::to_string);
        if name.is_none() {
            info!(oid, "OID not found in MIB");
        }
        name
    }

    /// Resolve, falling back to the raw OID.
    pub fn display_name(&self, oid: &str) -> String {
        self.resolve(oid).unwrap_or_else(|| oid.to_string())
    }
}
