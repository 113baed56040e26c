//! The OID -> symbol name lookup table shared by every worker.
//!
//! The [`MibSymbolIndex`] is built once from a loaded [`Mib`] and never
//! mutated afterwards, so workers share it behind an `Arc` and read it
//! without locking.

use std::collections::HashMap;

use tracing::debug;

use crate::symbol::Mib;

/// Exact-match index from canonical dotted OID to symbol name.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MibSymbolIndex {
    entries: HashMap<String, String>,
}

impl std::fmt::Debug for MibSymbolIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MibSymbolIndex")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl MibSymbolIndex {
    /// Index every symbol of `mib` that carries an OID value.
    ///
    /// Symbols are visited in definition order; a later definition of the
    /// same OID replaces the earlier name.
    pub fn build(mib: &Mib) -> Self {
        let mut entries = HashMap::with_capacity(mib.symbols.len());
        let mut replaced = 0usize;
        for symbol in mib.oid_symbols() {
            if let Some(oid) = &symbol.oid {
                if entries.insert(oid.clone(), symbol.name.clone()).is_some() {
                    replaced += 1;
                }
            }
        }
        debug!(
            module = %mib.module,
            indexed = entries.len(),
            replaced,
            "MIB symbol index built"
        );
        Self { entries }
    }

    /// Build from literal `(oid, name)` pairs. Last pair wins on duplicates.
    pub fn from_pairs<I, O, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (O, N)>,
        O: Into<String>,
        N: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(oid, name)| (oid.into(), name.into()))
                .collect(),
        }
    }

    /// Exact lookup; no prefix or wildcard matching.
    pub fn lookup(&self, oid: &str) -> Option<&str> {
        self.entries.get(oid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(oid, name)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All entries sorted by OID arcs numerically (`1.3.6.1.2` before `1.3.6.1.10`).
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<_> = self.iter().collect();
        out.sort_by_cached_key(|(oid, _)| {
            oid.split('.')
                .map(|arc| arc.parse::<u64>().unwrap_or(u64::MAX))
                .collect::<Vec<_>>()
        });
        out
    }
}
