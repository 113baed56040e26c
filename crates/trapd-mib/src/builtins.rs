//! Built-in OID tree roots from SNMPv2-SMI.
//!
//! Enterprise MIBs import these names rather than defining them, so the
//! loader seeds its name table with them before resolving a module.

use std::collections::HashMap;

/// A built-in OID tree node: name, arc, and parent name.
pub struct BuiltinNode {
    pub name: &'static str,
    pub arc: u32,
    pub parent: Option<&'static str>,
}

/// Parents are listed before their children.
pub static BUILTIN_NODES: &[BuiltinNode] = &[
    BuiltinNode { name: "ccitt", arc: 0, parent: None },
    BuiltinNode { name: "iso", arc: 1, parent: None },
    BuiltinNode { name: "joint-iso-ccitt", arc: 2, parent: None },
    BuiltinNode { name: "org", arc: 3, parent: Some("iso") },
    BuiltinNode { name: "dod", arc: 6, parent: Some("org") },
    BuiltinNode { name: "internet", arc: 1, parent: Some("dod") },
    BuiltinNode { name: "directory", arc: 1, parent: Some("internet") },
    BuiltinNode { name: "mgmt", arc: 2, parent: Some("internet") },
    BuiltinNode { name: "mib-2", arc: 1, parent: Some("mgmt") },
    BuiltinNode { name: "transmission", arc: 10, parent: Some("mib-2") },
    BuiltinNode { name: "experimental", arc: 3, parent: Some("internet") },
    BuiltinNode { name: "private", arc: 4, parent: Some("internet") },
    BuiltinNode { name: "enterprises", arc: 1, parent: Some("private") },
    BuiltinNode { name: "security", arc: 5, parent: Some("internet") },
    BuiltinNode { name: "snmpV2", arc: 6, parent: Some("internet") },
    BuiltinNode { name: "snmpDomains", arc: 1, parent: Some("snmpV2") },
    BuiltinNode { name: "snmpProxys", arc: 2, parent: Some("snmpV2") },
    BuiltinNode { name: "snmpModules", arc: 3, parent: Some("snmpV2") },
    BuiltinNode { name: "zeroDotZero", arc: 0, parent: Some("ccitt") },
];

/// Name -> arcs table for every built-in node.
pub fn builtin_roots() -> HashMap<String, Vec<u32>> {
    let mut table: HashMap<String, Vec<u32>> = HashMap::with_capacity(BUILTIN_NODES.len());
    for node in BUILTIN_NODES {
        let mut arcs = match node.parent {
            Some(parent) => table.get(parent).cloned().unwrap_or_default(),
            None => Vec::new(),
        };
        arcs.push(node.arc);
        table.insert(node.name.to_string(), arcs);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_paths() {
        let roots = builtin_roots();
        assert_eq!(roots["iso"], vec![1]);
        assert_eq!(roots["internet"], vec![1, 3, 6, 1]);
        assert_eq!(roots["mib-2"], vec![1, 3, 6, 1, 2, 1]);
        assert_eq!(roots["enterprises"], vec![1, 3, 6, 1, 4, 1]);
        assert_eq!(roots["snmpModules"], vec![1, 3, 6, 1, 6, 3]);
        assert_eq!(roots["zeroDotZero"], vec![0, 0]);
    }

    #[test]
    fn parents_precede_children() {
        for (i, node) in BUILTIN_NODES.iter().enumerate() {
            if let Some(parent) = node.parent {
                let pos = BUILTIN_NODES.iter().position(|n| n.name == parent).unwrap();
                assert!(pos < i, "{} listed before its parent", node.name);
            }
        }
    }
}
