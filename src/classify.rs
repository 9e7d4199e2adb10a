//! Unused type classification.
//!
//! One pass over the top-level table, producing the complement of the
//! scan's reachable set. The module pseudo-type, the compiler's
//! constants container and compiler-generated types are never
//! candidates. Nested types are classified before their enclosing type;
//! a used nested type keeps the enclosing type out of the unused list
//! (the container must survive removal) without adding it to the used
//! set.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::assembly::{Assembly, TypeId, TypeTag};
use crate::scan::UsageScan;

/// The classifier's output, consumed by the sweeps.
///
/// `top_level` and `nested` list exactly what the class sweep must
/// touch: removed top-level types take their whole subtree with them,
/// so subtrees of removed types are not listed again under `nested`.
/// `names` records every type name in any removed subtree, for the
/// resource sweep's `<TypeName>.resources` rule.
#[derive(Debug, Default)]
pub struct UnusedTypes {
    pub top_level: Vec<TypeId>,
    pub nested: Vec<TypeId>,
    names: HashSet<String>,
}

impl UnusedTypes {
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Classify every declared type as used or unused.
pub fn classify_unused(assembly: &Assembly, scan: &UsageScan) -> UnusedTypes {
    info!("scanning for unused classes");
    let mut unused = UnusedTypes::default();

    for &id in assembly.top_level() {
        let def = assembly.type_def(id);
        match def.tag {
            TypeTag::ModuleType | TypeTag::PrivateImplDetails | TypeTag::CompilerGenerated => {
                continue
            }
            TypeTag::Regular => {}
        }

        if subtree_used(assembly, scan, id) {
            // the type itself or something nested in it survives;
            // descend to find unused nested subtrees
            classify_nested(assembly, scan, id, &mut unused);
        } else {
            debug!(type_name = %def.name, "type unused");
            unused.top_level.push(id);
            record_subtree_names(assembly, id, &mut unused.names);
        }
    }

    info!(unused = unused.len(), "classification complete");
    unused
}

/// A type subtree is used when the type itself or any transitively
/// nested type was marked reachable.
fn subtree_used(assembly: &Assembly, scan: &UsageScan, id: TypeId) -> bool {
    scan.is_type_used(id)
        || assembly
            .type_def(id)
            .nested
            .iter()
            .any(|&nested| subtree_used(assembly, scan, nested))
}

fn classify_nested(assembly: &Assembly, scan: &UsageScan, id: TypeId, unused: &mut UnusedTypes) {
    for &nested in &assembly.type_def(id).nested {
        if subtree_used(assembly, scan, nested) {
            classify_nested(assembly, scan, nested, unused);
        } else {
            debug!(type_name = %assembly.type_def(nested).name, "type unused");
            unused.nested.push(nested);
            record_subtree_names(assembly, nested, &mut unused.names);
        }
    }
}

fn record_subtree_names(assembly: &Assembly, id: TypeId, names: &mut HashSet<String>) {
    let def = assembly.type_def(id);
    names.insert(def.name.clone());
    for &nested in &def.nested {
        record_subtree_names(assembly, nested, names);
    }
}
