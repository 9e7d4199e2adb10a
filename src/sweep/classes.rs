//! Removal of unused types from the live tables.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::assembly::{Assembly, TypeId};
use crate::classify::UnusedTypes;
use crate::error::{DeadcilError, DeadcilResult};

/// Remove every unused type.
///
/// Top-level types are removed from the type table first; nested
/// removal then runs against whatever top-level types survived, so a
/// nested entry is never removed through an enclosing type that is
/// itself gone. A type the classifier listed but the live table no
/// longer holds means the index and the tables have diverged; that is
/// always a hard failure.
pub fn cleanup_unused_classes(
    assembly: &mut Assembly,
    unused: &UnusedTypes,
) -> DeadcilResult<Vec<String>> {
    info!("cleaning up unused classes");
    let mut removed = Vec::new();

    for &id in &unused.top_level {
        let name = assembly.type_def(id).name.clone();
        if !assembly.remove_top_level(id) {
            return Err(DeadcilError::consistency(format!(
                "failed to remove type: {name}"
            )));
        }
        debug!(type_name = %name, "type removed");
        removed.push(name);
    }

    let nested: HashSet<TypeId> = unused.nested.iter().copied().collect();
    let mut nested_removed = 0usize;
    let survivors: Vec<TypeId> = assembly.top_level().to_vec();
    for id in survivors {
        remove_nested_in(assembly, id, &nested, &mut removed, &mut nested_removed)?;
    }

    if nested_removed != nested.len() {
        return Err(DeadcilError::consistency(format!(
            "{} unused nested types were not found in any surviving type",
            nested.len() - nested_removed
        )));
    }

    Ok(removed)
}

fn remove_nested_in(
    assembly: &mut Assembly,
    id: TypeId,
    nested: &HashSet<TypeId>,
    removed: &mut Vec<String>,
    count: &mut usize,
) -> DeadcilResult<()> {
    let children: Vec<TypeId> = assembly.type_def(id).nested.clone();
    for child in children {
        if nested.contains(&child) {
            let name = assembly.type_def(child).name.clone();
            if !assembly.remove_nested(id, child) {
                return Err(DeadcilError::consistency(format!(
                    "failed to remove nested type: {name}"
                )));
            }
            debug!(type_name = %name, "nested type removed");
            removed.push(name);
            *count += 1;
        } else {
            remove_nested_in(assembly, child, nested, removed, count)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::TypeDef;
    use crate::classify::classify_unused;
    use crate::scan::UsageScan;

    #[test]
    fn test_top_level_removed_before_nested() {
        let mut asm = Assembly::new("Acme");
        let dead_outer = asm.add_type(TypeDef::new("Acme.DeadOuter"));
        asm.add_nested_type(dead_outer, TypeDef::new("Acme.DeadOuter/Inner"));
        let live_outer = asm.add_type(TypeDef::new("Acme.LiveOuter"));
        asm.add_nested_type(live_outer, TypeDef::new("Acme.LiveOuter/DeadInner"));

        let mut scan = UsageScan::default();
        scan.used_types.insert(live_outer);

        let unused = classify_unused(&asm, &scan);
        let removed = cleanup_unused_classes(&mut asm, &unused).unwrap();

        assert!(removed.contains(&"Acme.DeadOuter".to_string()));
        assert!(removed.contains(&"Acme.LiveOuter/DeadInner".to_string()));
        assert_eq!(asm.top_level(), &[live_outer]);
        assert!(asm.type_def(live_outer).nested.is_empty());
    }

    #[test]
    fn test_stale_classification_is_fatal() {
        let mut asm = Assembly::new("Acme");
        let dead = asm.add_type(TypeDef::new("Acme.Dead"));

        let unused = classify_unused(&asm, &UsageScan::default());
        assert_eq!(unused.top_level, vec![dead]);

        // the table diverged between classification and the sweep
        asm.remove_top_level(dead);
        let err = cleanup_unused_classes(&mut asm, &unused).unwrap_err();
        assert!(matches!(err, DeadcilError::Consistency { .. }));
    }
}
