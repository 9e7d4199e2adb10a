//! Visibility downgrade of externally visible types.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::assembly::{Assembly, TypeAttributes, TypeId, TypeTag};

/// Strip the public bit from every top-level type not excluded by name
/// or by structural tag, downgrading it to assembly-internal.
///
/// Operates on whatever is in the table when it runs, independent of
/// the reachable and unused sets; callers conventionally run it after
/// class removal.
pub fn make_internal(assembly: &mut Assembly, exclusions: &HashSet<String>) -> Vec<String> {
    info!("adjusting access modifiers");
    let mut adjusted = Vec::new();

    let top_level: Vec<TypeId> = assembly.top_level().to_vec();
    for id in top_level {
        let def = assembly.type_def_mut(id);
        match def.tag {
            TypeTag::ModuleType | TypeTag::PrivateImplDetails | TypeTag::CompilerGenerated => {
                continue
            }
            TypeTag::Regular => {}
        }

        if def.attributes.contains(TypeAttributes::PUBLIC)
            && !def.attributes.contains(TypeAttributes::NESTED_PUBLIC)
            && !exclusions.contains(&def.name)
        {
            def.attributes.remove(TypeAttributes::PUBLIC);
            debug!(type_name = %def.name, "access modifier adjusted");
            adjusted.push(def.name.clone());
        }
    }

    adjusted
}
