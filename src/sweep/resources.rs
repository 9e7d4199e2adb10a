//! Pruning of unused resources, including the UI document container
//! rebuild.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::assembly::{Assembly, ResourceData, ResourcePart};
use crate::classify::UnusedTypes;
use crate::error::{DeadcilError, DeadcilResult};
use crate::index::{BamlIndex, TypeIndex};
use crate::scan::UsageScan;

/// Caller-configured knobs for the resource sweep.
#[derive(Debug)]
pub struct ResourceSweepOptions<'a> {
    /// Resource names never removed, whatever the rules say.
    pub exclusions: &'a HashSet<String>,
    /// Container part names never removed from the rebuilt container.
    pub baml_exclusions: &'a HashSet<String>,
    /// Remove resources and container parts that match no known type
    /// and were never marked used. Off keeps them.
    pub remove_unknown: bool,
}

/// Apply the keep/remove rules to every resource table entry.
///
/// Type-named resources are matched against the classifier's name set,
/// not the live type table, so this sweep works the same whether it
/// runs before or after class removal. The document container is
/// rebuilt in place and dropped entirely when the rebuild leaves it
/// empty.
pub fn cleanup_unused_resources(
    assembly: &mut Assembly,
    types: &TypeIndex,
    bamls: &BamlIndex,
    scan: &UsageScan,
    unused: &UnusedTypes,
    options: &ResourceSweepOptions<'_>,
) -> DeadcilResult<Vec<String>> {
    info!("cleaning up unused resources");
    let manager_name = assembly.resource_manager_name();
    let mut removed = Vec::new();

    let mut i = 0;
    while i < assembly.resources.len() {
        let resource = &assembly.resources[i];

        if options.exclusions.contains(&resource.name) {
            i += 1;
            continue;
        }

        if resource.is_container() {
            let name = resource.name.clone();
            let rebuilt = rebuild_container(assembly, bamls, scan, options, &mut removed)?;
            if rebuilt.is_empty() {
                debug!(resource = %name, "document container emptied, dropping");
                removed.push(name);
                assembly.resources.remove(i);
            } else {
                assembly.resources[i].data = ResourceData::BamlContainer(rebuilt);
                i += 1;
            }
            continue;
        }

        if resource.name == manager_name {
            i += 1;
            continue;
        }

        let remove = match resource.name.strip_suffix(".resources") {
            Some(stem) if types.contains(stem) => unused.contains_name(stem),
            _ => options.remove_unknown,
        };

        if remove {
            let name = resource.name.clone();
            debug!(resource = %name, "resource unused");
            removed.push(name);
            assembly.resources.remove(i);
        } else {
            i += 1;
        }
    }

    Ok(removed)
}

/// Rebuild the container's part list: documents survive iff the scan
/// reached them, other parts follow the unknown-resource rule against
/// the scan's used-resource marks and the container exclusion set.
fn rebuild_container(
    assembly: &Assembly,
    bamls: &BamlIndex,
    scan: &UsageScan,
    options: &ResourceSweepOptions<'_>,
    removed: &mut Vec<String>,
) -> DeadcilResult<Vec<ResourcePart>> {
    let Some((_, parts)) = assembly.baml_container() else {
        return Ok(Vec::new());
    };
    if parts.len() != bamls.parts().len() {
        return Err(DeadcilError::consistency(
            "document container diverged from its index",
        ));
    }

    let mut kept = Vec::with_capacity(parts.len());
    for (position, part) in parts.iter().enumerate() {
        if options.baml_exclusions.contains(&part.name) {
            kept.push(part.clone());
            continue;
        }

        let keep = if bamls.part(position).document.is_some() {
            scan.used_documents.contains(&position)
        } else {
            !options.remove_unknown || scan.used_resource_names.contains(&part.name)
        };

        if keep {
            kept.push(part.clone());
        } else {
            debug!(resource = %part.name, "container part unused");
            removed.push(part.name.clone());
        }
    }
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{Resource, TypeDef};
    use crate::baml::{BamlDecoder, BamlDocument, BamlRecord};
    use crate::classify::classify_unused;

    struct NameBoundDecoder;

    impl BamlDecoder for NameBoundDecoder {
        fn decode(&self, name: &str, _blob: &[u8]) -> DeadcilResult<BamlDocument> {
            Ok(BamlDocument::new(vec![BamlRecord::TypeInfo {
                type_name: format!("Acme.{}", name.trim_end_matches(".baml")),
            }]))
        }
    }

    fn sweep(
        assembly: &mut Assembly,
        scan: &UsageScan,
        remove_unknown: bool,
        exclusions: &HashSet<String>,
        baml_exclusions: &HashSet<String>,
    ) -> Vec<String> {
        let types = TypeIndex::build(assembly).unwrap();
        let bamls = BamlIndex::build(assembly, &NameBoundDecoder).unwrap();
        let unused = classify_unused(assembly, scan);
        let options = ResourceSweepOptions {
            exclusions,
            baml_exclusions,
            remove_unknown,
        };
        cleanup_unused_resources(assembly, &types, &bamls, scan, &unused, &options).unwrap()
    }

    #[test]
    fn test_typed_resource_follows_type() {
        let mut asm = Assembly::new("Acme");
        let used = asm.add_type(TypeDef::new("Acme.UsedForm"));
        asm.add_type(TypeDef::new("Acme.UnusedForm"));
        asm.resources.push(Resource::blob("Acme.UsedForm.resources", vec![]));
        asm.resources.push(Resource::blob("Acme.UnusedForm.resources", vec![]));

        let mut scan = UsageScan::default();
        scan.used_types.insert(used);

        let removed = sweep(&mut asm, &scan, false, &HashSet::new(), &HashSet::new());
        assert_eq!(removed, vec!["Acme.UnusedForm.resources"]);
        assert_eq!(asm.resources.len(), 1);
    }

    #[test]
    fn test_unknown_resource_kept_unless_aggressive() {
        let mut asm = Assembly::new("Acme");
        asm.resources.push(Resource::blob("Acme.Branding.Logo.png", vec![]));

        let scan = UsageScan::default();
        let removed = sweep(&mut asm, &scan, false, &HashSet::new(), &HashSet::new());
        assert!(removed.is_empty());

        let removed = sweep(&mut asm, &scan, true, &HashSet::new(), &HashSet::new());
        assert_eq!(removed, vec!["Acme.Branding.Logo.png"]);
    }

    #[test]
    fn test_exclusion_beats_aggressive_removal() {
        let mut asm = Assembly::new("Acme");
        asm.resources.push(Resource::blob("Acme.Branding.Logo.png", vec![]));

        let exclusions: HashSet<String> = ["Acme.Branding.Logo.png".to_string()].into();
        let removed = sweep(&mut asm, &UsageScan::default(), true, &exclusions, &HashSet::new());
        assert!(removed.is_empty());
        assert_eq!(asm.resources.len(), 1);
    }

    #[test]
    fn test_resource_manager_entry_kept() {
        let mut asm = Assembly::new("Acme");
        asm.resources.push(Resource::blob(
            "Acme.Properties.Resources.resources",
            vec![],
        ));

        let removed = sweep(&mut asm, &UsageScan::default(), true, &HashSet::new(), &HashSet::new());
        assert!(removed.is_empty());
    }

    #[test]
    fn test_container_rebuild_keeps_used_documents() {
        let mut asm = Assembly::new("Acme");
        asm.resources.push(Resource::baml_container(
            "Acme.g.resources",
            vec![
                ResourcePart::new("used.baml", vec![]),
                ResourcePart::new("unused.baml", vec![]),
                ResourcePart::new("logo.png", vec![]),
            ],
        ));

        let mut scan = UsageScan::default();
        scan.used_documents.insert(0);

        let removed = sweep(&mut asm, &scan, false, &HashSet::new(), &HashSet::new());
        assert_eq!(removed, vec!["unused.baml"]);

        let (_, parts) = asm.baml_container().unwrap();
        let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["used.baml", "logo.png"]);
    }

    #[test]
    fn test_container_part_exclusion() {
        let mut asm = Assembly::new("Acme");
        asm.resources.push(Resource::baml_container(
            "Acme.g.resources",
            vec![ResourcePart::new("themes/generic.baml", vec![])],
        ));

        let baml_exclusions: HashSet<String> = ["themes/generic.baml".to_string()].into();
        let removed = sweep(
            &mut asm,
            &UsageScan::default(),
            true,
            &HashSet::new(),
            &baml_exclusions,
        );
        assert!(removed.is_empty());
        assert!(asm.baml_container().is_some());
    }

    #[test]
    fn test_empty_container_dropped() {
        let mut asm = Assembly::new("Acme");
        asm.resources.push(Resource::baml_container(
            "Acme.g.resources",
            vec![ResourcePart::new("unused.baml", vec![])],
        ));

        let removed = sweep(&mut asm, &UsageScan::default(), false, &HashSet::new(), &HashSet::new());
        assert_eq!(removed, vec!["unused.baml", "Acme.g.resources"]);
        assert!(asm.resources.is_empty());
    }
}
