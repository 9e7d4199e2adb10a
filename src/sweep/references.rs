//! Pruning of unused external references.

use tracing::{debug, info};

use crate::assembly::Assembly;
use crate::scan::UsageScan;

/// Remove every managed assembly reference and native module reference
/// the scan did not record as used.
///
/// No reference is exempt here: a structurally required entry (the
/// runtime's root library) survives only if the scan resolved into it
/// or the caller seeded it as used before scanning.
pub fn cleanup_unused_references(assembly: &mut Assembly, scan: &UsageScan) -> Vec<String> {
    info!("cleaning up unused references");
    let mut removed = Vec::new();

    assembly.assembly_refs.retain(|r| {
        if scan.used_assembly_refs.contains(&r.name) {
            true
        } else {
            debug!(reference = %r.name, "reference unused");
            removed.push(r.name.clone());
            false
        }
    });

    assembly.module_refs.retain(|r| {
        if scan.used_module_refs.contains(&r.name) {
            true
        } else {
            debug!(module = %r.name, "native module unused");
            removed.push(r.name.clone());
            false
        }
    });

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{AssemblyRef, ModuleRef};

    #[test]
    fn test_only_used_references_survive() {
        let mut asm = Assembly::new("Acme");
        asm.assembly_refs.push(AssemblyRef::new("mscorlib"));
        asm.assembly_refs.push(AssemblyRef::new("System.Xml"));
        asm.module_refs.push(ModuleRef::new("user32.dll"));
        asm.module_refs.push(ModuleRef::new("gdi32.dll"));

        let mut scan = UsageScan::default();
        scan.used_assembly_refs.insert("System.Xml".into());
        scan.used_module_refs.insert("user32.dll".into());

        let removed = cleanup_unused_references(&mut asm, &scan);
        assert_eq!(removed, vec!["mscorlib", "gdi32.dll"]);
        assert_eq!(asm.assembly_refs, vec![AssemblyRef::new("System.Xml")]);
        assert_eq!(asm.module_refs, vec![ModuleRef::new("user32.dll")]);
    }

    #[test]
    fn test_seeded_reference_survives() {
        let mut asm = Assembly::new("Acme");
        asm.assembly_refs.push(AssemblyRef::new("mscorlib"));

        let mut scan = UsageScan::default();
        scan.seed_assembly_ref("mscorlib");

        let removed = cleanup_unused_references(&mut asm, &scan);
        assert!(removed.is_empty());
        assert_eq!(asm.assembly_refs.len(), 1);
    }
}
