//! Read-only listing helpers for tooling and debugging.

use crate::assembly::Assembly;
use crate::scan::UsageScan;

/// Deterministic, sorted listing of every declared type name.
pub fn all_types_list(assembly: &Assembly, separator: &str) -> String {
    let mut names: Vec<&str> = assembly
        .live_types()
        .into_iter()
        .map(|id| assembly.type_def(id).name.as_str())
        .collect();
    names.sort_unstable();
    names.join(separator)
}

/// Sorted listing of every type the scan proved used.
pub fn used_types_list(assembly: &Assembly, scan: &UsageScan, separator: &str) -> String {
    let mut names: Vec<&str> = scan
        .used_types
        .iter()
        .map(|&id| assembly.type_def(id).name.as_str())
        .collect();
    names.sort_unstable();
    names.join(separator)
}

/// Sorted listing of every external reference the scan recorded.
pub fn used_references_list(scan: &UsageScan, separator: &str) -> String {
    let mut names: Vec<&str> = scan
        .used_assembly_refs
        .iter()
        .map(String::as_str)
        .collect();
    names.sort_unstable();
    names.join(separator)
}
