//! Entry-point resolution.
//!
//! Maps the configured entry-point names plus the assembly's own entry
//! method to index nodes before anything is mutated. Any unresolvable
//! name fails the whole scan; partial results are never produced.

use tracing::info;

use crate::assembly::{Assembly, TypeId};
use crate::baml::normalize_part_name;
use crate::config::DeadcilConfig;
use crate::error::{DeadcilError, DeadcilResult};
use crate::index::{BamlIndex, TypeIndex};

/// Resolved scan seeds: type ids for the code queue, container part
/// positions for the document queue.
#[derive(Debug, Default)]
pub struct EntryPoints {
    pub types: Vec<TypeId>,
    pub documents: Vec<usize>,
}

/// Resolve every configured entry point.
///
/// The module entry method's declaring type is seeded implicitly when
/// the assembly declares one. User-supplied type names resolve through
/// the type index, document names through the container index; either
/// missing is a [`DeadcilError::Resolution`].
pub fn resolve_entry_points(
    assembly: &Assembly,
    types: &TypeIndex,
    bamls: &BamlIndex,
    config: &DeadcilConfig,
) -> DeadcilResult<EntryPoints> {
    let mut entries = EntryPoints::default();

    if let Some(entry_type) = &assembly.entry_point_type {
        // set by the loader, so it must exist in the index
        let id = types.get(entry_type).ok_or_else(|| {
            DeadcilError::consistency(format!(
                "module entry point type missing from index: {entry_type}"
            ))
        })?;
        info!(type_name = %entry_type, "found module entry point");
        entries.types.push(id);
    }

    for name in &config.entry_points {
        let id = types
            .get(name)
            .ok_or_else(|| DeadcilError::resolution(name))?;
        info!(type_name = %name, "entry point resolved");
        entries.types.push(id);
    }

    for name in &config.entry_point_bamls {
        let normalized = normalize_part_name(name);
        let part = bamls
            .part_by_name(&normalized)
            .ok_or_else(|| DeadcilError::resolution(name))?;
        info!(document = %name, "document entry point resolved");
        entries.documents.push(part);
    }

    Ok(entries)
}
