//! Name lookup indices over the type graph and the UI document
//! container.
//!
//! Both indices are built once per scan and never mutated afterwards;
//! the sweeps match against index contents by name, so they stay valid
//! even after types have been pruned from the live tables.

use std::collections::HashMap;

use tracing::debug;

use crate::assembly::{Assembly, TypeId};
use crate::baml::{normalize_part_name, BamlDecoder, BamlDocument};
use crate::error::{DeadcilError, DeadcilResult};

/// O(1) full-name lookup over every top-level and nested type.
#[derive(Debug, Default)]
pub struct TypeIndex {
    by_name: HashMap<String, TypeId>,
}

impl TypeIndex {
    /// Build the index. A duplicate full name means the loader handed
    /// us an impossible assembly; that is a hard failure, not a
    /// user-facing condition.
    pub fn build(assembly: &Assembly) -> DeadcilResult<Self> {
        let mut by_name = HashMap::new();
        for id in assembly.live_types() {
            let name = assembly.type_def(id).name.clone();
            if by_name.insert(name.clone(), id).is_some() {
                return Err(DeadcilError::consistency(format!(
                    "duplicate type name in assembly: {name}"
                )));
            }
        }
        debug!(types = by_name.len(), "type index built");
        Ok(Self { by_name })
    }

    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// One indexed container part: the original name, the decoded document
/// for `.baml` parts, and the type the document instantiates.
#[derive(Debug)]
pub struct BamlPart {
    pub name: String,
    pub document: Option<BamlDocument>,
    pub bound_type: Option<String>,
}

/// Index over the UI document container: normalized part name → part,
/// and bound type full name → part. Positions correspond 1:1 to the
/// container's entry list at build time.
#[derive(Debug, Default)]
pub struct BamlIndex {
    parts: Vec<BamlPart>,
    by_name: HashMap<String, usize>,
    by_type: HashMap<String, usize>,
}

impl BamlIndex {
    /// Build the index, decoding every document part through the
    /// injected decoder. Absent container → empty index.
    pub fn build(assembly: &Assembly, decoder: &dyn BamlDecoder) -> DeadcilResult<Self> {
        let Some((_, raw_parts)) = assembly.baml_container() else {
            return Ok(Self::default());
        };

        let mut parts = Vec::with_capacity(raw_parts.len());
        let mut by_name = HashMap::new();
        let mut by_type = HashMap::new();

        for (idx, raw) in raw_parts.iter().enumerate() {
            let document = if raw.is_document() {
                Some(decoder.decode(&raw.name, &raw.blob)?)
            } else {
                None
            };
            let bound_type = document
                .as_ref()
                .and_then(|d| d.bound_type())
                .map(str::to_string);

            if let Some(bound) = &bound_type {
                by_type.entry(bound.clone()).or_insert(idx);
            }
            by_name.insert(normalize_part_name(&raw.name), idx);
            parts.push(BamlPart {
                name: raw.name.clone(),
                document,
                bound_type,
            });
        }

        debug!(
            parts = parts.len(),
            documents = by_type.len(),
            "document index built"
        );
        Ok(Self {
            parts,
            by_name,
            by_type,
        })
    }

    pub fn part(&self, idx: usize) -> &BamlPart {
        &self.parts[idx]
    }

    pub fn parts(&self) -> &[BamlPart] {
        &self.parts
    }

    /// Look up a part by normalized name.
    pub fn part_by_name(&self, normalized: &str) -> Option<usize> {
        self.by_name.get(normalized).copied()
    }

    /// Look up the document bound to a type, by the type's full name.
    pub fn part_for_type(&self, type_name: &str) -> Option<usize> {
        self.by_type.get(type_name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
