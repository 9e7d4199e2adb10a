//! The strip session: pipeline orchestration over one assembly.
//!
//! Provides a fluent interface for configuring and running a strip:
//!
//! ```rust,ignore
//! use deadcil::prelude::*;
//!
//! let mut session = Deadcil::new(assembly)
//!     .with_entry_point("Acme.App")
//!     .with_entry_point_baml("ui/mainwindow.baml")
//!     .seed_reference("mscorlib");
//!
//! session.scan_used_classes(&decoder)?;
//! session.scan_unused_classes()?;
//! session.cleanup_unused_classes()?;
//! session.cleanup_unused_references()?;
//! session.cleanup_unused_resources()?;
//! session.make_internal()?;
//! session.save_to_path("out.dll", &writer)?;
//! ```
//!
//! The session is single-threaded, synchronous shared mutable state;
//! stages must run in the documented order and a failed stage poisons
//! the session, so a partially stripped assembly can never be
//! serialized.

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::assembly::{Assembly, AssemblyWriter};
use crate::baml::BamlDecoder;
use crate::classify::{classify_unused, UnusedTypes};
use crate::config::DeadcilConfig;
use crate::diag;
use crate::entry::resolve_entry_points;
use crate::error::{DeadcilError, DeadcilResult};
use crate::graph::{build_type_graph, type_graph_to_json};
use crate::index::{BamlIndex, TypeIndex};
use crate::report::StripReport;
use crate::scan::{Scanner, UsageScan};
use crate::sweep::{
    cleanup_unused_classes, cleanup_unused_references, cleanup_unused_resources, make_internal,
    ResourceSweepOptions,
};

/// A configured strip session over one loaded assembly.
pub struct Deadcil {
    assembly: Assembly,
    config: DeadcilConfig,
    seeded_refs: Vec<String>,
    type_index: Option<TypeIndex>,
    baml_index: Option<BamlIndex>,
    scan: Option<UsageScan>,
    unused: Option<UnusedTypes>,
    report: StripReport,
    failed: bool,
}

impl Deadcil {
    /// Create a session for an assembly produced by the loader.
    pub fn new(assembly: Assembly) -> Self {
        Self {
            assembly,
            config: DeadcilConfig::default(),
            seeded_refs: Vec::new(),
            type_index: None,
            baml_index: None,
            scan: None,
            unused: None,
            report: StripReport::default(),
            failed: false,
        }
    }

    // ---- configuration ----------------------------------------------

    /// Replace the whole configuration at once.
    pub fn with_config(mut self, config: DeadcilConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a type name as an analysis entry point.
    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.config.entry_points.push(name.into());
        self
    }

    /// Add an embedded document name as an analysis entry point.
    pub fn with_entry_point_baml(mut self, name: impl Into<String>) -> Self {
        self.config.entry_point_bamls.push(name.into());
        self
    }

    /// Exclude a type name from the visibility downgrade.
    pub fn with_internal_exclusion(mut self, name: impl Into<String>) -> Self {
        self.config.make_internal_exclusions.push(name.into());
        self
    }

    /// Exclude a resource name from the resource sweep.
    pub fn with_resource_exclusion(mut self, name: impl Into<String>) -> Self {
        self.config.unused_resource_exclusions.push(name.into());
        self
    }

    /// Exclude a container part name from the container rebuild.
    pub fn with_baml_resource_exclusion(mut self, name: impl Into<String>) -> Self {
        self.config.unused_baml_exclusions.push(name.into());
        self
    }

    /// Strip attributes from this namespace instead of marking them
    /// used. Consulted during scanning only, so it must be set before
    /// [`Self::scan_used_classes`].
    pub fn with_attribute_removal_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.remove_attribute_namespaces.push(namespace.into());
        self
    }

    /// Remove resources matching no known type. Defaults to keeping
    /// them.
    pub fn remove_unknown_resources(mut self, enabled: bool) -> Self {
        self.config.remove_unknown_resources = enabled;
        self
    }

    /// Pre-seed an external reference as used so the reference sweep
    /// keeps it even when the scan never resolves into it.
    pub fn seed_reference(mut self, name: impl Into<String>) -> Self {
        self.seeded_refs.push(name.into());
        self
    }

    // ---- pipeline ----------------------------------------------------

    /// Build the indices, resolve entry points and run the worklist
    /// scan. Must run first; nothing is mutated if an entry point fails
    /// to resolve.
    pub fn scan_used_classes(&mut self, decoder: &dyn BamlDecoder) -> DeadcilResult<()> {
        self.guard()?;
        let result = self.scan_used_inner(decoder);
        self.note(result)
    }

    fn scan_used_inner(&mut self, decoder: &dyn BamlDecoder) -> DeadcilResult<()> {
        let types = TypeIndex::build(&self.assembly)?;
        let bamls = BamlIndex::build(&self.assembly, decoder)?;
        let entries = resolve_entry_points(&self.assembly, &types, &bamls, &self.config)?;

        let namespaces: HashSet<String> = self
            .config
            .remove_attribute_namespaces
            .iter()
            .cloned()
            .collect();
        let mut scanner = Scanner::new(&mut self.assembly, &types, &bamls, &namespaces);
        for name in &self.seeded_refs {
            scanner.seed_assembly_ref(name.clone());
        }
        let scan = scanner.run(&entries);

        self.type_index = Some(types);
        self.baml_index = Some(bamls);
        self.scan = Some(scan);
        Ok(())
    }

    /// Classify every declared type as used or unused. Requires a
    /// completed scan.
    pub fn scan_unused_classes(&mut self) -> DeadcilResult<()> {
        self.guard()?;
        let result = match &self.scan {
            Some(scan) => {
                self.unused = Some(classify_unused(&self.assembly, scan));
                Ok(())
            }
            None => Err(DeadcilError::consistency(
                "scan_unused_classes called before scan_used_classes",
            )),
        };
        self.note(result)
    }

    /// Remove every unused type from the live tables. Requires
    /// classification.
    pub fn cleanup_unused_classes(&mut self) -> DeadcilResult<()> {
        self.guard()?;
        let result = match &self.unused {
            Some(unused) => cleanup_unused_classes(&mut self.assembly, unused).map(|removed| {
                self.report.removed_types.extend(removed);
            }),
            None => Err(DeadcilError::consistency(
                "cleanup_unused_classes called before scan_unused_classes",
            )),
        };
        self.note(result)
    }

    /// Remove every external reference the scan did not record as
    /// used. Requires a completed scan.
    pub fn cleanup_unused_references(&mut self) -> DeadcilResult<()> {
        self.guard()?;
        let result = match &self.scan {
            Some(scan) => {
                let removed = cleanup_unused_references(&mut self.assembly, scan);
                self.report.removed_references.extend(removed);
                Ok(())
            }
            None => Err(DeadcilError::consistency(
                "cleanup_unused_references called before scan_used_classes",
            )),
        };
        self.note(result)
    }

    /// Apply the resource keep/remove rules and rebuild the document
    /// container. Requires classification; independent of whether
    /// classes were already removed, since type-named resources match
    /// against the classifier's name set rather than the live table.
    pub fn cleanup_unused_resources(&mut self) -> DeadcilResult<()> {
        self.guard()?;
        let result = self.cleanup_resources_inner();
        self.note(result)
    }

    fn cleanup_resources_inner(&mut self) -> DeadcilResult<()> {
        let (Some(types), Some(bamls), Some(scan), Some(unused)) = (
            self.type_index.as_ref(),
            self.baml_index.as_ref(),
            self.scan.as_ref(),
            self.unused.as_ref(),
        ) else {
            return Err(DeadcilError::consistency(
                "cleanup_unused_resources called before scan and classification",
            ));
        };

        let exclusions: HashSet<String> = self
            .config
            .unused_resource_exclusions
            .iter()
            .cloned()
            .collect();
        let baml_exclusions: HashSet<String> = self
            .config
            .unused_baml_exclusions
            .iter()
            .cloned()
            .collect();
        let options = ResourceSweepOptions {
            exclusions: &exclusions,
            baml_exclusions: &baml_exclusions,
            remove_unknown: self.config.remove_unknown_resources,
        };

        let removed =
            cleanup_unused_resources(&mut self.assembly, types, bamls, scan, unused, &options)?;
        self.report.removed_resources.extend(removed);
        Ok(())
    }

    /// Downgrade externally visible types to assembly-internal,
    /// honoring the configured exclusions.
    pub fn make_internal(&mut self) -> DeadcilResult<()> {
        self.guard()?;
        let exclusions: HashSet<String> = self
            .config
            .make_internal_exclusions
            .iter()
            .cloned()
            .collect();
        let adjusted = make_internal(&mut self.assembly, &exclusions);
        self.report.adjusted_visibility.extend(adjusted);
        Ok(())
    }

    // ---- output ------------------------------------------------------

    /// Serialize the stripped assembly through the injected writer.
    /// Refused after any failed stage.
    pub fn save_to_writer(
        &self,
        out: &mut dyn Write,
        writer: &dyn AssemblyWriter,
    ) -> DeadcilResult<()> {
        self.guard()?;
        writer.write(&self.assembly, out)
    }

    /// Serialize the stripped assembly to a file.
    pub fn save_to_path(
        &self,
        path: impl AsRef<Path>,
        writer: &dyn AssemblyWriter,
    ) -> DeadcilResult<()> {
        self.guard()?;
        let path = path.as_ref();
        info!(path = %path.display(), "writing assembly");
        let mut file = File::create(path).map_err(|e| DeadcilError::io(path, e))?;
        writer.write(&self.assembly, &mut file)
    }

    // ---- inspection --------------------------------------------------

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    pub fn into_assembly(self) -> Assembly {
        self.assembly
    }

    pub fn usage(&self) -> Option<&UsageScan> {
        self.scan.as_ref()
    }

    pub fn unused_types(&self) -> Option<&UnusedTypes> {
        self.unused.as_ref()
    }

    pub fn report(&self) -> &StripReport {
        &self.report
    }

    /// Sorted listing of every declared type name.
    pub fn all_types_list(&self, separator: &str) -> String {
        diag::all_types_list(&self.assembly, separator)
    }

    /// Sorted listing of every type the scan proved used.
    pub fn used_types_list(&self, separator: &str) -> Option<String> {
        self.scan
            .as_ref()
            .map(|scan| diag::used_types_list(&self.assembly, scan, separator))
    }

    /// Sorted listing of every external reference the scan recorded.
    pub fn used_references_list(&self, separator: &str) -> Option<String> {
        self.scan
            .as_ref()
            .map(|scan| diag::used_references_list(scan, separator))
    }

    /// Dependency graph of the live types in visualizer JSON format.
    /// Requires a completed scan (the graph reuses the scan's index).
    pub fn dependency_graph_json(&self) -> DeadcilResult<serde_json::Value> {
        let types = self.type_index.as_ref().ok_or_else(|| {
            DeadcilError::consistency("dependency_graph_json called before scan_used_classes")
        })?;
        let graph = build_type_graph(&self.assembly, types);
        let empty = UnusedTypes::default();
        let unused = self.unused.as_ref().unwrap_or(&empty);
        Ok(type_graph_to_json(&self.assembly, &graph, unused))
    }

    // ---- internals ---------------------------------------------------

    fn guard(&self) -> DeadcilResult<()> {
        if self.failed {
            Err(DeadcilError::consistency(
                "session has failed; no further operations are allowed",
            ))
        } else {
            Ok(())
        }
    }

    fn note<T>(&mut self, result: DeadcilResult<T>) -> DeadcilResult<T> {
        if result.is_err() {
            self.failed = true;
        }
        result
    }
}
