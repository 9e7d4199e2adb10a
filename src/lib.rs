//! deadcil: dead-code elimination for managed assembly object models.
//!
//! This library computes, from a set of entry points, the transitive
//! closure of used types, methods, attributes, embedded UI documents
//! and external references in a loaded assembly, then removes
//! everything unreachable and optionally demotes the visibility of
//! what remains.
//!
//! # Features
//!
//! - **Reachability scanning**: a two-queue worklist over compiled
//!   code and embedded UI (BAML) documents, feeding each other
//! - **Class removal**: nesting-aware removal of unused types
//! - **Reference pruning**: managed assembly and native module
//!   references trimmed to what was actually resolved
//! - **Resource pruning**: type-bound resources follow their type,
//!   document containers are rebuilt in place
//! - **Visibility downgrade**: public types demoted to internal, with
//!   exclusions
//! - **Attribute stripping**: whole attribute namespaces struck during
//!   the scan
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use deadcil::prelude::*;
//!
//! let mut session = Deadcil::new(assembly)
//!     .with_entry_point("Acme.App");
//!
//! session.scan_used_classes(&decoder)?;
//! session.scan_unused_classes()?;
//! session.cleanup_unused_classes()?;
//! session.cleanup_unused_references()?;
//! session.cleanup_unused_resources()?;
//! session.save_to_path("out.dll", &writer)?;
//! ```
//!
//! The binary-format loader/writer and the BAML record reader are
//! collaborators injected at the edges ([`assembly::AssemblyWriter`],
//! [`baml::BamlDecoder`]); this crate only marks and removes on the
//! object model they produce.
//!
//! # Module Organization
//!
//! - [`assembly`]: the arena-based assembly object model
//! - [`baml`]: typed view of embedded UI documents
//! - [`index`]: name lookup tables over types and documents
//! - [`entry`]: entry-point resolution
//! - [`scan`]: the worklist reachability engine
//! - [`classify`]: unused type classification
//! - [`sweep`]: the four graph-mutation sweeps
//! - [`session`]: pipeline orchestration
//! - [`diag`], [`graph`], [`report`]: read-only diagnostics
//! - [`error`]: typed error handling

pub mod assembly;
pub mod baml;
pub mod classify;
pub mod config;
pub mod diag;
pub mod entry;
pub mod error;
pub mod graph;
pub mod index;
pub mod logging;
pub mod prelude;
pub mod report;
pub mod scan;
pub mod session;
pub mod sweep;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{DeadcilError, DeadcilResult};

// Session API
pub use session::Deadcil;

// Object model
pub use assembly::{
    Assembly, AssemblyRef, AssemblyWriter, AttributeArg, CustomAttribute, Field, FieldRef,
    GenericParam, Instruction, Method, MethodRef, ModuleRef, Operand, Property, Resource,
    ResourceData, ResourcePart, TypeAttributes, TypeDef, TypeId, TypeRef, TypeTag,
};

// Document model
pub use baml::{BamlDecoder, BamlDocument, BamlRecord};

// Indices
pub use index::{BamlIndex, BamlPart, TypeIndex};

// Entry points and scanning
pub use entry::{resolve_entry_points, EntryPoints};
pub use scan::{Scanner, UsageScan};

// Classification and sweeps
pub use classify::{classify_unused, UnusedTypes};
pub use sweep::{
    cleanup_unused_classes, cleanup_unused_references, cleanup_unused_resources, make_internal,
    ResourceSweepOptions,
};

// Configuration
pub use config::{load_config, DeadcilConfig};

// Logging
pub use logging::{init_structured_logging, log_error, log_info, log_warn};

// Diagnostics
pub use diag::{all_types_list, used_references_list, used_types_list};
pub use graph::{build_type_graph, type_graph_to_json};
pub use report::{print_json, print_plain, StripReport};
