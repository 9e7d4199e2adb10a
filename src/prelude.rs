//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use deadcil::prelude::*;
//! ```

// Core session API
pub use crate::session::Deadcil;

// Error types
pub use crate::error::{DeadcilError, DeadcilResult};

// Object model
pub use crate::assembly::{
    Assembly, AssemblyRef, AssemblyWriter, CustomAttribute, Field, Instruction, Method, MethodRef,
    ModuleRef, Operand, Property, Resource, ResourcePart, TypeDef, TypeId, TypeRef,
};

// Document model
pub use crate::baml::{BamlDecoder, BamlDocument, BamlRecord};

// Pipeline pieces, for callers that drive stages directly
pub use crate::classify::{classify_unused, UnusedTypes};
pub use crate::entry::resolve_entry_points;
pub use crate::index::{BamlIndex, TypeIndex};
pub use crate::scan::{Scanner, UsageScan};

// Configuration
pub use crate::config::{load_config, DeadcilConfig};

// Reporting
pub use crate::report::StripReport;
