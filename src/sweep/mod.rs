//! Graph-mutation sweeps consuming the classifier's output.
//!
//! Four independent mutators: class removal (nesting-aware), reference
//! pruning (managed and native), resource pruning (with the document
//! container rebuild), and the visibility downgrade. Each returns the
//! names of what it removed or adjusted, for reporting.

pub mod classes;
pub mod references;
pub mod resources;
pub mod visibility;

pub use classes::cleanup_unused_classes;
pub use references::cleanup_unused_references;
pub use resources::{cleanup_unused_resources, ResourceSweepOptions};
pub use visibility::make_internal;
