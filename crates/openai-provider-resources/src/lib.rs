pub mod context;
pub mod data_sources;
pub mod diagnostics;
pub mod errors;
pub mod registry;
pub mod resource;
pub mod resources;
#[cfg(test)]
mod testing;

// Minimal user-facing API: ResourceRegistry, ResourceContext, ApplyOutcome, Diagnostics, ResourceError.
pub use context::ResourceContext;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use errors::ResourceError;
pub use registry::{ApplyOutcome, ReadOutcome, ResourceRegistry};
pub use resource::{DataSource, DynDataSource, DynResource, PlanAction, Resource, reconcile};
