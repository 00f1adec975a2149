//! Provider binding resolver (dash-provider)
//!
//! Keeps widget provider selections consistent between the node and the
//! workspace-scoped store, and holds the process-wide widget registry the
//! resolver reads declared requirements from.

pub mod binding;
pub mod descriptor;
pub mod error;
pub mod registry;

// Re-exports
pub use binding::{
    bind, bind_declared, is_consistent, is_ready, reconcile, store_from_nodes, unbind,
    unresolved_requirements, validate_user_prefs, PrefViolation,
};
pub use descriptor::{PrefType, ProviderRequirement, UserPrefField, WidgetDescriptor};
pub use error::ProviderError;
pub use registry::{RegistrySnapshot, WidgetRegistry};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
