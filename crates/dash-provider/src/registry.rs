//! Process-wide widget registry
//!
//! Writers replace the whole map under a short lock; readers take an
//! immutable [`RegistrySnapshot`] and never observe a half-applied change.

use crate::descriptor::{ProviderRequirement, WidgetDescriptor};
use crate::error::ProviderError;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

type Entries = BTreeMap<String, Arc<WidgetDescriptor>>;

static GLOBAL: Lazy<WidgetRegistry> = Lazy::new(WidgetRegistry::new);

/// Registry of widget descriptors keyed by component
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    entries: RwLock<Arc<Entries>>,
}

impl WidgetRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide instance
    #[must_use]
    pub fn global() -> &'static WidgetRegistry {
        &GLOBAL
    }

    /// Register or replace a descriptor, returns the previous one
    pub fn register(&self, descriptor: WidgetDescriptor) -> Option<Arc<WidgetDescriptor>> {
        let mut guard = self.entries.write();
        let mut next = Entries::clone(&guard);
        let component = descriptor.component.clone();
        let previous = next.insert(component.clone(), Arc::new(descriptor));
        *guard = Arc::new(next);
        tracing::debug!(%component, replaced = previous.is_some(), "registered widget");
        previous
    }

    /// Remove a descriptor, returns it if present
    pub fn unregister(&self, component: &str) -> Option<Arc<WidgetDescriptor>> {
        let mut guard = self.entries.write();
        if !guard.contains_key(component) {
            return None;
        }
        let mut next = Entries::clone(&guard);
        let removed = next.remove(component);
        *guard = Arc::new(next);
        tracing::debug!(%component, "unregistered widget");
        removed
    }

    /// Immutable view of the current entries
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            entries: Arc::clone(&self.entries.read()),
        }
    }
}

/// Point-in-time copy of the registry
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    entries: Arc<Entries>,
}

impl RegistrySnapshot {
    /// Lookup descriptor
    #[must_use]
    pub fn get(&self, component: &str) -> Option<&WidgetDescriptor> {
        self.entries.get(component).map(Arc::as_ref)
    }

    /// Lookup descriptor
    ///
    /// # Errors
    /// `UnknownComponent` if not registered
    pub fn descriptor(&self, component: &str) -> Result<&WidgetDescriptor, ProviderError> {
        self.get(component)
            .ok_or_else(|| ProviderError::UnknownComponent(component.to_string()))
    }

    /// Declared requirements of a component
    ///
    /// # Errors
    /// `UnknownComponent` if not registered
    pub fn requirements(&self, component: &str) -> Result<&[ProviderRequirement], ProviderError> {
        Ok(&self.descriptor(component)?.requirements)
    }

    /// Whether a component is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, component: &str) -> bool {
        self.entries.contains_key(component)
    }

    /// Registered component names
    pub fn components(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshots_are_isolated_from_later_writes() {
        let registry = WidgetRegistry::new();
        registry.register(WidgetDescriptor::new("Clock"));
        let before = registry.snapshot();

        registry.register(WidgetDescriptor::new("Search"));
        assert!(registry.unregister("Clock").is_some());

        assert!(before.contains("Clock"));
        assert!(!before.contains("Search"));

        let after = registry.snapshot();
        assert_eq!(after.components().collect::<Vec<_>>(), vec!["Search"]);
    }

    #[test]
    fn unknown_component() {
        let registry = WidgetRegistry::new();
        assert!(registry.unregister("missing").is_none());
        let err = registry.snapshot().requirements("missing").unwrap_err();
        assert!(err.is_registry_miss());
    }

    #[test]
    fn register_replaces() {
        let registry = WidgetRegistry::new();
        assert!(registry.register(WidgetDescriptor::new("Clock")).is_none());
        let previous = registry.register(WidgetDescriptor::new("Clock").with_parent_workspace("layout"));
        assert!(previous.is_some());
        assert_eq!(
            registry.snapshot().get("Clock").unwrap().parent_workspace_name.as_deref(),
            Some("layout")
        );
    }
}
