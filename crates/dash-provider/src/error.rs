//! Provider resolver errors

use dash_layout::{LayoutError, WidgetUuid};

/// Provider binding and registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// No widget node carries the uuid
    #[error("widget not found: {0}")]
    WidgetNotFound(WidgetUuid),

    /// Layout rejected the node edit
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Component absent from the widget registry
    #[error("unknown component: {0}")]
    UnknownComponent(String),

    /// Provider type not declared by the widget's component
    #[error("component {component} does not declare provider type {provider_type}")]
    UndeclaredType {
        /// Widget component
        component: String,
        /// Rejected provider type
        provider_type: String,
    },
}

impl ProviderError {
    /// Whether the error points at a missing registry entry rather than bad input
    #[inline]
    #[must_use]
    pub fn is_registry_miss(&self) -> bool {
        matches!(self, Self::UnknownComponent(_))
    }
}
