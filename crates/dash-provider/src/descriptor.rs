//! Widget descriptors
//!
//! What the widget registry knows about a component: the provider types it
//! consumes and the user preference keys it accepts.

use serde::{Deserialize, Serialize};

/// One provider type a widget consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderRequirement {
    /// Provider type name, e.g. `"algolia"`
    #[serde(rename = "type")]
    pub provider_type: String,
    /// Whether the widget cannot work without it
    #[serde(default)]
    pub required: bool,
}

impl ProviderRequirement {
    /// Required provider type
    #[must_use]
    pub fn required(provider_type: impl Into<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            required: true,
        }
    }

    /// Optional provider type
    #[must_use]
    pub fn optional(provider_type: impl Into<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            required: false,
        }
    }
}

/// Value type of a user preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefType {
    /// Free text
    String,
    /// Any JSON number
    Number,
    /// true / false
    Boolean,
    /// JSON array
    List,
    /// JSON object
    Object,
}

impl PrefType {
    /// Whether `value` has this type
    #[must_use]
    pub fn matches(self, value: &serde_json::Value) -> bool {
        use serde_json::Value;
        matches!(
            (self, value),
            (PrefType::String, Value::String(_))
                | (PrefType::Number, Value::Number(_))
                | (PrefType::Boolean, Value::Bool(_))
                | (PrefType::List, Value::Array(_))
                | (PrefType::Object, Value::Object(_))
        )
    }
}

impl std::fmt::Display for PrefType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            PrefType::String => "string",
            PrefType::Number => "number",
            PrefType::Boolean => "boolean",
            PrefType::List => "list",
            PrefType::Object => "object",
        };
        f.write_str(text)
    }
}

/// One user preference key declared by a widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPrefField {
    /// Preference key
    pub key: String,
    /// Expected value type
    #[serde(rename = "type")]
    pub pref_type: PrefType,
    /// Must be present
    #[serde(default)]
    pub required: bool,
}

impl UserPrefField {
    /// Create field
    #[must_use]
    pub fn new(key: impl Into<String>, pref_type: PrefType, required: bool) -> Self {
        Self {
            key: key.into(),
            pref_type,
            required,
        }
    }
}

/// Registry entry for one widget component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDescriptor {
    /// Component identifier, matched against `LayoutNode::component`
    pub component: String,
    /// Human readable name
    #[serde(default)]
    pub name: Option<String>,
    /// Container workspace name instances must live in
    #[serde(default)]
    pub parent_workspace_name: Option<String>,
    /// Declared provider requirements
    #[serde(default)]
    pub requirements: Vec<ProviderRequirement>,
    /// Declared user preference keys
    #[serde(default)]
    pub user_prefs: Vec<UserPrefField>,
}

impl WidgetDescriptor {
    /// Descriptor with no requirements
    #[must_use]
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            name: None,
            parent_workspace_name: None,
            requirements: Vec::new(),
            user_prefs: Vec::new(),
        }
    }

    /// Add provider requirement
    #[must_use]
    pub fn with_requirement(mut self, requirement: ProviderRequirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Add user preference field
    #[must_use]
    pub fn with_pref(mut self, field: UserPrefField) -> Self {
        self.user_prefs.push(field);
        self
    }

    /// Set parent workspace name
    #[must_use]
    pub fn with_parent_workspace(mut self, name: impl Into<String>) -> Self {
        self.parent_workspace_name = Some(name.into());
        self
    }

    /// Whether `provider_type` is declared
    #[must_use]
    pub fn declares(&self, provider_type: &str) -> bool {
        self.requirements
            .iter()
            .any(|req| req.provider_type == provider_type)
    }
}
