//! Provider binding resolver
//!
//! A widget's provider selection lives in two places: on its node
//! (`LayoutNode::selected_providers`) and in the workspace-scoped store keyed
//! by widget uuid. Every function here returns a whole new [`Workspace`] with
//! both places written, so no caller can see one without the other.

use crate::descriptor::{ProviderRequirement, UserPrefField};
use crate::error::ProviderError;
use crate::registry::RegistrySnapshot;
use dash_layout::{LayoutNode, ProviderStore, WidgetUuid, Workspace};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

fn widget_node<'a>(workspace: &'a Workspace, uuid: &WidgetUuid) -> Result<&'a LayoutNode, ProviderError> {
    workspace
        .widget(uuid)
        .ok_or_else(|| ProviderError::WidgetNotFound(uuid.clone()))
}

/// Select `provider_name` for `provider_type` on the widget `uuid`
///
/// # Errors
/// `WidgetNotFound` if no widget carries `uuid`
pub fn bind(
    workspace: &Workspace,
    uuid: &WidgetUuid,
    provider_type: &str,
    provider_name: &str,
) -> Result<Workspace, ProviderError> {
    let node_id = widget_node(workspace, uuid)?.id;
    let layout = workspace.layout.update(node_id, |node| {
        node.selected_providers
            .insert(provider_type.to_string(), provider_name.to_string());
    })?;

    let mut next = workspace.clone();
    next.layout = layout;
    next.selected_providers
        .entry(uuid.clone())
        .or_default()
        .insert(provider_type.to_string(), provider_name.to_string());

    debug!(widget = %uuid, provider_type, provider_name, "bound provider");
    Ok(next)
}

/// [`bind`], refusing provider types the widget's component does not declare
///
/// # Errors
/// `WidgetNotFound`, `UnknownComponent` if the component is not registered,
/// or `UndeclaredType`
pub fn bind_declared(
    workspace: &Workspace,
    registry: &RegistrySnapshot,
    uuid: &WidgetUuid,
    provider_type: &str,
    provider_name: &str,
) -> Result<Workspace, ProviderError> {
    let node = widget_node(workspace, uuid)?;
    let component = node.component.as_deref().unwrap_or_default();
    if !registry.descriptor(component)?.declares(provider_type) {
        return Err(ProviderError::UndeclaredType {
            component: component.to_string(),
            provider_type: provider_type.to_string(),
        });
    }
    bind(workspace, uuid, provider_type, provider_name)
}

/// Clear the selection for `provider_type` on the widget `uuid`
///
/// Empty per-widget entries are dropped from the workspace store.
///
/// # Errors
/// `WidgetNotFound` if no widget carries `uuid`
pub fn unbind(workspace: &Workspace, uuid: &WidgetUuid, provider_type: &str) -> Result<Workspace, ProviderError> {
    let node_id = widget_node(workspace, uuid)?.id;
    let layout = workspace.layout.update(node_id, |node| {
        node.selected_providers.remove(provider_type);
    })?;

    let mut next = workspace.clone();
    next.layout = layout;
    if let Some(entry) = next.selected_providers.get_mut(uuid) {
        entry.remove(provider_type);
        if entry.is_empty() {
            next.selected_providers.remove(uuid);
        }
    }

    debug!(widget = %uuid, provider_type, "unbound provider");
    Ok(next)
}

/// Declared provider types the node has no (non-empty) selection for
#[must_use]
pub fn unresolved_requirements(node: &LayoutNode, requirements: &[ProviderRequirement]) -> Vec<String> {
    requirements
        .iter()
        .filter(|req| {
            node.selected_providers
                .get(&req.provider_type)
                .map_or(true, String::is_empty)
        })
        .map(|req| req.provider_type.clone())
        .collect()
}

/// Whether every required provider type has a selection
#[must_use]
pub fn is_ready(node: &LayoutNode, requirements: &[ProviderRequirement]) -> bool {
    let missing = unresolved_requirements(node, requirements);
    requirements
        .iter()
        .filter(|req| req.required)
        .all(|req| !missing.contains(&req.provider_type))
}

/// Workspace store as implied by the node-level bindings
#[must_use]
pub fn store_from_nodes(workspace: &Workspace) -> ProviderStore {
    workspace
        .layout
        .iter()
        .filter(|node| !node.selected_providers.is_empty())
        .filter_map(|node| {
            node.widget_uuid()
                .map(|uuid| (uuid.clone(), node.selected_providers.clone()))
        })
        .collect()
}

/// Rebuild the workspace-scoped store from node bindings
///
/// The node is authoritative. Entries for widgets no longer in the tree are
/// dropped, and so are store-only selections of widgets still present (data
/// loaded with the two places out of step). The latter are logged at `warn`.
#[must_use]
pub fn reconcile(workspace: &Workspace) -> Workspace {
    let store = store_from_nodes(workspace);
    if store == workspace.selected_providers {
        return workspace.clone();
    }
    for (uuid, selection) in &workspace.selected_providers {
        if workspace.widget(uuid).is_some() && store.get(uuid) != Some(selection) {
            warn!(
                workspace = %workspace.id,
                widget = %uuid,
                dropped = ?selection,
                "store selection not on node, replaced by node bindings"
            );
        }
    }
    debug!(
        workspace = %workspace.id,
        before = workspace.selected_providers.len(),
        after = store.len(),
        "reconciled provider store"
    );
    let mut next = workspace.clone();
    next.selected_providers = store;
    next
}

/// Whether both provider stores agree
#[must_use]
pub fn is_consistent(workspace: &Workspace) -> bool {
    store_from_nodes(workspace) == workspace.selected_providers
}

/// One problem found by [`validate_user_prefs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefViolation {
    /// Required key absent
    Missing(String),
    /// Value of the wrong type
    WrongType {
        /// Preference key
        key: String,
        /// Declared type
        expected: crate::descriptor::PrefType,
    },
    /// Key not declared by the widget
    Undeclared(String),
}

/// Check user prefs against the declared `{key, type, required}` fields
///
/// Returns every violation, empty when valid.
#[must_use]
pub fn validate_user_prefs(prefs: &BTreeMap<String, Value>, fields: &[UserPrefField]) -> Vec<PrefViolation> {
    let mut violations = Vec::new();
    for field in fields {
        match prefs.get(&field.key) {
            None | Some(Value::Null) if field.required => {
                violations.push(PrefViolation::Missing(field.key.clone()));
            }
            Some(value) if !value.is_null() && !field.pref_type.matches(value) => {
                violations.push(PrefViolation::WrongType {
                    key: field.key.clone(),
                    expected: field.pref_type,
                });
            }
            _ => {}
        }
    }
    violations.extend(
        prefs
            .keys()
            .filter(|key| !fields.iter().any(|f| &f.key == *key))
            .map(|key| PrefViolation::Undeclared(key.clone())),
    );
    violations
}
