//! Payloads exchanged with the dashboard collaborator

use dash_layout::{MenuId, WorkspaceRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Application identifier passed with every call
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(pub String);

impl AppId {
    /// Create app id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of list/save/delete workspace: the full stored list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkspaceList {
    /// Every stored workspace
    pub workspaces: Vec<WorkspaceRecord>,
}

/// Navigation folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    /// Identifier
    pub id: MenuId,
    /// Display name
    pub name: String,
    /// Enclosing folder
    #[serde(default)]
    pub parent_id: Option<MenuId>,
    /// Icon hint
    #[serde(default)]
    pub icon: Option<String>,
}

/// Named theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Key referenced by `Workspace::theme_key`
    pub key: String,
    /// Display name
    pub name: String,
    /// Opaque style values
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// Application settings document
pub type Settings = BTreeMap<String, Value>;

/// Configured data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    /// Unique provider name, e.g. `"algolia-prod"`
    pub name: String,
    /// Provider type, e.g. `"algolia"`
    #[serde(rename = "type")]
    pub provider_type: String,
    /// Opaque connection settings
    #[serde(default)]
    pub credentials: BTreeMap<String, Value>,
}

/// How to launch an MCP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Server id
    pub id: String,
    /// Executable
    pub command: String,
    /// Arguments
    #[serde(default)]
    pub args: Vec<String>,
}

/// Running state of an MCP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpServerStatus {
    /// Server id
    pub id: String,
    /// Whether it is running
    pub running: bool,
    /// Tool count advertised
    pub tool_count: usize,
}

/// Tool advertised by an MCP server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    /// Tool name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// JSON schema of the arguments
    #[serde(default)]
    pub input_schema: Value,
}

/// Resource advertised by an MCP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpResource {
    /// Resource uri
    pub uri: String,
    /// Display name
    pub name: String,
    /// Content type
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Catalog entry of an installable MCP server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpCatalogEntry {
    /// Server id
    pub id: String,
    /// Display name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
}
