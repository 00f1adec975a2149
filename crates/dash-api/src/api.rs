//! Dashboard collaborator contract
//!
//! Every call takes the application id and its payload and returns at once:
//! `Err` when the call could not be dispatched, otherwise a
//! [`DispatchOutcome`] that resolves later. Callers keep processing events
//! while outcomes are pending.

use crate::dispatch::DispatchOutcome;
use crate::error::DispatchError;
use crate::types::{
    AppId, McpCatalogEntry, McpResource, McpServerConfig, McpServerStatus, McpTool, MenuItem,
    ProviderRecord, Settings, Theme, WorkspaceList,
};
use dash_layout::{MenuId, WorkspaceId, WorkspaceRecord};
use serde_json::Value;

/// Shorthand for a dispatch result
pub type Dispatch<T> = Result<DispatchOutcome<T>, DispatchError>;

/// Storage/IPC bridge consumed by the session layer
pub trait DashboardApi: Send + Sync {
    // Workspace

    /// List stored workspaces
    fn list_workspaces(&self, app: &AppId) -> Dispatch<WorkspaceList>;

    /// Save one workspace; completes with the full refreshed list
    fn save_workspace(&self, app: &AppId, workspace: WorkspaceRecord) -> Dispatch<WorkspaceList>;

    /// Delete one workspace; completes with the remaining list
    fn delete_workspace(&self, app: &AppId, id: &WorkspaceId) -> Dispatch<WorkspaceList>;

    // Menu/Folder

    /// List menu items
    fn list_menu_items(&self, app: &AppId) -> Dispatch<Vec<MenuItem>>;

    /// Save a menu item; completes with the full list
    fn save_menu_item(&self, app: &AppId, item: MenuItem) -> Dispatch<Vec<MenuItem>>;

    /// Delete a menu item; completes with the remaining list
    fn delete_menu_item(&self, app: &AppId, id: &MenuId) -> Dispatch<Vec<MenuItem>>;

    // Theme

    /// List themes
    fn list_themes(&self, app: &AppId) -> Dispatch<Vec<Theme>>;

    /// Save a theme; completes with the full list
    fn save_theme(&self, app: &AppId, theme: Theme) -> Dispatch<Vec<Theme>>;

    /// Delete a theme; completes with the remaining list
    fn delete_theme(&self, app: &AppId, key: &str) -> Dispatch<Vec<Theme>>;

    // Settings

    /// Read settings
    fn get_settings(&self, app: &AppId) -> Dispatch<Settings>;

    /// Replace settings; completes with the stored document
    fn save_settings(&self, app: &AppId, settings: Settings) -> Dispatch<Settings>;

    /// Directory holding application data
    fn get_data_directory(&self, app: &AppId) -> Dispatch<String>;

    // Provider

    /// List configured providers
    fn list_providers(&self, app: &AppId) -> Dispatch<Vec<ProviderRecord>>;

    /// Read one provider
    fn get_provider(&self, app: &AppId, name: &str) -> Dispatch<ProviderRecord>;

    /// Save a provider; completes with the full list
    fn save_provider(&self, app: &AppId, provider: ProviderRecord) -> Dispatch<Vec<ProviderRecord>>;

    /// Delete a provider; completes with the remaining list
    fn delete_provider(&self, app: &AppId, name: &str) -> Dispatch<Vec<ProviderRecord>>;

    // MCP tool bridge

    /// Start an MCP server
    fn mcp_start_server(&self, app: &AppId, config: McpServerConfig) -> Dispatch<McpServerStatus>;

    /// Stop an MCP server
    fn mcp_stop_server(&self, app: &AppId, server: &str) -> Dispatch<McpServerStatus>;

    /// Invoke a tool
    fn mcp_call_tool(&self, app: &AppId, server: &str, tool: &str, args: Value) -> Dispatch<Value>;

    /// List a server's tools
    fn mcp_list_tools(&self, app: &AppId, server: &str) -> Dispatch<Vec<McpTool>>;

    /// List a server's resources
    fn mcp_list_resources(&self, app: &AppId, server: &str) -> Dispatch<Vec<McpResource>>;

    /// Read one resource
    fn mcp_read_resource(&self, app: &AppId, server: &str, uri: &str) -> Dispatch<Value>;

    /// Server state
    fn mcp_server_status(&self, app: &AppId, server: &str) -> Dispatch<McpServerStatus>;

    /// Installable servers
    fn mcp_get_catalog(&self, app: &AppId) -> Dispatch<Vec<McpCatalogEntry>>;
}
