//! In-memory collaborator
//!
//! Serves every operation group from process memory. Tests drive it with
//! failure injection, an offline switch, and held completions that are only
//! delivered on [`InMemoryDashboard::release_held`].

use crate::api::{DashboardApi, Dispatch};
use crate::dispatch::channel;
use crate::error::{CollaboratorError, DispatchError};
use crate::event::{Action, Feature, Operation};
use crate::types::{
    AppId, McpCatalogEntry, McpResource, McpServerConfig, McpServerStatus, McpTool, MenuItem,
    ProviderRecord, Settings, Theme, WorkspaceList,
};
use dash_layout::{Layout, MenuId, WorkspaceId, WorkspaceRecord};
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

type Deferred = Box<dyn FnOnce() + Send>;

#[derive(Debug, Default)]
struct McpServer {
    config: Option<McpServerConfig>,
    running: bool,
    tools: Vec<McpTool>,
    resources: BTreeMap<String, (McpResource, Value)>,
}

impl McpServer {
    fn status(&self, id: &str) -> McpServerStatus {
        McpServerStatus {
            id: id.to_string(),
            running: self.running,
            tool_count: self.tools.len(),
        }
    }
}

#[derive(Debug, Default)]
struct Store {
    workspaces: IndexMap<WorkspaceId, WorkspaceRecord>,
    menus: IndexMap<MenuId, MenuItem>,
    themes: IndexMap<String, Theme>,
    settings: Settings,
    providers: IndexMap<String, ProviderRecord>,
    servers: IndexMap<String, McpServer>,
}

impl Store {
    fn workspace_list(&self) -> WorkspaceList {
        WorkspaceList {
            workspaces: self.workspaces.values().cloned().collect(),
        }
    }

    fn server(&self, id: &str) -> Result<&McpServer, CollaboratorError> {
        self.servers
            .get(id)
            .ok_or_else(|| CollaboratorError::NotFound(format!("mcp server {id}")))
    }

    fn running_server(&self, id: &str) -> Result<&McpServer, CollaboratorError> {
        let server = self.server(id)?;
        if !server.running {
            return Err(CollaboratorError::Rejected(format!("mcp server {id} is not running")));
        }
        Ok(server)
    }
}

/// Injected failure
#[derive(Debug, Clone)]
enum Failure {
    Once(CollaboratorError),
    Always(CollaboratorError),
}

/// Dashboard collaborator backed by process memory
pub struct InMemoryDashboard {
    app: AppId,
    data_dir: String,
    catalog: Vec<McpCatalogEntry>,
    store: Mutex<Store>,
    failures: Mutex<HashMap<Operation, Failure>>,
    offline: AtomicBool,
    hold: AtomicBool,
    held: Mutex<Vec<Deferred>>,
}

impl fmt::Debug for InMemoryDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryDashboard")
            .field("app", &self.app)
            .field("workspaces", &self.store.lock().workspaces.len())
            .field("held", &self.held.lock().len())
            .finish_non_exhaustive()
    }
}

impl InMemoryDashboard {
    /// Empty backend serving `app`
    #[must_use]
    pub fn new(app: AppId) -> Self {
        let data_dir = format!("./data/{app}");
        Self {
            app,
            data_dir,
            catalog: Vec::new(),
            store: Mutex::new(Store::default()),
            failures: Mutex::new(HashMap::new()),
            offline: AtomicBool::new(false),
            hold: AtomicBool::new(false),
            held: Mutex::new(Vec::new()),
        }
    }

    /// Seed stored workspaces
    #[must_use]
    pub fn with_workspaces(self, records: impl IntoIterator<Item = WorkspaceRecord>) -> Self {
        {
            let mut store = self.store.lock();
            for record in records {
                store.workspaces.insert(record.id.clone(), record);
            }
        }
        self
    }

    /// Set the reported data directory
    #[must_use]
    pub fn with_data_directory(mut self, dir: impl Into<String>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the MCP catalog
    #[must_use]
    pub fn with_catalog(mut self, catalog: Vec<McpCatalogEntry>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Advertise a tool on a (possibly not yet started) MCP server
    #[must_use]
    pub fn with_mcp_tool(self, server: &str, tool: McpTool) -> Self {
        self.store
            .lock()
            .servers
            .entry(server.to_string())
            .or_default()
            .tools
            .push(tool);
        self
    }

    /// Publish a resource on an MCP server
    #[must_use]
    pub fn with_mcp_resource(self, server: &str, resource: McpResource, content: Value) -> Self {
        self.store
            .lock()
            .servers
            .entry(server.to_string())
            .or_default()
            .resources
            .insert(resource.uri.clone(), (resource, content));
        self
    }

    /// Fail the next call of `operation`
    pub fn fail_next(&self, operation: Operation, error: CollaboratorError) {
        self.failures.lock().insert(operation, Failure::Once(error));
    }

    /// Fail every call of `operation` until cleared
    pub fn fail_always(&self, operation: Operation, error: CollaboratorError) {
        self.failures.lock().insert(operation, Failure::Always(error));
    }

    /// Remove all injected failures
    pub fn clear_failures(&self) {
        self.failures.lock().clear();
    }

    /// Refuse every dispatch while offline
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Queue completions instead of delivering them
    pub fn hold_completions(&self, hold: bool) {
        self.hold.store(hold, Ordering::SeqCst);
    }

    /// Deliver every queued completion, returns how many
    pub fn release_held(&self) -> usize {
        let pending: Vec<Deferred> = std::mem::take(&mut *self.held.lock());
        let count = pending.len();
        for deliver in pending {
            deliver();
        }
        count
    }

    /// Number of queued completions
    #[must_use]
    pub fn held_count(&self) -> usize {
        self.held.lock().len()
    }

    /// Stored copy of one workspace
    #[must_use]
    pub fn stored_workspace(&self, id: &WorkspaceId) -> Option<WorkspaceRecord> {
        self.store.lock().workspaces.get(id).cloned()
    }

    /// Number of stored workspaces
    #[must_use]
    pub fn workspace_count(&self) -> usize {
        self.store.lock().workspaces.len()
    }

    fn take_failure(&self, operation: Operation) -> Option<CollaboratorError> {
        let mut failures = self.failures.lock();
        let failure = failures.get(&operation)?.clone();
        if matches!(failure, Failure::Once(_)) {
            failures.remove(&operation);
        }
        match failure {
            Failure::Once(error) | Failure::Always(error) => Some(error),
        }
    }

    fn accept(&self, app: &AppId) -> Result<(), DispatchError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DispatchError::Unavailable("backend offline".to_string()));
        }
        if *app != self.app {
            return Err(DispatchError::UnknownApp(app.to_string()));
        }
        Ok(())
    }

    fn dispatch<T, F>(&self, app: &AppId, feature: Feature, action: Action, run: F) -> Dispatch<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Store) -> Result<T, CollaboratorError>,
    {
        self.accept(app)?;
        let operation = Operation::new(feature, action);
        let result = match self.take_failure(operation) {
            Some(error) => Err(error),
            None => {
                let mut store = self.store.lock();
                run(&mut *store)
            }
        };
        debug!(%operation, ok = result.is_ok(), "dispatched");

        let (responder, outcome) = channel(operation);
        if self.hold.load(Ordering::SeqCst) {
            self.held.lock().push(Box::new(move || {
                responder.respond(result);
            }));
        } else {
            responder.respond(result);
        }
        Ok(outcome)
    }
}

impl DashboardApi for InMemoryDashboard {
    fn list_workspaces(&self, app: &AppId) -> Dispatch<WorkspaceList> {
        self.dispatch(app, Feature::Workspace, Action::List, |store| {
            Ok(store.workspace_list())
        })
    }

    fn save_workspace(&self, app: &AppId, mut workspace: WorkspaceRecord) -> Dispatch<WorkspaceList> {
        Layout::normalize(workspace.layout.clone())
            .map_err(|err| DispatchError::InvalidPayload(err.to_string()))?;
        self.dispatch(app, Feature::Workspace, Action::Save, move |store| {
            let previous = store
                .workspaces
                .get(&workspace.id)
                .map_or(workspace.version, |stored| stored.version.max(workspace.version));
            workspace.version = chrono::Utc::now()
                .timestamp_millis()
                .max(previous.saturating_add(1));
            store.workspaces.insert(workspace.id.clone(), workspace);
            Ok(store.workspace_list())
        })
    }

    fn delete_workspace(&self, app: &AppId, id: &WorkspaceId) -> Dispatch<WorkspaceList> {
        self.dispatch(app, Feature::Workspace, Action::Delete, |store| {
            store
                .workspaces
                .shift_remove(id)
                .ok_or_else(|| CollaboratorError::NotFound(format!("workspace {id}")))?;
            Ok(store.workspace_list())
        })
    }

    fn list_menu_items(&self, app: &AppId) -> Dispatch<Vec<MenuItem>> {
        self.dispatch(app, Feature::Menu, Action::List, |store| {
            Ok(store.menus.values().cloned().collect())
        })
    }

    fn save_menu_item(&self, app: &AppId, item: MenuItem) -> Dispatch<Vec<MenuItem>> {
        self.dispatch(app, Feature::Menu, Action::Save, move |store| {
            store.menus.insert(item.id.clone(), item);
            Ok(store.menus.values().cloned().collect())
        })
    }

    fn delete_menu_item(&self, app: &AppId, id: &MenuId) -> Dispatch<Vec<MenuItem>> {
        self.dispatch(app, Feature::Menu, Action::Delete, |store| {
            store
                .menus
                .shift_remove(id)
                .ok_or_else(|| CollaboratorError::NotFound(format!("menu {id}")))?;
            Ok(store.menus.values().cloned().collect())
        })
    }

    fn list_themes(&self, app: &AppId) -> Dispatch<Vec<Theme>> {
        self.dispatch(app, Feature::Theme, Action::List, |store| {
            Ok(store.themes.values().cloned().collect())
        })
    }

    fn save_theme(&self, app: &AppId, theme: Theme) -> Dispatch<Vec<Theme>> {
        self.dispatch(app, Feature::Theme, Action::Save, move |store| {
            store.themes.insert(theme.key.clone(), theme);
            Ok(store.themes.values().cloned().collect())
        })
    }

    fn delete_theme(&self, app: &AppId, key: &str) -> Dispatch<Vec<Theme>> {
        self.dispatch(app, Feature::Theme, Action::Delete, |store| {
            store
                .themes
                .shift_remove(key)
                .ok_or_else(|| CollaboratorError::NotFound(format!("theme {key}")))?;
            Ok(store.themes.values().cloned().collect())
        })
    }

    fn get_settings(&self, app: &AppId) -> Dispatch<Settings> {
        self.dispatch(app, Feature::Settings, Action::Get, |store| {
            Ok(store.settings.clone())
        })
    }

    fn save_settings(&self, app: &AppId, settings: Settings) -> Dispatch<Settings> {
        self.dispatch(app, Feature::Settings, Action::Save, move |store| {
            store.settings = settings;
            Ok(store.settings.clone())
        })
    }

    fn get_data_directory(&self, app: &AppId) -> Dispatch<String> {
        let dir = self.data_dir.clone();
        self.dispatch(app, Feature::Settings, Action::GetDataDirectory, move |_| Ok(dir))
    }

    fn list_providers(&self, app: &AppId) -> Dispatch<Vec<ProviderRecord>> {
        self.dispatch(app, Feature::Provider, Action::List, |store| {
            Ok(store.providers.values().cloned().collect())
        })
    }

    fn get_provider(&self, app: &AppId, name: &str) -> Dispatch<ProviderRecord> {
        self.dispatch(app, Feature::Provider, Action::Get, |store| {
            store
                .providers
                .get(name)
                .cloned()
                .ok_or_else(|| CollaboratorError::NotFound(format!("provider {name}")))
        })
    }

    fn save_provider(&self, app: &AppId, provider: ProviderRecord) -> Dispatch<Vec<ProviderRecord>> {
        self.dispatch(app, Feature::Provider, Action::Save, move |store| {
            store.providers.insert(provider.name.clone(), provider);
            Ok(store.providers.values().cloned().collect())
        })
    }

    fn delete_provider(&self, app: &AppId, name: &str) -> Dispatch<Vec<ProviderRecord>> {
        self.dispatch(app, Feature::Provider, Action::Delete, |store| {
            store
                .providers
                .shift_remove(name)
                .ok_or_else(|| CollaboratorError::NotFound(format!("provider {name}")))?;
            Ok(store.providers.values().cloned().collect())
        })
    }

    fn mcp_start_server(&self, app: &AppId, config: McpServerConfig) -> Dispatch<McpServerStatus> {
        self.dispatch(app, Feature::Mcp, Action::StartServer, move |store| {
            let id = config.id.clone();
            let server = store.servers.entry(id.clone()).or_default();
            if server.running {
                return Err(CollaboratorError::Rejected(format!("mcp server {id} already running")));
            }
            server.config = Some(config);
            server.running = true;
            Ok(server.status(&id))
        })
    }

    fn mcp_stop_server(&self, app: &AppId, server: &str) -> Dispatch<McpServerStatus> {
        self.dispatch(app, Feature::Mcp, Action::StopServer, |store| {
            let entry = store
                .servers
                .get_mut(server)
                .ok_or_else(|| CollaboratorError::NotFound(format!("mcp server {server}")))?;
            entry.running = false;
            Ok(entry.status(server))
        })
    }

    fn mcp_call_tool(&self, app: &AppId, server: &str, tool: &str, args: Value) -> Dispatch<Value> {
        self.dispatch(app, Feature::Mcp, Action::CallTool, move |store| {
            let entry = store.running_server(server)?;
            if !entry.tools.iter().any(|t| t.name == tool) {
                return Err(CollaboratorError::NotFound(format!("tool {tool} on {server}")));
            }
            Ok(json!({ "server": server, "tool": tool, "arguments": args }))
        })
    }

    fn mcp_list_tools(&self, app: &AppId, server: &str) -> Dispatch<Vec<McpTool>> {
        self.dispatch(app, Feature::Mcp, Action::ListTools, |store| {
            Ok(store.running_server(server)?.tools.clone())
        })
    }

    fn mcp_list_resources(&self, app: &AppId, server: &str) -> Dispatch<Vec<McpResource>> {
        self.dispatch(app, Feature::Mcp, Action::ListResources, |store| {
            Ok(store
                .running_server(server)?
                .resources
                .values()
                .map(|(resource, _)| resource.clone())
                .collect())
        })
    }

    fn mcp_read_resource(&self, app: &AppId, server: &str, uri: &str) -> Dispatch<Value> {
        self.dispatch(app, Feature::Mcp, Action::ReadResource, |store| {
            store
                .running_server(server)?
                .resources
                .get(uri)
                .map(|(_, content)| content.clone())
                .ok_or_else(|| CollaboratorError::NotFound(format!("resource {uri}")))
        })
    }

    fn mcp_server_status(&self, app: &AppId, server: &str) -> Dispatch<McpServerStatus> {
        self.dispatch(app, Feature::Mcp, Action::ServerStatus, |store| {
            Ok(store.server(server)?.status(server))
        })
    }

    fn mcp_get_catalog(&self, app: &AppId) -> Dispatch<Vec<McpCatalogEntry>> {
        let catalog = self.catalog.clone();
        self.dispatch(app, Feature::Mcp, Action::GetCatalog, move |_| Ok(catalog))
    }
}
