//! Testing utilities for the dashboard engine workspace
//!
//! Shared fixtures: sample layouts, the 2x2 grid template, a workspace with
//! a provider-requiring widget, and a seeded in-memory backend.

#![allow(missing_docs)]

use dash_api::{AppId, InMemoryDashboard};
use dash_layout::grid::{GridTemplate, TemplateCell};
use dash_layout::{Layout, LayoutNode, NodeId, WidgetUuid, Workspace, WorkspaceId, WorkspaceRecord};
use dash_provider::{ProviderRequirement, RegistrySnapshot, WidgetDescriptor, WidgetRegistry};

pub const APP: &str = "dashboard";

pub fn app() -> AppId {
    AppId::new(APP)
}

/// Root container with a "layout" panel, a "widgets" panel and one widget in
/// each:
///
/// ```text
/// 1 container(layout)
/// ├── 2 container(layout)
/// │   └── 4 widget Chart   (tag layout)
/// └── 3 container(widgets)
///     └── 5 widget Table   (tag widgets)
/// ```
pub fn sample_layout() -> Layout {
    Layout::normalize(vec![
        LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
        LayoutNode::container(NodeId(2), NodeId(1), "layout"),
        LayoutNode::container(NodeId(3), NodeId(1), "widgets").with_order(1),
        LayoutNode::widget(NodeId(4), NodeId(2), "Chart", WidgetUuid::from("uuid-4"))
            .with_parent_workspace("layout"),
        LayoutNode::widget(NodeId(5), NodeId(3), "Table", WidgetUuid::from("uuid-5"))
            .with_parent_workspace("widgets"),
    ])
    .unwrap()
}

pub fn sample_workspace(id: &str, name: &str) -> Workspace {
    Workspace::new(WorkspaceId::from(id), sample_layout()).with_name(name)
}

pub fn unnamed_workspace(id: &str) -> Workspace {
    Workspace::new(WorkspaceId::from(id), sample_layout())
}

/// Template `{rows:2, cols:2}` with 1.1 spanning 1x2 over a hidden 1.2
pub fn two_by_two_template() -> GridTemplate {
    GridTemplate {
        name: "two by two".to_string(),
        rows: 2,
        cols: 2,
        gap: 0,
        cells: vec![
            TemplateCell::new(1, 1).spanning(1, 2),
            TemplateCell::new(1, 2).hidden(),
            TemplateCell::new(2, 1),
            TemplateCell::new(2, 2),
        ],
    }
}

/// Workspace holding one `SearchWidget` with uuid `uuid-7`
pub fn search_workspace() -> Workspace {
    let layout = Layout::normalize(vec![
        LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
        LayoutNode::widget(NodeId(2), NodeId(1), "SearchWidget", WidgetUuid::from("uuid-7"))
            .with_parent_workspace("layout"),
    ])
    .unwrap();
    Workspace::new(WorkspaceId::from("ws-search"), layout).with_name("Search")
}

/// Registry declaring `SearchWidget` requires an `algolia` provider
pub fn search_registry() -> RegistrySnapshot {
    let registry = WidgetRegistry::new();
    registry.register(
        WidgetDescriptor::new("SearchWidget").with_requirement(ProviderRequirement::required("algolia")),
    );
    registry.register(WidgetDescriptor::new("Chart"));
    registry.register(WidgetDescriptor::new("Table"));
    registry.snapshot()
}

pub fn record(workspace: &Workspace) -> WorkspaceRecord {
    WorkspaceRecord::from(workspace)
}

/// Three stored workspaces: `ws-a`, `ws-b`, `ws-c`
pub fn three_workspaces() -> Vec<Workspace> {
    vec![
        sample_workspace("ws-a", "Alpha").with_version(10),
        sample_workspace("ws-b", "Beta").with_version(20),
        sample_workspace("ws-c", "Gamma").with_version(30),
    ]
}

/// Backend for [`APP`] seeded with `workspaces`
pub fn backend_with(workspaces: &[Workspace]) -> InMemoryDashboard {
    InMemoryDashboard::new(app()).with_workspaces(workspaces.iter().map(record))
}
