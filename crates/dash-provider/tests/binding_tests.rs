use dash_layout::{Layout, LayoutNode, NodeId, WidgetUuid, Workspace, WorkspaceId};
use dash_provider::*;
use pretty_assertions::assert_eq;

fn search_workspace() -> Workspace {
    let layout = Layout::normalize(vec![
        LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
        LayoutNode::widget(NodeId(2), NodeId(1), "SearchWidget", WidgetUuid::from("uuid-7"))
            .with_parent_workspace("layout"),
    ])
    .unwrap();
    Workspace::new(WorkspaceId::from("ws-search"), layout)
}

#[test]
fn provider_binding_scenario() {
    let registry = WidgetRegistry::new();
    registry.register(
        WidgetDescriptor::new("SearchWidget").with_requirement(ProviderRequirement::required("algolia")),
    );
    let snapshot = registry.snapshot();
    let ws = search_workspace();
    let uuid = WidgetUuid::from("uuid-7");

    let requirements = snapshot.requirements("SearchWidget").unwrap();
    assert_eq!(
        unresolved_requirements(ws.widget(&uuid).unwrap(), requirements),
        vec!["algolia".to_string()]
    );

    let bound = bind(&ws, &uuid, "algolia", "algolia-prod").unwrap();
    let node = bound.widget(&uuid).unwrap();
    assert_eq!(node.selected_providers["algolia"], "algolia-prod");
    assert_eq!(bound.selected_providers[&uuid]["algolia"], "algolia-prod");
    assert!(unresolved_requirements(node, requirements).is_empty());
    assert!(is_consistent(&bound));

    // the input workspace is never touched
    assert!(ws.selected_providers.is_empty());
    assert!(ws.widget(&uuid).unwrap().selected_providers.is_empty());
}

#[test]
fn bind_declared_checks_registry() {
    let registry = WidgetRegistry::new();
    registry.register(
        WidgetDescriptor::new("SearchWidget").with_requirement(ProviderRequirement::required("algolia")),
    );
    let snapshot = registry.snapshot();
    let ws = search_workspace();
    let uuid = WidgetUuid::from("uuid-7");

    let err = bind_declared(&ws, &snapshot, &uuid, "redis", "cache").unwrap_err();
    assert_eq!(
        err,
        ProviderError::UndeclaredType {
            component: "SearchWidget".into(),
            provider_type: "redis".into(),
        }
    );
    assert!(bind_declared(&ws, &snapshot, &uuid, "algolia", "prod").is_ok());

    let empty = WidgetRegistry::new().snapshot();
    let err = bind_declared(&ws, &empty, &uuid, "algolia", "prod").unwrap_err();
    assert_eq!(err, ProviderError::UnknownComponent("SearchWidget".into()));
}

#[test]
fn global_registry_is_shared() {
    WidgetRegistry::global().register(WidgetDescriptor::new("GlobalProbeWidget"));
    assert!(WidgetRegistry::global().snapshot().contains("GlobalProbeWidget"));
    WidgetRegistry::global().unregister("GlobalProbeWidget");
    assert!(!WidgetRegistry::global().snapshot().contains("GlobalProbeWidget"));
}
