use dash_api::*;
use dash_layout::{LayoutNode, NodeId, WorkspaceId, WorkspaceRecord};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;

fn app() -> AppId {
    AppId::new("dash-test")
}

fn record(id: &str, version: i64) -> WorkspaceRecord {
    WorkspaceRecord {
        id: WorkspaceId::from(id),
        name: Some(id.to_uppercase()),
        menu_id: None,
        theme_key: None,
        layout: vec![LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout")],
        version,
        selected_providers: BTreeMap::new(),
    }
}

#[tokio::test]
async fn save_echoes_full_list_and_bumps_version() {
    let api = InMemoryDashboard::new(app()).with_workspaces([record("a", 10), record("b", 20)]);

    let completion = api.save_workspace(&app(), record("c", 0)).unwrap().wait().await;
    assert_eq!(completion.event.to_string(), "WORKSPACE_SAVE_COMPLETE");
    let list = completion.into_result().unwrap();
    let ids: Vec<&str> = list.workspaces.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    let before = api.stored_workspace(&WorkspaceId::from("a")).unwrap().version;
    let list = api
        .save_workspace(&app(), record("a", before))
        .unwrap()
        .wait()
        .await
        .into_result()
        .unwrap();
    let after = list.workspaces.iter().find(|w| w.id.as_str() == "a").unwrap().version;
    assert!(after > before);
}

#[tokio::test]
async fn save_rejects_invalid_layout_before_dispatch() {
    let api = InMemoryDashboard::new(app());
    let mut bad = record("bad", 0);
    bad.layout.push(LayoutNode::container(NodeId(2), NodeId::ROOT_PARENT, "layout"));
    let err = api.save_workspace(&app(), bad).unwrap_err();
    assert!(matches!(err, DispatchError::InvalidPayload(_)));
    assert_eq!(api.workspace_count(), 0);
}

#[tokio::test]
async fn delete_missing_workspace_reports_error_event() {
    let api = InMemoryDashboard::new(app()).with_workspaces([record("a", 1)]);
    let completion = api
        .delete_workspace(&app(), &WorkspaceId::from("zzz"))
        .unwrap()
        .wait()
        .await;
    assert_eq!(completion.event.to_string(), "WORKSPACE_DELETE_ERROR");
    assert_eq!(api.workspace_count(), 1);
}

#[tokio::test]
async fn injected_failure_leaves_store_untouched() {
    let api = InMemoryDashboard::new(app());
    api.fail_always(
        Operation::new(Feature::Workspace, Action::Save),
        CollaboratorError::Backend("disk full".into()),
    );
    let completion = api.save_workspace(&app(), record("x", 0)).unwrap().wait().await;
    assert_eq!(completion.result, Err(CollaboratorError::Backend("disk full".into())));
    assert_eq!(api.workspace_count(), 0);

    api.clear_failures();
    assert!(api.save_workspace(&app(), record("x", 0)).unwrap().wait().await.is_success());
}

#[tokio::test]
async fn menu_theme_provider_settings_round_trip() {
    let api = InMemoryDashboard::new(app()).with_data_directory("/var/lib/dash");

    let menus = api
        .save_menu_item(
            &app(),
            MenuItem {
                id: "m1".into(),
                name: "Ops".into(),
                parent_id: None,
                icon: None,
            },
        )
        .unwrap()
        .wait()
        .await
        .into_result()
        .unwrap();
    assert_eq!(menus.len(), 1);
    let menus = api.delete_menu_item(&app(), &"m1".into()).unwrap().wait().await;
    assert_eq!(menus.into_result().unwrap(), vec![]);

    let themes = api
        .save_theme(
            &app(),
            Theme {
                key: "dark".into(),
                name: "Dark".into(),
                values: BTreeMap::new(),
            },
        )
        .unwrap()
        .wait()
        .await
        .into_result()
        .unwrap();
    assert_eq!(themes[0].key, "dark");
    assert!(api.delete_theme(&app(), "dark").unwrap().wait().await.is_success());
    assert!(api.list_themes(&app()).unwrap().wait().await.into_result().unwrap().is_empty());

    let provider = ProviderRecord {
        name: "algolia-prod".into(),
        provider_type: "algolia".into(),
        credentials: BTreeMap::new(),
    };
    api.save_provider(&app(), provider.clone()).unwrap().wait().await.into_result().unwrap();
    let fetched = api.get_provider(&app(), "algolia-prod").unwrap().wait().await;
    assert_eq!(fetched.into_result().unwrap(), provider);
    let deleted = api.delete_provider(&app(), "algolia-prod").unwrap().wait().await;
    assert_eq!(deleted.event.to_string(), "PROVIDER_DELETE_COMPLETE");
    let missing = api.delete_provider(&app(), "algolia-prod").unwrap().wait().await;
    assert_eq!(missing.event.to_string(), "PROVIDER_DELETE_ERROR");
    assert!(api.list_providers(&app()).unwrap().wait().await.into_result().unwrap().is_empty());

    let mut settings = Settings::new();
    settings.insert("locale".into(), json!("en"));
    api.save_settings(&app(), settings.clone()).unwrap().wait().await.into_result().unwrap();
    let stored = api.get_settings(&app()).unwrap().wait().await.into_result().unwrap();
    assert_eq!(stored, settings);

    let dir = api.get_data_directory(&app()).unwrap().wait().await.into_result().unwrap();
    assert_eq!(dir, "/var/lib/dash");
}

#[tokio::test]
async fn mcp_bridge_lifecycle() {
    let api = InMemoryDashboard::new(app())
        .with_mcp_tool(
            "search",
            McpTool {
                name: "query".into(),
                description: "run a query".into(),
                input_schema: json!({"type": "object"}),
            },
        )
        .with_mcp_resource(
            "search",
            McpResource {
                uri: "index://products".into(),
                name: "products".into(),
                mime_type: Some("application/json".into()),
            },
            json!({"count": 3}),
        )
        .with_catalog(vec![McpCatalogEntry {
            id: "search".into(),
            name: "Search".into(),
            description: String::new(),
        }]);

    let call = api
        .mcp_call_tool(&app(), "search", "query", json!({"q": "shoes"}))
        .unwrap()
        .wait()
        .await;
    assert_eq!(call.event.to_string(), "MCP_CALL_TOOL_ERROR");

    let status = api
        .mcp_start_server(
            &app(),
            McpServerConfig {
                id: "search".into(),
                command: "search-mcp".into(),
                args: vec![],
            },
        )
        .unwrap()
        .wait()
        .await
        .into_result()
        .unwrap();
    assert!(status.running);
    assert_eq!(status.tool_count, 1);

    let result = api
        .mcp_call_tool(&app(), "search", "query", json!({"q": "shoes"}))
        .unwrap()
        .wait()
        .await
        .into_result()
        .unwrap();
    assert_eq!(result["arguments"]["q"], "shoes");

    let tools = api.mcp_list_tools(&app(), "search").unwrap().wait().await;
    assert_eq!(tools.into_result().unwrap().len(), 1);
    let resources = api.mcp_list_resources(&app(), "search").unwrap().wait().await;
    assert_eq!(resources.into_result().unwrap()[0].uri, "index://products");
    let content = api
        .mcp_read_resource(&app(), "search", "index://products")
        .unwrap()
        .wait()
        .await
        .into_result()
        .unwrap();
    assert_eq!(content, json!({"count": 3}));

    let stopped = api.mcp_stop_server(&app(), "search").unwrap().wait().await;
    assert!(!stopped.into_result().unwrap().running);
    let status = api.mcp_server_status(&app(), "search").unwrap().wait().await;
    assert!(!status.into_result().unwrap().running);
    let catalog = api.mcp_get_catalog(&app()).unwrap().wait().await;
    assert_eq!(catalog.into_result().unwrap()[0].id, "search");
}
