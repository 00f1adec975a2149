use dash_api::{Action, CollaboratorError, Feature, Operation};
use dash_layout::{NodeId, WorkspaceId};
use dash_session::*;
use dash_test_utils::{app, backend_with, sample_workspace, search_registry, search_workspace, three_workspaces};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const SAVE: Operation = Operation::new(Feature::Workspace, Action::Save);
const LIST: Operation = Operation::new(Feature::Workspace, Action::List);
const DELETE: Operation = Operation::new(Feature::Workspace, Action::Delete);

fn config() -> SessionConfig {
    SessionConfig::default().with_app_id(app().0)
}

#[tokio::test]
async fn save_reconciles_with_echoed_list() {
    let backend = Arc::new(backend_with(&three_workspaces()));
    let mut session = SessionManager::new(config(), backend.clone());
    session.refresh_workspaces().await.unwrap();
    session.open_from_catalog(&WorkspaceId::from("ws-b")).unwrap();
    let before = session.active_workspace().unwrap().version;

    session.handle(SessionCommand::BeginEdit).unwrap();
    session.handle(SessionCommand::RemoveNode(NodeId(5))).unwrap();
    let outcome = session.save_active().await.unwrap();

    let Some(SaveOutcome::Saved { version }) = outcome else {
        panic!("expected a saved outcome, got {outcome:?}");
    };
    assert!(version > before);
    assert_eq!(session.catalog().len(), 3);
    let echoed = session
        .catalog()
        .iter()
        .find(|ws| ws.id == WorkspaceId::from("ws-b"))
        .unwrap();
    assert_eq!(session.active_workspace().unwrap(), echoed);
    assert!(!echoed.layout.contains(NodeId(5)));
    assert_eq!(session.active_mode(), Some(EditMode::Preview));
}

#[tokio::test]
async fn failed_save_keeps_edits() {
    let backend = Arc::new(backend_with(&three_workspaces()));
    let mut session = SessionManager::new(config(), backend.clone());
    session.open_tab(sample_workspace("ws-a", "Alpha")).unwrap();
    session.handle(SessionCommand::BeginEdit).unwrap();
    session.handle(SessionCommand::SetRootScrollable(true)).unwrap();
    let edited = session.active_workspace().unwrap().clone();

    backend.fail_next(SAVE, CollaboratorError::Backend("disk full".into()));
    let err = session.save_active().await.unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(err.to_string(), "WORKSPACE_SAVE_ERROR: backend error: disk full");
    assert_eq!(session.active_mode(), Some(EditMode::Editing));
    assert_eq!(session.active_workspace().unwrap(), &edited);

    // retry succeeds
    assert!(matches!(
        session.save_active().await.unwrap(),
        Some(SaveOutcome::Saved { .. })
    ));
    assert!(session.active_workspace().unwrap().layout.root().scrollable);
}

#[tokio::test]
async fn save_in_preview_is_a_noop() {
    let backend = Arc::new(backend_with(&[]));
    let mut session = SessionManager::new(config(), backend.clone());
    session.open_tab(sample_workspace("ws-a", "Alpha")).unwrap();
    assert_eq!(session.save_active().await.unwrap(), None);
    assert_eq!(backend.workspace_count(), 0);
}

#[tokio::test]
async fn stale_save_after_close_is_ignored() {
    let backend = Arc::new(backend_with(&three_workspaces()));
    let mut session = SessionManager::new(config(), backend.clone());
    session.open_tab(sample_workspace("ws-a", "Alpha")).unwrap();
    session.handle(SessionCommand::BeginEdit).unwrap();

    backend.hold_completions(true);
    let pending = session.begin_save().unwrap().unwrap();
    assert!(matches!(session.begin_save(), Err(SessionError::SaveInFlight(_))));

    session.close_tab(&pending.tab).unwrap();
    assert_eq!(backend.release_held(), 1);

    let completion = pending.outcome.wait().await;
    assert!(completion.is_success());
    let outcome = session.complete_save(pending.ticket, &pending.tab, completion).unwrap();
    assert_eq!(outcome, SaveOutcome::Stale);
    assert_eq!(session.tab_count(), 0);
}

#[tokio::test]
async fn reopened_tab_rejects_old_ticket() {
    let backend = Arc::new(backend_with(&three_workspaces()));
    let mut session = SessionManager::new(config(), backend.clone());
    session.open_tab(sample_workspace("ws-a", "Alpha")).unwrap();
    session.handle(SessionCommand::BeginEdit).unwrap();

    backend.hold_completions(true);
    let pending = session.begin_save().unwrap().unwrap();
    session.close_tab(&pending.tab).unwrap();
    session.open_tab(sample_workspace("ws-a", "Alpha")).unwrap();
    backend.release_held();

    let completion = pending.outcome.wait().await;
    let outcome = session.complete_save(pending.ticket, &pending.tab, completion).unwrap();
    assert_eq!(outcome, SaveOutcome::Stale);
    assert_eq!(session.active_workspace().unwrap().version, 0);
}

#[tokio::test]
async fn save_from_cancelled_edit_does_not_touch_next_edit() {
    let backend = Arc::new(backend_with(&three_workspaces()));
    let mut session = SessionManager::new(config(), backend.clone());
    session.open_tab(sample_workspace("ws-b", "Beta")).unwrap();

    backend.hold_completions(true);
    session.handle(SessionCommand::BeginEdit).unwrap();
    session.handle(SessionCommand::SetRootScrollable(true)).unwrap();
    let old = session.begin_save().unwrap().unwrap();

    session.handle(SessionCommand::CancelEdit).unwrap();
    assert_eq!(session.active_tab().unwrap().pending_save(), None);
    session.handle(SessionCommand::BeginEdit).unwrap();
    session.handle(SessionCommand::RemoveNode(NodeId(5))).unwrap();
    let edited = session.active_workspace().unwrap().clone();

    // the new edit can be saved while the old one is still in flight
    let new = session.begin_save().unwrap().unwrap();
    assert_ne!(new.ticket, old.ticket);
    assert_eq!(backend.release_held(), 2);

    let completion = old.outcome.wait().await;
    let outcome = session.complete_save(old.ticket, &old.tab, completion).unwrap();
    assert_eq!(outcome, SaveOutcome::Stale);
    assert_eq!(session.active_mode(), Some(EditMode::Editing));
    assert_eq!(session.active_workspace().unwrap(), &edited);

    let completion = new.outcome.wait().await;
    let outcome = session.complete_save(new.ticket, &new.tab, completion).unwrap();
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
    assert!(!session.active_workspace().unwrap().layout.contains(NodeId(5)));
    assert!(!session.active_workspace().unwrap().layout.root().scrollable);
    assert_eq!(session.active_mode(), Some(EditMode::Preview));
}

#[tokio::test]
async fn switching_away_invalidates_pending_save() {
    let backend = Arc::new(backend_with(&three_workspaces()));
    let mut session = SessionManager::new(config(), backend.clone());
    let beta = sample_workspace("ws-b", "Beta");
    session.open_tab(sample_workspace("ws-a", "Alpha")).unwrap();
    session.open_tab(beta.clone()).unwrap();

    backend.hold_completions(true);
    session.handle(SessionCommand::BeginEdit).unwrap();
    session.handle(SessionCommand::RemoveNode(NodeId(5))).unwrap();
    let pending = session.begin_save().unwrap().unwrap();

    session.switch_tab(&WorkspaceId::from("ws-a")).unwrap();
    session.switch_tab(&WorkspaceId::from("ws-b")).unwrap();
    let tab = session.active_tab().unwrap();
    assert_eq!(tab.mode(), EditMode::Preview);
    assert_eq!(tab.pending_save(), None);
    assert_eq!(tab.workspace(), &beta);

    backend.release_held();
    let completion = pending.outcome.wait().await;
    let outcome = session.complete_save(pending.ticket, &pending.tab, completion).unwrap();
    assert_eq!(outcome, SaveOutcome::Stale);
    assert_eq!(session.active_workspace().unwrap(), &beta);

    backend.hold_completions(false);
    session.handle(SessionCommand::BeginEdit).unwrap();
    assert!(matches!(
        session.save_active().await.unwrap(),
        Some(SaveOutcome::Saved { .. })
    ));
}

#[tokio::test]
async fn refresh_degrades_to_empty_catalog() {
    let backend = Arc::new(backend_with(&three_workspaces()));
    let mut session = SessionManager::new(config(), backend.clone());
    assert_eq!(session.refresh_workspaces().await.unwrap(), 3);

    backend.fail_next(LIST, CollaboratorError::Backend("timeout".into()));
    let err = session.refresh_workspaces().await.unwrap_err();
    assert!(matches!(err, SessionError::Collaborator { .. }));
    assert!(session.catalog().is_empty());

    assert_eq!(session.refresh_workspaces().await.unwrap(), 3);
    backend.set_offline(true);
    assert!(matches!(
        session.refresh_workspaces().await,
        Err(SessionError::Dispatch(_))
    ));
    assert!(session.catalog().is_empty());
}

#[tokio::test]
async fn delete_closes_tab_and_failure_changes_nothing() {
    let backend = Arc::new(backend_with(&three_workspaces()));
    let mut session = SessionManager::new(config(), backend.clone());
    session.refresh_workspaces().await.unwrap();
    session.open_from_catalog(&WorkspaceId::from("ws-a")).unwrap();
    session.open_from_catalog(&WorkspaceId::from("ws-c")).unwrap();

    backend.fail_next(DELETE, CollaboratorError::Rejected("locked".into()));
    let err = session.delete_workspace(&WorkspaceId::from("ws-c")).await.unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(session.tab_count(), 2);
    assert_eq!(session.catalog().len(), 3);

    session.delete_workspace(&WorkspaceId::from("ws-c")).await.unwrap();
    assert_eq!(session.tab_count(), 1);
    assert_eq!(session.active_id(), Some(&WorkspaceId::from("ws-a")));
    assert_eq!(session.catalog().len(), 2);
    assert_eq!(backend.workspace_count(), 2);
}

#[tokio::test]
async fn bound_provider_survives_save() {
    let backend = Arc::new(backend_with(&[search_workspace()]));
    let mut session = SessionManager::new(config(), backend.clone()).with_registry(search_registry());
    session.open_tab(search_workspace()).unwrap();
    session.handle(SessionCommand::BeginEdit).unwrap();
    session
        .handle(SessionCommand::BindProvider {
            widget: dash_layout::WidgetUuid::from("uuid-7"),
            provider_type: "algolia".into(),
            provider_name: "algolia-prod".into(),
        })
        .unwrap();
    session.save_active().await.unwrap();

    let saved = session.active_workspace().unwrap();
    let uuid = dash_layout::WidgetUuid::from("uuid-7");
    assert_eq!(saved.selected_providers[&uuid]["algolia"], "algolia-prod");
    assert_eq!(saved.widget(&uuid).unwrap().selected_providers["algolia"], "algolia-prod");
    assert!(dash_provider::is_ready(
        saved.widget(&uuid).unwrap(),
        search_registry().requirements("SearchWidget").unwrap()
    ));
}

#[tokio::test]
async fn simulator_passes() {
    let report = run_simulator(SimulatorConfig {
        seed: 2024,
        operations: 500,
        ..SimulatorConfig::default()
    })
    .await;
    assert!(report.passed(), "{}", report.generate_text());
}
