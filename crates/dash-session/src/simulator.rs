//! Session invariant simulator
//!
//! Drives a [`SessionManager`] with a seeded random stream of UI events and
//! saves against an [`InMemoryDashboard`], checking after every step:
//! - each open layout has exactly one root, no dangling parents, contiguous
//!   sibling orders and accurate `has_children`
//! - node-level and workspace-level provider bindings agree
//! - tab ids are unique and the active id names an open tab
//! - only the active tab can be `Editing`
//! - cancel restores the workspace captured at begin-edit
//! - a failed save keeps `Editing` and the edits; a successful one leaves
//!   `Preview` with a strictly larger version
//!
//! Rejected edits (illegal drops, unknown ids) are expected and only counted.

use crate::command::{CommandOutcome, SessionCommand};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::manager::SessionManager;
use crate::mode::EditMode;
use crate::persist::SaveOutcome;
use dash_api::{Action, AppId, CollaboratorError, Feature, InMemoryDashboard, Operation};
use dash_layout::grid::{CellKey, GridSpec, Span};
use dash_layout::{
    Direction, Layout, LayoutError, LayoutNode, NodeId, NodeKind, WidgetUuid, Workspace, WorkspaceId, WorkspaceRecord,
};
use dash_provider::is_consistent;
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::sync::Arc;

const SAVE: Operation = Operation::new(Feature::Workspace, Action::Save);
const COMPONENTS: [&str; 4] = ["Chart", "Table", "Search", "Clock"];
const WORKSPACE_NAMES: [&str; 2] = ["layout", "widgets"];
const PROVIDERS: [(&str, &str); 3] = [("algolia", "algolia-prod"), ("sql", "warehouse"), ("redis", "cache")];

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Number of operations to apply
    pub operations: u64,
    /// Workspaces seeded into the store
    pub workspaces: usize,
    /// Chance that a save is made to fail
    pub save_failure_rate: f64,
    /// Stop at the first violation
    pub stop_on_first_violation: bool,
    /// Session settings under test
    pub session: SessionConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            operations: 1000,
            workspaces: 4,
            save_failure_rate: 0.25,
            stop_on_first_violation: true,
            session: SessionConfig::default().with_app_id("simulator"),
        }
    }
}

/// One simulated step
#[derive(Debug, Clone, PartialEq)]
pub enum SimulatedOperation {
    /// UI event
    Command(SessionCommand),
    /// Save the active tab, optionally failing it
    Save {
        /// Inject a backend failure
        fail: bool,
    },
    /// Reload the catalog
    Refresh,
}

/// An invariant broken during simulation
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// Tree invariant broken in an open tab
    Structure {
        /// Tab
        tab: WorkspaceId,
        /// What was wrong
        detail: String,
    },
    /// Provider stores disagree
    ProviderDrift {
        /// Tab
        tab: WorkspaceId,
    },
    /// Tab bookkeeping broken
    Tabs {
        /// What was wrong
        detail: String,
    },
    /// A tab other than the active one is `Editing`
    BackgroundEditing {
        /// Tab
        tab: WorkspaceId,
    },
    /// Cancel did not restore the begin-edit snapshot
    SnapshotNotRestored {
        /// Tab
        tab: WorkspaceId,
    },
    /// Save outcome did not match its contract
    SaveContract {
        /// Tab
        tab: WorkspaceId,
        /// What was wrong
        detail: String,
    },
    /// Operation failed with an error it can never produce here
    UnexpectedError {
        /// Operation applied
        operation: SimulatedOperation,
        /// Error text
        error: String,
    },
}

/// Statistics for simulation
#[derive(Debug, Clone, Default)]
pub struct SimulatorStats {
    /// Operations applied
    pub operations: u64,
    /// Commands that changed state
    pub applied: u64,
    /// Commands rejected with an expected error
    pub rejected: u64,
    /// Commands that were contractual no-ops
    pub unchanged: u64,
    /// Saves dispatched
    pub saves_attempted: u64,
    /// Saves applied
    pub saves_succeeded: u64,
    /// Saves that failed and kept the edits
    pub saves_failed: u64,
    /// Cancels that restored a snapshot
    pub snapshots_restored: u64,
}

/// Final report from simulator
#[derive(Debug, Clone)]
pub struct SimulatorReport {
    /// Configuration used
    pub config: SimulatorConfig,
    /// Counters
    pub stats: SimulatorStats,
    /// Everything that went wrong
    pub violations: Vec<Violation>,
}

impl SimulatorReport {
    /// Whether no invariant was broken
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Generate text report
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();
        let _ = writeln!(report, "=== Session Simulator Report ===\n");
        let _ = writeln!(report, "Seed: {}", self.config.seed);
        let _ = writeln!(report, "Operations: {}", self.stats.operations);
        let _ = writeln!(report, "Applied: {}", self.stats.applied);
        let _ = writeln!(report, "Rejected: {}", self.stats.rejected);
        let _ = writeln!(report, "No-ops: {}", self.stats.unchanged);
        let _ = writeln!(report, "Saves Attempted: {}", self.stats.saves_attempted);
        let _ = writeln!(report, "Saves Succeeded: {}", self.stats.saves_succeeded);
        let _ = writeln!(report, "Saves Failed: {}", self.stats.saves_failed);
        let _ = writeln!(report, "Snapshots Restored: {}", self.stats.snapshots_restored);
        let _ = writeln!(report, "Violations: {}", self.violations.len());

        if !self.violations.is_empty() {
            let _ = writeln!(report, "\n=== Violations ===");
            for (i, v) in self.violations.iter().enumerate() {
                let _ = writeln!(report, "{}. {:?}", i + 1, v);
            }
        }

        let _ = writeln!(report, "\n=== Result: {} ===", if self.passed() { "PASS" } else { "FAIL" });
        report
    }
}

/// Run the session simulator
pub async fn run_simulator(config: SimulatorConfig) -> SimulatorReport {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let app = AppId::new(config.session.app_id.clone());
    let pool: Vec<Workspace> = (0..config.workspaces.max(1))
        .filter_map(|index| seed_workspace(&mut rng, index).ok())
        .collect();
    let backend = Arc::new(
        InMemoryDashboard::new(app).with_workspaces(pool.iter().map(WorkspaceRecord::from)),
    );
    let mut session = SessionManager::new(config.session.clone(), backend.clone());

    let mut stats = SimulatorStats::default();
    let mut violations = Vec::new();

    for _ in 0..config.operations {
        let operation = generate_operation(&mut rng, &session, &pool, config.save_failure_rate);
        stats.operations += 1;

        let mut found = apply(&operation, &mut session, &backend, &mut stats).await;
        found.extend(check_invariants(&session));

        if !found.is_empty() {
            tracing::warn!(?operation, count = found.len(), "invariant violated");
            violations.extend(found);
            if config.stop_on_first_violation {
                break;
            }
        }
    }

    SimulatorReport {
        config,
        stats,
        violations,
    }
}

/// Apply one operation, returning contract violations specific to it
async fn apply(
    operation: &SimulatedOperation,
    session: &mut SessionManager,
    backend: &InMemoryDashboard,
    stats: &mut SimulatorStats,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    match operation {
        SimulatedOperation::Command(command) => {
            let before = session.active_tab().map(|tab| {
                (
                    tab.id().clone(),
                    tab.edit_state().snapshot().cloned(),
                    tab.workspace().clone(),
                )
            });
            match session.handle(command.clone()) {
                Ok(CommandOutcome::Unchanged) => stats.unchanged += 1,
                Ok(_) => {
                    stats.applied += 1;
                    if let (SessionCommand::CancelEdit, Some((tab, Some(snapshot), _))) = (command, &before) {
                        stats.snapshots_restored += 1;
                        if session.active_workspace() != Some(snapshot) {
                            violations.push(Violation::SnapshotNotRestored { tab: tab.clone() });
                        }
                    }
                }
                Err(err) if err.is_programmer_error() || matches!(err, SessionError::TabLimit { .. }) => {
                    stats.rejected += 1;
                    if let Some((tab, _, workspace)) = &before {
                        if session.tab(tab).map(|t| t.workspace()) != Some(workspace) {
                            violations.push(Violation::Structure {
                                tab: tab.clone(),
                                detail: "rejected edit changed the workspace".to_string(),
                            });
                        }
                    }
                }
                Err(err) => violations.push(Violation::UnexpectedError {
                    operation: operation.clone(),
                    error: err.to_string(),
                }),
            }
        }
        SimulatedOperation::Save { fail } => {
            let Some(tab) = session.active_tab() else {
                return violations;
            };
            let id = tab.id().clone();
            let edited = tab.workspace().clone();
            let mode = tab.mode();
            if *fail {
                backend.fail_next(SAVE, CollaboratorError::Backend("simulated".to_string()));
            }
            if mode == EditMode::Editing {
                stats.saves_attempted += 1;
            }

            let result = session.save_active().await;
            if *fail {
                backend.clear_failures();
            }
            let after = session.tab(&id);
            match result {
                Ok(None) => {}
                Ok(Some(SaveOutcome::Saved { version })) => {
                    stats.saves_succeeded += 1;
                    if version <= edited.version {
                        violations.push(Violation::SaveContract {
                            tab: id.clone(),
                            detail: format!("version {version} not above {}", edited.version),
                        });
                    }
                    if after.map(|t| t.mode()) != Some(EditMode::Preview) {
                        violations.push(Violation::SaveContract {
                            tab: id,
                            detail: "still editing after save".to_string(),
                        });
                    }
                }
                Ok(Some(SaveOutcome::Stale)) => violations.push(Violation::SaveContract {
                    tab: id,
                    detail: "awaited save reported stale".to_string(),
                }),
                Err(SessionError::Collaborator { .. }) if *fail => {
                    stats.saves_failed += 1;
                    let kept = after.is_some_and(|t| t.mode() == EditMode::Editing && t.workspace() == &edited);
                    if !kept {
                        violations.push(Violation::SaveContract {
                            tab: id,
                            detail: "failed save lost the edits".to_string(),
                        });
                    }
                }
                Err(err) => violations.push(Violation::UnexpectedError {
                    operation: operation.clone(),
                    error: err.to_string(),
                }),
            }
        }
        SimulatedOperation::Refresh => {
            if let Err(err) = session.refresh_workspaces().await {
                violations.push(Violation::UnexpectedError {
                    operation: operation.clone(),
                    error: err.to_string(),
                });
            }
        }
    }
    violations
}

/// Check the tree, provider and tab invariants of every open tab
#[must_use]
pub fn check_invariants(session: &SessionManager) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut seen = HashSet::new();
    for tab in session.tabs() {
        if !seen.insert(tab.id().clone()) {
            violations.push(Violation::Tabs {
                detail: format!("duplicate tab {}", tab.id()),
            });
        }
        if let Some(detail) = layout_problem(&tab.workspace().layout) {
            violations.push(Violation::Structure {
                tab: tab.id().clone(),
                detail,
            });
        }
        if !is_consistent(tab.workspace()) {
            violations.push(Violation::ProviderDrift { tab: tab.id().clone() });
        }
        let active = session.active_id() == Some(tab.id());
        if !active && tab.mode() == EditMode::Editing {
            violations.push(Violation::BackgroundEditing { tab: tab.id().clone() });
        }
        if tab.edit_state().is_editing() != tab.edit_state().snapshot().is_some() {
            violations.push(Violation::Tabs {
                detail: format!("mode and snapshot disagree on {}", tab.id()),
            });
        }
        if tab.mode() == EditMode::Preview && tab.pending_save().is_some() {
            violations.push(Violation::Tabs {
                detail: format!("save ticket outlived the edit on {}", tab.id()),
            });
        }
    }

    match session.active_id() {
        Some(id) if session.tab(id).is_none() => violations.push(Violation::Tabs {
            detail: format!("active tab {id} is not open"),
        }),
        None if session.tab_count() > 0 => violations.push(Violation::Tabs {
            detail: "tabs open but none active".to_string(),
        }),
        _ => {}
    }
    violations
}

fn layout_problem(layout: &Layout) -> Option<String> {
    let roots = layout.iter().filter(|n| n.parent.is_root_parent()).count();
    if roots != 1 {
        return Some(format!("{roots} roots"));
    }
    for node in layout.iter() {
        if !node.parent.is_root_parent() {
            match layout.get(node.parent) {
                None => return Some(format!("node {} has dangling parent {}", node.id, node.parent)),
                Some(parent) if !parent.can_have_children() => {
                    return Some(format!("node {} is parented by widget {}", node.id, node.parent))
                }
                Some(_) => {}
            }
        }
        let children = layout.child_ids(node.id);
        if node.has_children != children.len() {
            return Some(format!("node {} has_children is stale", node.id));
        }
        for (rank, child) in children.iter().enumerate() {
            let order = layout.get(*child).map(|c| c.order as usize);
            if order != Some(rank) {
                return Some(format!("children of {} not ordered 0..n", node.id));
            }
        }
    }
    if layout.depth_first().len() != layout.len() {
        return Some("unreachable nodes".to_string());
    }
    None
}

fn seed_workspace(rng: &mut StdRng, index: usize) -> Result<Workspace, LayoutError> {
    let root = if rng.gen_bool(0.5) {
        LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout")
    } else {
        match GridSpec::filled(2, 2) {
            Ok(grid) => LayoutNode::grid(NodeId(1), NodeId::ROOT_PARENT, grid),
            Err(_) => LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
        }
    };
    let mut nodes = vec![root];
    let mut containers = vec![NodeId(1)];
    for raw in 2..rng.gen_range(4..10u32) {
        let parent = containers[rng.gen_range(0..containers.len())];
        let id = NodeId(raw);
        if rng.gen_bool(0.4) {
            let name = WORKSPACE_NAMES[rng.gen_range(0..WORKSPACE_NAMES.len())];
            nodes.push(LayoutNode::container(id, parent, name));
            containers.push(id);
        } else {
            nodes.push(random_widget(rng, id, parent, format!("w-{index}-{raw}")));
        }
    }

    let layout = Layout::normalize(nodes)?;
    Ok(Workspace::new(WorkspaceId(format!("ws-{index}")), layout).with_name(format!("Dashboard {index}")))
}

fn random_widget(rng: &mut StdRng, id: NodeId, parent: NodeId, uuid: String) -> LayoutNode {
    let component = COMPONENTS[rng.gen_range(0..COMPONENTS.len())];
    let node = LayoutNode::widget(id, parent, component, WidgetUuid(uuid));
    if rng.gen_bool(0.8) {
        node.with_parent_workspace(WORKSPACE_NAMES[rng.gen_range(0..WORKSPACE_NAMES.len())])
    } else {
        node
    }
}

/// Existing id most of the time, occasionally one that does not exist
fn pick_node(rng: &mut StdRng, layout: &Layout) -> NodeId {
    let ids: Vec<NodeId> = layout.iter().map(|n| n.id).collect();
    match ids.choose(rng) {
        Some(id) if rng.gen_bool(0.95) => *id,
        _ => layout.next_id(),
    }
}

fn pick_widget(rng: &mut StdRng, layout: &Layout) -> Option<WidgetUuid> {
    let widgets: Vec<&WidgetUuid> = layout.iter().filter_map(LayoutNode::widget_uuid).collect();
    widgets.choose(rng).map(|uuid| (*uuid).clone())
}

fn generate_operation(
    rng: &mut StdRng,
    session: &SessionManager,
    pool: &[Workspace],
    save_failure_rate: f64,
) -> SimulatedOperation {
    let Some(workspace) = session.active_workspace() else {
        return match pool.choose(rng) {
            Some(ws) => SimulatedOperation::Command(SessionCommand::OpenTab(ws.clone())),
            None => SimulatedOperation::Refresh,
        };
    };
    let layout = &workspace.layout;

    let command = match rng.gen_range(0..20u32) {
        0 => match pool.choose(rng) {
            Some(ws) => SessionCommand::OpenTab(ws.clone()),
            None => SessionCommand::BeginEdit,
        },
        1 => match session.tabs().map(|t| t.id().clone()).collect::<Vec<_>>().choose(rng) {
            Some(id) if rng.gen_bool(0.3) => SessionCommand::CloseTab(id.clone()),
            Some(id) => SessionCommand::SwitchTab(id.clone()),
            None => SessionCommand::BeginEdit,
        },
        2 | 3 => SessionCommand::BeginEdit,
        4 => SessionCommand::CancelEdit,
        5 | 6 => {
            return SimulatedOperation::Save {
                fail: rng.gen_bool(save_failure_rate.clamp(0.0, 1.0)),
            }
        }
        7 => return SimulatedOperation::Refresh,
        8 => SessionCommand::MoveNode {
            node: pick_node(rng, layout),
            parent: pick_node(rng, layout),
        },
        9 | 10 => SessionCommand::DropNode {
            node: pick_node(rng, layout),
            target: pick_node(rng, layout),
        },
        11 => {
            let raw = layout.next_id().get();
            let node = if rng.gen_bool(0.3) {
                LayoutNode::container(NodeId(0), NodeId(0), WORKSPACE_NAMES[rng.gen_range(0..2)])
            } else {
                random_widget(rng, NodeId(0), NodeId(0), format!("{}-w{raw}", workspace.id))
            };
            SessionCommand::AddNode {
                parent: pick_node(rng, layout),
                node,
            }
        }
        12 => SessionCommand::RemoveNode(pick_node(rng, layout)),
        13 => {
            let id = pick_node(rng, layout);
            match layout.get(id) {
                Some(node) => {
                    let mut node = node.clone();
                    node.width = Some(format!("{}px", rng.gen_range(100..800)));
                    SessionCommand::ReplaceNode { id, node }
                }
                None => SessionCommand::RemoveNode(id),
            }
        }
        14 => grid_command(rng, layout),
        15 | 16 => match pick_widget(rng, layout) {
            Some(widget) => {
                let (provider_type, provider_name) = PROVIDERS[rng.gen_range(0..PROVIDERS.len())];
                if rng.gen_bool(0.25) {
                    SessionCommand::UnbindProvider {
                        widget,
                        provider_type: provider_type.to_string(),
                    }
                } else {
                    SessionCommand::BindProvider {
                        widget,
                        provider_type: provider_type.to_string(),
                        provider_name: provider_name.to_string(),
                    }
                }
            }
            None => SessionCommand::BeginEdit,
        },
        17 => SessionCommand::ChangeOrder {
            node: pick_node(rng, layout),
            position: rng.gen_range(0..5),
        },
        18 => SessionCommand::ChangeDirection {
            node: pick_node(rng, layout),
            direction: if rng.gen_bool(0.5) { Direction::Row } else { Direction::Col },
        },
        _ => SessionCommand::SetRootScrollable(rng.gen_bool(0.5)),
    };
    SimulatedOperation::Command(command)
}

fn grid_command(rng: &mut StdRng, layout: &Layout) -> SessionCommand {
    let grids: Vec<(NodeId, u16, u16)> = layout
        .iter()
        .filter_map(|n| match &n.kind {
            NodeKind::Grid { grid, .. } => Some((n.id, grid.rows, grid.cols)),
            _ => None,
        })
        .collect();
    let Some(&(id, rows, cols)) = grids.choose(rng) else {
        return SessionCommand::SetRootScrollable(rng.gen_bool(0.5));
    };
    let cell = CellKey::new(rng.gen_range(1..=rows), rng.gen_range(1..=cols));
    match rng.gen_range(0..3u32) {
        0 => SessionCommand::SetCellComponent {
            grid: id,
            cell,
            component: COMPONENTS.choose(rng).map(|c| (*c).to_string()),
        },
        1 => SessionCommand::MergeCells {
            grid: id,
            cell,
            span: Span::new(rng.gen_range(1..=rows), rng.gen_range(1..=cols)),
        },
        _ => SessionCommand::SplitCell { grid: id, cell },
    }
}
