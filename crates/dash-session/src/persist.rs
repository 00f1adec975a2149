//! Collaborator round trips: list, save, delete
//!
//! Save is two-phase. [`SessionManager::begin_save`] dispatches and records a
//! ticket on the tab; [`SessionManager::complete_save`] applies the completion
//! only if that tab is still open and still waiting on the same ticket. Any
//! other completion is stale and dropped.

use crate::error::SessionError;
use crate::manager::SessionManager;
use crate::mode::EditMode;
use crate::tab::SaveTicket;
use dash_api::{Completion, DispatchOutcome, WorkspaceList};
use dash_layout::{Workspace, WorkspaceId, WorkspaceRecord};
use tracing::{debug, info, warn};

/// Save dispatched but not yet applied
#[derive(Debug)]
pub struct PendingSave {
    /// Ticket recorded on the tab
    pub ticket: SaveTicket,
    /// Tab the save belongs to
    pub tab: WorkspaceId,
    /// Pending echo of the stored list
    pub outcome: DispatchOutcome<WorkspaceList>,
}

/// How a save completion was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Tab now holds the echoed workspace
    Saved {
        /// Version after reconciliation
        version: i64,
    },
    /// Tab closed or superseded; nothing applied
    Stale,
}

/// Rebuild every echoed record, skipping ones that fail to normalize
pub(crate) fn reconstruct(list: WorkspaceList) -> Vec<Workspace> {
    list.workspaces
        .into_iter()
        .filter_map(|record: WorkspaceRecord| {
            let id = record.id.clone();
            match Workspace::try_from(record) {
                Ok(workspace) => Some(workspace),
                Err(err) => {
                    warn!(workspace = %id, error = %err, "dropping echoed workspace that failed reconstruction");
                    None
                }
            }
        })
        .collect()
}

impl SessionManager {
    /// Reload the catalog from the collaborator
    ///
    /// On failure the catalog is left empty and the error returned.
    ///
    /// # Errors
    /// `Dispatch` or `Collaborator`
    #[tracing::instrument(skip(self), fields(app = %self.app))]
    pub async fn refresh_workspaces(&mut self) -> Result<usize, SessionError> {
        let outcome = match self.api.list_workspaces(&self.app) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "workspace list not dispatched, catalog empty");
                self.catalog.clear();
                return Err(err.into());
            }
        };

        let Completion { event, result } = outcome.wait().await;
        match result {
            Ok(list) => {
                self.catalog = reconstruct(list);
                info!(%event, count = self.catalog.len(), "workspace catalog refreshed");
                Ok(self.catalog.len())
            }
            Err(source) => {
                warn!(%event, error = %source, "workspace list failed, catalog empty");
                self.catalog.clear();
                Err(SessionError::Collaborator { event, source })
            }
        }
    }

    /// Open a catalog entry as a tab
    ///
    /// # Errors
    /// `TabNotFound` if the catalog has no such workspace, or [`Self::open_tab`] errors
    pub fn open_from_catalog(&mut self, id: &WorkspaceId) -> Result<(), SessionError> {
        let workspace = self
            .catalog
            .iter()
            .find(|ws| &ws.id == id)
            .cloned()
            .ok_or_else(|| SessionError::TabNotFound(id.clone()))?;
        self.open_tab(workspace)?;
        Ok(())
    }

    /// Dispatch a save of the active tab
    ///
    /// Returns `Ok(None)` when the tab is in `Preview`. The tab stays
    /// `Editing` until [`Self::complete_save`] applies a successful echo.
    ///
    /// # Errors
    /// `NoActiveTab`, `SaveInFlight`, or `Dispatch` (state untouched)
    #[tracing::instrument(skip(self))]
    pub fn begin_save(&mut self) -> Result<Option<PendingSave>, SessionError> {
        let tab = self
            .active_tab()
            .ok_or(SessionError::NoActiveTab)?;
        if tab.mode() != EditMode::Editing {
            debug!(tab = %tab.id(), "save ignored in preview");
            return Ok(None);
        }
        if tab.pending_save().is_some() {
            return Err(SessionError::SaveInFlight(tab.id().clone()));
        }

        let record = WorkspaceRecord::from(tab.workspace());
        let tab_id = tab.id().clone();
        let outcome = self.api.save_workspace(&self.app, record)?;

        let ticket = self.issue_ticket();
        self.active_tab_mut()?.set_pending_save(Some(ticket));
        info!(tab = %tab_id, %ticket, "save dispatched");
        Ok(Some(PendingSave {
            ticket,
            tab: tab_id,
            outcome,
        }))
    }

    /// Apply the completion of a save started by [`Self::begin_save`]
    ///
    /// # Errors
    /// `Collaborator` when the save failed, `MissingEcho` when the echoed list
    /// lacks the workspace. Either way the tab keeps its edited state and stays
    /// `Editing`.
    #[tracing::instrument(skip(self, completion), fields(event = %completion.event))]
    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        tab_id: &WorkspaceId,
        completion: Completion<WorkspaceList>,
    ) -> Result<SaveOutcome, SessionError> {
        let untitled = self.config.untitled_name.clone();
        let Some(tab) = self.tabs.get_mut(tab_id) else {
            warn!(tab = %tab_id, %ticket, "save completed for closed tab, ignored");
            return Ok(SaveOutcome::Stale);
        };
        if tab.pending_save() != Some(ticket) {
            warn!(tab = %tab_id, %ticket, "stale save completion ignored");
            return Ok(SaveOutcome::Stale);
        }
        tab.set_pending_save(None);

        let Completion { event, result } = completion;
        let list = match result {
            Ok(list) => list,
            Err(source) => {
                warn!(%event, tab = %tab_id, error = %source, "save failed, edits kept");
                return Err(SessionError::Collaborator { event, source });
            }
        };

        let catalog = reconstruct(list);
        let Some(echoed) = catalog.iter().find(|ws| &ws.id == tab_id).cloned() else {
            warn!(%event, tab = %tab_id, "saved workspace missing from echo");
            return Err(SessionError::MissingEcho(tab_id.clone()));
        };

        let previous = tab.workspace().version;
        let version = echoed.version.max(previous.saturating_add(1));
        tab.set_workspace(echoed.with_version(version), &untitled);
        tab.finish_save();
        self.catalog = catalog;

        info!(%event, tab = %tab_id, previous, version, "save applied");
        Ok(SaveOutcome::Saved { version })
    }

    /// Save the active tab and wait for the echo
    ///
    /// `Ok(None)` when the tab is in `Preview`.
    ///
    /// # Errors
    /// As [`Self::begin_save`] and [`Self::complete_save`]
    pub async fn save_active(&mut self) -> Result<Option<SaveOutcome>, SessionError> {
        let Some(PendingSave {
            ticket,
            tab,
            outcome,
        }) = self.begin_save()?
        else {
            return Ok(None);
        };
        let completion = outcome.wait().await;
        self.complete_save(ticket, &tab, completion).map(Some)
    }

    /// Delete a stored workspace
    ///
    /// On success the catalog is replaced by the echoed list and the
    /// workspace's tab, if open, is closed. On failure nothing changes.
    ///
    /// # Errors
    /// `Dispatch` or `Collaborator`
    #[tracing::instrument(skip(self), fields(workspace = %id))]
    pub async fn delete_workspace(&mut self, id: &WorkspaceId) -> Result<(), SessionError> {
        let outcome = self.api.delete_workspace(&self.app, id)?;
        let Completion { event, result } = outcome.wait().await;
        let list = match result {
            Ok(list) => list,
            Err(source) => {
                warn!(%event, error = %source, "delete failed, local state kept");
                return Err(SessionError::Collaborator { event, source });
            }
        };

        self.catalog = reconstruct(list);
        if self.tabs.contains_key(id) {
            self.close_tab(id)?;
        }
        info!(%event, remaining = self.catalog.len(), "workspace deleted");
        Ok(())
    }
}
