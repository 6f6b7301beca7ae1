use crate::areas::repository::Repository;
use crate::artifacts::checkout::conflict::untracked_conflicts;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use std::collections::HashMap;
use std::path::PathBuf;

/// Type of file system action required for checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Create a file the current commit does not track
    Add,
    /// Delete a file the target commit does not track
    Delete,
    /// Overwrite a file both commits track
    Modify,
}

/// Planned actions grouped by type, with the blob to write where applicable
pub type ActionsSet = HashMap<ActionType, Vec<(PathBuf, Option<ObjectId>)>>;

/// Moves the working tree from the `current` snapshot to the `target` one
///
/// Every file tracked by the target is written, even when the current commit
/// tracks identical content, so local edits to tracked files are discarded.
pub struct Migration<'r> {
    repository: &'r Repository,
    current: &'r Snapshot,
    target: &'r Snapshot,
    actions: ActionsSet,
}

impl<'r> Migration<'r> {
    pub fn new(repository: &'r Repository, current: &'r Snapshot, target: &'r Snapshot) -> Self {
        let actions = HashMap::from([
            (ActionType::Add, Vec::new()),
            (ActionType::Delete, Vec::new()),
            (ActionType::Modify, Vec::new()),
        ]);

        Self {
            repository,
            current,
            target,
            actions,
        }
    }

    pub fn actions_of(&self, action: ActionType) -> &[(PathBuf, Option<ObjectId>)] {
        self.actions
            .get(&action)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn apply_changes(&mut self) -> anyhow::Result<()> {
        self.plan_changes()?;
        self.repository.workspace().apply_migration(self)?;

        tracing::info!(
            added = self.actions_of(ActionType::Add).len(),
            modified = self.actions_of(ActionType::Modify).len(),
            deleted = self.actions_of(ActionType::Delete).len(),
            "snapshot projected onto working tree"
        );

        Ok(())
    }

    fn plan_changes(&mut self) -> anyhow::Result<()> {
        let conflicts = untracked_conflicts(self.repository.workspace(), self.current, self.target)?;
        if !conflicts.is_empty() {
            tracing::warn!(?conflicts, "untracked files in the way");
            return Err(RepositoryError::UntrackedFileConflict(conflicts).into());
        }

        for (path, oid) in self.target {
            let action = if self.current.contains_key(path) {
                ActionType::Modify
            } else {
                ActionType::Add
            };

            self.record_change(action, path.clone(), Some(oid.clone()));
        }

        for path in self.current.keys() {
            if !self.target.contains_key(path) {
                self.record_change(ActionType::Delete, path.clone(), None);
            }
        }

        Ok(())
    }

    fn record_change(&mut self, action: ActionType, path: PathBuf, oid: Option<ObjectId>) {
        self.actions.entry(action).or_default().push((path, oid));
    }

    pub fn load_blob_data(&self, object_id: &ObjectId) -> anyhow::Result<String> {
        Ok(self
            .repository
            .database()
            .load_blob(object_id)?
            .into_content())
    }
}
