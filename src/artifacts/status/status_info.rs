use crate::areas::repository::Repository;
use crate::areas::staging::StagingArea;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::status::file_change::WorkspaceChangeType;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

pub type ChangeSet = BTreeMap<PathBuf, WorkspaceChangeType>;
pub type FileSet = BTreeSet<PathBuf>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub(crate) active_branch: BranchName,
    pub(crate) branches: Vec<BranchName>,
    pub(crate) staged_files: FileSet,
    pub(crate) removed_files: FileSet,
    pub(crate) workspace_changeset: ChangeSet,
    pub(crate) untracked_files: FileSet,
}

#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl<'r> Status<'r> {
    pub fn initialize(&self, staging: &StagingArea) -> anyhow::Result<StatusInfo> {
        let refs = self.repository.refs();
        let (_, head_commit) = self.repository.head_commit()?;
        let head_tree = head_commit.tracked();

        let workspace_files = self.repository.workspace().list_files()?;
        let workspace_changeset = self.detect_workspace_changes(&workspace_files, head_tree, staging)?;
        let untracked_files = workspace_files
            .into_iter()
            .filter(|path| {
                let untracked = !staging.is_staged_for_addition(path) && !head_tree.contains_key(path);
                untracked || staging.is_staged_for_removal(path)
            })
            .collect();

        Ok(StatusInfo {
            active_branch: refs.current_branch()?,
            branches: refs.list_branches()?,
            staged_files: staging.additions().keys().cloned().collect(),
            removed_files: staging.removals().keys().cloned().collect(),
            workspace_changeset,
            untracked_files,
        })
    }

    // modified: staged content or tracked content differs from the working copy
    // deleted: staged or tracked (and not staged for removal), yet missing
    fn detect_workspace_changes(
        &self,
        workspace_files: &[PathBuf],
        head_tree: &Snapshot,
        staging: &StagingArea,
    ) -> anyhow::Result<ChangeSet> {
        let workspace = self.repository.workspace();
        let present = workspace_files.iter().collect::<BTreeSet<_>>();
        let mut changeset = ChangeSet::new();

        for (path, staged_oid) in staging.additions() {
            if !present.contains(path) {
                changeset.insert(path.clone(), WorkspaceChangeType::Deleted);
            } else if &workspace.digest_file(path)? != staged_oid {
                changeset.insert(path.clone(), WorkspaceChangeType::Modified);
            }
        }

        for (path, tracked_oid) in head_tree {
            if staging.is_staged_for_addition(path) || staging.is_staged_for_removal(path) {
                continue;
            }

            if !present.contains(path) {
                changeset.insert(path.clone(), WorkspaceChangeType::Deleted);
            } else if &workspace.digest_file(path)? != tracked_oid {
                changeset.insert(path.clone(), WorkspaceChangeType::Modified);
            }
        }

        Ok(changeset)
    }
}

impl std::fmt::Display for StatusInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Branches ===")?;
        for branch in &self.branches {
            let marker = if branch == &self.active_branch { "*" } else { "" };
            writeln!(f, "{marker}{branch}")?;
        }
        writeln!(f)?;

        writeln!(f, "=== Staged Files ===")?;
        for path in &self.staged_files {
            writeln!(f, "{}", path.display())?;
        }
        writeln!(f)?;

        writeln!(f, "=== Removed Files ===")?;
        for path in &self.removed_files {
            writeln!(f, "{}", path.display())?;
        }
        writeln!(f)?;

        writeln!(f, "=== Modifications Not Staged For Commit ===")?;
        for (path, change) in &self.workspace_changeset {
            writeln!(f, "{} {change}", path.display())?;
        }
        writeln!(f)?;

        writeln!(f, "=== Untracked Files ===")?;
        for path in &self.untracked_files {
            writeln!(f, "{}", path.display())?;
        }
        writeln!(f)
    }
}
