use crate::areas::repository::Repository;
use crate::artifacts::checkout::conflict::untracked_conflicts;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::merge::bca_finder::BCAFinder;
use crate::artifacts::merge::conflict::render_conflict;
use crate::artifacts::merge::resolution::{Resolution, resolve_all};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;

const FAST_FORWARD_NOTICE: &str = "Current branch fast-forwarded.";
const CONFLICT_NOTICE: &str = "Encountered a merge conflict.";

impl Repository {
    pub async fn merge(&mut self, branch_name: &str) -> anyhow::Result<()> {
        let staging = self.staging();
        let mut staging = staging.lock().await;

        staging.rehydrate()?;

        if !staging.is_empty() {
            return Err(RepositoryError::DirtyStagingArea.into());
        }

        let incoming_branch = self.load_branch(&self.existing_branch(branch_name)?)?;
        if incoming_branch.is_active() {
            return Err(RepositoryError::SelfMerge.into());
        }
        let active_branch = self.active_branch()?;

        let active_oid = active_branch.head().clone();
        let incoming_oid = incoming_branch.head().clone();
        let active_commit = self.database().load_commit(&active_oid)?;
        let incoming_commit = self.database().load_commit(&incoming_oid)?;

        let conflicts = untracked_conflicts(
            self.workspace(),
            active_commit.tracked(),
            incoming_commit.tracked(),
        )?;
        if !conflicts.is_empty() {
            return Err(RepositoryError::UntrackedFileConflict(conflicts).into());
        }

        let split_oid = {
            let database = self.database();
            let bca_finder = BCAFinder::new(|oid: &ObjectId| {
                database
                    .load_commit(oid)
                    .map(|commit| commit.to_slim(oid.clone()))
            });
            bca_finder.find_best_common_ancestor(&active_oid, &incoming_oid)?
        };

        tracing::info!(
            active = %active_oid,
            incoming = %incoming_oid,
            split = ?split_oid.as_ref().map(ObjectId::to_short_oid),
            "merging branches"
        );

        if active_branch.contains(&incoming_oid) || split_oid.as_ref() == Some(&incoming_oid) {
            return Err(RepositoryError::AlreadyAncestor.into());
        }

        if split_oid.as_ref() == Some(&active_oid) {
            let mut migration =
                Migration::new(self, active_commit.tracked(), incoming_commit.tracked());
            migration.apply_changes()?;

            self.refs().update_branch(active_branch.name(), &incoming_oid)?;
            writeln!(self.writer(), "{FAST_FORWARD_NOTICE}")?;

            return Ok(());
        }

        // unrelated histories merge against an empty snapshot
        let split_tracked = match &split_oid {
            Some(split_oid) => self.database().load_commit(split_oid)?.tracked().clone(),
            None => Default::default(),
        };

        let resolutions = resolve_all(
            active_commit.tracked(),
            incoming_commit.tracked(),
            &split_tracked,
        );

        let mut conflicted = false;
        for (path, resolution) in resolutions {
            match resolution {
                Resolution::Keep => {}
                Resolution::TakeIncoming(blob_id) => {
                    let blob = self.database().load_blob(&blob_id)?;
                    self.workspace().write_file(&path, blob.content())?;
                    staging.stage_add(path, blob_id, None);
                }
                Resolution::Remove => {
                    self.workspace().remove_file(&path)?;
                    if let Some(tracked_oid) = active_commit.tracked_oid(&path).cloned() {
                        staging.stage_remove(path, tracked_oid);
                    }
                }
                Resolution::Conflict { ours, theirs } => {
                    let ours = ours
                        .map(|oid| self.database().load_blob(&oid))
                        .transpose()?;
                    let theirs = theirs
                        .map(|oid| self.database().load_blob(&oid))
                        .transpose()?;
                    let content = render_conflict(
                        ours.as_ref().map(Blob::content),
                        theirs.as_ref().map(Blob::content),
                    );

                    let blob_id = self.database().store(&Blob::new(content.clone()))?;
                    self.workspace().write_file(&path, &content)?;
                    staging.stage_add(path, blob_id, None);

                    conflicted = true;
                }
            }
        }

        if conflicted {
            writeln!(self.writer(), "{CONFLICT_NOTICE}")?;
        }

        let message = format!(
            "Merged {} into {}.",
            incoming_branch.name(),
            active_branch.name()
        );
        self.write_commit(&mut staging, &message, Some(incoming_oid))?;
        staging.write_updates()?;

        Ok(())
    }
}
