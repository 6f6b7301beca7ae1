use crate::areas::repository::Repository;
use crate::areas::staging::StagingArea;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;

impl Repository {
    pub async fn commit(&mut self, message: &str) -> anyhow::Result<()> {
        if message.trim().is_empty() {
            return Err(RepositoryError::EmptyMessage.into());
        }

        let staging = self.staging();
        let mut staging = staging.lock().await;

        staging.rehydrate()?;

        if staging.is_empty() {
            return Err(RepositoryError::NothingToCommit.into());
        }

        self.write_commit(&mut staging, message, None)?;
        staging.write_updates()?;

        Ok(())
    }

    /// Fold the staging area into a new commit on the active branch
    ///
    /// The snapshot starts from the head commit, takes every staged addition
    /// and drops every staged removal. `merged_parent` becomes the second
    /// parent of a merge commit. The staging area is cleared, not persisted.
    pub(crate) fn write_commit(
        &self,
        staging: &mut StagingArea,
        message: &str,
        merged_parent: Option<ObjectId>,
    ) -> anyhow::Result<ObjectId> {
        let branch = self.refs().current_branch()?;
        let (head_oid, head_commit) = self.head_commit()?;

        let mut tracked = head_commit.tracked().clone();
        tracked.extend(
            staging
                .additions()
                .iter()
                .map(|(path, oid)| (path.clone(), oid.clone())),
        );
        for path in staging.removals().keys() {
            tracked.remove(path);
        }

        let merged_commit = merged_parent
            .as_ref()
            .map(|oid| self.database().load_commit(oid))
            .transpose()?;
        let parent_commits = std::iter::once(&head_commit)
            .chain(merged_commit.as_ref())
            .collect::<Vec<_>>();
        let timestamp = Commit::next_timestamp(&parent_commits);

        let parents = std::iter::once(head_oid)
            .chain(merged_parent)
            .collect::<Vec<_>>();
        let commit = Commit::new(parents, timestamp, tracked, message.to_string());
        let commit_oid = self.database().store(&commit)?;

        self.refs().update_branch(&branch, &commit_oid)?;
        staging.clear();

        tracing::info!(
            branch = %branch,
            commit = %commit_oid,
            merge = commit.is_merge(),
            "commit created"
        );

        Ok(commit_oid)
    }
}
