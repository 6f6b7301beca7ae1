use crate::areas::repository::Repository;
use crate::errors::RepositoryError;

impl Repository {
    /// Unstage `path`, and if the head commit tracks it, stage its removal and
    /// delete the working copy
    pub async fn rm(&mut self, path: &str) -> anyhow::Result<()> {
        let staging = self.staging();
        let mut staging = staging.lock().await;

        staging.rehydrate()?;

        let path = self.relative_path(path);
        let (_, head_commit) = self.head_commit()?;
        let tracked_oid = head_commit.tracked_oid(&path).cloned();

        if tracked_oid.is_none() && !staging.is_staged_for_addition(&path) {
            return Err(RepositoryError::NoReasonToRemove.into());
        }

        staging.unstage(&path);
        if let Some(tracked_oid) = tracked_oid {
            self.workspace().remove_file(&path)?;
            staging.stage_remove(path, tracked_oid);
        }

        staging.write_updates()?;

        Ok(())
    }
}
