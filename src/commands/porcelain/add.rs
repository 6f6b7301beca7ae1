use crate::areas::repository::Repository;
use crate::errors::RepositoryError;

impl Repository {
    pub async fn add(&mut self, path: &str) -> anyhow::Result<()> {
        let staging = self.staging();
        let mut staging = staging.lock().await;

        staging.rehydrate()?;

        let path = self.relative_path(path);
        if !self.workspace().file_exists(&path) {
            return Err(RepositoryError::FileDoesNotExist.into());
        }

        let (_, head_commit) = self.head_commit()?;
        let blob = self.workspace().parse_blob(&path)?;
        let blob_id = self.database().store(&blob)?;

        let tracked_oid = head_commit.tracked_oid(&path).cloned();

        staging.stage_add(path, blob_id, tracked_oid.as_ref());
        staging.write_updates()?;

        Ok(())
    }
}
