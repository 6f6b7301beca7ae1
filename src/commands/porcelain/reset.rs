use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;

impl Repository {
    /// Move the active branch to `commit` and project its snapshot
    pub async fn reset(&mut self, commit: &str) -> anyhow::Result<()> {
        let (target_oid, target_commit) = self.resolve_commit(commit)?;
        let current_branch = self.refs().current_branch()?;

        let staging = self.staging();
        let mut staging = staging.lock().await;

        staging.rehydrate()?;

        let (_, current_commit) = self.head_commit()?;
        let mut migration =
            Migration::new(self, current_commit.tracked(), target_commit.tracked());
        migration.apply_changes()?;

        self.refs().update_branch(&current_branch, &target_oid)?;
        staging.clear();
        staging.write_updates()?;

        Ok(())
    }
}
