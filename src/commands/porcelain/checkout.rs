use crate::areas::repository::Repository;
use crate::artifacts::checkout::migration::Migration;
use crate::errors::RepositoryError;

const ALREADY_ON_BRANCH: &str = "No need to checkout the current branch.";

impl Repository {
    /// Restore one file from a commit (the active head when `commit` is `None`)
    /// into the working tree, leaving the staging area alone
    pub fn checkout_file(&mut self, commit: Option<&str>, path: &str) -> anyhow::Result<()> {
        let (_, commit) = match commit {
            Some(prefix) => self.resolve_commit(prefix)?,
            None => self.head_commit()?,
        };

        let path = self.relative_path(path);
        let blob_id = commit
            .tracked_oid(&path)
            .ok_or(RepositoryError::FileNotInCommit)?;
        let blob = self.database().load_blob(blob_id)?;

        self.workspace().write_file(&path, blob.content())?;

        Ok(())
    }

    /// Project the head of `branch_name` onto the working tree and make it the
    /// active branch
    pub async fn checkout_branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        let target_branch = self.existing_branch(branch_name)?;
        let current_branch = self.refs().current_branch()?;

        let staging = self.staging();
        let mut staging = staging.lock().await;

        staging.rehydrate()?;

        if target_branch == current_branch {
            writeln!(self.writer(), "{ALREADY_ON_BRANCH}")?;
        }

        let (_, current_commit) = self.head_commit()?;
        let target_oid = self
            .refs()
            .read_branch(&target_branch)?
            .ok_or(RepositoryError::NoSuchBranch)?;
        let target_commit = self.database().load_commit(&target_oid)?;

        let mut migration =
            Migration::new(self, current_commit.tracked(), target_commit.tracked());
        migration.apply_changes()?;

        if target_branch != current_branch {
            staging.clear();
        }
        self.refs().set_head(&target_branch)?;

        staging.write_updates()?;

        Ok(())
    }
}
