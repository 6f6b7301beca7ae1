use crate::DEFAULT_BRANCH;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::commit::Commit;
use anyhow::Context;
use std::fs;

const ALREADY_INITIALIZED: &str =
    "A Gitlet version-control system already exists in the current directory.";

impl Repository {
    pub fn init(&mut self) -> anyhow::Result<()> {
        if self.is_initialized() {
            writeln!(self.writer(), "{ALREADY_INITIALIZED}")?;
            return Ok(());
        }

        fs::create_dir_all(self.database().objects_path())
            .context("Failed to create .gitlet/objects directory")?;

        fs::create_dir_all(self.refs().heads_path())
            .context("Failed to create .gitlet/refs/heads directory")?;

        let root_oid = self
            .database()
            .store(&Commit::root())
            .context("Failed to store the initial commit")?;

        let default_branch = BranchName::try_parse(DEFAULT_BRANCH)?;
        self.refs()
            .create_branch(&default_branch, &root_oid)
            .context("Failed to create the default branch")?;
        self.refs()
            .set_head(&default_branch)
            .context("Failed to create initial HEAD reference")?;

        tracing::info!(path = %self.path().display(), root = %root_oid, "repository initialized");

        Ok(())
    }
}
