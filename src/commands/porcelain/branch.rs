use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;

impl Repository {
    /// Create a branch pointing at the active branch's head
    pub fn branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = BranchName::try_parse(branch_name)?;
        let source_oid = self.refs().read_head()?;

        self.refs().create_branch(&branch_name, &source_oid)
    }

    /// Delete a branch pointer; its commits stay in the store
    pub fn rm_branch(&mut self, branch_name: &str) -> anyhow::Result<()> {
        let branch_name = self.existing_branch(branch_name)?;

        self.refs().delete_branch(&branch_name)?;

        Ok(())
    }
}
