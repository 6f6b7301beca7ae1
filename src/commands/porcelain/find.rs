use crate::areas::repository::Repository;
use crate::errors::RepositoryError;

impl Repository {
    /// Print the id of every commit whose message is exactly `message`
    pub fn find(&self, message: &str) -> anyhow::Result<()> {
        let matches = self
            .commits_newest_first()?
            .into_iter()
            .filter(|(_, commit)| commit.message() == message)
            .map(|(oid, _)| oid)
            .collect::<Vec<_>>();

        if matches.is_empty() {
            return Err(RepositoryError::NoCommitWithMessage.into());
        }

        for oid in matches {
            writeln!(self.writer(), "{oid}")?;
        }

        Ok(())
    }
}
