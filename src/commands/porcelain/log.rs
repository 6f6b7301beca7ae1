use crate::areas::repository::Repository;
use crate::artifacts::log::history::History;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use colored::Colorize;
use std::cmp::Reverse;

impl Repository {
    /// Active branch history, newest first, following first parents only
    pub fn log(&self) -> anyhow::Result<()> {
        let head = self.refs().read_head()?;

        for entry in History::new(self.database(), Some(head)) {
            let (commit_oid, commit) = entry?;
            self.show_commit(&commit_oid, &commit)?;
        }

        Ok(())
    }

    /// Every commit ever made, newest first
    pub fn global_log(&self) -> anyhow::Result<()> {
        for (commit_oid, commit) in self.commits_newest_first()? {
            self.show_commit(&commit_oid, &commit)?;
        }

        Ok(())
    }

    pub(crate) fn commits_newest_first(&self) -> anyhow::Result<Vec<(ObjectId, Commit)>> {
        let mut commits = self.database().commits()?;
        commits.sort_by_key(|(oid, commit)| (Reverse(commit.timestamp()), oid.clone()));

        Ok(commits)
    }

    fn show_commit(&self, commit_oid: &ObjectId, commit: &Commit) -> anyhow::Result<()> {
        let mut writer = self.writer();

        writeln!(writer, "===")?;
        writeln!(writer, "{}", format!("commit {commit_oid}").yellow())?;
        if let (Some(first), Some(second)) = (commit.parent(), commit.merged_parent()) {
            writeln!(
                writer,
                "Merge: {} {}",
                first.to_short_oid(),
                second.to_short_oid()
            )?;
        }
        writeln!(writer, "Date: {}", commit.readable_timestamp())?;
        writeln!(writer, "{}", commit.message())?;
        writeln!(writer)?;

        Ok(())
    }
}
