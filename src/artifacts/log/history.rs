use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// Walks first parents from `start` back to the root commit, newest first
///
/// Second parents of merge commits are never followed.
#[derive(Clone, new)]
pub struct History<'d> {
    database: &'d Database,
    next_commit_oid: Option<ObjectId>,
}

impl Iterator for History<'_> {
    type Item = anyhow::Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let commit_oid = self.next_commit_oid.take()?;

        match self.database.load_commit(&commit_oid) {
            Ok(commit) => {
                self.next_commit_oid = commit.parent().cloned();
                Some(Ok((commit_oid, commit)))
            }
            Err(error) => Some(Err(error)),
        }
    }
}

/// Ids along the first-parent chain ending at `head`, oldest first
pub fn first_parent_chain(database: &Database, head: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
    let mut chain = History::new(database, Some(head.clone()))
        .map(|entry| entry.map(|(oid, _)| oid))
        .collect::<anyhow::Result<Vec<_>>>()?;
    chain.reverse();

    Ok(chain)
}
