use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use derive_new::new;

/// A named pointer into the commit graph
///
/// `history` is the first-parent chain from the root commit to `head`, oldest
/// first. It is rebuilt from the graph every time the branch is loaded, so two
/// branches never share (or mutate) one another's history.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Branch {
    name: BranchName,
    head: ObjectId,
    history: Vec<ObjectId>,
    is_active: bool,
}

impl Branch {
    pub fn name(&self) -> &BranchName {
        &self.name
    }

    pub fn head(&self) -> &ObjectId {
        &self.head
    }

    pub fn history(&self) -> &[ObjectId] {
        &self.history
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn contains(&self, commit: &ObjectId) -> bool {
        self.history.contains(commit)
    }
}
