//! Best common ancestor (split point) finder
//!
//! ## Algorithm Overview
//!
//! ### Phase 1: Find All Common Ancestors
//!
//! A bidirectional traversal explores the history of both commits, newest
//! first, following every parent link (second parents of merge commits
//! included):
//! - Mark commits as visited from the source or the target side
//! - A commit visited from both sides is a common ancestor
//! - Parents of a common ancestor are marked STALE and no longer reported
//!
//! ### Phase 2: Filter to Best Common Ancestors
//!
//! > A best common ancestor of X and Y is any common ancestor of X and Y that
//! > is not an ancestor of any other common ancestor.
//!
//! Each common ancestor is checked against the others; the ones reachable from
//! another common ancestor are dropped. When several best common ancestors
//! remain (criss-cross histories) one of them is returned.
//!
//! ## Debug Logging
//!
//! Building with `--features debug_merge` traces every traversal step at the
//! `trace` level.

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use bitflags::bitflags;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;

macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "debug_merge")]
        {
            tracing::trace!($($arg)*);
        }
    };
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const NONE = 0b00;
        const VISITED_FROM_SOURCE = 0b01;
        const VISITED_FROM_TARGET = 0b10;
        const VISITED_FROM_BOTH = Self::VISITED_FROM_SOURCE.bits() | Self::VISITED_FROM_TARGET.bits();
        const STALE = 0b100;
        const RESULT = 0b1000;
    }
}

impl fmt::Debug for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut flags = Vec::new();
        if self.contains(VisitState::VISITED_FROM_SOURCE) {
            flags.push("SOURCE");
        }
        if self.contains(VisitState::VISITED_FROM_TARGET) {
            flags.push("TARGET");
        }
        if self.contains(VisitState::STALE) {
            flags.push("STALE");
        }
        if self.contains(VisitState::RESULT) {
            flags.push("RESULT");
        }
        if flags.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", flags.join("|"))
        }
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

struct CommonAncestorsFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> CommonAncestorsFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// Visit states of every common ancestor of `source_commit_id` and the
    /// `target_commit_ids` that is not a parent of another common ancestor
    fn find_common_ancestors(
        &self,
        source_commit_id: &ObjectId,
        target_commit_ids: HashSet<&ObjectId>,
    ) -> anyhow::Result<HashMap<ObjectId, VisitState>> {
        if target_commit_ids.contains(source_commit_id) {
            return Ok(HashMap::from([(
                source_commit_id.clone(),
                VisitState::RESULT,
            )]));
        }

        let mut ancestors_states = HashMap::<ObjectId, VisitState>::new();
        let mut priority_queue = BinaryHeap::new();

        let source_commit = (self.commit_loader)(source_commit_id)?;
        ancestors_states.insert(source_commit.oid.clone(), VisitState::VISITED_FROM_SOURCE);
        priority_queue.push((source_commit.timestamp, source_commit.oid));

        for &target_commit_id in target_commit_ids.iter() {
            ancestors_states.insert(target_commit_id.clone(), VisitState::VISITED_FROM_TARGET);

            let target_commit = (self.commit_loader)(target_commit_id)?;
            priority_queue.push((target_commit.timestamp, target_commit.oid));
        }

        while let Some((_, commit_id)) = priority_queue.pop() {
            let current_state = ancestors_states
                .get(&commit_id)
                .copied()
                .unwrap_or(VisitState::NONE);

            debug_log!("processing commit {}: state={}", &commit_id, current_state);

            if current_state.contains(VisitState::STALE) {
                continue;
            }

            let is_common_ancestor = current_state.contains(VisitState::VISITED_FROM_BOTH);
            if is_common_ancestor {
                ancestors_states
                    .entry(commit_id.clone())
                    .and_modify(|state| *state |= VisitState::RESULT);
            }

            let current_commit = (self.commit_loader)(&commit_id)?;

            for parent_id in &current_commit.parents {
                let parent_state = ancestors_states
                    .get(parent_id)
                    .copied()
                    .unwrap_or(VisitState::NONE);

                let mut new_state = parent_state | current_state;
                if is_common_ancestor {
                    new_state |= VisitState::STALE;
                }

                if new_state != parent_state {
                    let parent_commit = (self.commit_loader)(parent_id)?;
                    ancestors_states.insert(parent_id.clone(), new_state);
                    priority_queue.push((parent_commit.timestamp, parent_id.clone()));
                }
            }
        }

        debug_log!(
            "final ancestors states: {}",
            ancestors_states
                .iter()
                .map(|(oid, state)| format!("{oid}: {state}"))
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(ancestors_states
            .into_iter()
            .filter(|(_, state)| {
                !state.contains(VisitState::STALE) && state.contains(VisitState::RESULT)
            })
            .collect())
    }
}

pub struct BCAFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    inner: CommonAncestorsFinder<CommitLoaderFn>,
}

impl<CommitLoaderFn> BCAFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> anyhow::Result<SlimCommit>,
{
    /// `commit_loader` returns the parents and timestamp of a commit; loading
    /// failures abort the search
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self {
            inner: CommonAncestorsFinder::new(commit_loader),
        }
    }

    /// Best common ancestor of two commits, `None` for unrelated histories
    pub fn find_best_common_ancestor(
        &self,
        source_commit_id: &ObjectId,
        target_commit_id: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        let target_commit_ids = HashSet::from([target_commit_id]);
        let common_ancestors = self
            .inner
            .find_common_ancestors(source_commit_id, target_commit_ids)?
            .into_keys()
            .collect::<HashSet<_>>();

        if common_ancestors.is_empty() {
            return Ok(None);
        }

        debug_log!(
            "found common ancestors: {}",
            common_ancestors
                .iter()
                .map(|oid| oid.as_ref())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut redundant_ancestors = HashSet::<ObjectId>::new();
        for commit in &common_ancestors {
            if redundant_ancestors.contains(commit) {
                continue;
            }

            let others = common_ancestors
                .iter()
                .filter(|other| *other != commit && !redundant_ancestors.contains(*other))
                .collect::<HashSet<_>>();
            if others.is_empty() {
                continue;
            }
            let common_states = self.inner.find_common_ancestors(commit, others.clone())?;

            if common_states
                .get(commit)
                .unwrap_or(&VisitState::NONE)
                .contains(VisitState::VISITED_FROM_TARGET)
            {
                redundant_ancestors.insert(commit.clone());
            }

            for other in others {
                if common_states
                    .get(other)
                    .unwrap_or(&VisitState::NONE)
                    .contains(VisitState::VISITED_FROM_SOURCE)
                {
                    redundant_ancestors.insert(other.clone());
                }
            }
        }

        let mut best_common_ancestors = common_ancestors
            .into_iter()
            .filter(|commit| !redundant_ancestors.contains(commit))
            .collect::<Vec<_>>();
        // several candidates only happen in criss-cross histories; pick one
        // deterministically
        best_common_ancestors.sort();

        debug_log!(
            "best common ancestors: {}",
            best_common_ancestors
                .iter()
                .map(|oid| oid.as_ref())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(best_common_ancestors.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone};
    use pretty_assertions::assert_eq;
    use rstest::*;

    type CommitData = (Vec<ObjectId>, DateTime<FixedOffset>);

    /// In-memory commit store for testing
    #[derive(Debug, Clone, Default)]
    struct InMemoryCommitStore {
        commits: HashMap<ObjectId, CommitData>,
    }

    impl InMemoryCommitStore {
        fn add_commit(&mut self, commit_id: &ObjectId, parents: &[&ObjectId]) {
            // one hour apart, in insertion order
            let timestamp_offset = self.commits.len() as i64 * 3600;
            let timestamp = FixedOffset::east_opt(0)
                .unwrap()
                .timestamp_opt(1640995200 + timestamp_offset, 0)
                .unwrap();
            let parents = parents.iter().map(|&parent| parent.clone()).collect();

            self.commits.insert(commit_id.clone(), (parents, timestamp));
        }

        fn get_slim_commit(&self, commit_id: &ObjectId) -> anyhow::Result<SlimCommit> {
            let (parents, timestamp) = self
                .commits
                .get(commit_id)
                .ok_or_else(|| anyhow::anyhow!("commit {commit_id} not in test store"))?;

            Ok(SlimCommit {
                oid: commit_id.clone(),
                parents: parents.clone(),
                timestamp: *timestamp,
            })
        }

        fn bca(&self, source: &ObjectId, target: &ObjectId) -> Option<ObjectId> {
            BCAFinder::new(|oid| self.get_slim_commit(oid))
                .find_best_common_ancestor(source, target)
                .unwrap()
        }
    }

    fn create_oid(id: &str) -> ObjectId {
        let mut hex_string = id
            .as_bytes()
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<String>();

        while hex_string.len() < 40 {
            hex_string.push('0');
        }
        hex_string.truncate(40);

        ObjectId::try_parse(hex_string).unwrap()
    }

    #[fixture]
    fn linear() -> (InMemoryCommitStore, Vec<ObjectId>) {
        // A <- B <- C <- D
        let mut store = InMemoryCommitStore::default();
        let ids = ["A", "B", "C", "D"].map(create_oid).to_vec();

        store.add_commit(&ids[0], &[]);
        store.add_commit(&ids[1], &[&ids[0]]);
        store.add_commit(&ids[2], &[&ids[1]]);
        store.add_commit(&ids[3], &[&ids[2]]);

        (store, ids)
    }

    #[rstest]
    fn ancestor_is_its_own_split_point(linear: (InMemoryCommitStore, Vec<ObjectId>)) {
        let (store, ids) = linear;

        assert_eq!(store.bca(&ids[1], &ids[3]), Some(ids[1].clone()));
        assert_eq!(store.bca(&ids[3], &ids[1]), Some(ids[1].clone()));
    }

    #[rstest]
    fn same_commit_is_the_split_point(linear: (InMemoryCommitStore, Vec<ObjectId>)) {
        let (store, ids) = linear;

        assert_eq!(store.bca(&ids[2], &ids[2]), Some(ids[2].clone()));
    }

    #[test]
    fn simple_divergence_meets_at_the_fork() {
        //     A
        //    / \
        //   B   C
        //   |   |
        //   D   E
        let mut store = InMemoryCommitStore::default();
        let [a, b, c, d, e] = ["A", "B", "C", "D", "E"].map(create_oid);
        store.add_commit(&a, &[]);
        store.add_commit(&b, &[&a]);
        store.add_commit(&c, &[&a]);
        store.add_commit(&d, &[&b]);
        store.add_commit(&e, &[&c]);

        assert_eq!(store.bca(&d, &e), Some(a));
    }

    #[test]
    fn previous_merge_moves_the_split_point_forward() {
        //   A - B ----- M - D      (master)
        //    \         /
        //     C ----- E - F        (other)
        // After merging E into master, the next merge of F only needs the
        // changes since E; walking second parents is what finds it.
        let mut store = InMemoryCommitStore::default();
        let [a, b, c, e, m, d, f] = ["A", "B", "C", "E", "M", "D", "F"].map(create_oid);
        store.add_commit(&a, &[]);
        store.add_commit(&b, &[&a]);
        store.add_commit(&c, &[&a]);
        store.add_commit(&e, &[&c]);
        store.add_commit(&m, &[&b, &e]);
        store.add_commit(&d, &[&m]);
        store.add_commit(&f, &[&e]);

        assert_eq!(store.bca(&d, &f), Some(e));
    }

    #[test]
    fn criss_cross_returns_one_of_the_best_ancestors() {
        //     A
        //    / \
        //   B   C
        //   |\ /|
        //   | X |
        //   |/ \|
        //   D   E
        let mut store = InMemoryCommitStore::default();
        let [a, b, c, d, e] = ["A", "B", "C", "D", "E"].map(create_oid);
        store.add_commit(&a, &[]);
        store.add_commit(&b, &[&a]);
        store.add_commit(&c, &[&a]);
        store.add_commit(&d, &[&b, &c]);
        store.add_commit(&e, &[&c, &b]);

        let bca = store.bca(&d, &e).unwrap();

        assert!(bca == b || bca == c);
        assert_ne!(bca, a);
    }

    #[test]
    fn unrelated_histories_have_no_split_point() {
        let mut store = InMemoryCommitStore::default();
        let [a, b] = ["A", "B"].map(create_oid);
        store.add_commit(&a, &[]);
        store.add_commit(&b, &[]);

        assert_eq!(store.bca(&a, &b), None);
    }

    #[test]
    fn loader_failures_are_reported() {
        let store = InMemoryCommitStore::default();
        let missing = create_oid("missing");

        let result = BCAFinder::new(|oid| store.get_slim_commit(oid))
            .find_best_common_ancestor(&missing, &create_oid("other"));

        assert!(result.is_err());
    }
}
