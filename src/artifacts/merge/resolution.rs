use crate::artifacts::objects::commit::Snapshot;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// What a merge does to one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The active side already has the right content (or absence)
    Keep,
    /// Write the incoming blob and stage it
    TakeIncoming(ObjectId),
    /// Delete the working file and stage the removal
    Remove,
    /// Both sides changed the path differently since the split point
    Conflict {
        ours: Option<ObjectId>,
        theirs: Option<ObjectId>,
    },
}

/// Three-way decision for one path given its blob in the active, incoming and
/// split snapshots (`None` when the snapshot does not track the path)
pub fn resolve(
    active: Option<&ObjectId>,
    incoming: Option<&ObjectId>,
    split: Option<&ObjectId>,
) -> Resolution {
    if active == incoming {
        return Resolution::Keep;
    }

    if active == split {
        return match incoming {
            Some(oid) => Resolution::TakeIncoming(oid.clone()),
            None => Resolution::Remove,
        };
    }

    if incoming == split {
        return Resolution::Keep;
    }

    Resolution::Conflict {
        ours: active.cloned(),
        theirs: incoming.cloned(),
    }
}

/// Decisions for every path any of the snapshots tracks, leaving out paths
/// that keep the active version
pub fn resolve_all(
    active: &Snapshot,
    incoming: &Snapshot,
    split: &Snapshot,
) -> BTreeMap<PathBuf, Resolution> {
    let paths = active
        .keys()
        .chain(incoming.keys())
        .chain(split.keys())
        .collect::<BTreeSet<_>>();

    paths
        .into_iter()
        .filter_map(|path| {
            let resolution = resolve(active.get(path), incoming.get(path), split.get(path));
            tracing::debug!(path = %path.display(), ?resolution, "merge decision");

            (resolution != Resolution::Keep).then(|| (path.clone(), resolution))
        })
        .collect()
}
