use crate::areas::workspace::Workspace;
use crate::artifacts::objects::commit::Snapshot;
use std::path::PathBuf;

/// Working files that moving from `current` to `target` would clobber
///
/// A file is in the way when the current commit does not track it but the
/// target does, with content different from what is on disk.
pub fn untracked_conflicts(
    workspace: &Workspace,
    current: &Snapshot,
    target: &Snapshot,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut conflicts = Vec::new();

    for path in workspace.list_files()? {
        if current.contains_key(&path) {
            continue;
        }

        if let Some(target_oid) = target.get(&path)
            && &workspace.digest_file(&path)? != target_oid
        {
            conflicts.push(path);
        }
    }

    Ok(conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::object_id::ObjectId;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use pretty_assertions::assert_eq;

    fn blob_id(content: &str) -> ObjectId {
        use crate::artifacts::objects::blob::Blob;
        use crate::artifacts::objects::object::Object;

        Blob::new(content.to_string()).object_id().unwrap()
    }

    #[test]
    fn untracked_file_with_other_content_is_in_the_way() {
        let dir = TempDir::new().unwrap();
        dir.child("f.txt").write_str("local").unwrap();
        dir.child("same.txt").write_str("same").unwrap();
        dir.child("tracked.txt").write_str("edited").unwrap();
        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());

        let current = Snapshot::from([(PathBuf::from("tracked.txt"), blob_id("old"))]);
        let target = Snapshot::from([
            (PathBuf::from("f.txt"), blob_id("theirs")),
            (PathBuf::from("same.txt"), blob_id("same")),
            (PathBuf::from("tracked.txt"), blob_id("new")),
        ]);

        let conflicts = untracked_conflicts(&workspace, &current, &target).unwrap();

        assert_eq!(conflicts, vec![PathBuf::from("f.txt")]);
    }
}
