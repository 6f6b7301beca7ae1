use anyhow::Context;
use file_guard::{FileGuard, Lock};
use std::fs::File;
use std::path::Path;

/// Name of the lock file inside the metadata directory
pub const LOCK_FILE: &str = "lock";

/// Exclusive advisory lock held for the duration of one command
///
/// Released when dropped, on every exit path. The lock is taken once per
/// process; opening and closing another descriptor for the same file would
/// drop the lock early, so nothing else in the crate touches the lock file.
pub struct RepositoryLock {
    _guard: FileGuard<Box<File>>,
}

impl RepositoryLock {
    pub fn acquire(gitlet_path: &Path) -> anyhow::Result<Self> {
        let lock_path = gitlet_path.join(LOCK_FILE);
        let lock_file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("failed to open lock file at {lock_path:?}"))?;

        let guard = file_guard::lock(Box::new(lock_file), Lock::Exclusive, 0, 1)
            .with_context(|| format!("failed to lock repository at {lock_path:?}"))?;
        tracing::debug!(path = ?lock_path, "repository locked");

        Ok(RepositoryLock { _guard: guard })
    }
}
