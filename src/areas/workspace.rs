use crate::GITLET_DIR;
use crate::artifacts::checkout::migration::{ActionType, Migration};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The working tree: every file under the repository root except the metadata
/// directory
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every working file, relative to the root and sorted by path
    pub fn list_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = WalkDir::new(&self.path)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != GITLET_DIR)
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(self.path.as_ref())
                    .ok()
                    .map(Path::to_path_buf)
            })
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    pub fn file_exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &Path) -> anyhow::Result<String> {
        let full_path = self.path.join(file_path);

        std::fs::read_to_string(&full_path)
            .with_context(|| format!("Failed to read file: {:?}", file_path))
    }

    pub fn parse_blob(&self, file_path: &Path) -> anyhow::Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    /// Digest the working copy of `file_path` would have as a blob
    pub fn digest_file(&self, file_path: &Path) -> anyhow::Result<ObjectId> {
        self.parse_blob(file_path)?.object_id()
    }

    /// Overwrite (or create) a working file, creating parent directories
    pub fn write_file(&self, file_path: &Path, content: &str) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        if full_path.is_dir() {
            std::fs::remove_dir_all(&full_path).with_context(|| {
                format!("Failed to remove directory in the way of: {:?}", file_path)
            })?;
        }

        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create parent of: {:?}", file_path))?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&full_path)
            .with_context(|| format!("Failed to open file: {:?}", file_path))?;

        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to file: {:?}", file_path))
    }

    /// Delete a working file if present, then prune directories it leaves empty
    pub fn remove_file(&self, file_path: &Path) -> anyhow::Result<()> {
        let full_path = self.path.join(file_path);

        if full_path.is_file() {
            std::fs::remove_file(&full_path)
                .with_context(|| format!("Failed to remove file: {:?}", file_path))?;
        }

        self.prune_empty_parent_dirs(&full_path)
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.is_dir()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("Failed to remove empty directory: {:?}", parent))?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    // Deletions go first so that a directory being replaced by a file (or the
    // other way round) is out of the way before anything is written.
    pub fn apply_migration(&self, migration: &Migration) -> anyhow::Result<()> {
        for (file_path, _) in migration.actions_of(ActionType::Delete) {
            self.remove_file(file_path)?;
        }

        for action in [ActionType::Modify, ActionType::Add] {
            for (file_path, oid) in migration.actions_of(action) {
                let oid = oid
                    .as_ref()
                    .with_context(|| format!("No blob planned for {:?}", file_path))?;
                let data = migration.load_blob_data(oid)?;

                self.write_file(file_path, &data)?;
            }
        }

        Ok(())
    }
}
