//! Branch table and HEAD
//!
//! ## File Format
//!
//! - `HEAD` holds `ref: refs/heads/<active-branch>`
//! - `refs/heads/<name>` holds the 40-character id of the branch head
//!
//! Branch names may contain slashes, in which case the branch file lives in a
//! nested directory that is pruned again when the branch is deleted.

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (`.gitlet`)
    path: Box<Path>,
}

impl Refs {
    /// Name of the branch HEAD points to
    pub fn current_branch(&self) -> anyhow::Result<BranchName> {
        let head_path = self.head_path();
        let content = std::fs::read_to_string(&head_path)
            .with_context(|| format!("failed to read HEAD at {head_path:?}"))?;
        let content = content.trim();

        let symref_match = regex::Regex::new(SYMREF_REGEX)?
            .captures(content)
            .with_context(|| format!("HEAD does not point to a branch: {content:?}"))?;

        BranchName::try_parse_ref(&symref_match[1])
    }

    pub fn is_current_branch(&self, name: &BranchName) -> anyhow::Result<bool> {
        Ok(&self.current_branch()? == name)
    }

    /// Point HEAD at `name`; the branch heads themselves are untouched
    pub fn set_head(&self, name: &BranchName) -> anyhow::Result<()> {
        if !self.branch_exists(name) {
            return Err(RepositoryError::NoSuchBranch.into());
        }

        tracing::info!(branch = %name, "HEAD moved");
        self.update_ref_file(&self.head_path(), format!("ref: {}", name.to_ref()))
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    /// Head commit of `name`, if such a branch exists
    pub fn read_branch(&self, name: &BranchName) -> anyhow::Result<Option<ObjectId>> {
        let branch_path = self.branch_path(name);
        if !branch_path.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&branch_path)
            .with_context(|| format!("failed to read ref file at {branch_path:?}"))?;

        Ok(Some(ObjectId::try_parse(content.trim().to_string())?))
    }

    /// Head commit of the active branch
    pub fn read_head(&self) -> anyhow::Result<ObjectId> {
        let current = self.current_branch()?;

        self.read_branch(&current)?
            .with_context(|| format!("active branch {current} has no head commit"))
    }

    pub fn create_branch(&self, name: &BranchName, head: &ObjectId) -> anyhow::Result<()> {
        if self.branch_exists(name) {
            return Err(RepositoryError::BranchExists.into());
        }

        tracing::info!(branch = %name, head = %head, "branch created");
        self.update_ref_file(&self.branch_path(name), head.to_string())
    }

    /// Move an existing branch to a new head
    pub fn update_branch(&self, name: &BranchName, head: &ObjectId) -> anyhow::Result<()> {
        if !self.branch_exists(name) {
            return Err(RepositoryError::NoSuchBranch.into());
        }

        tracing::info!(branch = %name, head = %head, "branch updated");
        self.update_ref_file(&self.branch_path(name), head.to_string())
    }

    /// Remove the branch pointer, leaving its commits in the store
    pub fn delete_branch(&self, name: &BranchName) -> anyhow::Result<ObjectId> {
        if self.is_current_branch(name)? {
            return Err(RepositoryError::CannotDeleteActive.into());
        }

        let head = self
            .read_branch(name)?
            .ok_or(RepositoryError::NoSuchBranch)?;

        let branch_path = self.branch_path(name);
        std::fs::remove_file(&branch_path)
            .with_context(|| format!("failed to delete branch file at {branch_path:?}"))?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;

        tracing::info!(branch = %name, head = %head, "branch deleted");
        Ok(head)
    }

    /// Every branch, sorted by name
    pub fn list_branches(&self) -> anyhow::Result<Vec<BranchName>> {
        let heads_path = self.heads_path();

        let mut branches = WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&heads_path).ok()?;
                BranchName::try_parse(relative_path.to_string_lossy().to_string()).ok()
            })
            .collect::<Vec<_>>();
        branches.sort();

        Ok(branches)
    }

    fn update_ref_file(&self, path: &Path, raw_ref: String) -> anyhow::Result<()> {
        std::fs::create_dir_all(path.parent().with_context(|| {
            format!("failed to create parent directories for ref file at {path:?}")
        })?)?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("failed to open ref file at {path:?}"))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(raw_ref.as_bytes())?;

        Ok(())
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent.read_dir()?.next().is_none()
        {
            std::fs::remove_dir(parent).with_context(|| {
                format!("failed to remove empty branch directory at {parent:?}")
            })?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    fn branch_path(&self, name: &BranchName) -> Box<Path> {
        self.path.join(name.to_ref_path()).into_boxed_path()
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn refs_path(&self) -> Box<Path> {
        self.path.join("refs").into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.refs_path().join("heads").into_boxed_path()
    }
}
