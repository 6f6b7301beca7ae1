//! Staging area
//!
//! Holds the changes that the next commit will apply on top of the current
//! head: staged additions (path to the blob that should be tracked) and staged
//! removals (path to the blob that is being untracked).
//!
//! The staging area is loaded once per command with [`StagingArea::rehydrate`]
//! and persisted once at the end of a mutating command with
//! [`StagingArea::write_updates`]. The file is read under a shared lock and
//! written under an exclusive one, and carries a trailing SHA-1 checksum.

use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::staging::checksum::Checksum;
use crate::artifacts::staging::staged_entry::{ENTRY_FIXED_SIZE, StagedEntry, StagedKind};
use crate::artifacts::staging::staging_header::StagingHeader;
use crate::artifacts::staging::HEADER_SIZE;
use anyhow::Context;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StagingArea {
    /// Path to the staging file (`.gitlet/index`)
    path: Box<Path>,
    additions: BTreeMap<PathBuf, ObjectId>,
    removals: BTreeMap<PathBuf, ObjectId>,
    /// Whether the in-memory state diverged from the file
    changed: bool,
}

impl StagingArea {
    pub fn new(path: Box<Path>) -> Self {
        StagingArea {
            path,
            additions: BTreeMap::new(),
            removals: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn additions(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.additions
    }

    pub fn removals(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.removals
    }

    pub fn is_staged_for_addition(&self, path: &Path) -> bool {
        self.additions.contains_key(path)
    }

    pub fn is_staged_for_removal(&self, path: &Path) -> bool {
        self.removals.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub fn has_changed(&self) -> bool {
        self.changed
    }

    /// Stage `digest` as the new content of `path`
    ///
    /// `tracked` is the digest the current commit records for `path`. When the
    /// working copy matches it there is nothing to commit for this path, so any
    /// pending addition or removal is cancelled instead.
    pub fn stage_add(&mut self, path: PathBuf, digest: ObjectId, tracked: Option<&ObjectId>) {
        self.removals.remove(&path);

        if tracked == Some(&digest) {
            tracing::debug!(path = %path.display(), "content matches head, unstaging");
            self.additions.remove(&path);
        } else {
            tracing::debug!(path = %path.display(), oid = %digest, "staged for addition");
            self.additions.insert(path, digest);
        }

        self.changed = true;
    }

    /// Stage `path` for removal from the next commit
    pub fn stage_remove(&mut self, path: PathBuf, digest: ObjectId) {
        tracing::debug!(path = %path.display(), "staged for removal");
        self.additions.remove(&path);
        self.removals.insert(path, digest);
        self.changed = true;
    }

    /// Drop a staged addition, returning whether there was one
    pub fn unstage(&mut self, path: &Path) -> bool {
        let existed = self.additions.remove(path).is_some();
        self.changed |= existed;
        existed
    }

    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.changed = true;
        }

        self.additions.clear();
        self.removals.clear();
    }

    /// Load the staging area from disk
    ///
    /// A missing or empty staging file is an empty staging area.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.additions.clear();
        self.removals.clear();
        self.changed = false;

        if !self.path.exists() {
            return Ok(());
        }

        let mut staging_file = std::fs::OpenOptions::new()
            .read(true)
            .open(&self.path)
            .context(format!("Unable to open staging file {}", self.path.display()))?;
        let mut lock = file_guard::lock(&mut staging_file, file_guard::Lock::Shared, 0, 1)?;

        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);

        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = StagingHeader::deserialize(Cursor::new(header_bytes))?;
        header.validate()?;

        let entries_count = header.additions_count + header.removals_count;
        for _ in 0..entries_count {
            let entry = Self::parse_entry(&mut reader)?;

            match entry.kind {
                StagedKind::Addition => self.additions.insert(entry.path, entry.oid),
                StagedKind::Removal => self.removals.insert(entry.path, entry.oid),
            };
        }

        reader
            .verify()
            .context(format!("Corrupt staging file {}", self.path.display()))
    }

    fn parse_entry(reader: &mut Checksum) -> anyhow::Result<StagedEntry> {
        let fixed = reader.read(ENTRY_FIXED_SIZE)?;
        let path_len = StagedEntry::path_len(&fixed)?;
        let path = reader.read(path_len)?;

        let entry_bytes = [fixed.to_vec(), path.to_vec()].concat();
        StagedEntry::deserialize(Cursor::new(entry_bytes))
    }

    /// Persist the staging area if it changed since it was loaded
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        if !self.changed {
            return Ok(());
        }

        let mut staging_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .context(format!("Unable to open staging file {}", self.path.display()))?;
        let lock = file_guard::lock(&mut staging_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(lock);

        let header = StagingHeader::with_counts(self.additions.len(), self.removals.len());
        writer.write(&header.serialize()?)?;

        let additions = self
            .additions
            .iter()
            .map(|(path, oid)| (StagedKind::Addition, path, oid));
        let removals = self
            .removals
            .iter()
            .map(|(path, oid)| (StagedKind::Removal, path, oid));

        for (kind, path, oid) in additions.chain(removals) {
            let entry = StagedEntry::new(kind, path.clone(), oid.clone());
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()?;
        self.changed = false;
        tracing::debug!(
            additions = self.additions.len(),
            removals = self.removals.len(),
            "staging area written"
        );

        Ok(())
    }
}
