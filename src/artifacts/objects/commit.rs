//! Commit object
//!
//! A commit is an immutable snapshot of every tracked path, together with a
//! message, a timestamp and links to its parents (none for the root commit,
//! two for merge commits).
//!
//! ## Format
//!
//! On disk:
//! ```text
//! commit <size>\0
//! timestamp <rfc3339 with nanoseconds>
//! parent <commit-sha>
//! blob <blob-sha> <path-byte-len> <path>
//!
//! <commit message>
//! ```
//!
//! The message runs verbatim to the end of the object.
//!
//! ## Identity
//!
//! A commit's id is the SHA-1 of its message followed by its canonical
//! timestamp. Tracked content and parents do not take part, which is what makes
//! the root commit identical across repositories.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, sha1_of};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use chrono::{DateTime, FixedOffset, SecondsFormat, TimeDelta};
use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Message of the commit created by `init`
pub const ROOT_COMMIT_MESSAGE: &str = "initial commit";

/// Overrides the commit clock, mostly useful for reproducible histories
pub const COMMIT_DATE_ENV: &str = "GITLET_COMMIT_DATE";

/// Path to blob id mapping making up a commit snapshot
pub type Snapshot = BTreeMap<PathBuf, ObjectId>;

/// Just enough of a commit to walk the graph: its parents and timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlimCommit {
    pub oid: ObjectId,
    pub parents: Vec<ObjectId>,
    pub timestamp: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Parent commit IDs (empty for the root commit, two for merge commits)
    parents: Vec<ObjectId>,
    timestamp: DateTime<FixedOffset>,
    /// Full snapshot of tracked files, not a delta against the parent
    tracked: Snapshot,
    message: String,
}

impl Commit {
    pub fn new(
        parents: Vec<ObjectId>,
        timestamp: DateTime<FixedOffset>,
        tracked: Snapshot,
        message: String,
    ) -> Self {
        Commit {
            parents,
            timestamp,
            tracked,
            message,
        }
    }

    /// The commit every repository starts from, pinned to the Unix epoch
    pub fn root() -> Self {
        let epoch = DateTime::UNIX_EPOCH.fixed_offset();

        Commit::new(vec![], epoch, Snapshot::new(), ROOT_COMMIT_MESSAGE.to_string())
    }

    /// Pick the timestamp for a commit made on top of `parents`
    ///
    /// Uses the current time (or `GITLET_COMMIT_DATE`), moved forward when
    /// needed so that a commit is always strictly newer than its parents.
    pub fn next_timestamp(parents: &[&Commit]) -> DateTime<FixedOffset> {
        let now = Self::load_date_from_env().unwrap_or_else(|| chrono::Local::now().fixed_offset());
        let newest_parent = parents.iter().map(|parent| parent.timestamp).max();

        match newest_parent {
            Some(newest) if now <= newest => newest + TimeDelta::nanoseconds(1),
            _ => now,
        }
    }

    fn load_date_from_env() -> Option<DateTime<FixedOffset>> {
        let date_str = std::env::var(COMMIT_DATE_ENV).ok()?;
        let timestamp = DateTime::parse_from_rfc2822(&date_str)
            .or_else(|_| DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
            .ok();

        if timestamp.is_none() {
            tracing::warn!("ignoring unparsable {COMMIT_DATE_ENV}: {date_str}");
        }

        timestamp
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    /// Timestamp in the form hashed into the commit id
    pub fn canonical_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }

    /// Format timestamp like "Thu Jan 1 00:00:00 1970 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    /// First parent, the one followed by `log`
    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// Second parent, only present on merge commits
    pub fn merged_parent(&self) -> Option<&ObjectId> {
        self.parents.get(1)
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    pub fn tracked(&self) -> &Snapshot {
        &self.tracked
    }

    pub fn tracked_oid(&self, path: &Path) -> Option<&ObjectId> {
        self.tracked.get(path)
    }

    pub fn to_slim(&self, oid: ObjectId) -> SlimCommit {
        SlimCommit {
            oid,
            parents: self.parents.clone(),
            timestamp: self.timestamp,
        }
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut object_content = vec![];

        object_content.push(format!("timestamp {}", self.canonical_timestamp()));
        for parent in &self.parents {
            object_content.push(format!("parent {}", parent.as_ref()));
        }
        for (path, oid) in &self.tracked {
            let path = path.to_string_lossy();
            object_content.push(format!("blob {} {} {}", oid.as_ref(), path.len(), path));
        }
        object_content.push(String::new());
        object_content.push(self.message.to_string());

        let object_content = object_content.join("\n");

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), object_content.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(object_content.as_bytes())?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;

        let content = String::from_utf8(content)?;

        let (timestamp_line, mut rest) = content
            .split_once('\n')
            .context("Invalid commit object: missing timestamp line")?;
        let timestamp = timestamp_line
            .strip_prefix("timestamp ")
            .context("Invalid commit object: invalid timestamp line")?;
        let timestamp = DateTime::parse_from_rfc3339(timestamp)
            .context("Invalid commit object: unparsable timestamp")?;

        let mut parents = Vec::new();
        let mut tracked = Snapshot::new();

        // the message is everything after the blank line, taken verbatim
        let message = loop {
            if let Some(message) = rest.strip_prefix('\n') {
                break message.to_string();
            }

            if let Some(entry) = rest.strip_prefix("parent ") {
                let (parent_oid, remaining) = entry
                    .split_once('\n')
                    .context("Invalid commit object: unterminated parent line")?;
                parents.push(ObjectId::try_parse(parent_oid.to_string())?);
                rest = remaining;
            } else if let Some(entry) = rest.strip_prefix("blob ") {
                let (path, oid, remaining) = Self::parse_blob_entry(entry)?;
                tracked.insert(path, oid);
                rest = remaining;
            } else {
                let line = rest.lines().next().unwrap_or_default();
                anyhow::bail!("Invalid commit object: unexpected header line {line:?}");
            }
        };

        Ok(Self::new(parents, timestamp, tracked, message))
    }
}

impl Commit {
    // `<oid> <path-byte-len> <path>\n`; the length lets paths carry spaces
    // and line breaks
    fn parse_blob_entry(entry: &str) -> anyhow::Result<(PathBuf, ObjectId, &str)> {
        let (oid, entry) = entry
            .split_once(' ')
            .context("Invalid commit object: invalid blob line")?;
        let (path_len, entry) = entry
            .split_once(' ')
            .context("Invalid commit object: missing blob path length")?;
        let path_len = path_len
            .parse::<usize>()
            .context("Invalid commit object: invalid blob path length")?;

        let path = entry
            .get(..path_len)
            .context("Invalid commit object: truncated blob path")?;
        let remaining = entry[path_len..]
            .strip_prefix('\n')
            .context("Invalid commit object: unterminated blob line")?;

        Ok((
            PathBuf::from(path),
            ObjectId::try_parse(oid.to_string())?,
            remaining,
        ))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn object_id(&self) -> anyhow::Result<ObjectId> {
        Ok(sha1_of(&[
            self.message.as_bytes(),
            self.canonical_timestamp().as_bytes(),
        ]))
    }
}
