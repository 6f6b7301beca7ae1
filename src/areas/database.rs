use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::RepositoryError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

const TEMP_OBJECT_PREFIX: &str = "tmp-obj-";

/// Content-addressed store of blobs and commits under `.gitlet/objects`
///
/// Objects are immutable: once a file exists under an id it is never rewritten.
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Write `object` under its id and return the id
    ///
    /// Storing content that already exists is a no-op.
    pub fn store(&self, object: &impl Object) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            tracing::debug!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        std::fs::create_dir_all(
            object_path
                .parent()
                .context(format!("Invalid object path {}", object_path.display()))?,
        )
        .context(format!(
            "Unable to create object directory {}",
            object_path.display()
        ))?;

        self.write_object(&object_path, object.serialize()?)?;
        tracing::debug!(oid = %object_id, kind = %object.object_type(), "stored object");

        Ok(object_id)
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    pub fn load_blob(&self, object_id: &ObjectId) -> anyhow::Result<Blob> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Blob::deserialize(object_reader),
            other => anyhow::bail!("Object {object_id} is a {other}, not a blob"),
        }
    }

    pub fn load_commit(&self, object_id: &ObjectId) -> anyhow::Result<Commit> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Commit => Commit::deserialize(object_reader),
            other => anyhow::bail!("Object {object_id} is a {other}, not a commit"),
        }
    }

    pub fn object_type(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    /// Expand an abbreviated commit id to the single commit it names
    ///
    /// Blobs sharing the prefix are ignored.
    pub fn resolve_commit(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        if !ObjectId::is_valid_prefix(prefix) {
            return Err(RepositoryError::NoSuchCommit.into());
        }

        let mut candidates = self
            .find_objects_by_prefix(prefix)?
            .into_iter()
            .filter(|oid| matches!(self.object_type(oid), Ok(ObjectType::Commit)))
            .collect::<Vec<_>>();

        match candidates.len() {
            0 => Err(RepositoryError::NoSuchCommit.into()),
            1 => Ok(candidates.remove(0)),
            _ => Err(RepositoryError::AmbiguousId(prefix.to_string()).into()),
        }
    }

    /// Every commit in the store, in no particular order
    pub fn commits(&self) -> anyhow::Result<Vec<(ObjectId, Commit)>> {
        let mut commits = Vec::new();

        for object_id in self.object_ids()? {
            if let ObjectType::Commit = self.object_type(&object_id)? {
                let commit = self.load_commit(&object_id)?;
                commits.push((object_id, commit));
            }
        }

        Ok(commits)
    }

    fn object_ids(&self) -> anyhow::Result<Vec<ObjectId>> {
        let mut object_ids = Vec::new();

        for entry in walkdir::WalkDir::new(&self.path).min_depth(2).max_depth(2) {
            let entry = entry.context("Unable to walk the object database")?;
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy();
            if file_name.starts_with(TEMP_OBJECT_PREFIX) {
                continue;
            }

            let dir_name = entry
                .path()
                .parent()
                .and_then(|dir| dir.file_name())
                .map(|dir| dir.to_string_lossy().to_string())
                .unwrap_or_default();

            if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                object_ids.push(oid);
            }
        }

        Ok(object_ids)
    }

    /// Find all objects whose id starts with the given prefix
    ///
    /// For prefixes of 2+ characters only the matching fan-out directory is
    /// searched; shorter prefixes fall back to a full scan.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();

        if prefix.len() < 2 {
            return Ok(self
                .object_ids()?
                .into_iter()
                .filter(|oid| oid.starts_with(&prefix))
                .collect());
        }

        let mut matches = Vec::new();
        let (dir_name, file_prefix) = prefix.split_at(2);
        let dir_path = self.path.join(dir_name);

        if dir_path.is_dir() {
            for entry in std::fs::read_dir(&dir_path)? {
                let entry = entry?;
                let file_name = entry.file_name();
                let file_name = file_name.to_string_lossy();

                if file_name.starts_with(file_prefix) {
                    if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                        matches.push(oid);
                    }
                }
            }
        }

        Ok(matches)
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, impl BufRead)> {
        let object_path = self.path.join(object_id.to_path());
        let object_content = self.read_object(object_path)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: &Path, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;

        // rename into place so readers never observe a partial object
        std::fs::rename(&temp_object_path, object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("{TEMP_OBJECT_PREFIX}{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::Snapshot;
    use assert_fs::TempDir;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn objects_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn database(dir: &TempDir) -> Database {
        Database::new(dir.path().join("objects").into_boxed_path())
    }

    fn commit_with_message(message: &str) -> Commit {
        Commit::new(
            vec![],
            DateTime::parse_from_rfc3339("2024-05-01T12:00:00+00:00").unwrap(),
            Snapshot::new(),
            message.to_string(),
        )
    }

    #[rstest]
    fn stored_blob_can_be_loaded_back(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let blob = Blob::new("some text\n".to_string());

        let oid = database.store(&blob).unwrap();

        assert!(database.contains(&oid));
        assert_eq!(database.load_blob(&oid).unwrap(), blob);
    }

    #[rstest]
    fn storing_identical_content_is_a_no_op(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let blob = Blob::new("same".to_string());

        let first = database.store(&blob).unwrap();
        let second = database.store(&blob).unwrap();

        assert_eq!(first, second);
        assert_eq!(database.object_ids().unwrap(), vec![first]);
    }

    #[rstest]
    fn loading_a_blob_as_commit_fails(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.store(&Blob::new("not a commit".to_string())).unwrap();

        assert!(database.load_commit(&oid).is_err());
    }

    #[rstest]
    fn resolve_commit_expands_unique_prefix(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.store(&commit_with_message("first")).unwrap();

        let resolved = database.resolve_commit(&oid.as_ref()[..6]).unwrap();

        assert_eq!(resolved, oid);
    }

    #[rstest]
    fn resolve_commit_ignores_blobs(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let blob_oid = database.store(&Blob::new("content".to_string())).unwrap();

        let error = database.resolve_commit(blob_oid.as_ref()).unwrap_err();

        assert_eq!(
            RepositoryError::find_in(&error),
            Some(&RepositoryError::NoSuchCommit)
        );
    }

    #[rstest]
    fn resolve_commit_reports_ambiguous_prefix(objects_dir: TempDir) {
        let database = database(&objects_dir);
        // seventeen ids over sixteen leading digits: at least two share one
        let ids = (0..17)
            .map(|n| database.store(&commit_with_message(&n.to_string())).unwrap())
            .collect::<Vec<_>>();
        let prefix = ids
            .iter()
            .map(|oid| oid.as_ref()[..1].to_string())
            .find(|first| ids.iter().filter(|oid| oid.starts_with(first)).count() > 1)
            .unwrap();

        let error = database.resolve_commit(&prefix).unwrap_err();

        assert_eq!(
            RepositoryError::find_in(&error),
            Some(&RepositoryError::AmbiguousId(prefix))
        );
    }

    #[rstest]
    fn commits_lists_every_stored_commit(objects_dir: TempDir) {
        let database = database(&objects_dir);
        database.store(&Blob::new("x".to_string())).unwrap();
        let first = database.store(&commit_with_message("one")).unwrap();
        let second = database.store(&commit_with_message("two")).unwrap();

        let mut ids = database
            .commits()
            .unwrap()
            .into_iter()
            .map(|(oid, _)| oid)
            .collect::<Vec<_>>();
        ids.sort();
        let mut expected = vec![first, second];
        expected.sort();

        assert_eq!(ids, expected);
    }
}
