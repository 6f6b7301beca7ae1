use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::areas::staging::StagingArea;
use crate::areas::workspace::Workspace;
use crate::artifacts::branch::branch::Branch;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::log::history::first_parent_chain;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::RepositoryError;
use crate::GITLET_DIR;
use anyhow::Context;
use std::cell::{RefCell, RefMut};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Name of the staging file inside the metadata directory
pub const STAGING_FILE: &str = "index";

/// One repository rooted at `path`, with its metadata under `path/.gitlet`
pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    staging: Arc<Mutex<StagingArea>>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    pub fn new(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("Failed to create repository root {path:?}"))?;
        }
        let path = path.canonicalize()?;
        let gitlet_path = path.join(GITLET_DIR);

        let staging = StagingArea::new(gitlet_path.join(STAGING_FILE).into_boxed_path());
        let database = Database::new(gitlet_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(gitlet_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            staging: Arc::new(Mutex::new(staging)),
            database,
            workspace,
            refs,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn gitlet_path(&self) -> PathBuf {
        self.path.join(GITLET_DIR)
    }

    pub fn is_initialized(&self) -> bool {
        self.refs.head_path().is_file()
    }

    pub fn ensure_initialized(&self) -> anyhow::Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(RepositoryError::NotInitialized.into())
        }
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn staging(&self) -> Arc<Mutex<StagingArea>> {
        self.staging.clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    /// Load a branch with its history rebuilt from the commit graph
    pub fn load_branch(&self, name: &BranchName) -> anyhow::Result<Branch> {
        let head = self
            .refs
            .read_branch(name)?
            .ok_or(RepositoryError::NoSuchBranch)?;
        let history = first_parent_chain(&self.database, &head)?;
        let is_active = self.refs.is_current_branch(name)?;

        Ok(Branch::new(name.clone(), head, history, is_active))
    }

    pub fn active_branch(&self) -> anyhow::Result<Branch> {
        self.load_branch(&self.refs.current_branch()?)
    }

    /// Id and content of the active branch's head commit
    pub fn head_commit(&self) -> anyhow::Result<(ObjectId, Commit)> {
        let head = self.refs.read_head()?;
        let commit = self
            .database
            .load_commit(&head)
            .with_context(|| format!("Failed to load head commit {head}"))?;

        Ok((head, commit))
    }

    /// Name of an existing branch; unknown or malformed names are `NoSuchBranch`
    pub fn existing_branch(&self, name: &str) -> anyhow::Result<BranchName> {
        let name = BranchName::try_parse(name).map_err(|_| RepositoryError::NoSuchBranch)?;

        if self.refs.branch_exists(&name) {
            Ok(name)
        } else {
            Err(RepositoryError::NoSuchBranch.into())
        }
    }

    /// Path relative to the repository root, as commits and staging record it
    pub fn relative_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        let path = path.strip_prefix(&self.path).unwrap_or(path);

        path.components()
            .filter(|component| !matches!(component, Component::CurDir))
            .collect()
    }

    /// Resolve a full or abbreviated commit id and load the commit
    pub fn resolve_commit(&self, prefix: &str) -> anyhow::Result<(ObjectId, Commit)> {
        let oid = self.database.resolve_commit(prefix)?;
        let commit = self.database.load_commit(&oid)?;

        Ok((oid, commit))
    }
}
