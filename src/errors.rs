//! Recoverable repository errors
//!
//! Every variant describes a precondition that failed before any state was
//! mutated. The binary prints the message as a single line and exits cleanly;
//! anything that is not a `RepositoryError` (I/O failures, corrupt objects) is
//! treated as fatal.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Not in an initialized Gitlet directory.")]
    NotInitialized,

    #[error("Please enter a commit message.")]
    EmptyMessage,

    #[error("No changes added to the commit.")]
    NothingToCommit,

    #[error("File does not exist.")]
    FileDoesNotExist,

    #[error("No reason to remove the file.")]
    NoReasonToRemove,

    #[error("You have uncommitted changes.")]
    DirtyStagingArea,

    #[error("Cannot merge a branch with itself.")]
    SelfMerge,

    #[error("Given branch is an ancestor of the current branch.")]
    AlreadyAncestor,

    #[error("Cannot remove the current branch.")]
    CannotDeleteActive,

    #[error("A branch with that name already exists.")]
    BranchExists,

    #[error("A branch with that name does not exist.")]
    NoSuchBranch,

    #[error("Invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("File does not exist in that commit.")]
    FileNotInCommit,

    #[error("No commit with that id exists.")]
    NoSuchCommit,

    #[error("Ambiguous commit id prefix: {0}")]
    AmbiguousId(String),

    #[error("Found no commit with that message.")]
    NoCommitWithMessage,

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFileConflict(Vec<PathBuf>),

    #[error("Incorrect operands.")]
    IncorrectOperands,
}

impl RepositoryError {
    /// Find a `RepositoryError` anywhere in an `anyhow` error chain
    pub fn find_in(error: &anyhow::Error) -> Option<&RepositoryError> {
        error
            .chain()
            .find_map(|cause| cause.downcast_ref::<RepositoryError>())
    }
}
