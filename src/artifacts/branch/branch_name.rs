use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::RepositoryError;
use anyhow::Context;
use std::path::PathBuf;

/// Prefix of the symbolic reference stored in HEAD
pub const REF_PREFIX: &str = "refs/heads/";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> anyhow::Result<Self> {
        let name = name.into();

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .with_context(|| format!("invalid branch name regex: {INVALID_BRANCH_NAME_REGEX}"))?;

        if name.is_empty() || re.is_match(&name) {
            Err(RepositoryError::InvalidBranchName(name).into())
        } else {
            Ok(Self(name))
        }
    }

    /// Parse the branch out of a `refs/heads/<name>` reference
    pub fn try_parse_ref(sym_ref: &str) -> anyhow::Result<Self> {
        let name = sym_ref
            .strip_prefix(REF_PREFIX)
            .with_context(|| format!("symbolic ref must start with '{REF_PREFIX}', got '{sym_ref}'"))?;

        Self::try_parse(name)
    }

    /// `refs/heads/<name>`, the form written into HEAD
    pub fn to_ref(&self) -> String {
        format!("{REF_PREFIX}{}", self.0)
    }

    /// Location of the branch file relative to the metadata directory
    pub fn to_ref_path(&self) -> PathBuf {
        PathBuf::from(self.to_ref())
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
