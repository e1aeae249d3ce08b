//! Error taxonomy for the review pipeline.
//!
//! Fatal conditions live here; recovered conditions (rule parse
//! failures, unreadable files, bad anchors) are carried as data in the
//! result types instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RevetError {
    #[error("Change-set not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    Access(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Publish backend error: {0}")]
    Publish(String),
}

impl RevetError {
    /// Exit code reported by the binary for this error.
    ///
    /// 0 is reserved for a completed pipeline (any decision) and 2 for
    /// CLI usage errors, so fatal kinds start at 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            RevetError::Config(_) => 2,
            RevetError::NotFound(_) | RevetError::Access(_) => 3,
            RevetError::Git(_) | RevetError::Io(_) => 4,
            RevetError::Publish(_) => 5,
        }
    }

    /// A short remediation hint shown alongside fatal errors.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RevetError::NotFound(_) => {
                Some("check the change id; numeric ids resolve via refs/pull/<n>/head")
            }
            RevetError::Access(_) => {
                Some("check repository permissions and that --repo-root points inside a git repo")
            }
            RevetError::Publish(_) => Some("created/skipped counts up to the failure were reported"),
            _ => None,
        }
    }
}
