use std::path::PathBuf;

/// All errors produced by gitdocs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("version not found: {0}")]
    VersionNotFound(String),

    #[error("update branch not found: {0}")]
    UpdateBranchNotFound(String),

    #[error("remote unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("malformed document at {path}: {reason}")]
    MalformedDocument { path: String, reason: String },

    #[error("path conflict: {0}")]
    PathConflict(String),

    #[error("merge conflict: {0}")]
    MergeConflict(String),

    #[error("push verification failed for {branch}: remote is at {actual}, expected {expected}")]
    PushVerificationFailed {
        branch: String,
        expected: String,
        actual: String,
    },

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("invalid ref name: {0}")]
    InvalidRefName(String),

    #[error("store is locked: {0}")]
    StoreLocked(String),

    #[error("git error: {0}")]
    Git(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

impl Error {
    pub fn version_not_found(token: impl Into<String>) -> Self {
        Self::VersionNotFound(token.into())
    }

    pub fn update_branch_not_found(branch: impl Into<String>) -> Self {
        Self::UpdateBranchNotFound(branch.into())
    }

    pub fn remote_unavailable(msg: impl Into<String>) -> Self {
        Self::RemoteUnavailable(msg.into())
    }

    pub fn malformed_document(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn path_conflict(path: impl Into<String>) -> Self {
        Self::PathConflict(path.into())
    }

    pub fn merge_conflict(msg: impl Into<String>) -> Self {
        Self::MergeConflict(msg.into())
    }

    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }

    pub fn invalid_ref_name(name: impl Into<String>) -> Self {
        Self::InvalidRefName(name.into())
    }

    pub fn store_locked(msg: impl Into<String>) -> Self {
        Self::StoreLocked(msg.into())
    }

    pub fn git(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Git(Box::new(err))
    }

    pub fn git_msg(msg: impl Into<String>) -> Self {
        Self::Git(msg.into().into())
    }

    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io(std::io::Error::new(
            err.kind(),
            format!("{}: {}", path.into().display(), err),
        ))
    }
}
