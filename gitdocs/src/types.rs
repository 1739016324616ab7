use std::collections::BTreeMap;

use serde_json::Value;

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Author/committer identity used for every commit a store creates.
#[derive(Debug, Clone)]
pub struct Signature {
    pub name: String,
    pub email: String,
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            name: "gitdocs".into(),
            email: "gitdocs@localhost".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// OpenOptions
// ---------------------------------------------------------------------------

/// Options for opening a `DocStore`.
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// Remote URL to clone from when the checkout does not exist yet.
    pub url: Option<String>,
    /// Default branch name (defaults to `main`).
    pub branch: Option<String>,
    /// Commit author name.
    pub author: Option<String>,
    /// Commit author email.
    pub email: Option<String>,
}

// ---------------------------------------------------------------------------
// WriteRequest
// ---------------------------------------------------------------------------

/// One logical write: replace every document under `path` with `files`.
#[derive(Debug, Clone)]
pub struct WriteRequest {
    /// Version token naming the parent the write builds on.
    pub parent: String,
    /// Branch the result is pushed to; falls back to `parent` when absent.
    pub update_branch: Option<String>,
    /// Store path prefix whose document set is replaced.
    pub path: String,
    /// Replacement documents, keyed by store name relative to `path`.
    pub files: BTreeMap<String, Value>,
}
