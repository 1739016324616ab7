//! A git-backed JSON document store.
//!
//! `gitdocs` exposes a version-controlled tree of JSON files as a document
//! store. A [`DocStore`] owns a checkout cloned from a remote; any branch
//! name or commit id resolves to an immutable [`Snapshot`] holding the
//! documents in nested and flat form, and writes replace a subtree of
//! documents atomically, merging with a possibly-diverged branch before a
//! verified push.
//!
//! # Key types
//!
//! - [`DocStore`] — opens (or clones) the checkout, serializes every
//!   operation behind a single gate, and caches the latest snapshot by
//!   commit id.
//! - [`Snapshot`] — immutable materialization of one commit's documents.
//!   `object(path)` walks the nested form; `files(prefix)` filters the
//!   flat form.
//! - [`WriteRequest`] — one atomic replacement of the documents under a
//!   path prefix, committed on a parent version and pushed to a branch.
//!
//! # Quick example
//!
//! ```rust,no_run
//! use gitdocs::{DocStore, OpenOptions, WriteRequest};
//!
//! let store = DocStore::open("/tmp/checkout", OpenOptions {
//!     url: Some("https://example.com/config.git".into()),
//!     ..Default::default()
//! }).unwrap();
//!
//! // Read
//! let snap = store.snapshot("main").unwrap();
//! let settings = snap.object("app/settings");
//!
//! // Write (returns the new commit id)
//! let commit = store.write(&WriteRequest {
//!     parent: "main".into(),
//!     update_branch: None,
//!     path: "app".into(),
//!     files: [("settings".into(), serde_json::json!({"debug": true}))]
//!         .into_iter()
//!         .collect(),
//! }).unwrap();
//! ```

pub mod document;
pub mod error;
mod lock;
pub mod paths;
pub mod snapshot;
pub mod store;
pub mod types;
mod write;

// Re-export primary public types at crate root.
pub use error::{Error, Result};
pub use snapshot::Snapshot;
pub use store::DocStore;
pub use types::{OpenOptions, Signature, WriteRequest};
