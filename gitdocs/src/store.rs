use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::{Error, Result};
use crate::lock;
use crate::snapshot::{self, Snapshot};
use crate::types::{OpenOptions, Signature, WriteRequest};
use crate::write;

/// Mutable state guarded by the store's gate: the checkout handle and the
/// single snapshot cache slot.
pub(crate) struct RepoState {
    pub(crate) repo: git2::Repository,
    pub(crate) cache: Option<Arc<Snapshot>>,
}

/// Internal state shared via `Arc`.
pub(crate) struct DocStoreInner {
    pub(crate) state: Mutex<RepoState>,
    pub(crate) path: PathBuf,
    pub(crate) branch: String,
    pub(crate) signature: Signature,
    /// Cross-process checkout lock, held until the store drops.
    _lock: std::fs::File,
}

/// A JSON document store backed by a git checkout cloned from a remote.
///
/// Cheap to clone (`Arc` internally). Every operation fetches from the
/// remote first, so reads always reflect current remote state, and all
/// operations on one store are serialized behind a single gate.
#[derive(Clone)]
pub struct DocStore {
    pub(crate) inner: Arc<DocStoreInner>,
}

impl DocStore {
    /// Open the checkout at `path`, cloning it from `options.url` if it does
    /// not exist yet.
    pub fn open(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let signature = Signature {
            name: options.author.unwrap_or_else(|| "gitdocs".into()),
            email: options.email.unwrap_or_else(|| "gitdocs@localhost".into()),
        };
        let branch = options.branch.unwrap_or_else(|| "main".into());

        let repo = if path.join(".git").exists() {
            git2::Repository::open(&path).map_err(Error::git)?
        } else {
            let url = options.url.as_deref().ok_or_else(|| {
                Error::invalid_path(format!(
                    "no checkout at {} and no remote url to clone from",
                    path.display()
                ))
            })?;
            git2::build::RepoBuilder::new()
                .branch(&branch)
                .clone(url, &path)
                .map_err(|e| Error::remote_unavailable(e.message()))?
        };

        let lock_file = lock::acquire_checkout_lock(repo.path())?;

        Ok(DocStore {
            inner: Arc::new(DocStoreInner {
                state: Mutex::new(RepoState { repo, cache: None }),
                path,
                branch,
                signature,
                _lock: lock_file,
            }),
        })
    }

    /// Acquire the gate and run `f` with exclusive access to the checkout.
    ///
    /// The guard drops on every exit path, so a failing operation never
    /// blocks the ones queued behind it.
    fn with_state<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut RepoState) -> Result<T>,
    {
        let mut state = self
            .inner
            .state
            .lock()
            .map_err(|e| Error::git_msg(e.to_string()))?;
        f(&mut state)
    }

    /// Path of the checkout on disk.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// The default branch served by [`DocStore::latest`].
    pub fn default_branch(&self) -> &str {
        &self.inner.branch
    }

    /// The identity used for commits created by this store.
    pub fn signature(&self) -> &Signature {
        &self.inner.signature
    }

    /// Commit id at the tip of the default branch, after fetching.
    pub fn latest(&self) -> Result<String> {
        let branch = self.inner.branch.clone();
        self.with_state(|state| {
            fetch_origin(&state.repo)?;
            let commit = resolve_commit(&state.repo, &branch)?
                .ok_or_else(|| Error::version_not_found(&branch))?;
            Ok(commit.id().to_string())
        })
    }

    /// Resolve `token` and return the snapshot of the commit it names.
    ///
    /// Serves the cached snapshot when the resolved commit is unchanged;
    /// otherwise rebuilds and replaces the cache. A failed rebuild leaves
    /// the previous cache entry intact.
    pub fn snapshot(&self, token: &str) -> Result<Arc<Snapshot>> {
        self.with_state(|state| {
            let RepoState { repo, cache } = state;
            fetch_origin(repo)?;
            let commit =
                resolve_commit(repo, token)?.ok_or_else(|| Error::version_not_found(token))?;
            ensure_snapshot(repo, cache, &commit)
        })
    }

    /// The nested value at `path` for the version named by `token`.
    pub fn get_object(&self, token: &str, path: &str) -> Result<Option<Value>> {
        Ok(self.snapshot(token)?.object(path).cloned())
    }

    /// The flat-map entries under `prefix` for the version named by `token`.
    pub fn get_files(&self, token: &str, prefix: &str) -> Result<BTreeMap<String, Value>> {
        Ok(self.snapshot(token)?.files(prefix))
    }

    /// Apply one logical write and return the resulting commit id.
    ///
    /// See [`WriteRequest`]: the documents under `request.path` are replaced
    /// with `request.files` on top of the resolved parent, reconciled with
    /// the update branch, pushed, and verified.
    pub fn write(&self, request: &WriteRequest) -> Result<String> {
        let signature = self.inner.signature.clone();
        self.with_state(|state| write::run(&state.repo, &signature, request))
    }
}

// ---------------------------------------------------------------------------
// Version resolution
// ---------------------------------------------------------------------------

/// Fetch all branches from `origin` so resolution sees current remote state.
pub(crate) fn fetch_origin(repo: &git2::Repository) -> Result<()> {
    let mut remote = repo
        .find_remote("origin")
        .map_err(|e| Error::remote_unavailable(format!("no 'origin' remote: {}", e.message())))?;
    let mut options = git2::FetchOptions::new();
    options.prune(git2::FetchPrune::On);
    remote
        .fetch(
            &["+refs/heads/*:refs/remotes/origin/*"],
            Some(&mut options),
            None,
        )
        .map_err(|e| Error::remote_unavailable(e.message()))?;
    Ok(())
}

/// Resolve a version token to a commit: remote branch first, then raw
/// commit id. `None` when the token matches neither.
pub(crate) fn resolve_commit<'r>(
    repo: &'r git2::Repository,
    token: &str,
) -> Result<Option<git2::Commit<'r>>> {
    let tracking = format!("origin/{}", token);
    if let Ok(branch) = repo.find_branch(&tracking, git2::BranchType::Remote) {
        let commit = branch.get().peel_to_commit().map_err(Error::git)?;
        return Ok(Some(commit));
    }

    if let Ok(oid) = git2::Oid::from_str(token) {
        if let Ok(commit) = repo.find_commit(oid) {
            return Ok(Some(commit));
        }
    }

    Ok(None)
}

/// Return the cached snapshot if it matches `commit`, otherwise rebuild and
/// replace the cache slot wholesale.
fn ensure_snapshot(
    repo: &git2::Repository,
    cache: &mut Option<Arc<Snapshot>>,
    commit: &git2::Commit,
) -> Result<Arc<Snapshot>> {
    let id = commit.id().to_string();
    if let Some(snap) = cache.as_ref() {
        if snap.commit_id() == id {
            return Ok(Arc::clone(snap));
        }
    }
    let snap = Arc::new(snapshot::build(repo, commit)?);
    *cache = Some(Arc::clone(&snap));
    Ok(snap)
}
