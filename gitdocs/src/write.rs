use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::document;
use crate::error::{Error, Result};
use crate::paths;
use crate::store;
use crate::types::{Signature, WriteRequest};

/// Run one logical write against the checkout. Caller holds the gate.
///
/// Pipeline: resolve parent and update branch, reset the checkout to the
/// parent, replace the documents under the target prefix, commit, reconcile
/// with the update branch (ancestry check, merge if diverged), push and
/// verify. Any failure aborts the pipeline; the remote branch pointer is
/// only advanced by a verified push.
pub(crate) fn run(
    repo: &git2::Repository,
    signature: &Signature,
    request: &WriteRequest,
) -> Result<String> {
    let prefix = paths::normalize_path(&request.path)?;
    let branch = request.update_branch.as_deref().unwrap_or(&request.parent);
    paths::validate_branch_name(branch)?;

    store::fetch_origin(repo)?;
    let parent = store::resolve_commit(repo, &request.parent)?
        .ok_or_else(|| Error::version_not_found(&request.parent))?;
    let update = store::resolve_commit(repo, branch)?
        .ok_or_else(|| Error::update_branch_not_found(branch))?;

    reset_to(repo, &parent)?;
    clear_documents(repo, &prefix)?;
    apply_files(repo, &prefix, &request.files)?;
    let tree_id = stage_all(repo)?;

    let author = git2::Signature::now(&signature.name, &signature.email).map_err(Error::git)?;
    let tree = repo.find_tree(tree_id).map_err(Error::git)?;
    let message = format!(
        "update {}",
        if prefix.is_empty() { "/" } else { prefix.as_str() }
    );
    let new_id = repo
        .commit(None, &author, &author, &message, &tree, &[&parent])
        .map_err(Error::git)?;
    let new_commit = repo.find_commit(new_id).map_err(Error::git)?;

    let result_id = reconcile(repo, &author, branch, &new_commit, &update)?;

    push_verified(repo, branch, result_id)
}

/// Detach HEAD at `commit` and force-checkout its tree, removing untracked
/// and ignored files, then sync the index to the same tree.
fn reset_to(repo: &git2::Repository, commit: &git2::Commit) -> Result<()> {
    repo.set_head_detached(commit.id()).map_err(Error::git)?;

    let mut checkout = git2::build::CheckoutBuilder::new();
    checkout
        .force()
        .remove_untracked(true)
        .remove_ignored(true);
    repo.checkout_head(Some(&mut checkout)).map_err(Error::git)?;

    let tree = commit.tree().map_err(Error::git)?;
    let mut index = repo.index().map_err(Error::git)?;
    index.read_tree(&tree).map_err(Error::git)?;
    index.write().map_err(Error::git)?;
    Ok(())
}

/// Delete every document file under `prefix` in the working tree.
fn clear_documents(repo: &git2::Repository, prefix: &str) -> Result<()> {
    let workdir = require_workdir(repo)?;
    let root = if prefix.is_empty() {
        workdir.to_path_buf()
    } else {
        workdir.join(prefix)
    };
    if !root.is_dir() {
        return Ok(());
    }
    remove_documents_under(&root)
}

fn remove_documents_under(dir: &Path) -> Result<()> {
    for entry in std::fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        if file_type.is_dir() {
            if entry.file_name() == ".git" {
                continue;
            }
            remove_documents_under(&path)?;
        } else if entry
            .file_name()
            .to_str()
            .is_some_and(document::is_document_name)
        {
            std::fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
        }
    }
    Ok(())
}

/// Serialize each document of `files` to its file under `prefix`.
fn apply_files(
    repo: &git2::Repository,
    prefix: &str,
    files: &BTreeMap<String, Value>,
) -> Result<()> {
    let workdir = require_workdir(repo)?;
    for (name, doc) in files {
        let rel = paths::normalize_path(name)?;
        if rel.is_empty() {
            return Err(Error::invalid_path("document name must not be empty"));
        }
        let store_path = paths::join(prefix, &rel);

        let mut disk: PathBuf = workdir.to_path_buf();
        if !prefix.is_empty() {
            disk.push(prefix);
        }
        let mut segments = rel.split('/').peekable();
        while let Some(seg) = segments.next() {
            if segments.peek().is_some() {
                disk.push(seg);
            } else {
                disk.push(document::file_name(seg));
            }
        }

        if let Some(parent) = disk.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let bytes =
            document::serialize(doc).map_err(|e| Error::malformed_document(&store_path, e))?;
        std::fs::write(&disk, bytes).map_err(|e| Error::io(&disk, e))?;
    }
    Ok(())
}

/// Stage every change in the working tree (including deletions) and write
/// the resulting tree object.
fn stage_all(repo: &git2::Repository) -> Result<git2::Oid> {
    let mut index = repo.index().map_err(Error::git)?;
    index
        .add_all(["*"], git2::IndexAddOption::DEFAULT, None)
        .map_err(Error::git)?;
    index.update_all(["*"], None).map_err(Error::git)?;
    index.write().map_err(Error::git)?;
    index.write_tree().map_err(Error::git)
}

/// Decide whether `new_commit` already contains the update branch's history.
/// If not, merge the two; a conflicted merge fails the whole write.
fn reconcile(
    repo: &git2::Repository,
    author: &git2::Signature,
    branch: &str,
    new_commit: &git2::Commit,
    update: &git2::Commit,
) -> Result<git2::Oid> {
    if update.id() == new_commit.id()
        || repo
            .graph_descendant_of(new_commit.id(), update.id())
            .map_err(Error::git)?
    {
        return Ok(new_commit.id());
    }

    let mut merged = repo
        .merge_commits(new_commit, update, Some(&git2::MergeOptions::new()))
        .map_err(Error::git)?;
    if merged.has_conflicts() {
        return Err(Error::merge_conflict(format!(
            "update branch {} has conflicting changes",
            branch
        )));
    }

    let tree_id = merged.write_tree_to(repo).map_err(Error::git)?;
    let tree = repo.find_tree(tree_id).map_err(Error::git)?;
    let message = format!("merge {}", branch);
    repo.commit(None, author, author, &message, &tree, &[new_commit, update])
        .map_err(Error::git)
}

/// Push `result` to the update branch on the remote and verify it landed.
///
/// The push return value is not trusted: after pushing, re-fetch and compare
/// the remote-tracking ref against the pushed id.
fn push_verified(repo: &git2::Repository, branch: &str, result: git2::Oid) -> Result<String> {
    let refname = format!("refs/heads/{}", branch);
    repo.reference(&refname, result, true, &format!("push {}", branch))
        .map_err(Error::git)?;

    let mut remote = repo
        .find_remote("origin")
        .map_err(|e| Error::remote_unavailable(format!("no 'origin' remote: {}", e.message())))?;
    let refspec = format!("{}:{}", refname, refname);
    remote
        .push(&[refspec.as_str()], Some(&mut git2::PushOptions::new()))
        .map_err(|e| Error::remote_unavailable(e.message()))?;
    drop(remote);

    store::fetch_origin(repo)?;
    let tracking = format!("refs/remotes/origin/{}", branch);
    let actual = repo
        .find_reference(&tracking)
        .ok()
        .and_then(|reference| reference.target());
    match actual {
        Some(oid) if oid == result => Ok(result.to_string()),
        other => Err(Error::PushVerificationFailed {
            branch: branch.to_string(),
            expected: result.to_string(),
            actual: other
                .map(|oid| oid.to_string())
                .unwrap_or_else(|| "missing".into()),
        }),
    }
}

fn require_workdir(repo: &git2::Repository) -> Result<&Path> {
    repo.workdir()
        .ok_or_else(|| Error::git_msg("repository has no working directory"))
}
