use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::document;
use crate::error::{Error, Result};
use crate::paths;

/// The documents of one commit, materialized in two forms: a nested object
/// mirroring the directory structure, and a flat path-indexed map.
///
/// A snapshot is immutable and valid only for the exact commit it was built
/// from. Both forms are derived together, so every flat entry appears at the
/// corresponding nested path and vice versa.
#[derive(Debug, Clone)]
pub struct Snapshot {
    commit_id: String,
    nested: Value,
    files: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Hex id of the commit this snapshot was built from.
    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }

    /// The whole nested object.
    pub fn nested(&self) -> &Value {
        &self.nested
    }

    /// The whole flat map.
    pub fn flat(&self) -> &BTreeMap<String, Value> {
        &self.files
    }

    /// The nested value at `path`, or `None` if absent.
    ///
    /// An empty path returns the whole nested object. Absence is not an
    /// error; callers decide how to report it.
    pub fn object(&self, path: &str) -> Option<&Value> {
        let mut cursor = &self.nested;
        for seg in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            cursor = cursor.as_object()?.get(seg)?;
        }
        Some(cursor)
    }

    /// The flat-map entries under `prefix`, keyed by full path.
    ///
    /// An empty prefix returns the entire flat map. A prefix that exactly
    /// names a document returns an empty map (a file has no children).
    pub fn files(&self, prefix: &str) -> BTreeMap<String, Value> {
        let norm: Vec<&str> = prefix
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        if norm.is_empty() {
            return self.files.clone();
        }
        let norm = norm.join("/");
        if self.files.contains_key(&norm) {
            return BTreeMap::new();
        }
        let dir = format!("{}/", norm);
        self.files
            .iter()
            .filter(|(path, _)| path.starts_with(&dir))
            .map(|(path, doc)| (path.clone(), doc.clone()))
            .collect()
    }
}

/// Build a [`Snapshot`] from a commit by walking its whole tree.
///
/// Only blob entries with the document extension are read; everything else
/// is skipped. A parse failure aborts the build, as does a store path that
/// is claimed by both a document and a directory level.
pub(crate) fn build(repo: &git2::Repository, commit: &git2::Commit) -> Result<Snapshot> {
    let tree = commit.tree().map_err(Error::git)?;
    let mut files = BTreeMap::new();
    let mut nested = Value::Object(Map::new());
    walk_tree(repo, &tree, "", &mut files, &mut nested)?;
    Ok(Snapshot {
        commit_id: commit.id().to_string(),
        nested,
        files,
    })
}

fn walk_tree(
    repo: &git2::Repository,
    tree: &git2::Tree,
    prefix: &str,
    files: &mut BTreeMap<String, Value>,
    nested: &mut Value,
) -> Result<()> {
    for entry in tree.iter() {
        let name = match entry.name() {
            Some(name) => name,
            None => return Err(Error::invalid_path("tree entry name is not UTF-8")),
        };
        match entry.kind() {
            Some(git2::ObjectType::Tree) => {
                let subtree = repo.find_tree(entry.id()).map_err(Error::git)?;
                let sub_prefix = paths::join(prefix, name);
                walk_tree(repo, &subtree, &sub_prefix, files, nested)?;
            }
            Some(git2::ObjectType::Blob) => {
                let stem = match document::document_stem(name) {
                    Some(stem) => stem,
                    None => continue,
                };
                let blob = repo.find_blob(entry.id()).map_err(Error::git)?;
                let path = paths::join(prefix, stem);
                let doc = document::parse(blob.content())
                    .map_err(|e| Error::malformed_document(paths::join(prefix, name), e))?;
                insert_nested(nested, files, &path, doc.clone())?;
                files.insert(path, doc);
            }
            _ => {}
        }
    }
    Ok(())
}

/// Insert `doc` at `path` in the nested object, creating intermediate object
/// levels. A level that is already occupied by a document, or a leaf that is
/// already occupied at all, is a [`Error::PathConflict`].
fn insert_nested(
    nested: &mut Value,
    files: &BTreeMap<String, Value>,
    path: &str,
    doc: Value,
) -> Result<()> {
    let segments: Vec<&str> = path.split('/').collect();
    let (leaf, dirs) = match segments.split_last() {
        Some(parts) => parts,
        None => return Err(Error::invalid_path(path)),
    };

    let mut cursor = &mut *nested;
    let mut walked = String::new();
    for seg in dirs {
        if !walked.is_empty() {
            walked.push('/');
        }
        walked.push_str(seg);
        if files.contains_key(&walked) {
            return Err(Error::path_conflict(walked));
        }
        let map = match cursor.as_object_mut() {
            Some(map) => map,
            None => return Err(Error::path_conflict(walked)),
        };
        cursor = map
            .entry(seg.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let map = match cursor.as_object_mut() {
        Some(map) => map,
        None => return Err(Error::path_conflict(path.to_string())),
    };
    if files.contains_key(path) || map.contains_key(*leaf) {
        return Err(Error::path_conflict(path.to_string()));
    }
    map.insert(leaf.to_string(), doc);
    Ok(())
}
