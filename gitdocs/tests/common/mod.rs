use std::collections::BTreeMap;
use std::path::Path;

use gitdocs::{DocStore, OpenOptions};

/// Create a bare origin repository under `dir` with one commit on `branch`.
///
/// The commit's tree contains exactly `files` (path → raw file content).
pub fn create_origin(dir: &Path, branch: &str, files: &[(&str, &str)]) -> git2::Repository {
    let origin = git2::Repository::init_bare(dir.join("origin.git")).unwrap();
    commit_files(&origin, branch, files);
    origin.set_head(&format!("refs/heads/{}", branch)).unwrap();
    origin
}

/// Commit a tree containing exactly `files` onto `branch`, creating the
/// branch if needed. Returns the new commit id.
pub fn commit_files(repo: &git2::Repository, branch: &str, files: &[(&str, &str)]) -> git2::Oid {
    let owned: Vec<(String, String)> = files
        .iter()
        .map(|(path, content)| (path.to_string(), content.to_string()))
        .collect();
    let tree_id = build_tree(repo, &owned);
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = git2::Signature::now("origin", "origin@test").unwrap();

    let refname = format!("refs/heads/{}", branch);
    let parents = match repo.find_reference(&refname) {
        Ok(reference) => vec![reference.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(Some(&refname), &sig, &sig, "seed", &tree, &parent_refs)
        .unwrap()
}

fn build_tree(repo: &git2::Repository, files: &[(String, String)]) -> git2::Oid {
    let mut builder = repo.treebuilder(None).unwrap();
    let mut subdirs: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();

    for (path, content) in files {
        match path.split_once('/') {
            Some((dir, rest)) => subdirs
                .entry(dir.to_string())
                .or_default()
                .push((rest.to_string(), content.clone())),
            None => {
                let oid = repo.blob(content.as_bytes()).unwrap();
                builder.insert(path, oid, 0o100644).unwrap();
            }
        }
    }

    for (dir, sub) in subdirs {
        let sub_id = build_tree(repo, &sub);
        builder.insert(&dir, sub_id, 0o040000).unwrap();
    }

    builder.write().unwrap()
}

/// Point `branch` at an existing commit, creating or moving the ref.
#[allow(dead_code)]
pub fn create_branch(repo: &git2::Repository, branch: &str, target: &str) {
    let oid = git2::Oid::from_str(target).unwrap();
    repo.reference(&format!("refs/heads/{}", branch), oid, true, "branch")
        .unwrap();
}

/// Current tip of `branch` in `repo`, as a hex string.
#[allow(dead_code)]
pub fn branch_tip(repo: &git2::Repository, branch: &str) -> String {
    repo.find_reference(&format!("refs/heads/{}", branch))
        .unwrap()
        .target()
        .unwrap()
        .to_string()
}

/// Open a store whose checkout lives next to the origin created by
/// [`create_origin`].
pub fn open_store(dir: &Path, branch: &str) -> DocStore {
    DocStore::open(
        dir.join("checkout"),
        OpenOptions {
            url: Some(dir.join("origin.git").to_str().unwrap().to_string()),
            branch: Some(branch.to_string()),
            ..Default::default()
        },
    )
    .unwrap()
}
