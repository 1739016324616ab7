mod common;

use gitdocs::Error;

// ---------------------------------------------------------------------------
// Token resolution
// ---------------------------------------------------------------------------

#[test]
fn branch_token_resolves_to_tip() {
    let dir = tempfile::tempdir().unwrap();
    let origin = common::create_origin(dir.path(), "main", &[("a.json", "{}")]);
    let store = common::open_store(dir.path(), "main");

    let snap = store.snapshot("main").unwrap();
    assert_eq!(snap.commit_id(), common::branch_tip(&origin, "main"));
}

#[test]
fn commit_id_token_resolves_directly() {
    let dir = tempfile::tempdir().unwrap();
    let origin = common::create_origin(dir.path(), "main", &[("a.json", "{}")]);
    let store = common::open_store(dir.path(), "main");
    let tip = common::branch_tip(&origin, "main");

    let snap = store.snapshot(&tip).unwrap();
    assert_eq!(snap.commit_id(), tip);
}

#[test]
fn unknown_token_is_version_not_found() {
    let dir = tempfile::tempdir().unwrap();
    common::create_origin(dir.path(), "main", &[("a.json", "{}")]);
    let store = common::open_store(dir.path(), "main");

    let err = store.snapshot("no-such-version").unwrap_err();
    assert!(matches!(err, Error::VersionNotFound(t) if t == "no-such-version"));
}

#[test]
fn secondary_branch_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let origin = common::create_origin(dir.path(), "main", &[("a.json", "1")]);
    common::commit_files(&origin, "dev", &[("a.json", "2")]);
    let store = common::open_store(dir.path(), "main");

    let snap = store.snapshot("dev").unwrap();
    assert_eq!(snap.commit_id(), common::branch_tip(&origin, "dev"));
}

// ---------------------------------------------------------------------------
// Fetch-before-resolve
// ---------------------------------------------------------------------------

#[test]
fn resolution_sees_remote_updates() {
    let dir = tempfile::tempdir().unwrap();
    let origin = common::create_origin(dir.path(), "main", &[("a.json", "1")]);
    let store = common::open_store(dir.path(), "main");

    // Advance the remote after the clone; the next read must see it.
    let new_tip = common::commit_files(&origin, "main", &[("a.json", "2")]);
    let snap = store.snapshot("main").unwrap();
    assert_eq!(snap.commit_id(), new_tip.to_string());
}

#[test]
fn branch_created_after_clone_resolves() {
    let dir = tempfile::tempdir().unwrap();
    let origin = common::create_origin(dir.path(), "main", &[("a.json", "1")]);
    let store = common::open_store(dir.path(), "main");

    let tip = common::commit_files(&origin, "later", &[("b.json", "2")]);
    let snap = store.snapshot("later").unwrap();
    assert_eq!(snap.commit_id(), tip.to_string());
}

// ---------------------------------------------------------------------------
// latest
// ---------------------------------------------------------------------------

#[test]
fn latest_is_default_branch_tip() {
    let dir = tempfile::tempdir().unwrap();
    let origin = common::create_origin(dir.path(), "main", &[("a.json", "{}")]);
    let store = common::open_store(dir.path(), "main");

    assert_eq!(store.latest().unwrap(), common::branch_tip(&origin, "main"));

    let new_tip = common::commit_files(&origin, "main", &[("a.json", "2")]);
    assert_eq!(store.latest().unwrap(), new_tip.to_string());
}

#[test]
fn latest_follows_configured_branch() {
    let dir = tempfile::tempdir().unwrap();
    let origin = common::create_origin(dir.path(), "trunk", &[("a.json", "{}")]);
    let store = common::open_store(dir.path(), "trunk");

    assert_eq!(store.latest().unwrap(), common::branch_tip(&origin, "trunk"));
}
