use crate::error::{Error, Result};

/// Normalize a store path: strip leading/trailing slashes, collapse repeated
/// slashes and `.` segments, reject `..`.
///
/// An empty result means the root of the tree.
///
/// # Errors
/// Returns [`Error::InvalidPath`] if the path contains a `..` segment.
pub fn normalize_path(path: &str) -> Result<String> {
    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => continue,
            ".." => {
                return Err(Error::invalid_path(format!(
                    "'..' is not allowed in {:?}",
                    path,
                )));
            }
            _ => segments.push(seg),
        }
    }
    Ok(segments.join("/"))
}

/// Join a (normalized) prefix and a relative path, either of which may be
/// empty.
pub fn join(prefix: &str, rest: &str) -> String {
    match (prefix.is_empty(), rest.is_empty()) {
        (true, _) => rest.to_string(),
        (_, true) => prefix.to_string(),
        _ => format!("{}/{}", prefix, rest),
    }
}

/// Validate a branch name destined for `refs/heads/<name>`.
///
/// Applies git's `check-ref-format` rules: no spaces, control characters,
/// `\`, `^`, `~`, `?`, `*`, `[`, or `:`; no `..` or `@{`; no trailing `.`
/// and no `.lock` suffix.
///
/// # Errors
/// Returns [`Error::InvalidRefName`] if the name violates any rule.
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_ref_name("branch name must not be empty"));
    }

    if let Some(ch) = name.chars().find(|ch| {
        matches!(*ch, ':' | ' ' | '\t' | '\n' | '\r' | '\\' | '^' | '~' | '?' | '*' | '[')
            || ch.is_control()
    }) {
        return Err(Error::invalid_ref_name(format!(
            "branch name contains invalid character: {:?}",
            ch,
        )));
    }

    if name.contains("..") {
        return Err(Error::invalid_ref_name("branch name must not contain '..'"));
    }

    if name.contains("@{") {
        return Err(Error::invalid_ref_name("branch name must not contain '@{'"));
    }

    if name.starts_with('/') || name.ends_with('/') || name.contains("//") {
        return Err(Error::invalid_ref_name(
            "branch name must not have empty path components",
        ));
    }

    if name.ends_with('.') {
        return Err(Error::invalid_ref_name("branch name must not end with '.'"));
    }

    if name.ends_with(".lock") {
        return Err(Error::invalid_ref_name(
            "branch name must not end with '.lock'",
        ));
    }

    Ok(())
}
