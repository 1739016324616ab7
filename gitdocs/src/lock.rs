use std::fs::{File, OpenOptions};
use std::path::Path;

use fs2::FileExt;

use crate::error::{Error, Result};

/// Acquire the advisory file lock guarding a checkout.
///
/// Creates `<gitdir>/gitdocs.lock` and takes an exclusive `fs2` lock on it.
/// The lock is held until the returned handle drops, so a second process
/// opening the same checkout fails immediately rather than queueing.
///
/// # Errors
/// Returns [`Error::StoreLocked`] if another process holds the lock.
pub(crate) fn acquire_checkout_lock(gitdir: &Path) -> Result<File> {
    let lock_path = gitdir.join("gitdocs.lock");
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .open(&lock_path)
        .map_err(|e| Error::io(&lock_path, e))?;
    file.try_lock_exclusive()
        .map_err(|_| Error::store_locked(lock_path.display().to_string()))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_fails_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let held = acquire_checkout_lock(dir.path()).unwrap();
        assert!(matches!(
            acquire_checkout_lock(dir.path()),
            Err(Error::StoreLocked(_))
        ));
        drop(held);
        assert!(acquire_checkout_lock(dir.path()).is_ok());
    }
}
