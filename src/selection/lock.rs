// Single-writer guard for a selection store
//
// `<store>.lock` is created exclusively and removed on drop. Readers
// (export, plain load) never take it.

use crate::error::{Result, SurfaceError};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Held while a merge mutates the store at `store_path`
#[derive(Debug)]
pub struct StoreLock {
    lock_path: PathBuf,
}

impl StoreLock {
    /// Take the lock, or fail with `StoreLocked` if another writer holds it
    pub fn acquire(store_path: &Path) -> Result<Self> {
        let lock_path = lock_path_for(store_path);
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SurfaceError::StoreIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(SurfaceError::StoreLocked(store_path.to_path_buf()));
            }
            Err(source) => {
                return Err(SurfaceError::StoreIo {
                    path: lock_path,
                    source,
                });
            }
        };

        // Owner pid, for humans clearing a stale lock
        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            debug!("Could not record owner in {}: {}", lock_path.display(), e);
        }

        debug!("Acquired {}", lock_path.display());
        Ok(Self { lock_path })
    }

    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.lock_path) {
            warn!("Failed to release {}: {}", self.lock_path.display(), e);
        }
    }
}

fn lock_path_for(store_path: &Path) -> PathBuf {
    let mut name = store_path.as_os_str().to_os_string();
    name.push(".lock");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_writer_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store_path = temp_dir.path().join(".apisurface/selections.yaml");

        let lock = StoreLock::acquire(&store_path).unwrap();
        assert!(lock.path().exists());

        let err = StoreLock::acquire(&store_path).unwrap_err();
        assert!(matches!(err, SurfaceError::StoreLocked(_)));

        drop(lock);
        assert!(!lock_path_for(&store_path).exists());
        assert!(StoreLock::acquire(&store_path).is_ok());
    }
}
