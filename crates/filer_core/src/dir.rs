//! Local directory management.
//!
//! This module handles the file system layout of a Filer directory:
//!
//! ```text
//! <local_dir>/
//! ├─ .filer.lock           # Advisory lock for single-writer
//! ├─ .drive_registry       # Registry for the drive backend
//! ├─ .s3_registry          # Registry for the object backend
//! ├─ <name>.flr            # Payloads
//! └─ .<name>.flr.partial   # Staging file while writing or downloading
//! ```
//!
//! The LOCK file ensures only one process mutates the directory at a time.

use crate::error::{FilerError, FilerResult};
use crate::record::validate_name;
use filer_codec::PAYLOAD_EXTENSION;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Lock file name within the local directory.
const LOCK_FILE: &str = ".filer.lock";

/// Suffix of staging files.
const STAGING_SUFFIX: &str = "partial";

/// Manages the payload directory and its lock.
///
/// # Thread Safety
///
/// A `LocalDir` holds an exclusive advisory lock on the directory. Only one
/// instance can exist per directory at a time, across processes.
#[derive(Debug)]
pub struct LocalDir {
    /// Root directory path.
    path: PathBuf,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl LocalDir {
    /// Opens an existing local directory and locks it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path does not exist or is not a directory (`InvalidConfiguration`)
    /// - Another process holds the lock (`Locked`)
    /// - I/O errors occur
    pub fn open(path: &Path) -> FilerResult<Self> {
        if !path.is_dir() {
            return Err(FilerError::invalid_configuration(format!(
                "local path is not a valid directory: {}",
                path.display()
            )));
        }

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(FilerError::Locked {
                path: path.to_path_buf(),
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Returns the path to the local directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the path of a registry file inside the directory.
    #[must_use]
    pub fn registry_path(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    /// Returns the payload path for an artifact name.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` if the name cannot be mapped to a file.
    pub fn payload_path(&self, name: &str) -> FilerResult<PathBuf> {
        validate_name(name)?;
        Ok(self.path.join(format!("{name}.{PAYLOAD_EXTENSION}")))
    }

    /// Returns the staging path used while a payload is being written.
    pub fn staging_path(&self, name: &str) -> FilerResult<PathBuf> {
        validate_name(name)?;
        Ok(self
            .path
            .join(format!(".{name}.{PAYLOAD_EXTENSION}.{STAGING_SUFFIX}")))
    }

    /// Returns true if the payload file for `name` exists.
    #[must_use]
    pub fn has_payload(&self, name: &str) -> bool {
        self.payload_path(name).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Reads a payload, returning `None` if the file does not exist.
    pub fn read_payload(&self, name: &str) -> FilerResult<Option<Vec<u8>>> {
        match fs::read(self.payload_path(name)?) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes a payload atomically.
    ///
    /// Uses the write-then-rename pattern so an interrupted write never
    /// leaves a truncated payload under the final name:
    /// 1. Write to the staging file
    /// 2. Sync the staging file to disk
    /// 3. Rename it over the payload path
    /// 4. Fsync the directory
    pub fn write_payload(&self, name: &str, bytes: &[u8]) -> FilerResult<()> {
        let staging = self.staging_path(name)?;
        let mut file = File::create(&staging)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);

        self.commit_staged(name)
    }

    /// Moves a fully written staging file into place.
    pub fn commit_staged(&self, name: &str) -> FilerResult<()> {
        fs::rename(self.staging_path(name)?, self.payload_path(name)?)?;
        sync_directory(&self.path)
    }

    /// Deletes a leftover staging file, if any.
    pub fn discard_staged(&self, name: &str) -> FilerResult<()> {
        match fs::remove_file(self.staging_path(name)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Deletes a payload file.
    ///
    /// Returns `true` if a file was removed, `false` if none existed.
    pub fn remove_payload(&self, name: &str) -> FilerResult<bool> {
        match fs::remove_file(self.payload_path(name)?) {
            Ok(()) => {
                sync_directory(&self.path)?;
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// Syncs a directory so that creates, renames and deletes inside it are durable.
///
/// On Windows, directory fsync is not supported in the same way as Unix;
/// NTFS journaling covers metadata durability, so the call is a no-op there.
#[cfg(unix)]
pub(crate) fn sync_directory(path: &Path) -> FilerResult<()> {
    File::open(path)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
pub(crate) fn sync_directory(_path: &Path) -> FilerResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_fails_if_missing() {
        let temp = tempdir().unwrap();
        let result = LocalDir::open(&temp.path().join("nope"));
        assert!(matches!(
            result,
            Err(FilerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn lock_prevents_second_open() {
        let temp = tempdir().unwrap();
        let _dir = LocalDir::open(temp.path()).unwrap();

        let result = LocalDir::open(temp.path());
        assert!(matches!(result, Err(FilerError::Locked { .. })));
    }

    #[test]
    fn lock_released_on_drop() {
        let temp = tempdir().unwrap();
        {
            let _dir = LocalDir::open(temp.path()).unwrap();
        }
        let _again = LocalDir::open(temp.path()).unwrap();
    }

    #[test]
    fn paths_are_correct() {
        let temp = tempdir().unwrap();
        let dir = LocalDir::open(temp.path()).unwrap();

        assert_eq!(dir.payload_path("m").unwrap(), temp.path().join("m.flr"));
        assert_eq!(
            dir.staging_path("m").unwrap(),
            temp.path().join(".m.flr.partial")
        );
        assert_eq!(
            dir.registry_path(".drive_registry"),
            temp.path().join(".drive_registry")
        );
    }

    #[test]
    fn payload_path_rejects_traversal() {
        let temp = tempdir().unwrap();
        let dir = LocalDir::open(temp.path()).unwrap();
        assert!(matches!(
            dir.payload_path("../escape"),
            Err(FilerError::InvalidName { .. })
        ));
    }

    #[test]
    fn write_read_remove() {
        let temp = tempdir().unwrap();
        let dir = LocalDir::open(temp.path()).unwrap();

        assert_eq!(dir.read_payload("m").unwrap(), None);
        dir.write_payload("m", b"bytes").unwrap();
        assert!(dir.has_payload("m"));
        assert!(!dir.staging_path("m").unwrap().exists());
        assert_eq!(dir.read_payload("m").unwrap(), Some(b"bytes".to_vec()));

        assert!(dir.remove_payload("m").unwrap());
        assert!(!dir.remove_payload("m").unwrap());
        assert!(!dir.has_payload("m"));
    }

    #[test]
    fn discard_staged_is_idempotent() {
        let temp = tempdir().unwrap();
        let dir = LocalDir::open(temp.path()).unwrap();

        fs::write(dir.staging_path("m").unwrap(), b"half").unwrap();
        dir.discard_staged("m").unwrap();
        dir.discard_staged("m").unwrap();
        assert!(!dir.staging_path("m").unwrap().exists());
    }
}
