//! Mirror-directory remote store.

use crate::error::{StorageError, StorageResult};
use crate::remote::{unique_object_name, RemoteStore};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// A remote store that mirrors payloads into a directory.
///
/// The directory is usually a synced folder (a network drive, a cloud drive
/// mount) shared between machines. Each upload copies the payload to
/// `<root>/<name>_<uuid>` and returns that path as the address.
///
/// # Addresses
///
/// Addresses are absolute filesystem paths under the canonical root.
/// `download` and `delete` only accept addresses that name a direct child of
/// the root, so a corrupted registry cannot make the store touch files
/// elsewhere. Both sides are compared after canonicalization, so any spelling
/// of the same directory is accepted.
///
/// # Example
///
/// ```no_run
/// use filer_storage::{DriveStore, RemoteStore};
/// use std::path::Path;
///
/// let store = DriveStore::open(Path::new("/mnt/drive/artifacts")).unwrap();
/// let address = store.upload("weights", Path::new("weights.flr")).unwrap();
/// store.download(&address, Path::new("weights.flr")).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct DriveStore {
    root: PathBuf,
}

impl DriveStore {
    /// Opens a drive store rooted at an existing directory.
    ///
    /// The root is canonicalized, so recorded addresses do not depend on the
    /// working directory or on how the root was spelled.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRoot` if `root` does not exist or is not a directory.
    pub fn open(root: &Path) -> StorageResult<Self> {
        let invalid = || StorageError::InvalidRoot {
            path: root.display().to_string(),
        };
        if !root.is_dir() {
            return Err(invalid());
        }
        let root = root.canonicalize().map_err(|_| invalid())?;

        Ok(Self { root })
    }

    /// Returns the canonical root directory of the mirror.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, address: &str) -> StorageResult<PathBuf> {
        let path = PathBuf::from(address);
        let file_name = match path.components().next_back() {
            Some(Component::Normal(name)) => name.to_owned(),
            _ => return Err(StorageError::invalid_address(address, "no object name")),
        };

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => return Err(StorageError::invalid_address(address, "no directory")),
        };
        // A parent that cannot be resolved holds no objects.
        let parent = parent
            .canonicalize()
            .map_err(|_| StorageError::not_found(address))?;
        if parent != self.root {
            return Err(StorageError::invalid_address(
                address,
                format!("not inside {}", self.root.display()),
            ));
        }

        Ok(self.root.join(file_name))
    }
}

impl RemoteStore for DriveStore {
    fn upload(&self, name: &str, local_path: &Path) -> StorageResult<String> {
        let target = self.root.join(unique_object_name(name));
        let address = target
            .to_str()
            .ok_or_else(|| StorageError::InvalidRoot {
                path: self.root.display().to_string(),
            })?
            .to_string();

        if let Err(err) = fs::copy(local_path, &target) {
            // Do not leave a truncated copy behind.
            let _ = fs::remove_file(&target);
            return Err(err.into());
        }

        debug!(name, %address, "copied payload to drive");
        Ok(address)
    }

    fn download(&self, address: &str, local_path: &Path) -> StorageResult<()> {
        let source = self.resolve(address)?;
        if !source.is_file() {
            return Err(StorageError::not_found(address));
        }

        fs::copy(&source, local_path)?;
        debug!(%address, path = %local_path.display(), "copied payload from drive");
        Ok(())
    }

    fn delete(&self, address: &str) -> StorageResult<()> {
        let target = self.resolve(address)?;
        if !target.is_file() {
            return Err(StorageError::not_found(address));
        }

        fs::remove_file(&target)?;
        debug!(%address, "deleted payload from drive");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "drive"
    }
}
