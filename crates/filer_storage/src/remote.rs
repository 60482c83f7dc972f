//! Remote store trait definition.

use crate::error::StorageResult;
use std::path::Path;
use uuid::Uuid;

/// A remote store for artifact payloads.
///
/// Remote stores are **opaque transports**. They copy bytes between a local
/// file and some durable location identified by an address string. The
/// address format belongs to the store; callers persist it verbatim and hand
/// it back for `download` and `delete`.
///
/// # Invariants
///
/// - `upload` never overwrites an existing remote object; each call returns a
///   new, unique address
/// - `download` writes exactly the bytes that were uploaded to that address
/// - `delete` of a missing object fails with `NotFound`
/// - No operation retries on failure
///
/// # Implementors
///
/// - [`super::DriveStore`] - Mirror directory
/// - [`super::ObjectStore`] - Bucket on an object service
pub trait RemoteStore: Send + Sync {
    /// Uploads the file at `local_path` under a fresh address derived from `name`.
    ///
    /// Returns the address of the new remote object.
    ///
    /// # Errors
    ///
    /// Returns an error if the local file cannot be read or the remote write fails.
    fn upload(&self, name: &str, local_path: &Path) -> StorageResult<String>;

    /// Downloads the object at `address` into `local_path`.
    ///
    /// An existing file at `local_path` is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No object exists at `address`
    /// - The address does not belong to this store
    /// - An I/O error occurs
    fn download(&self, address: &str, local_path: &Path) -> StorageResult<()>;

    /// Deletes the object at `address`.
    ///
    /// # Errors
    ///
    /// Returns an error if no object exists at `address` or the delete fails.
    fn delete(&self, address: &str) -> StorageResult<()>;

    /// Short backend label used in log output.
    fn kind(&self) -> &'static str;
}

impl<S: RemoteStore + ?Sized> RemoteStore for Box<S> {
    fn upload(&self, name: &str, local_path: &Path) -> StorageResult<String> {
        (**self).upload(name, local_path)
    }

    fn download(&self, address: &str, local_path: &Path) -> StorageResult<()> {
        (**self).download(address, local_path)
    }

    fn delete(&self, address: &str) -> StorageResult<()> {
        (**self).delete(address)
    }

    fn kind(&self) -> &'static str {
        (**self).kind()
    }
}

/// Builds the remote object name for an upload of `name`.
///
/// The result is `<name>_<uuid v4>`, unique across overwrite cycles of the
/// same artifact name.
#[must_use]
pub fn unique_object_name(name: &str) -> String {
    format!("{}_{}", name, Uuid::new_v4())
}
