//! Object-service remote store.
//!
//! [`ObjectStore`] maps the remote store contract onto a bucket of an
//! S3-style object service. The service itself is reached through the
//! [`ObjectClient`] trait so the store stays independent of any particular
//! SDK; an SDK-backed client only has to provide put, get and delete.

use crate::error::{StorageError, StorageResult};
use crate::remote::{unique_object_name, RemoteStore};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Minimal client for an S3-style object service.
///
/// Implement this trait to plug in a real SDK. Keys are opaque strings
/// and may contain `/`.
pub trait ObjectClient: Send + Sync {
    /// Writes `body` to `key` in `bucket`, replacing any existing object.
    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> StorageResult<()>;

    /// Reads the object at `key` in `bucket`.
    ///
    /// Returns `NotFound` if there is no such object.
    fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// Deletes the object at `key` in `bucket`.
    ///
    /// Returns `NotFound` if there is no such object.
    fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()>;

    /// Returns whether `bucket` exists and is reachable.
    fn bucket_exists(&self, bucket: &str) -> StorageResult<bool>;
}

impl<C: ObjectClient + ?Sized> ObjectClient for Arc<C> {
    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> StorageResult<()> {
        (**self).put_object(bucket, key, body)
    }

    fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        (**self).get_object(bucket, key)
    }

    fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        (**self).delete_object(bucket, key)
    }

    fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        (**self).bucket_exists(bucket)
    }
}

/// A remote store backed by a fixed bucket on an object service.
///
/// Each upload writes the payload to the key `<prefix><name>_<uuid>` and
/// returns that key as the address.
#[derive(Debug)]
pub struct ObjectStore<C: ObjectClient> {
    client: C,
    bucket: String,
    prefix: String,
}

impl<C: ObjectClient> ObjectStore<C> {
    /// Creates a store over `bucket`, writing keys under `prefix`.
    ///
    /// # Errors
    ///
    /// Returns `BucketNotFound` if the client reports that the bucket does
    /// not exist, or the client's error if the check itself fails.
    pub fn new(client: C, bucket: impl Into<String>, prefix: impl Into<String>) -> StorageResult<Self> {
        let bucket = bucket.into();
        if bucket.is_empty() || !client.bucket_exists(&bucket)? {
            return Err(StorageError::BucketNotFound { bucket });
        }

        Ok(Self {
            client,
            bucket,
            prefix: prefix.into(),
        })
    }

    /// Returns the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the underlying client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: ObjectClient> RemoteStore for ObjectStore<C> {
    fn upload(&self, name: &str, local_path: &Path) -> StorageResult<String> {
        let key = format!("{}{}", self.prefix, unique_object_name(name));
        let body = fs::read(local_path)?;
        let len = body.len();

        self.client.put_object(&self.bucket, &key, body)?;
        debug!(bucket = %self.bucket, %key, len, "uploaded payload");
        Ok(key)
    }

    fn download(&self, address: &str, local_path: &Path) -> StorageResult<()> {
        let body = self.client.get_object(&self.bucket, address)?;
        fs::write(local_path, &body)?;
        debug!(bucket = %self.bucket, key = %address, len = body.len(), "downloaded payload");
        Ok(())
    }

    fn delete(&self, address: &str) -> StorageResult<()> {
        self.client.delete_object(&self.bucket, address)?;
        debug!(bucket = %self.bucket, key = %address, "deleted payload");
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "object"
    }
}

/// An object client that keeps buckets as directories on disk.
///
/// Layout:
///
/// ```text
/// <root>/
/// └─ <bucket>/
///    └─ <key>        # keys containing `/` become nested paths
/// ```
///
/// Useful for offline development and for exercising the object backend
/// without network access.
#[derive(Debug, Clone)]
pub struct DirObjectClient {
    root: PathBuf,
}

impl DirObjectClient {
    /// Creates a client over an existing root directory.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRoot` if `root` is not a directory.
    pub fn open(root: &Path) -> StorageResult<Self> {
        if !root.is_dir() {
            return Err(StorageError::InvalidRoot {
                path: root.display().to_string(),
            });
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Creates a bucket directory if it does not exist.
    pub fn create_bucket(&self, bucket: &str) -> StorageResult<()> {
        let dir = self.bucket_dir(bucket)?;
        fs::create_dir_all(dir)?;
        Ok(())
    }

    fn bucket_dir(&self, bucket: &str) -> StorageResult<PathBuf> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == "." || bucket == ".." {
            return Err(StorageError::BucketNotFound {
                bucket: bucket.to_string(),
            });
        }
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let clean = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(StorageError::invalid_address(key, "malformed object key"));
        }
        Ok(self.bucket_dir(bucket)?.join(relative))
    }
}

impl ObjectClient for DirObjectClient {
    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, body)?;
        Ok(())
    }

    fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        if !path.is_file() {
            return Err(StorageError::not_found(key));
        }
        Ok(fs::read(path)?)
    }

    fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        let path = self.object_path(bucket, key)?;
        if !path.is_file() {
            return Err(StorageError::not_found(key));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        Ok(self.bucket_dir(bucket)?.is_dir())
    }
}
