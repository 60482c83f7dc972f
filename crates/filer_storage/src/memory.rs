//! In-memory object client for testing.

use crate::error::{StorageError, StorageResult};
use crate::object::ObjectClient;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

/// An in-memory object service.
///
/// This client keeps every object in memory and is suitable for:
/// - Unit tests
/// - Integration tests of the object backend
///
/// Wrap it in an `Arc` to keep a handle for inspection while an
/// [`super::ObjectStore`] owns another.
///
/// # Example
///
/// ```rust
/// use filer_storage::{InMemoryObjectClient, ObjectClient};
///
/// let client = InMemoryObjectClient::with_bucket("b");
/// client.put_object("b", "k", b"v".to_vec()).unwrap();
/// assert_eq!(client.get_object("b", "k").unwrap(), b"v");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryObjectClient {
    buckets: RwLock<BTreeSet<String>>,
    objects: RwLock<BTreeMap<(String, String), Vec<u8>>>,
}

impl InMemoryObjectClient {
    /// Creates a client with no buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a client with a single empty bucket.
    #[must_use]
    pub fn with_bucket(bucket: &str) -> Self {
        let client = Self::new();
        client.create_bucket(bucket);
        client
    }

    /// Creates a bucket.
    pub fn create_bucket(&self, bucket: &str) {
        self.buckets.write().insert(bucket.to_string());
    }

    /// Returns a copy of an object, if present.
    #[must_use]
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Returns the number of stored objects across all buckets.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns all keys in a bucket, sorted.
    #[must_use]
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    fn check_bucket(&self, bucket: &str) -> StorageResult<()> {
        if self.buckets.read().contains(bucket) {
            Ok(())
        } else {
            Err(StorageError::BucketNotFound {
                bucket: bucket.to_string(),
            })
        }
    }
}

impl ObjectClient for InMemoryObjectClient {
    fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> StorageResult<()> {
        self.check_bucket(bucket)?;
        self.objects
            .write()
            .insert((bucket.to_string(), key.to_string()), body);
        Ok(())
    }

    fn get_object(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>> {
        self.check_bucket(bucket)?;
        self.object(bucket, key)
            .ok_or_else(|| StorageError::not_found(key))
    }

    fn delete_object(&self, bucket: &str, key: &str) -> StorageResult<()> {
        self.check_bucket(bucket)?;
        self.objects
            .write()
            .remove(&(bucket.to_string(), key.to_string()))
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(key))
    }

    fn bucket_exists(&self, bucket: &str) -> StorageResult<bool> {
        Ok(self.buckets.read().contains(bucket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_put_get() {
        let client = InMemoryObjectClient::with_bucket("b");
        client.put_object("b", "k", b"hello".to_vec()).unwrap();
        assert_eq!(client.get_object("b", "k").unwrap(), b"hello");
        assert_eq!(client.keys("b"), vec!["k".to_string()]);
    }

    #[test]
    fn memory_missing_bucket() {
        let client = InMemoryObjectClient::new();
        let result = client.put_object("b", "k", Vec::new());
        assert!(matches!(result, Err(StorageError::BucketNotFound { .. })));
    }

    #[test]
    fn memory_delete_missing() {
        let client = InMemoryObjectClient::with_bucket("b");
        let result = client.delete_object("b", "k");
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn memory_buckets_are_isolated() {
        let client = InMemoryObjectClient::with_bucket("a");
        client.create_bucket("b");
        client.put_object("a", "k", b"1".to_vec()).unwrap();

        assert!(client.get_object("b", "k").is_err());
        assert_eq!(client.object_count(), 1);
    }
}
