//! Error types for remote store operations.

use std::io;
use thiserror::Error;

/// Result type for remote store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while talking to a remote store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// No object exists at the given address.
    #[error("remote object not found: {address}")]
    NotFound {
        /// The address that was looked up.
        address: String,
    },

    /// The store root is missing or not a directory.
    #[error("remote root is not a valid directory: {path}")]
    InvalidRoot {
        /// The configured root path.
        path: String,
    },

    /// The bucket does not exist on the object service.
    #[error("bucket not found: {bucket}")]
    BucketNotFound {
        /// Name of the bucket.
        bucket: String,
    },

    /// The address does not belong to this store.
    #[error("invalid remote address {address}: {reason}")]
    InvalidAddress {
        /// The rejected address.
        address: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The object service client reported a failure.
    #[error("object client error: {0}")]
    Client(String),
}

impl StorageError {
    /// Creates a not-found error.
    pub fn not_found(address: impl Into<String>) -> Self {
        Self::NotFound {
            address: address.into(),
        }
    }

    /// Creates an invalid address error.
    pub fn invalid_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }
}
