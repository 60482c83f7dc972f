//! # Filer Storage
//!
//! Remote store trait and implementations for Filer.
//!
//! A remote store is an **opaque transport** for artifact payloads. It copies
//! a local file somewhere durable and hands back an address that can later be
//! used to fetch or delete the copy. Stores know nothing about the registry,
//! artifact status, or payload encoding.
//!
//! ## Design Principles
//!
//! - Three operations only: upload, download, delete
//! - Every upload produces a fresh address (`<name>_<uuid>`), so repeated
//!   uploads of the same name never collide
//! - Failures are returned unchanged; stores never retry
//! - Must be `Send + Sync`
//!
//! ## Available Stores
//!
//! - [`DriveStore`] - Mirror directory on a local or mounted filesystem
//! - [`ObjectStore`] - Keys in a fixed bucket of an [`ObjectClient`]
//!
//! ## Object Clients
//!
//! - [`InMemoryObjectClient`] - For testing
//! - [`DirObjectClient`] - Buckets as subdirectories of a root directory
//!
//! ## Example
//!
//! ```rust
//! use filer_storage::{InMemoryObjectClient, ObjectStore, RemoteStore};
//!
//! let client = InMemoryObjectClient::with_bucket("artifacts");
//! let store = ObjectStore::new(client, "artifacts", "models/").unwrap();
//!
//! let dir = tempfile::tempdir().unwrap();
//! let local = dir.path().join("weights.flr");
//! std::fs::write(&local, b"payload").unwrap();
//!
//! let address = store.upload("weights", &local).unwrap();
//! assert!(address.starts_with("models/weights_"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod drive;
mod error;
mod memory;
mod object;
mod remote;

pub use drive::DriveStore;
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryObjectClient;
pub use object::{DirObjectClient, ObjectClient, ObjectStore};
pub use remote::{unique_object_name, RemoteStore};
