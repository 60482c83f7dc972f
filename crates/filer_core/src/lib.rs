//! # Filer Core
//!
//! Artifact registry and push/pull lifecycle for Filer.
//!
//! This crate provides:
//! - A durable registry file mapping artifact names to their sync status
//! - Local payload storage with atomic writes
//! - The store / load / push / pull / remove lifecycle over any
//!   [`filer_storage::RemoteStore`]
//! - Batch push and pull with per-name outcomes
//!
//! ## Layout
//!
//! A Filer owns one local directory. Payloads live next to a hidden registry
//! file named after the backend (`.drive_registry` or `.s3_registry`). The
//! registry is plain text so it can be committed to version control and
//! shared; collaborators then `pull` the payloads they need.
//!
//! ## Example
//!
//! ```rust
//! use filer_core::{ArtifactStatus, Filer, FilerConfig, StoreOptions};
//!
//! let local = tempfile::tempdir().unwrap();
//! let mirror = tempfile::tempdir().unwrap();
//! let filer = Filer::open(FilerConfig::drive(local.path(), mirror.path())).unwrap();
//!
//! filer.dump(&[1u32, 2, 3], "counts", StoreOptions::new()).unwrap();
//! filer.push("counts").unwrap();
//!
//! assert_eq!(
//!     filer.list_status().unwrap(),
//!     vec![("counts".to_string(), ArtifactStatus::Synced)]
//! );
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod dir;
mod error;
mod filer;
mod format;
mod record;
mod registry;

pub use config::{BackendKind, FilerConfig, RemoteConfig};
pub use dir::LocalDir;
pub use error::{FilerError, FilerResult};
pub use filer::{BatchReport, Filer, LoadOptions, RemoveOptions, StoreOptions};
pub use format::{encode_record, encode_records, parse_records, DELIMITER, QUOTE};
pub use record::{validate_name, ArtifactRecord, ArtifactStatus};
pub use registry::Registry;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
