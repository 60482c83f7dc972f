//! # Filer Testkit
//!
//! Test utilities for Filer.
//!
//! This crate provides:
//! - Temporary Filer fixtures over drive and in-memory object backends
//! - A fault-injecting remote store for failure scenarios
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use filer_core::StoreOptions;
//! use filer_testkit::prelude::*;
//!
//! let fixture = TestFiler::drive();
//! fixture.store_bytes(b"payload", "model", StoreOptions::new()).unwrap();
//! assert_eq!(fixture.remote_object_count(), 0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::faults::*;
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use faults::*;
pub use fixtures::*;
pub use generators::*;
