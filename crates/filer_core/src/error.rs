//! Error types for Filer core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type FilerResult<T> = Result<T, FilerError>;

/// Errors that can occur in Filer operations.
#[derive(Debug, Error)]
pub enum FilerError {
    /// The remote store failed. Propagated unchanged.
    #[error("transport failure: {0}")]
    Transport(#[from] filer_storage::StorageError),

    /// Payload encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] filer_codec::CodecError),

    /// I/O error on the local directory or registry file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The local directory, remote descriptor or backend selector is unusable.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the problem.
        message: String,
    },

    /// No artifact with this name is registered.
    #[error("artifact not found in registry: {name}")]
    NotFound {
        /// The artifact name.
        name: String,
    },

    /// An artifact with this name is already registered.
    #[error("artifact already exists in registry: {name}")]
    AlreadyExists {
        /// The artifact name.
        name: String,
    },

    /// The registry already holds a record with this name.
    #[error("duplicate registry record: {name}")]
    DuplicateName {
        /// The artifact name.
        name: String,
    },

    /// The requested status transition is not allowed.
    #[error("invalid transition for {name}: {message}")]
    InvalidTransition {
        /// The artifact name.
        name: String,
        /// Why the transition is rejected.
        message: String,
    },

    /// Push was requested for an artifact that is already synced.
    #[error("artifact already synced: {name}")]
    AlreadySynced {
        /// The artifact name.
        name: String,
    },

    /// The registry expects a local payload that is not on disk.
    #[error("payload missing for {name}: {path}")]
    PayloadMissing {
        /// The artifact name.
        name: String,
        /// Where the payload was expected.
        path: PathBuf,
    },

    /// The name cannot be used as an artifact name.
    #[error("invalid artifact name {name:?}: {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A record violates the status/address invariant.
    #[error("invalid record for {name}: {message}")]
    InvalidRecord {
        /// The artifact name.
        name: String,
        /// Which invariant is violated.
        message: String,
    },

    /// The registry file cannot be parsed.
    #[error("registry corrupted at line {line}: {message}")]
    RegistryCorrupted {
        /// 1-based line where the problem starts.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Another process holds the local directory lock.
    #[error("local directory locked by another process: {path}")]
    Locked {
        /// The locked directory.
        path: PathBuf,
    },
}

impl FilerError {
    /// Creates an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Creates an invalid transition error.
    pub fn invalid_transition(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidTransition {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid record error.
    pub fn invalid_record(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a registry corruption error.
    pub fn corrupted(line: usize, message: impl Into<String>) -> Self {
        Self::RegistryCorrupted {
            line,
            message: message.into(),
        }
    }

    /// Returns true for every rejected status transition.
    ///
    /// Pushing a synced artifact is reported as [`FilerError::AlreadySynced`]
    /// but is a transition error all the same.
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. } | Self::AlreadySynced { .. }
        )
    }

    /// Returns true if the error came from the remote store.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
