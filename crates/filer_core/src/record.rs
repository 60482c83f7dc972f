//! Artifact records and status.

use crate::error::{FilerError, FilerResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Where an artifact's payload lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactStatus {
    /// The payload exists only in the local directory.
    Local,
    /// The payload has been uploaded; the record carries its remote address.
    Synced,
}

impl ArtifactStatus {
    /// Returns the registry spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Synced => "synced",
        }
    }
}

impl fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "synced" => Ok(Self::Synced),
            other => Err(format!("unknown status {other:?}")),
        }
    }
}

/// One registry entry.
///
/// # Invariants
///
/// - `Synced` records carry a non-empty remote address
/// - `Local` records carry no remote address
///
/// Both constructors and the registry parser enforce these, so every
/// `ArtifactRecord` in circulation satisfies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    name: String,
    status: ArtifactStatus,
    remote_address: Option<String>,
    timestamp: DateTime<Utc>,
}

impl ArtifactRecord {
    /// Creates a record for a payload that has not been pushed.
    #[must_use]
    pub fn local(name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            status: ArtifactStatus::Local,
            remote_address: None,
            timestamp,
        }
    }

    /// Creates a record for a payload stored at `remote_address`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecord` if the address is empty.
    pub fn synced(
        name: impl Into<String>,
        remote_address: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> FilerResult<Self> {
        Self::new(
            name,
            ArtifactStatus::Synced,
            Some(remote_address.into()),
            timestamp,
        )
    }

    /// Creates a record from its raw parts, checking the address invariant.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRecord` if the status and address disagree.
    pub fn new(
        name: impl Into<String>,
        status: ArtifactStatus,
        remote_address: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> FilerResult<Self> {
        let name = name.into();
        let remote_address = remote_address.filter(|a| !a.is_empty());

        match (status, &remote_address) {
            (ArtifactStatus::Synced, None) => {
                return Err(FilerError::invalid_record(
                    name,
                    "synced record without a remote address",
                ))
            }
            (ArtifactStatus::Local, Some(_)) => {
                return Err(FilerError::invalid_record(
                    name,
                    "local record with a remote address",
                ))
            }
            _ => {}
        }

        Ok(Self {
            name,
            status,
            remote_address,
            timestamp,
        })
    }

    /// Returns the synced successor of this record.
    ///
    /// The name and timestamp carry over unchanged.
    ///
    /// # Errors
    ///
    /// Returns `AlreadySynced` if this record is already synced, or
    /// `InvalidRecord` if the address is empty.
    pub fn into_synced(self, remote_address: impl Into<String>) -> FilerResult<Self> {
        if self.is_synced() {
            return Err(FilerError::AlreadySynced { name: self.name });
        }
        Self::synced(self.name, remote_address, self.timestamp)
    }

    /// Returns the artifact name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the artifact status.
    #[must_use]
    pub fn status(&self) -> ArtifactStatus {
        self.status
    }

    /// Returns the remote address of a synced record.
    #[must_use]
    pub fn remote_address(&self) -> Option<&str> {
        self.remote_address.as_deref()
    }

    /// Returns when the payload was written.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns true if the payload exists only locally.
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.status == ArtifactStatus::Local
    }

    /// Returns true if the payload has a remote copy.
    #[must_use]
    pub fn is_synced(&self) -> bool {
        self.status == ArtifactStatus::Synced
    }
}

/// Checks that `name` can be used as an artifact name.
///
/// The local payload path is derived from the name, so names must be a
/// single plain file-name component. Names starting with `.` are reserved
/// for the registry, lock and staging files.
///
/// # Errors
///
/// Returns `InvalidName` describing the first rule that is violated.
pub fn validate_name(name: &str) -> FilerResult<()> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.starts_with('.') {
        "names starting with '.' are reserved"
    } else if name.contains(['/', '\\']) {
        "name contains a path separator"
    } else if name.contains('\0') {
        "name contains NUL"
    } else {
        return Ok(());
    };

    Err(FilerError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}
