//! Filer configuration.

use crate::error::{FilerError, FilerResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which remote backend a Filer talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Mirror directory on a local or mounted filesystem.
    Drive,
    /// Bucket on an S3-style object service.
    Object,
}

impl BackendKind {
    /// Returns the registry file name used for this backend.
    ///
    /// Each backend keeps its own registry, so one local directory can be
    /// tracked against both without the records mixing.
    #[must_use]
    pub const fn registry_file_name(self) -> &'static str {
        match self {
            Self::Drive => ".drive_registry",
            Self::Object => ".s3_registry",
        }
    }

    /// Returns the selector spelling of the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drive => "drive",
            Self::Object => "s3",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = FilerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drive" => Ok(Self::Drive),
            "s3" | "object" => Ok(Self::Object),
            other => Err(FilerError::invalid_configuration(format!(
                "unsupported remote type: {other}"
            ))),
        }
    }
}

/// Connection descriptor for the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteConfig {
    /// Mirror directory. Must already exist.
    Drive {
        /// Root directory of the mirror.
        root: PathBuf,
    },
    /// Object service bucket.
    Object {
        /// Bucket name.
        bucket: String,
        /// Key prefix, empty or ending in `/`.
        prefix: String,
    },
}

impl RemoteConfig {
    /// Parses a connection descriptor for the given backend.
    ///
    /// - drive: the mirror root path
    /// - object: `bucket` or `bucket/key/prefix`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for an empty root or bucket.
    pub fn parse(kind: BackendKind, descriptor: &str) -> FilerResult<Self> {
        let descriptor = descriptor.trim();
        match kind {
            BackendKind::Drive => {
                if descriptor.is_empty() {
                    return Err(FilerError::invalid_configuration(
                        "drive backend needs a remote directory",
                    ));
                }
                Ok(Self::Drive {
                    root: PathBuf::from(descriptor),
                })
            }
            BackendKind::Object => {
                let (bucket, prefix) = descriptor.split_once('/').unwrap_or((descriptor, ""));
                if bucket.is_empty() {
                    return Err(FilerError::invalid_configuration(
                        "object backend needs a bucket name",
                    ));
                }
                Ok(Self::Object {
                    bucket: bucket.to_string(),
                    prefix: normalize_prefix(prefix),
                })
            }
        }
    }

    /// Returns the backend this descriptor belongs to.
    #[must_use]
    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Drive { .. } => BackendKind::Drive,
            Self::Object { .. } => BackendKind::Object,
        }
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}/")
    }
}

/// Configuration for opening a Filer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilerConfig {
    /// Directory holding payloads and the registry. Must already exist.
    pub local_dir: PathBuf,
    /// Remote store descriptor.
    pub remote: RemoteConfig,
}

impl FilerConfig {
    /// Creates a configuration for a drive mirror.
    pub fn drive(local_dir: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self {
            local_dir: local_dir.into(),
            remote: RemoteConfig::Drive { root: root.into() },
        }
    }

    /// Creates a configuration for an object service bucket.
    pub fn object(local_dir: impl Into<PathBuf>, bucket: impl Into<String>) -> Self {
        Self {
            local_dir: local_dir.into(),
            remote: RemoteConfig::Object {
                bucket: bucket.into(),
                prefix: String::new(),
            },
        }
    }

    /// Sets the key prefix. Has no effect on drive configurations.
    #[must_use]
    pub fn with_prefix(mut self, value: &str) -> Self {
        if let RemoteConfig::Object { prefix, .. } = &mut self.remote {
            *prefix = normalize_prefix(value);
        }
        self
    }

    /// Builds a configuration from the three user-facing settings.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for an unknown backend selector or an
    /// unusable descriptor.
    pub fn from_descriptor(local_dir: &Path, backend: &str, descriptor: &str) -> FilerResult<Self> {
        let kind: BackendKind = backend.parse()?;
        Ok(Self {
            local_dir: local_dir.to_path_buf(),
            remote: RemoteConfig::parse(kind, descriptor)?,
        })
    }

    /// Returns the configured backend.
    #[must_use]
    pub fn backend(&self) -> BackendKind {
        self.remote.kind()
    }

    /// Returns the registry file name for the configured backend.
    #[must_use]
    pub fn registry_file_name(&self) -> &'static str {
        self.backend().registry_file_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_selector() {
        assert_eq!("drive".parse::<BackendKind>().unwrap(), BackendKind::Drive);
        assert_eq!("s3".parse::<BackendKind>().unwrap(), BackendKind::Object);
        assert!(matches!(
            "foo".parse::<BackendKind>(),
            Err(FilerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn registry_names_differ_per_backend() {
        assert_eq!(BackendKind::Drive.registry_file_name(), ".drive_registry");
        assert_eq!(BackendKind::Object.registry_file_name(), ".s3_registry");
    }

    #[test]
    fn object_descriptor_splits_prefix() {
        let remote = RemoteConfig::parse(BackendKind::Object, "bucket/models/v1/").unwrap();
        assert_eq!(
            remote,
            RemoteConfig::Object {
                bucket: "bucket".to_string(),
                prefix: "models/v1/".to_string(),
            }
        );
    }

    #[test]
    fn empty_descriptors_rejected() {
        assert!(RemoteConfig::parse(BackendKind::Drive, " ").is_err());
        assert!(RemoteConfig::parse(BackendKind::Object, "/prefix").is_err());
    }

    #[test]
    fn builder_pattern() {
        let config = FilerConfig::object("/tmp/local", "bucket").with_prefix("/team/");
        assert_eq!(config.backend(), BackendKind::Object);
        assert_eq!(
            config.remote,
            RemoteConfig::Object {
                bucket: "bucket".to_string(),
                prefix: "team/".to_string(),
            }
        );

        let drive = FilerConfig::drive("/tmp/local", "/mnt/drive").with_prefix("ignored");
        assert_eq!(drive.registry_file_name(), ".drive_registry");
    }

    #[test]
    fn from_descriptor() {
        let config = FilerConfig::from_descriptor(Path::new("/l"), "drive", "/r").unwrap();
        assert_eq!(config, FilerConfig::drive("/l", "/r"));
    }
}
