//! CLI command implementations.

pub mod artifact;
pub mod list;
pub mod sync;

use crate::error::CliError;
use filer_core::{BackendKind, Filer, FilerConfig};
use filer_storage::DirObjectClient;
use std::path::PathBuf;
use tracing::debug;

/// Global options that select the local directory and remote store.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Local artifact directory.
    pub dir: PathBuf,
    /// Backend selector.
    pub backend: String,
    /// Remote descriptor.
    pub remote: Option<String>,
    /// Bucket root for the s3 backend.
    pub object_root: Option<PathBuf>,
}

impl Connection {
    /// Opens the Filer described by these options.
    pub fn open(&self) -> Result<Filer, Box<dyn std::error::Error>> {
        let kind: BackendKind = self.backend.parse()?;
        let descriptor = self.remote.as_deref().ok_or_else(|| CliError::MissingOption {
            backend: kind.to_string(),
            option: "--remote",
        })?;
        let config = FilerConfig::from_descriptor(&self.dir, kind.as_str(), descriptor)?;
        debug!(dir = %self.dir.display(), backend = %kind, "opening filer");

        let filer = match kind {
            BackendKind::Drive => Filer::open(config)?,
            BackendKind::Object => {
                let root = self
                    .object_root
                    .as_deref()
                    .ok_or_else(|| CliError::MissingOption {
                        backend: kind.to_string(),
                        option: "--object-root",
                    })?;
                Filer::open_with_object_client(config, DirObjectClient::open(root)?)?
            }
        };
        Ok(filer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filer_core::FilerError;
    use tempfile::tempdir;

    fn connection(dir: PathBuf, backend: &str, remote: Option<String>) -> Connection {
        Connection {
            dir,
            backend: backend.to_string(),
            remote,
            object_root: None,
        }
    }

    #[test]
    fn opens_drive_backend() {
        let local = tempdir().unwrap();
        let mirror = tempdir().unwrap();
        let conn = connection(
            local.path().to_path_buf(),
            "drive",
            Some(mirror.path().display().to_string()),
        );

        let filer = conn.open().unwrap();
        assert_eq!(filer.backend(), "drive");
    }

    #[test]
    fn rejects_unknown_backend() {
        let local = tempdir().unwrap();
        let conn = connection(local.path().to_path_buf(), "ftp", Some("x".to_string()));

        let err = conn.open().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FilerError>(),
            Some(FilerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn requires_remote_descriptor() {
        let local = tempdir().unwrap();
        let conn = connection(local.path().to_path_buf(), "drive", None);

        let err = conn.open().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::MissingOption { option: "--remote", .. })
        ));
    }

    #[test]
    fn object_backend_requires_root() {
        let local = tempdir().unwrap();
        let conn = connection(local.path().to_path_buf(), "s3", Some("bucket".to_string()));

        let err = conn.open().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::MissingOption {
                option: "--object-root",
                ..
            })
        ));
    }

    #[test]
    fn opens_object_backend() {
        let local = tempdir().unwrap();
        let buckets = tempdir().unwrap();
        DirObjectClient::open(buckets.path())
            .unwrap()
            .create_bucket("models")
            .unwrap();

        let mut conn = connection(local.path().to_path_buf(), "s3", Some("models/v1".to_string()));
        conn.object_root = Some(buckets.path().to_path_buf());

        let filer = conn.open().unwrap();
        assert_eq!(filer.backend(), "object");
        assert!(filer.registry_path().ends_with(".s3_registry"));
    }
}
