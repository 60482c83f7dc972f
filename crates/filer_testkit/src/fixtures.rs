//! Test fixtures.
//!
//! Provides temporary Filers with automatic cleanup, and helpers for
//! simulating a second collaborator sharing the same registry.

use crate::faults::FaultyRemote;
use filer_core::{BackendKind, Filer, FilerConfig};
use filer_storage::{DriveStore, InMemoryObjectClient};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Bucket used by object fixtures.
pub const TEST_BUCKET: &str = "filer-test";

/// Where a fixture's remote objects live.
enum Backing {
    Drive(Arc<TempDir>),
    Object(Arc<InMemoryObjectClient>),
}

/// A Filer over temporary directories.
pub struct TestFiler {
    /// The Filer instance.
    pub filer: Filer,
    local: TempDir,
    backing: Backing,
}

impl TestFiler {
    /// Creates a Filer with a temporary drive mirror.
    pub fn drive() -> Self {
        let mirror = Arc::new(TempDir::new().expect("Failed to create mirror directory"));
        Self::open_drive(TempDir::new().expect("Failed to create local directory"), mirror)
    }

    /// Creates a Filer over an in-memory object bucket.
    pub fn object() -> Self {
        let client = Arc::new(InMemoryObjectClient::with_bucket(TEST_BUCKET));
        Self::open_object(TempDir::new().expect("Failed to create local directory"), client)
    }

    /// Creates a drive Filer whose remote fails on request.
    ///
    /// The returned handle controls the faults.
    pub fn faulty() -> (Self, FaultyRemote) {
        let local = TempDir::new().expect("Failed to create local directory");
        let mirror = Arc::new(TempDir::new().expect("Failed to create mirror directory"));
        let store = DriveStore::open(mirror.path()).expect("Failed to open drive store");
        let remote = FaultyRemote::new(store);

        let filer = Filer::with_remote(
            local.path(),
            BackendKind::Drive.registry_file_name(),
            Box::new(remote.clone()),
        )
        .expect("Failed to open faulty filer");

        let fixture = Self {
            filer,
            local,
            backing: Backing::Drive(mirror),
        };
        (fixture, remote)
    }

    fn open_drive(local: TempDir, mirror: Arc<TempDir>) -> Self {
        let filer = Filer::open(FilerConfig::drive(local.path(), mirror.path()))
            .expect("Failed to open drive filer");
        Self {
            filer,
            local,
            backing: Backing::Drive(mirror),
        }
    }

    fn open_object(local: TempDir, client: Arc<InMemoryObjectClient>) -> Self {
        let config = FilerConfig::object(local.path(), TEST_BUCKET);
        let filer = Filer::open_with_object_client(config, Arc::clone(&client))
            .expect("Failed to open object filer");
        Self {
            filer,
            local,
            backing: Backing::Object(client),
        }
    }

    fn open_like(&self, local: TempDir) -> Self {
        match &self.backing {
            Backing::Drive(mirror) => Self::open_drive(local, Arc::clone(mirror)),
            Backing::Object(client) => Self::open_object(local, Arc::clone(client)),
        }
    }

    /// Returns the drive mirror directory, if this fixture uses one.
    pub fn mirror_path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::Drive(mirror) => Some(mirror.path()),
            Backing::Object(_) => None,
        }
    }

    /// Returns the object client, if this fixture uses one.
    pub fn object_client(&self) -> Option<&InMemoryObjectClient> {
        match &self.backing {
            Backing::Drive(_) => None,
            Backing::Object(client) => Some(client.as_ref()),
        }
    }

    /// Returns the number of objects in the remote store.
    pub fn remote_object_count(&self) -> usize {
        match &self.backing {
            Backing::Drive(mirror) => fs::read_dir(mirror.path())
                .expect("Failed to read mirror directory")
                .count(),
            Backing::Object(client) => client.object_count(),
        }
    }

    /// Returns true if an object exists at `address`.
    pub fn remote_contains(&self, address: &str) -> bool {
        match &self.backing {
            Backing::Drive(_) => Path::new(address).is_file(),
            Backing::Object(client) => client.object(TEST_BUCKET, address).is_some(),
        }
    }

    /// Deletes the local payload of `name`, as after a fresh checkout.
    pub fn drop_local_payload(&self, name: &str) {
        let path = self
            .filer
            .local_path(name)
            .expect("Invalid artifact name");
        fs::remove_file(path).expect("Failed to delete payload");
    }

    /// Returns the registry file contents.
    pub fn registry_text(&self) -> String {
        fs::read_to_string(self.filer.registry_path()).expect("Failed to read registry")
    }

    /// Closes and reopens the Filer on the same directories.
    ///
    /// Faulty fixtures come back with a plain drive store.
    pub fn reopen(self) -> Self {
        let Self {
            filer,
            local,
            backing,
        } = self;
        drop(filer);

        match backing {
            Backing::Drive(mirror) => Self::open_drive(local, mirror),
            Backing::Object(client) => Self::open_object(local, client),
        }
    }

    /// Opens a second Filer that shares this one's remote and a copy of
    /// its registry, but none of its payloads.
    ///
    /// This is what a collaborator sees after checking out a registry that
    /// was committed to version control.
    pub fn collaborator(&self) -> Self {
        let local = TempDir::new().expect("Failed to create local directory");
        let registry = self.filer.registry_path();
        let file_name = registry.file_name().expect("Registry path has no file name");
        fs::copy(&registry, local.path().join(file_name)).expect("Failed to copy registry");

        self.open_like(local)
    }
}

impl std::ops::Deref for TestFiler {
    type Target = Filer;

    fn deref(&self) -> &Self::Target {
        &self.filer
    }
}

/// Runs a test with a temporary drive Filer.
pub fn with_drive_filer<F, R>(f: F) -> R
where
    F: FnOnce(&Filer) -> R,
{
    let fixture = TestFiler::drive();
    f(&fixture.filer)
}

/// Runs a test against both backends.
pub fn with_each_backend<F>(mut f: F)
where
    F: FnMut(&TestFiler),
{
    f(&TestFiler::drive());
    f(&TestFiler::object());
}
