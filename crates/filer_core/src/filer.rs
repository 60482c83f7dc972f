//! Artifact lifecycle.
//!
//! [`Filer`] ties a [`Registry`], a [`LocalDir`] and a [`RemoteStore`]
//! together and enforces the status rules:
//!
//! ```text
//!            store                push
//!   (none) ────────▶ Local ───────────────▶ Synced
//!                      │  ▲                   │
//!                      │  └── store(overwrite)│
//!                      │                      │
//!                      └──── remove ──────────┴──▶ (none)
//! ```
//!
//! There is no Synced → Local edge. Overwriting a synced artifact requires
//! removing it first, which makes the fate of the old remote object an
//! explicit choice ([`RemoveOptions::remove_remote`]).

use crate::config::{FilerConfig, RemoteConfig};
use crate::dir::LocalDir;
use crate::error::{FilerError, FilerResult};
use crate::record::{validate_name, ArtifactRecord, ArtifactStatus};
use crate::registry::Registry;
use chrono::{DateTime, SubsecRound, Utc};
use filer_storage::{DriveStore, ObjectClient, ObjectStore, RemoteStore};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options for [`Filer::store_bytes`] and [`Filer::dump`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Push to the remote right after the local write.
    pub push: bool,
    /// Replace an existing local artifact with the same name.
    pub overwrite: bool,
}

impl StoreOptions {
    /// Creates options with both flags off.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            push: false,
            overwrite: false,
        }
    }

    /// Sets whether to push after storing.
    #[must_use]
    pub const fn push(mut self, value: bool) -> Self {
        self.push = value;
        self
    }

    /// Sets whether to overwrite an existing local artifact.
    #[must_use]
    pub const fn overwrite(mut self, value: bool) -> Self {
        self.overwrite = value;
        self
    }
}

/// Options for [`Filer::load_bytes`] and [`Filer::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fetch a synced payload from the remote when it is missing locally.
    pub pull: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { pull: true }
    }
}

impl LoadOptions {
    /// Creates options that pull on demand.
    #[must_use]
    pub const fn new() -> Self {
        Self { pull: true }
    }

    /// Sets whether to pull on demand.
    #[must_use]
    pub const fn pull(mut self, value: bool) -> Self {
        self.pull = value;
        self
    }
}

/// Options for [`Filer::remove`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoveOptions {
    /// Also delete the remote object of a synced artifact.
    pub remove_remote: bool,
}

impl RemoveOptions {
    /// Creates options that leave remote objects in place.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            remove_remote: false,
        }
    }

    /// Sets whether to delete the remote object.
    #[must_use]
    pub const fn remove_remote(mut self, value: bool) -> Self {
        self.remove_remote = value;
        self
    }
}

/// Per-name outcome of a batch operation.
///
/// One failing artifact never stops the batch; it is recorded here and the
/// batch moves on.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Names processed successfully, in registry order.
    pub succeeded: Vec<String>,
    /// Names that failed, with the error each one hit.
    pub failed: Vec<(String, FilerError)>,
}

impl BatchReport {
    /// Returns true if nothing failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Returns the number of names attempted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    fn record(&mut self, operation: &str, name: &str, result: FilerResult<()>) {
        match result {
            Ok(()) => self.succeeded.push(name.to_string()),
            Err(err) => {
                warn!(operation, name, error = %err, "batch member failed");
                self.failed.push((name.to_string(), err));
            }
        }
    }
}

/// Tracks named artifacts in a local directory and syncs them with a remote store.
///
/// Every operation runs under one internal lock, so a `Filer` can be shared
/// across threads and registry rewrites never interleave. The local
/// directory is also locked against other processes for the lifetime of the
/// instance.
///
/// # Example
///
/// ```rust,no_run
/// use filer_core::{Filer, FilerConfig, LoadOptions, StoreOptions};
///
/// let filer = Filer::open(FilerConfig::drive("models", "/mnt/drive/models"))?;
/// filer.dump(&vec![0.5f32, 1.5], "weights", StoreOptions::new().push(true))?;
///
/// let weights: Vec<f32> = filer.load("weights", LoadOptions::default())?;
/// # Ok::<(), filer_core::FilerError>(())
/// ```
pub struct Filer {
    dir: LocalDir,
    registry: Mutex<Registry>,
    remote: Box<dyn RemoteStore>,
}

impl std::fmt::Debug for Filer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filer")
            .field("dir", &self.dir.path())
            .field("registry", &self.registry.lock().path())
            .field("remote", &self.remote.kind())
            .finish()
    }
}

impl Filer {
    /// Opens a Filer with a drive backend.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the local directory or the mirror
    /// root is missing, or if the configuration names the object backend
    /// (use [`Filer::open_with_object_client`] for that).
    pub fn open(config: FilerConfig) -> FilerResult<Self> {
        let dir = LocalDir::open(&config.local_dir)?;
        let registry_file_name = config.registry_file_name();

        let RemoteConfig::Drive { root } = &config.remote else {
            return Err(FilerError::invalid_configuration(
                "object backend requires an object client",
            ));
        };
        let store = DriveStore::open(root)
            .map_err(|e| FilerError::invalid_configuration(e.to_string()))?;

        Self::from_parts(dir, registry_file_name, Box::new(store))
    }

    /// Opens a Filer with an object backend reached through `client`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the local directory is missing, the
    /// bucket does not exist, or the configuration names the drive backend.
    pub fn open_with_object_client<C>(config: FilerConfig, client: C) -> FilerResult<Self>
    where
        C: ObjectClient + 'static,
    {
        let dir = LocalDir::open(&config.local_dir)?;
        let registry_file_name = config.registry_file_name();

        let RemoteConfig::Object { bucket, prefix } = config.remote else {
            return Err(FilerError::invalid_configuration(
                "drive backend does not use an object client",
            ));
        };
        let store = ObjectStore::new(client, bucket, prefix)
            .map_err(|e| FilerError::invalid_configuration(e.to_string()))?;

        Self::from_parts(dir, registry_file_name, Box::new(store))
    }

    /// Opens a Filer over any remote store.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the local directory is missing, or
    /// `Locked` if another instance holds it.
    pub fn with_remote(
        local_dir: &Path,
        registry_file_name: &str,
        remote: Box<dyn RemoteStore>,
    ) -> FilerResult<Self> {
        let dir = LocalDir::open(local_dir)?;
        Self::from_parts(dir, registry_file_name, remote)
    }

    fn from_parts(
        dir: LocalDir,
        registry_file_name: &str,
        remote: Box<dyn RemoteStore>,
    ) -> FilerResult<Self> {
        let registry = Registry::open(&dir.registry_path(registry_file_name))?;
        debug!(
            dir = %dir.path().display(),
            registry = registry_file_name,
            backend = remote.kind(),
            "opened filer"
        );

        Ok(Self {
            dir,
            registry: Mutex::new(registry),
            remote,
        })
    }

    /// Returns the local directory.
    #[must_use]
    pub fn local_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Returns the registry file path.
    #[must_use]
    pub fn registry_path(&self) -> PathBuf {
        self.registry.lock().path().to_path_buf()
    }

    /// Returns the backend label of the remote store.
    #[must_use]
    pub fn backend(&self) -> &'static str {
        self.remote.kind()
    }

    /// Returns the payload path for `name`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` if the name cannot be mapped to a file.
    pub fn local_path(&self, name: &str) -> FilerResult<PathBuf> {
        self.dir.payload_path(name)
    }

    /// Returns true if the payload for `name` is present locally.
    #[must_use]
    pub fn has_local_payload(&self, name: &str) -> bool {
        self.dir.has_payload(name)
    }

    /// Encodes `value` and stores it under `name`.
    ///
    /// See [`Filer::store_bytes`] for the rules.
    pub fn dump<T: Serialize + ?Sized>(
        &self,
        value: &T,
        name: &str,
        options: StoreOptions,
    ) -> FilerResult<()> {
        let bytes = filer_codec::to_payload(value)?;
        self.store_bytes(&bytes, name, options)
    }

    /// Writes a payload and registers it as a local artifact.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if `name` is registered and `overwrite` is off
    /// - `InvalidTransition` if `name` is synced (remove it first)
    /// - `InvalidName` if the name is unusable
    /// - any push error when `push` is on; the artifact then stays local and
    ///   can be pushed again later
    pub fn store_bytes(&self, payload: &[u8], name: &str, options: StoreOptions) -> FilerResult<()> {
        validate_name(name)?;
        let registry = self.registry.lock();

        if let Some(existing) = registry.find(name)? {
            if !options.overwrite {
                return Err(FilerError::AlreadyExists {
                    name: name.to_string(),
                });
            }
            if existing.is_synced() {
                return Err(FilerError::invalid_transition(
                    name,
                    "cannot overwrite a synced artifact directly; remove it first",
                ));
            }
            self.dir.remove_payload(name)?;
            registry.remove(name)?;
            debug!(name, "replacing local artifact");
        }

        self.dir.write_payload(name, payload)?;
        registry.add(ArtifactRecord::local(name, now()))?;
        info!(name, bytes = payload.len(), "stored artifact");

        if options.push {
            if let Err(err) = self.push_locked(&registry, name) {
                warn!(name, error = %err, "push after store failed; artifact remains local");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Loads and decodes the artifact `name`.
    ///
    /// See [`Filer::load_bytes`] for the rules.
    pub fn load<T: DeserializeOwned>(&self, name: &str, options: LoadOptions) -> FilerResult<T> {
        let bytes = self.load_bytes(name, options)?;
        Ok(filer_codec::from_payload(&bytes)?)
    }

    /// Returns the payload of `name`, pulling it first if allowed and needed.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `name` is not registered
    /// - `PayloadMissing` if the file is absent and the artifact is local,
    ///   or synced with `pull` off
    /// - any pull error
    pub fn load_bytes(&self, name: &str, options: LoadOptions) -> FilerResult<Vec<u8>> {
        let registry = self.registry.lock();
        let record = registry
            .find(name)?
            .ok_or_else(|| FilerError::not_found(name))?;

        if let Some(bytes) = self.dir.read_payload(name)? {
            return Ok(bytes);
        }

        if record.is_synced() && options.pull {
            self.fetch(&record)?;
            if let Some(bytes) = self.dir.read_payload(name)? {
                return Ok(bytes);
            }
        }

        Err(self.payload_missing(name))
    }

    /// Uploads a local artifact and marks it synced.
    ///
    /// The record keeps its original timestamp.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `name` is not registered
    /// - `AlreadySynced` if it was pushed before
    /// - `PayloadMissing` if the local file is gone (typical after a fresh
    ///   checkout of a registry whose payloads were never pushed)
    /// - `Transport` if the upload fails
    pub fn push(&self, name: &str) -> FilerResult<()> {
        let registry = self.registry.lock();
        self.push_locked(&registry, name)
    }

    /// Downloads a synced artifact whose payload is missing locally.
    ///
    /// Does nothing if the payload is already present; the local copy is
    /// not compared against the remote one.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `name` is not registered
    /// - `InvalidTransition` if the artifact is local (there is nothing to pull)
    /// - `Transport` if the download fails
    pub fn pull(&self, name: &str) -> FilerResult<()> {
        let registry = self.registry.lock();
        self.pull_locked(&registry, name)
    }

    /// Pushes every local artifact.
    ///
    /// Failures are collected per name; the batch itself only fails if the
    /// registry cannot be read.
    pub fn push_all(&self) -> FilerResult<BatchReport> {
        let registry = self.registry.lock();
        let mut report = BatchReport::default();

        for record in registry.list()?.iter().filter(|r| r.is_local()) {
            let result = self.push_locked(&registry, record.name());
            report.record("push", record.name(), result);
        }

        info!(
            pushed = report.succeeded.len(),
            failed = report.failed.len(),
            "push_all finished"
        );
        Ok(report)
    }

    /// Pulls every synced artifact whose payload is missing locally.
    ///
    /// Failures are collected per name, as in [`Filer::push_all`].
    pub fn pull_all(&self) -> FilerResult<BatchReport> {
        let registry = self.registry.lock();
        let mut report = BatchReport::default();

        for record in registry.list()? {
            if record.is_synced() && !self.dir.has_payload(record.name()) {
                let result = self.pull_locked(&registry, record.name());
                report.record("pull", record.name(), result);
            }
        }

        info!(
            pulled = report.succeeded.len(),
            failed = report.failed.len(),
            "pull_all finished"
        );
        Ok(report)
    }

    /// Unregisters `name` and deletes its local payload.
    ///
    /// The remote object of a synced artifact is left in place unless
    /// `remove_remote` is set: older copies of the registry (for example in
    /// version control) may still point at it.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `name` is not registered
    /// - `Transport` if the remote delete fails; the record and local payload
    ///   are already gone at that point
    pub fn remove(&self, name: &str, options: RemoveOptions) -> FilerResult<ArtifactRecord> {
        let registry = self.registry.lock();
        self.remove_locked(&registry, name, options)
    }

    /// Removes every local artifact, registry entry and payload included.
    ///
    /// Local artifacts have no remote copy, so this **destroys their only
    /// copy**. It is not a cache clear: synced artifacts are untouched and
    /// local ones are gone for good.
    pub fn remove_locals(&self) -> FilerResult<BatchReport> {
        let registry = self.registry.lock();
        let mut report = BatchReport::default();

        for record in registry.list()?.iter().filter(|r| r.is_local()) {
            warn!(name = record.name(), "deleting local-only artifact");
            let result = self
                .remove_locked(&registry, record.name(), RemoveOptions::new())
                .map(|_| ());
            report.record("remove", record.name(), result);
        }
        Ok(report)
    }

    /// Returns every registered name with its status, in registry order.
    pub fn list_status(&self) -> FilerResult<Vec<(String, ArtifactStatus)>> {
        Ok(self
            .records()?
            .into_iter()
            .map(|r| (r.name().to_string(), r.status()))
            .collect())
    }

    /// Returns every record, in registry order.
    pub fn records(&self) -> FilerResult<Vec<ArtifactRecord>> {
        self.registry.lock().list()
    }

    /// Returns the record for `name`, if registered.
    pub fn record(&self, name: &str) -> FilerResult<Option<ArtifactRecord>> {
        self.registry.lock().find(name)
    }

    /// Returns `(name, remote_address)` for every synced artifact.
    pub fn remote_addresses(&self) -> FilerResult<Vec<(String, String)>> {
        Ok(self
            .records()?
            .into_iter()
            .filter_map(|r| {
                r.remote_address()
                    .map(|address| (r.name().to_string(), address.to_string()))
            })
            .collect())
    }

    fn push_locked(&self, registry: &Registry, name: &str) -> FilerResult<()> {
        let record = registry
            .find(name)?
            .ok_or_else(|| FilerError::not_found(name))?;
        if record.is_synced() {
            return Err(FilerError::AlreadySynced {
                name: name.to_string(),
            });
        }

        let path = self.dir.payload_path(name)?;
        if !path.is_file() {
            return Err(self.payload_missing(name));
        }

        let address = self.remote.upload(name, &path)?;
        let synced = record.into_synced(address.as_str())?;
        if let Err(err) = registry.replace(name, synced) {
            warn!(name, %address, error = %err, "registry update failed after upload; remote object orphaned");
            return Err(err);
        }

        info!(name, backend = self.remote.kind(), %address, "pushed artifact");
        Ok(())
    }

    fn pull_locked(&self, registry: &Registry, name: &str) -> FilerResult<()> {
        let record = registry
            .find(name)?
            .ok_or_else(|| FilerError::not_found(name))?;
        if record.is_local() {
            return Err(FilerError::invalid_transition(
                name,
                "cannot pull a local artifact; it has never been pushed",
            ));
        }

        if self.dir.has_payload(name) {
            debug!(name, "payload already present; pull skipped");
            return Ok(());
        }
        self.fetch(&record)
    }

    /// Downloads a synced record's payload through the staging file.
    fn fetch(&self, record: &ArtifactRecord) -> FilerResult<()> {
        let name = record.name();
        let Some(address) = record.remote_address() else {
            return Err(FilerError::invalid_record(
                name,
                "synced record without a remote address",
            ));
        };

        let staging = self.dir.staging_path(name)?;
        if let Err(err) = self.remote.download(address, &staging) {
            self.dir.discard_staged(name)?;
            return Err(err.into());
        }
        self.dir.commit_staged(name)?;

        info!(name, backend = self.remote.kind(), address, "pulled artifact");
        Ok(())
    }

    fn remove_locked(
        &self,
        registry: &Registry,
        name: &str,
        options: RemoveOptions,
    ) -> FilerResult<ArtifactRecord> {
        let record = registry.remove(name)?;
        let had_payload = self.dir.remove_payload(name)?;
        info!(name, had_payload, "removed artifact");

        if let Some(address) = record.remote_address() {
            if options.remove_remote {
                if let Err(err) = self.remote.delete(address) {
                    warn!(name, address, error = %err, "remote delete failed; object orphaned");
                    return Err(err.into());
                }
                info!(name, address, "deleted remote object");
            } else {
                debug!(name, address, "remote object left in place");
            }
        }
        Ok(record)
    }

    fn payload_missing(&self, name: &str) -> FilerError {
        FilerError::PayloadMissing {
            name: name.to_string(),
            path: self
                .dir
                .payload_path(name)
                .unwrap_or_else(|_| self.dir.path().join(name)),
        }
    }
}

/// Record timestamps are kept at the precision the registry stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
