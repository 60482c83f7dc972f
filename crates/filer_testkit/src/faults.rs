//! Fault injection for remote stores.
//!
//! [`FaultyRemote`] wraps a real store and fails selected operations on
//! demand. Clones share state, so a test can keep one handle while the
//! Filer owns another.

use filer_storage::{RemoteStore, StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// A remote store operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOp {
    /// `upload`
    Upload,
    /// `download`
    Download,
    /// `delete`
    Delete,
}

#[derive(Default)]
struct Faults {
    by_name: HashSet<(RemoteOp, String)>,
    everything: HashSet<RemoteOp>,
}

struct Inner {
    store: Box<dyn RemoteStore>,
    faults: Mutex<Faults>,
    calls: Mutex<HashMap<RemoteOp, usize>>,
}

/// A remote store that fails on request.
#[derive(Clone)]
pub struct FaultyRemote {
    inner: Arc<Inner>,
}

impl FaultyRemote {
    /// Wraps `store`. No faults are armed initially.
    pub fn new(store: impl RemoteStore + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Box::new(store),
                faults: Mutex::new(Faults::default()),
                calls: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Makes `op` fail for the artifact `name`.
    pub fn fail(&self, op: RemoteOp, name: &str) {
        self.inner
            .faults
            .lock()
            .by_name
            .insert((op, name.to_string()));
    }

    /// Makes `op` fail for every artifact.
    pub fn fail_all(&self, op: RemoteOp) {
        self.inner.faults.lock().everything.insert(op);
    }

    /// Disarms every fault.
    pub fn heal(&self) {
        *self.inner.faults.lock() = Faults::default();
    }

    /// Returns how many times `op` was called, failed calls included.
    #[must_use]
    pub fn calls(&self, op: RemoteOp) -> usize {
        self.inner.calls.lock().get(&op).copied().unwrap_or(0)
    }

    fn check(&self, op: RemoteOp, name: &str) -> StorageResult<()> {
        *self.inner.calls.lock().entry(op).or_insert(0) += 1;

        let faults = self.inner.faults.lock();
        if faults.everything.contains(&op) || faults.by_name.contains(&(op, name.to_string())) {
            return Err(StorageError::Client(format!(
                "injected {op:?} failure for {name}"
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for FaultyRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultyRemote")
            .field("kind", &self.inner.store.kind())
            .finish_non_exhaustive()
    }
}

impl RemoteStore for FaultyRemote {
    fn upload(&self, name: &str, local_path: &Path) -> StorageResult<String> {
        self.check(RemoteOp::Upload, name)?;
        self.inner.store.upload(name, local_path)
    }

    fn download(&self, address: &str, local_path: &Path) -> StorageResult<()> {
        self.check(RemoteOp::Download, artifact_name(address))?;
        self.inner.store.download(address, local_path)
    }

    fn delete(&self, address: &str) -> StorageResult<()> {
        self.check(RemoteOp::Delete, artifact_name(address))?;
        self.inner.store.delete(address)
    }

    fn kind(&self) -> &'static str {
        self.inner.store.kind()
    }
}

/// Recovers the artifact name from an address ending in `<name>_<uuid>`.
#[must_use]
pub fn artifact_name(address: &str) -> &str {
    let object = address.rsplit(['/', '\\']).next().unwrap_or(address);
    object.rsplit_once('_').map_or(object, |(name, _)| name)
}
