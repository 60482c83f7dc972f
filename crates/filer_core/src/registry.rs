//! Durable artifact registry.
//!
//! The registry is a flat record file mapping artifact names to their
//! status. Records are never edited in place: `add` appends a line, `remove`
//! rewrites the file without the record, and `replace` does both in a single
//! rewrite. A record on disk is therefore always either the old state or the
//! new one, never a blend.
//!
//! Rewrites are O(n) in the number of records. Registries are expected to
//! hold tens to low thousands of entries.

use crate::dir::sync_directory;
use crate::error::{FilerError, FilerResult};
use crate::format::{encode_record, encode_records, parse_records};
use crate::record::{validate_name, ArtifactRecord};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A registry backed by a single file.
///
/// The registry does no locking of its own; [`crate::Filer`] serializes
/// access.
#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
}

impl Registry {
    /// Opens a registry file, creating it empty if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn open(path: &Path) -> FilerResult<Self> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Returns the path of the registry file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all records in file order.
    pub fn list(&self) -> FilerResult<Vec<ArtifactRecord>> {
        parse_records(&self.read()?)
    }

    /// Finds the record for `name`.
    pub fn find(&self, name: &str) -> FilerResult<Option<ArtifactRecord>> {
        Ok(self.list()?.into_iter().find(|r| r.name() == name))
    }

    /// Returns the number of records.
    pub fn len(&self) -> FilerResult<usize> {
        Ok(self.list()?.len())
    }

    /// Returns true if the registry holds no records.
    pub fn is_empty(&self) -> FilerResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Appends a record.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if a record with the same name exists, or
    /// `InvalidName` if the name is unusable.
    pub fn add(&self, record: ArtifactRecord) -> FilerResult<()> {
        validate_name(record.name())?;

        let contents = self.read()?;
        let records = parse_records(&contents)?;
        if records.iter().any(|r| r.name() == record.name()) {
            return Err(FilerError::DuplicateName {
                name: record.name().to_string(),
            });
        }

        let mut line = String::new();
        if !contents.is_empty() && !contents.ends_with('\n') {
            line.push('\n');
        }
        line.push_str(&encode_record(&record));

        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.sync_data()?;
        Ok(())
    }

    /// Removes the record for `name` and returns it.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has this name.
    pub fn remove(&self, name: &str) -> FilerResult<ArtifactRecord> {
        let mut records = self.list()?;
        let index = Self::position(&records, name)?;
        let removed = records.remove(index);

        self.rewrite(&records)?;
        Ok(removed)
    }

    /// Removes the record for `name` and appends `record`, in one rewrite.
    ///
    /// The new record goes to the end of the file, exactly where
    /// `remove` followed by `add` would put it. Returns the old record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record has this name, or `DuplicateName` if
    /// `record` carries a different name that is already taken.
    pub fn replace(&self, name: &str, record: ArtifactRecord) -> FilerResult<ArtifactRecord> {
        validate_name(record.name())?;

        let mut records = self.list()?;
        let index = Self::position(&records, name)?;
        let removed = records.remove(index);

        if records.iter().any(|r| r.name() == record.name()) {
            return Err(FilerError::DuplicateName {
                name: record.name().to_string(),
            });
        }
        records.push(record);

        self.rewrite(&records)?;
        Ok(removed)
    }

    fn position(records: &[ArtifactRecord], name: &str) -> FilerResult<usize> {
        records
            .iter()
            .position(|r| r.name() == name)
            .ok_or_else(|| FilerError::not_found(name))
    }

    fn read(&self) -> FilerResult<String> {
        Ok(fs::read_to_string(&self.path)?)
    }

    /// Replaces the file contents atomically (write temp, sync, rename).
    fn rewrite(&self, records: &[ArtifactRecord]) -> FilerResult<()> {
        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        let mut file = File::create(&temp_path)?;
        file.write_all(encode_records(records).as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &self.path)?;

        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => sync_directory(parent),
            _ => Ok(()),
        }
    }
}
