//! Single-artifact commands: store, load and remove.
//!
//! The CLI treats payloads as opaque bytes. Files are stored verbatim, so a
//! `load` writes back exactly what `store` read.

use filer_core::{Filer, LoadOptions, RemoveOptions, StoreOptions};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Stores the contents of `file` under `name`.
pub fn store(
    filer: &Filer,
    name: &str,
    file: &Path,
    push: bool,
    overwrite: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = fs::read(file)?;
    info!("Storing {:?} as {}", file, name);

    filer.store_bytes(
        &bytes,
        name,
        StoreOptions::new().push(push).overwrite(overwrite),
    )?;

    println!("✓ Stored {name}");
    println!("  Size: {} bytes", bytes.len());
    if let Some(record) = filer.record(name)? {
        println!("  Status: {}", record.status());
        if let Some(address) = record.remote_address() {
            println!("  Remote: {address}");
        }
    }
    Ok(())
}

/// Writes the payload of `name` to `out`.
pub fn load(
    filer: &Filer,
    name: &str,
    out: &Path,
    pull: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = filer.load_bytes(name, LoadOptions::new().pull(pull))?;

    let mut file = fs::File::create(out)?;
    file.write_all(&bytes)?;
    file.sync_all()?;

    println!("✓ Loaded {name} into {:?} ({} bytes)", out, bytes.len());
    Ok(())
}

/// Unregisters `name`, optionally deleting its remote object.
pub fn remove(
    filer: &Filer,
    name: &str,
    delete_remote: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let record = filer.remove(name, RemoveOptions::new().remove_remote(delete_remote))?;

    println!("✓ Removed {name}");
    if let Some(address) = record.remote_address() {
        if delete_remote {
            println!("  Remote object deleted: {address}");
        } else {
            println!("  Remote object kept: {address}");
        }
    }
    Ok(())
}
