//! Push, pull and batch commands.

use crate::error::CliError;
use filer_core::{ArtifactStatus, BatchReport, Filer};
use tracing::{info, warn};

/// Pushes one artifact.
pub fn push(filer: &Filer, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    filer.push(name)?;
    let address = filer
        .record(name)?
        .and_then(|r| r.remote_address().map(str::to_string))
        .unwrap_or_default();

    println!("✓ Pushed {name}");
    println!("  Remote: {address}");
    Ok(())
}

/// Pulls one artifact.
pub fn pull(filer: &Filer, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    filer.pull(name)?;
    println!("✓ {name} present at {:?}", filer.local_path(name)?);
    Ok(())
}

/// Pushes every local artifact.
pub fn push_all(filer: &Filer) -> Result<(), Box<dyn std::error::Error>> {
    info!("Pushing all local artifacts");
    let report = filer.push_all()?;
    finish("push-all", "Pushed", &report)
}

/// Pulls every synced artifact missing locally.
pub fn pull_all(filer: &Filer) -> Result<(), Box<dyn std::error::Error>> {
    info!("Pulling all missing artifacts");
    let report = filer.pull_all()?;
    finish("pull-all", "Pulled", &report)
}

/// Removes every local-only artifact. Requires `confirmed`.
pub fn remove_locals(filer: &Filer, confirmed: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirmed {
        let count = filer
            .list_status()?
            .iter()
            .filter(|(_, status)| *status == ArtifactStatus::Local)
            .count();
        return Err(CliError::NotConfirmed(format!(
            "remove-locals would permanently delete {count} local-only artifacts; \
             pass --yes to proceed"
        ))
        .into());
    }

    warn!("Deleting all local-only artifacts");
    let report = filer.remove_locals()?;
    finish("remove-locals", "Removed", &report)
}

fn finish(
    operation: &'static str,
    verb: &str,
    report: &BatchReport,
) -> Result<(), Box<dyn std::error::Error>> {
    print_report(verb, report);

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::BatchFailed {
            operation,
            failed: report.failed.len(),
            attempted: report.attempted(),
        }
        .into())
    }
}

fn print_report(verb: &str, report: &BatchReport) {
    if report.attempted() == 0 {
        println!("Nothing to do");
        return;
    }

    println!("{verb} {} of {}", report.succeeded.len(), report.attempted());
    for name in &report.succeeded {
        println!("  ✓ {name}");
    }
    for (name, err) in &report.failed {
        println!("  ✗ {name}: {err}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filer_core::{FilerConfig, StoreOptions};
    use tempfile::tempdir;

    #[test]
    fn batch_failure_is_an_error() {
        let local = tempdir().unwrap();
        let mirror = tempdir().unwrap();
        let filer = Filer::open(FilerConfig::drive(local.path(), mirror.path())).unwrap();
        filer.store_bytes(b"1", "good", StoreOptions::new()).unwrap();
        filer.store_bytes(b"2", "bad", StoreOptions::new()).unwrap();
        std::fs::remove_file(filer.local_path("bad").unwrap()).unwrap();

        let err = push_all(&filer).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::BatchFailed {
                failed: 1,
                attempted: 2,
                ..
            })
        ));
        assert!(filer.record("good").unwrap().unwrap().is_synced());
    }

    #[test]
    fn remove_locals_needs_confirmation() {
        let local = tempdir().unwrap();
        let mirror = tempdir().unwrap();
        let filer = Filer::open(FilerConfig::drive(local.path(), mirror.path())).unwrap();
        filer.store_bytes(b"1", "only", StoreOptions::new()).unwrap();

        assert!(remove_locals(&filer, false).is_err());
        assert_eq!(filer.records().unwrap().len(), 1);

        remove_locals(&filer, true).unwrap();
        assert!(filer.records().unwrap().is_empty());
    }
}
