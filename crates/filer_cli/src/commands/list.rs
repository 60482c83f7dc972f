//! List command implementation.

use crate::error::CliError;
use filer_core::{ArtifactRecord, Filer};
use serde::Serialize;

/// Listing output.
#[derive(Debug, Serialize)]
pub struct ListResult {
    /// Local directory.
    pub dir: String,
    /// Backend label.
    pub backend: &'static str,
    /// Registered artifacts in registry order.
    pub artifacts: Vec<ArtifactEntry>,
}

/// One listed artifact.
#[derive(Debug, Serialize)]
pub struct ArtifactEntry {
    /// Registry record.
    #[serde(flatten)]
    pub record: ArtifactRecord,
    /// Whether the payload file is present locally.
    pub present: bool,
}

/// Runs the list command.
pub fn run(filer: &Filer, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = collect(filer)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "text" => print_text_output(&result),
        other => return Err(CliError::UnknownFormat(other.to_string()).into()),
    }
    Ok(())
}

fn collect(filer: &Filer) -> Result<ListResult, Box<dyn std::error::Error>> {
    let artifacts = filer
        .records()?
        .into_iter()
        .map(|record| ArtifactEntry {
            present: filer.has_local_payload(record.name()),
            record,
        })
        .collect();

    Ok(ListResult {
        dir: filer.local_dir().display().to_string(),
        backend: filer.backend(),
        artifacts,
    })
}

fn print_text_output(result: &ListResult) {
    println!("Filer: {} ({})", result.dir, result.backend);
    if result.artifacts.is_empty() {
        println!("  (no artifacts)");
        return;
    }

    let width = result
        .artifacts
        .iter()
        .map(|a| a.record.name().len())
        .max()
        .unwrap_or(0);

    for entry in &result.artifacts {
        let marker = if entry.present { ' ' } else { '*' };
        println!(
            " {marker}{:<width$}  {:<6}  {}",
            entry.record.name(),
            entry.record.status().as_str(),
            entry.record.timestamp().format("%Y-%m-%d %H:%M:%S"),
        );
    }

    if result.artifacts.iter().any(|a| !a.present) {
        println!();
        println!("  * payload not present locally");
    }
}
