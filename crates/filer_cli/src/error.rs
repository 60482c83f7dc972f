//! CLI-level errors.

use thiserror::Error;

/// Failures detected by the CLI itself rather than by the Filer.
#[derive(Debug, Error)]
pub enum CliError {
    /// A backend needs an option the user did not pass.
    #[error("the {backend} backend requires {option}")]
    MissingOption {
        /// Selected backend.
        backend: String,
        /// The missing option, as spelled on the command line.
        option: &'static str,
    },

    /// A batch finished with failed members.
    #[error("{operation}: {failed} of {attempted} artifacts failed")]
    BatchFailed {
        /// Batch operation name.
        operation: &'static str,
        /// Number of failed members.
        failed: usize,
        /// Number of members attempted.
        attempted: usize,
    },

    /// A destructive command was run without confirmation.
    #[error("{0}")]
    NotConfirmed(String),

    /// Unknown `--format` value.
    #[error("unsupported output format: {0}")]
    UnknownFormat(String),
}
