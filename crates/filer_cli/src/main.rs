//! Filer CLI
//!
//! Command-line front end for a Filer directory.
//!
//! # Commands
//!
//! - `list` - Show registered artifacts and their status
//! - `store` / `load` - Copy a file into or out of the registry
//! - `push` / `pull` - Sync one artifact with the remote store
//! - `push-all` / `pull-all` - Sync every eligible artifact
//! - `remove` / `remove-locals` - Unregister artifacts

mod commands;
mod error;

use clap::{Parser, Subcommand};
use commands::Connection;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Track artifacts in a local directory and sync them with a remote store.
#[derive(Parser)]
#[command(name = "filer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Local artifact directory
    #[arg(global = true, short, long, default_value = ".")]
    dir: PathBuf,

    /// Remote backend (drive, s3)
    #[arg(global = true, short, long, default_value = "drive")]
    backend: String,

    /// Remote descriptor: mirror directory for drive, `bucket[/prefix]` for s3
    #[arg(global = true, short, long)]
    remote: Option<String>,

    /// Directory holding buckets for the s3 backend
    #[arg(global = true, long)]
    object_root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered artifacts
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Store a file as an artifact
    Store {
        /// Artifact name
        name: String,

        /// File whose bytes become the payload
        #[arg(short, long)]
        file: PathBuf,

        /// Push right after storing
        #[arg(short, long)]
        push: bool,

        /// Replace an existing local artifact
        #[arg(short, long)]
        overwrite: bool,
    },

    /// Write an artifact's payload to a file
    Load {
        /// Artifact name
        name: String,

        /// Destination file
        #[arg(short, long)]
        out: PathBuf,

        /// Fail instead of pulling a missing payload
        #[arg(long)]
        no_pull: bool,
    },

    /// Upload a local artifact
    Push {
        /// Artifact name
        name: String,
    },

    /// Download a synced artifact missing locally
    Pull {
        /// Artifact name
        name: String,
    },

    /// Upload every local artifact
    PushAll,

    /// Download every synced artifact missing locally
    PullAll,

    /// Unregister an artifact and delete its local payload
    Remove {
        /// Artifact name
        name: String,

        /// Also delete the remote object
        #[arg(long)]
        delete_remote: bool,
    },

    /// Delete every local-only artifact (destroys their only copy)
    RemoveLocals {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Commands::Version = cli.command {
        println!("Filer CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("Filer Core v{}", filer_core::VERSION);
        return Ok(());
    }

    let connection = Connection {
        dir: cli.dir,
        backend: cli.backend,
        remote: cli.remote,
        object_root: cli.object_root,
    };
    let filer = connection.open()?;

    match cli.command {
        Commands::List { format } => commands::list::run(&filer, &format)?,
        Commands::Store {
            name,
            file,
            push,
            overwrite,
        } => commands::artifact::store(&filer, &name, &file, push, overwrite)?,
        Commands::Load { name, out, no_pull } => {
            commands::artifact::load(&filer, &name, &out, !no_pull)?;
        }
        Commands::Push { name } => commands::sync::push(&filer, &name)?,
        Commands::Pull { name } => commands::sync::pull(&filer, &name)?,
        Commands::PushAll => commands::sync::push_all(&filer)?,
        Commands::PullAll => commands::sync::pull_all(&filer)?,
        Commands::Remove {
            name,
            delete_remote,
        } => commands::artifact::remove(&filer, &name, delete_remote)?,
        Commands::RemoveLocals { yes } => commands::sync::remove_locals(&filer, yes)?,
        Commands::Version => {}
    }

    Ok(())
}
