//! Command-line parsing
//!
//! Defines the subcommands the binary understands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Validate, store, list, remove and duplicate files under an upload directory.
#[derive(Parser, Debug)]
#[command(name = "rax-files", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Path to a TOML configuration file. Defaults to ./config.toml when present.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Validate a local file and store it in the upload directory
    Upload {
        /// File to upload
        source: PathBuf,

        /// Target directory instead of the configured upload directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Stored file name, extension included
        #[arg(long)]
        name: Option<String>,

        /// Maximum size in bytes
        #[arg(long)]
        max_size: Option<u64>,

        /// Allowed extensions, comma separated
        #[arg(long = "allow", value_delimiter = ',')]
        allowed: Vec<String>,

        /// Skip validation and store directly
        #[arg(long)]
        no_validate: bool,

        /// Move the source into place instead of copying it
        #[arg(long = "move")]
        consume: bool,
    },

    /// List the entries of a directory
    #[command(alias = "ls")]
    List {
        /// Directory to list; defaults to the upload directory
        path: Option<PathBuf>,
    },

    /// Write a stored file to stdout or to a local path
    Download {
        /// Name of the stored file
        name: String,

        /// Directory holding the file
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Write here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Remove a file, or everything inside a directory
    #[command(alias = "rm")]
    Remove {
        /// File to remove; without it the whole directory content goes
        #[arg(long)]
        name: Option<String>,

        /// Directory to act on
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Delete the directory too when it ends up empty
        #[arg(long)]
        remove_if_empty: bool,
    },

    /// Copy a single file or a whole directory tree
    #[command(alias = "cp")]
    Duplicate {
        /// Source directory
        #[arg(long)]
        from: Option<PathBuf>,

        /// File inside the source directory; omit to copy the whole tree
        #[arg(long)]
        file: Option<String>,

        /// Destination directory, created when missing
        #[arg(long)]
        to: Option<PathBuf>,

        /// New name for a single-file copy
        #[arg(long)]
        rename: Option<String>,
    },
}
