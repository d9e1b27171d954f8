//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::path::PathBuf;

use crate::error::FilesError;

/// Result of a successful upload or direct save
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResult {
    pub file_path: PathBuf,
    pub bytes_written: u64,
}

/// Result of a directory listing operation
#[derive(Debug, Clone, PartialEq)]
pub struct ListResult {
    pub path: PathBuf,
    /// Sorted entry names; non-UTF-8 bytes become U+FFFD
    pub entries: Vec<String>,
}

/// A file confirmed to exist and ready to be streamed
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    pub file_path: PathBuf,
    pub size: u64,
}

/// Outcome of a removal request
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    /// The request named neither a file nor a path
    NothingToRemove,
    Removed {
        path: PathBuf,
        entries_removed: usize,
        directory_removed: bool,
    },
}

/// Counters and per-entry failures collected by a recursive copy
#[derive(Debug, Default)]
pub struct CopyReport {
    pub files_copied: usize,
    pub directories_created: usize,
    pub bytes_copied: u64,
    pub failures: Vec<FilesError>,
}

impl CopyReport {
    /// True when every entry of the walk was copied
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of a duplicate operation
#[derive(Debug)]
pub enum DuplicateResult {
    File { destination: PathBuf, bytes: u64 },
    Tree { destination: PathBuf, report: CopyReport },
}
