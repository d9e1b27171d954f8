//! File system storage management
//!
//! Handles upload validation, writes, listings, removal and duplication.

pub mod filesystem;
pub mod operations;
pub mod paths;
pub mod requests;
pub mod results;
pub mod tree;
pub mod validation;
pub mod write;

// Re-export the operations and the types callers build or receive
pub use operations::{duplicate, list_directory, prepare_download, remove, save_file, upload};
pub use requests::{DuplicateRequest, FileSource, IncomingFile, RemovalRequest, UploadConfig};
pub use results::{
    CopyReport, DownloadResult, DuplicateResult, ListResult, RemoveOutcome, UploadResult,
};
