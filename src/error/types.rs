//! Error types
//!
//! Defines the error values returned by every storage operation.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Reasons an incoming file is refused before anything touches the disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    ExtensionNotAllowed { extension: String },
    TooLarge { size: u64, max_size: u64 },
    UnsafeName { name: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::ExtensionNotAllowed { extension } => {
                write!(f, "Extension not allowed: '{}'", extension)
            }
            ValidationError::TooLarge { size, max_size } => write!(
                f,
                "File too large: {} bytes exceeds the limit of {} bytes",
                size, max_size
            ),
            ValidationError::UnsafeName { name } => {
                write!(f, "File name contains unsafe characters: {}", name)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Storage errors
#[derive(Debug)]
pub enum FilesError {
    ValidationFailed(ValidationError),
    FileNotFound(PathBuf),
    DirectoryNotFound(PathBuf),
    NotADirectory(PathBuf),
    AlreadyExists(PathBuf),
    InvalidRequest(String),
    DepthExceeded(PathBuf),
    IoFailure { path: PathBuf, source: io::Error },
}

impl FilesError {
    /// Wraps an I/O error together with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FilesError::IoFailure {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for FilesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilesError::ValidationFailed(e) => write!(f, "Validation failed: {}", e),
            FilesError::FileNotFound(p) => write!(f, "File not found: {}", p.display()),
            FilesError::DirectoryNotFound(p) => {
                write!(f, "Directory not found: {}", p.display())
            }
            FilesError::NotADirectory(p) => write!(f, "Not a directory: {}", p.display()),
            FilesError::AlreadyExists(p) => write!(f, "File already exists: {}", p.display()),
            FilesError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            FilesError::DepthExceeded(p) => {
                write!(f, "Directory tree too deep at: {}", p.display())
            }
            FilesError::IoFailure { path, source } => {
                write!(f, "I/O failure on {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for FilesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FilesError::ValidationFailed(e) => Some(e),
            FilesError::IoFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ValidationError> for FilesError {
    fn from(error: ValidationError) -> Self {
        FilesError::ValidationFailed(error)
    }
}

/// Errors surfaced by the command-line front end
#[derive(Debug)]
pub enum AppError {
    Config(config::ConfigError),
    Files(FilesError),
    Io(io::Error),
    TimedOut(u64),
    WorkerFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "Configuration error: {}", e),
            AppError::Files(e) => write!(f, "{}", e),
            AppError::Io(e) => write!(f, "I/O error: {}", e),
            AppError::TimedOut(secs) => write!(f, "Operation timed out after {}s", secs),
            AppError::WorkerFailed(msg) => write!(f, "Worker failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<config::ConfigError> for AppError {
    fn from(error: config::ConfigError) -> Self {
        AppError::Config(error)
    }
}

impl From<FilesError> for AppError {
    fn from(error: FilesError) -> Self {
        AppError::Files(error)
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        AppError::Io(error)
    }
}
