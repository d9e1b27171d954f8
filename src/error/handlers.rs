//! Error handlers
//!
//! Logs errors and maps them to process exit codes.

use crate::error::types::{AppError, FilesError, ValidationError};
use log::{error, warn};

/// Log an application error at the level it deserves
pub fn handle_error(err: &AppError) {
    match err {
        AppError::Files(FilesError::ValidationFailed(_))
        | AppError::Files(FilesError::AlreadyExists(_)) => warn!("{}", err),
        _ => error!("{}", err),
    }
}

/// Convert error to a process exit code
pub fn error_to_exit_code(err: &AppError) -> u8 {
    match err {
        AppError::Files(e) => files_error_code(e),
        AppError::Config(_) => 78,
        AppError::Io(_) => 74,
        AppError::TimedOut(_) => 124,
        AppError::WorkerFailed(_) => 70,
    }
}

fn files_error_code(err: &FilesError) -> u8 {
    match err {
        FilesError::ValidationFailed(ValidationError::ExtensionNotAllowed { .. }) => 10,
        FilesError::ValidationFailed(ValidationError::TooLarge { .. }) => 11,
        FilesError::ValidationFailed(ValidationError::UnsafeName { .. }) => 12,
        FilesError::FileNotFound(_) | FilesError::DirectoryNotFound(_) => 2,
        FilesError::NotADirectory(_) => 3,
        FilesError::AlreadyExists(_) => 4,
        FilesError::InvalidRequest(_) => 64,
        FilesError::DepthExceeded(_) => 5,
        FilesError::IoFailure { .. } => 74,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn validation_reasons_have_distinct_codes() {
        let ext = AppError::Files(
            ValidationError::ExtensionNotAllowed {
                extension: "exe".into(),
            }
            .into(),
        );
        let size = AppError::Files(
            ValidationError::TooLarge {
                size: 10,
                max_size: 5,
            }
            .into(),
        );
        let name = AppError::Files(
            ValidationError::UnsafeName {
                name: "bad name".into(),
            }
            .into(),
        );

        assert_eq!(error_to_exit_code(&ext), 10);
        assert_eq!(error_to_exit_code(&size), 11);
        assert_eq!(error_to_exit_code(&name), 12);
    }

    #[test]
    fn not_found_maps_to_two() {
        let err = AppError::Files(FilesError::FileNotFound(PathBuf::from("x")));
        assert_eq!(error_to_exit_code(&err), 2);
        let err = AppError::Files(FilesError::DirectoryNotFound(PathBuf::from("x")));
        assert_eq!(error_to_exit_code(&err), 2);
    }

    #[test]
    fn timeout_maps_to_124() {
        assert_eq!(error_to_exit_code(&AppError::TimedOut(3)), 124);
    }
}
