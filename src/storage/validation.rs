//! Upload validation
//!
//! Checks an incoming file against its upload configuration before anything
//! is written. Checks run in a fixed order and stop at the first failure:
//! extension, then size, then file name.

use crate::error::ValidationError;
use crate::storage::paths::resolve_file_name;
use crate::storage::requests::{IncomingFile, UploadConfig};

/// Longest file name, in bytes, accepted regardless of its characters
pub const MAX_FILE_NAME_LENGTH: usize = 250;

/// Run the whole pipeline
pub fn validate_upload(
    file: &IncomingFile,
    upload: &UploadConfig,
    strict_names: bool,
) -> Result<(), ValidationError> {
    check_extension(&file.extension, upload.allowed_extensions.as_deref())?;
    check_size(file.size, upload.max_size)?;

    let name = resolve_file_name(upload.file_name.as_deref(), &file.name);
    check_file_name(name, strict_names)
}

/// Extension must be on the allow-list, when one is configured. Case-sensitive.
pub fn check_extension(extension: &str, allowed: Option<&[String]>) -> Result<(), ValidationError> {
    match allowed {
        Some(list) if !list.iter().any(|e| e == extension) => {
            Err(ValidationError::ExtensionNotAllowed {
                extension: extension.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Size must not exceed the limit, when one is configured
pub fn check_size(size: u64, max_size: Option<u64>) -> Result<(), ValidationError> {
    match max_size {
        Some(max_size) if size > max_size => Err(ValidationError::TooLarge { size, max_size }),
        _ => Ok(()),
    }
}

/// A name passes when it uses only safe characters OR is at most
/// `MAX_FILE_NAME_LENGTH` bytes long. `strict` requires both.
pub fn check_file_name(name: &str, strict: bool) -> Result<(), ValidationError> {
    let safe_chars = has_safe_characters(name);
    let short_enough = name.len() <= MAX_FILE_NAME_LENGTH;

    let accepted = if strict {
        safe_chars && short_enough
    } else {
        safe_chars || short_enough
    };

    if accepted {
        Ok(())
    } else {
        Err(ValidationError::UnsafeName {
            name: name.to_string(),
        })
    }
}

/// Non-empty and made only of `[A-Za-z0-9_.-]`
fn has_safe_characters(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
