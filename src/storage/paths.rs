//! Path resolution
//!
//! Turns optional caller overrides into the directory and file name an
//! operation actually uses.

use std::path::{Component, Path, PathBuf};

use crate::config::StorageConfig;
use crate::error::FilesError;

/// The requested directory, or the configured upload directory
pub fn resolve_directory<'a>(config: &'a StorageConfig, requested: Option<&'a Path>) -> &'a Path {
    requested.unwrap_or(config.default_upload_dir.as_path())
}

/// The explicit name, or the name the file arrived with
pub fn resolve_file_name<'a>(explicit: Option<&'a str>, original: &'a str) -> &'a str {
    explicit.unwrap_or(original)
}

/// Make sure `name` is a single entry name.
///
/// Absolute paths, separators and `.`/`..` are refused, so joining the name
/// onto a directory always yields a direct child of that directory.
pub fn check_entry_name(name: &str) -> Result<(), FilesError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(FilesError::InvalidRequest(format!(
            "'{}' is not a plain file name",
            name
        ))),
    }
}

/// `directory/name`, once `name` has passed [`check_entry_name`]
pub fn entry_path(directory: &Path, name: &str) -> Result<PathBuf, FilesError> {
    check_entry_name(name)?;
    Ok(directory.join(name))
}

/// Full path of `name` inside the resolved directory
pub fn resolve_file_path(
    config: &StorageConfig,
    requested_dir: Option<&Path>,
    name: &str,
) -> Result<PathBuf, FilesError> {
    entry_path(resolve_directory(config, requested_dir), name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_falls_back_to_default() {
        let config = StorageConfig::with_upload_dir("/data/uploads");
        assert_eq!(resolve_directory(&config, None), Path::new("/data/uploads"));
        assert_eq!(
            resolve_directory(&config, Some(Path::new("/tmp/x"))),
            Path::new("/tmp/x")
        );
    }

    #[test]
    fn file_name_prefers_explicit() {
        assert_eq!(resolve_file_name(Some("b.txt"), "a.txt"), "b.txt");
        assert_eq!(resolve_file_name(None, "a.txt"), "a.txt");
    }

    #[test]
    fn file_path_joins_directory_and_name() {
        let config = StorageConfig::with_upload_dir("up");
        assert_eq!(
            resolve_file_path(&config, None, "a.txt").unwrap(),
            PathBuf::from("up").join("a.txt")
        );
    }

    #[test]
    fn entry_names_must_stay_in_their_directory() {
        assert!(check_entry_name("a.txt").is_ok());
        assert!(check_entry_name(".hidden").is_ok());
        assert!(check_entry_name("name with spaces.txt").is_ok());

        for name in ["", ".", "..", "/etc/passwd", "/abs/x.txt", "../x.txt", "sub/x.txt"] {
            assert!(
                matches!(check_entry_name(name), Err(FilesError::InvalidRequest(_))),
                "{} should be refused",
                name
            );
        }
    }

    #[test]
    fn file_path_refuses_absolute_names() {
        let config = StorageConfig::with_upload_dir("up");
        assert!(resolve_file_path(&config, None, "/tmp/outside.txt").is_err());
    }
}
