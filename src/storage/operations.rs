//! Storage operations
//!
//! Entry points for uploading, listing, downloading, removing and
//! duplicating files. Every function takes the process configuration plus an
//! immutable request and returns a definite result.

use log::{error, info, warn};
use std::fs;
use std::path::Path;

use crate::config::StorageConfig;
use crate::error::FilesError;
use crate::storage::filesystem::{
    count_entries, create_directory, directory_exists, entry_exists, file_exists, make_writable,
    resolve_path, same_file,
};
use crate::storage::paths::{
    check_entry_name, entry_path, resolve_directory, resolve_file_name, resolve_file_path,
};
use crate::storage::requests::{DuplicateRequest, IncomingFile, RemovalRequest, UploadConfig};
use crate::storage::results::{
    DownloadResult, DuplicateResult, ListResult, RemoveOutcome, UploadResult,
};
use crate::storage::tree::{copy_tree, delete_tree};
use crate::storage::validation::validate_upload;
use crate::storage::write::write_file;

/// Validate an incoming file and store it.
///
/// Nothing on disk changes unless every check passes.
pub fn upload(
    config: &StorageConfig,
    file: IncomingFile,
    upload: &UploadConfig,
) -> Result<UploadResult, FilesError> {
    if let Err(e) = validate_upload(&file, upload, config.strict_file_names) {
        warn!("Rejected upload of {}: {}", file.name, e);
        return Err(e.into());
    }

    save_file(config, file, upload)
}

/// Store a file without validating it
pub fn save_file(
    config: &StorageConfig,
    file: IncomingFile,
    upload: &UploadConfig,
) -> Result<UploadResult, FilesError> {
    let directory = resolve_directory(config, upload.directory.as_deref());
    let name = resolve_file_name(upload.file_name.as_deref(), &file.name).to_string();

    write_file(file, directory, &name)
}

/// Lists the entry names of a directory, sorted.
///
/// Names that are not valid UTF-8 are converted lossily, so such an entry
/// can be seen here but not addressed by name in other operations.
pub fn list_directory(
    config: &StorageConfig,
    path: Option<&Path>,
) -> Result<ListResult, FilesError> {
    let path = resolve_directory(config, path);

    if !directory_exists(path) {
        return Err(FilesError::DirectoryNotFound(path.to_path_buf()));
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| FilesError::io(path, e))? {
        let entry = entry.map_err(|e| FilesError::io(path, e))?;
        entries.push(entry.file_name().to_string_lossy().into_owned());
    }
    entries.sort();

    info!("Listed directory {} - {} entries", path.display(), entries.len());

    Ok(ListResult {
        path: path.to_path_buf(),
        entries,
    })
}

/// Resolve a file for download and confirm it exists
pub fn prepare_download(
    config: &StorageConfig,
    file_name: &str,
    path: Option<&Path>,
) -> Result<DownloadResult, FilesError> {
    let file_path = resolve_file_path(config, path, file_name)?;

    let metadata = match fs::metadata(&file_path) {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => return Err(FilesError::FileNotFound(file_path)),
    };

    info!("Prepared download of {}", file_path.display());

    Ok(DownloadResult {
        file_path,
        size: metadata.len(),
    })
}

/// Remove one file, or everything inside a directory.
///
/// With a file name, only that file goes. With just a path, every child is
/// removed and the first failure stops the walk. `remove_if_empty` then
/// deletes the directory itself if nothing is left in it, even when the named
/// file turned out to be missing.
pub fn remove(config: &StorageConfig, request: &RemovalRequest) -> Result<RemoveOutcome, FilesError> {
    if request.file_name.is_none() && request.path.is_none() {
        info!("Nothing to remove");
        return Ok(RemoveOutcome::NothingToRemove);
    }

    let path = resolve_directory(config, request.path.as_deref());

    let removed = match &request.file_name {
        Some(name) => remove_single_file(path, name),
        None => remove_contents(path, config.max_tree_depth),
    };

    let entries_removed = match removed {
        Ok(count) => count,
        Err(FilesError::FileNotFound(target)) => {
            if request.remove_if_empty {
                match remove_if_empty(path) {
                    Ok(true) => info!("Removed empty directory {}", path.display()),
                    Ok(false) => {}
                    Err(e) => warn!("Could not remove {}: {}", path.display(), e),
                }
            }
            return Err(FilesError::FileNotFound(target));
        }
        Err(e) => return Err(e),
    };

    let directory_removed = request.remove_if_empty && remove_if_empty(path)?;

    info!(
        "Removed {} entries from {}{}",
        entries_removed,
        path.display(),
        if directory_removed { " and the directory itself" } else { "" }
    );

    Ok(RemoveOutcome::Removed {
        path: path.to_path_buf(),
        entries_removed,
        directory_removed,
    })
}

fn remove_single_file(directory: &Path, name: &str) -> Result<usize, FilesError> {
    check_entry_name(name)?;

    if directory_exists(directory) {
        if let Err(e) = make_writable(directory) {
            warn!("Could not make {} writable: {}", directory.display(), e);
        }
    }

    let target = directory.join(name);
    if !entry_exists(&target) {
        return Err(FilesError::FileNotFound(target));
    }

    fs::remove_file(&target).map_err(|e| {
        error!("File {} can not be removed: {}", target.display(), e);
        FilesError::io(&target, e)
    })?;

    Ok(1)
}

fn remove_contents(directory: &Path, max_depth: usize) -> Result<usize, FilesError> {
    if !entry_exists(directory) {
        return Err(FilesError::DirectoryNotFound(directory.to_path_buf()));
    }
    if !directory_exists(directory) {
        return Err(FilesError::NotADirectory(directory.to_path_buf()));
    }

    let mut removed = 0;
    for entry in fs::read_dir(directory).map_err(|e| FilesError::io(directory, e))? {
        let entry = entry.map_err(|e| FilesError::io(directory, e))?;
        let child = entry.path();
        let is_dir = entry
            .file_type()
            .map_err(|e| FilesError::io(&child, e))?
            .is_dir();

        if is_dir {
            removed += delete_tree(&child, max_depth).map_err(|e| {
                error!("Directory {} can not be removed: {}", child.display(), e);
                match e {
                    FilesError::IoFailure { source, .. } => FilesError::io(&child, source),
                    other => other,
                }
            })?;
        } else {
            fs::remove_file(&child).map_err(|e| {
                error!("File {} can not be removed: {}", child.display(), e);
                FilesError::io(&child, e)
            })?;
            removed += 1;
        }
    }

    Ok(removed)
}

fn remove_if_empty(directory: &Path) -> Result<bool, FilesError> {
    if !directory_exists(directory) {
        return Ok(false);
    }

    let remaining = count_entries(directory).map_err(|e| FilesError::io(directory, e))?;
    if remaining > 0 {
        return Ok(false);
    }

    fs::remove_dir(directory).map_err(|e| FilesError::io(directory, e))?;
    Ok(true)
}

/// Copy a single file or a whole directory tree.
///
/// A source file name selects single-file mode. In directory mode the
/// operation succeeds once the walk finishes; entries that could not be
/// copied are listed in the returned report.
pub fn duplicate(
    config: &StorageConfig,
    request: &DuplicateRequest,
) -> Result<DuplicateResult, FilesError> {
    if request.is_empty() {
        return Err(FilesError::InvalidRequest(
            "the duplicate request is empty".into(),
        ));
    }

    let (Some(source), Some(destination)) = (&request.source_path, &request.destination_path)
    else {
        return Err(FilesError::InvalidRequest(
            "both a source path and a destination path are required".into(),
        ));
    };

    match &request.source_file_name {
        Some(name) => {
            let new_name = request
                .destination_file_name
                .as_deref()
                .filter(|n| !n.is_empty());
            duplicate_file(source, name, destination, new_name)
        }
        None => duplicate_tree(source, destination, config.max_tree_depth),
    }
}

fn duplicate_file(
    source_dir: &Path,
    name: &str,
    destination_dir: &Path,
    new_name: Option<&str>,
) -> Result<DuplicateResult, FilesError> {
    let source = entry_path(source_dir, name)?;
    let target_name = new_name.unwrap_or(name);
    check_entry_name(target_name)?;

    if !file_exists(&source) {
        return Err(FilesError::FileNotFound(source));
    }

    if !directory_exists(destination_dir) {
        create_directory(destination_dir).map_err(|e| FilesError::io(destination_dir, e))?;
    }

    let destination = destination_dir.join(target_name);
    if same_file(&source, &destination) {
        return Err(FilesError::InvalidRequest(format!(
            "{} would be copied onto itself",
            source.display()
        )));
    }

    let bytes = fs::copy(&source, &destination).map_err(|e| FilesError::io(&destination, e))?;

    info!(
        "Duplicated {} -> {} ({} bytes)",
        source.display(),
        destination.display(),
        bytes
    );

    Ok(DuplicateResult::File { destination, bytes })
}

fn duplicate_tree(
    source: &Path,
    destination: &Path,
    max_depth: usize,
) -> Result<DuplicateResult, FilesError> {
    if !directory_exists(source) {
        return Err(FilesError::NotADirectory(source.to_path_buf()));
    }

    if is_within(destination, source) {
        return Err(FilesError::InvalidRequest(format!(
            "destination {} lies inside the source tree {}",
            destination.display(),
            source.display()
        )));
    }

    let report = copy_tree(source, destination, max_depth);

    info!(
        "Duplicated tree {} -> {}: {} files, {} directories created, {} failures",
        source.display(),
        destination.display(),
        report.files_copied,
        report.directories_created,
        report.failures.len()
    );

    Ok(DuplicateResult::Tree {
        destination: destination.to_path_buf(),
        report,
    })
}

fn is_within(inner: &Path, outer: &Path) -> bool {
    match (resolve_path(inner), resolve_path(outer)) {
        (Ok(inner), Ok(outer)) => inner.starts_with(outer),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn is_within_detects_nested_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        assert!(is_within(&source.join("copy"), &source));
        assert!(is_within(&source, &source));
        assert!(!is_within(&temp_dir.path().join("srcx"), &source));
    }

    #[test]
    fn is_within_resolves_parent_components() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("a");
        fs::create_dir(&source).unwrap();
        fs::create_dir(temp_dir.path().join("b")).unwrap();

        assert!(is_within(&temp_dir.path().join("b/../a/copy"), &source));
        assert!(!is_within(&temp_dir.path().join("a/../b/copy"), &source));
    }

    #[cfg(unix)]
    #[test]
    fn is_within_follows_symlinks_into_the_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("a");
        fs::create_dir(&source).unwrap();
        std::os::unix::fs::symlink(&source, temp_dir.path().join("alias")).unwrap();

        assert!(is_within(&temp_dir.path().join("alias/copy"), &source));
    }

    #[test]
    fn remove_contents_rejects_files() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("f.txt");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(
            remove_contents(&file, 8),
            Err(FilesError::NotADirectory(_))
        ));
    }

    #[test]
    fn remove_if_empty_keeps_non_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("f.txt"), b"x").unwrap();

        assert!(!remove_if_empty(temp_dir.path()).unwrap());
        assert!(temp_dir.path().exists());
    }
}
