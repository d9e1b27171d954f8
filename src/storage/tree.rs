//! Recursive tree operations
//!
//! Post-order deletion and pre-order copying of directory trees. Symlinks are
//! never descended into, and both walks refuse to go deeper than `max_depth`
//! directory levels below the starting point.

use log::{debug, warn};
use std::fs;
use std::io;
use std::path::Path;

use crate::error::FilesError;
use crate::storage::results::CopyReport;

/// Delete a directory and everything beneath it, or a single file.
///
/// A path that does not exist counts as already deleted. Returns the number
/// of entries removed, the starting path included. Stops at the first entry
/// that cannot be removed; whatever was deleted before stays deleted.
pub fn delete_tree(path: &Path, max_depth: usize) -> Result<usize, FilesError> {
    let removed = delete_entry(path, 0, max_depth)?;
    debug!("Deleted {} entries under {}", removed, path.display());
    Ok(removed)
}

fn delete_entry(path: &Path, depth: usize, max_depth: usize) -> Result<usize, FilesError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(FilesError::io(path, e)),
    };

    if !metadata.is_dir() {
        fs::remove_file(path).map_err(|e| FilesError::io(path, e))?;
        return Ok(1);
    }

    if depth >= max_depth {
        return Err(FilesError::DepthExceeded(path.to_path_buf()));
    }

    let mut removed = 0;
    for entry in fs::read_dir(path).map_err(|e| FilesError::io(path, e))? {
        let entry = entry.map_err(|e| FilesError::io(path, e))?;
        removed += delete_entry(&entry.path(), depth + 1, max_depth)?;
    }

    fs::remove_dir(path).map_err(|e| FilesError::io(path, e))?;
    Ok(removed + 1)
}

/// Copy every entry of `source` into `destination`, creating directories as
/// needed. Failures are recorded in the report and the walk carries on with
/// the next sibling. Existing destination files are overwritten.
pub fn copy_tree(source: &Path, destination: &Path, max_depth: usize) -> CopyReport {
    let mut report = CopyReport::default();
    copy_dir(source, destination, 0, max_depth, &mut report);

    if report.is_complete() {
        debug!(
            "Copied {} -> {}: {} files, {} bytes",
            source.display(),
            destination.display(),
            report.files_copied,
            report.bytes_copied
        );
    } else {
        warn!(
            "Copied {} -> {} with {} failures",
            source.display(),
            destination.display(),
            report.failures.len()
        );
    }

    report
}

fn copy_dir(
    source: &Path,
    destination: &Path,
    depth: usize,
    max_depth: usize,
    report: &mut CopyReport,
) {
    if depth >= max_depth {
        report
            .failures
            .push(FilesError::DepthExceeded(source.to_path_buf()));
        return;
    }

    if !destination.is_dir() {
        match fs::create_dir(destination) {
            Ok(()) => report.directories_created += 1,
            Err(e) => {
                report.failures.push(FilesError::io(destination, e));
                return;
            }
        }
    }

    let entries = match fs::read_dir(source) {
        Ok(entries) => entries,
        Err(e) => {
            report.failures.push(FilesError::io(source, e));
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report.failures.push(FilesError::io(source, e));
                continue;
            }
        };

        let from = entry.path();
        let to = destination.join(entry.file_name());

        let is_dir = match entry.file_type() {
            Ok(file_type) => file_type.is_dir(),
            Err(e) => {
                report.failures.push(FilesError::io(&from, e));
                continue;
            }
        };

        if is_dir {
            copy_dir(&from, &to, depth + 1, max_depth, report);
        } else {
            match fs::copy(&from, &to) {
                Ok(bytes) => {
                    report.files_copied += 1;
                    report.bytes_copied += bytes;
                }
                Err(e) => report.failures.push(FilesError::io(&from, e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn build_tree(root: &Path) {
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir_all(root.join("c")).unwrap();
        fs::write(root.join("top.txt"), b"top").unwrap();
        fs::write(root.join("a/one.txt"), b"one").unwrap();
        fs::write(root.join("a/b/two.bin"), [0u8, 1, 2, 255]).unwrap();
    }

    #[test]
    fn delete_missing_path_is_success() {
        let temp_dir = TempDir::new().unwrap();
        let removed = delete_tree(&temp_dir.path().join("nope"), 8).unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn delete_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("f.txt");
        fs::write(&file, b"x").unwrap();

        assert_eq!(delete_tree(&file, 8).unwrap(), 1);
        assert!(!file.exists());
    }

    #[test]
    fn delete_counts_every_entry_and_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        build_tree(&root);

        // 3 files + 3 directories (a, a/b, c) + root
        assert_eq!(delete_tree(&root, 8).unwrap(), 7);
        assert!(!root.exists());
        assert!(temp_dir.path().exists());
    }

    #[test]
    fn delete_refuses_trees_deeper_than_limit() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        fs::create_dir_all(root.join("a/b")).unwrap();

        let result = delete_tree(&root, 2);
        assert!(matches!(result, Err(FilesError::DepthExceeded(_))));
    }

    #[cfg(unix)]
    #[test]
    fn delete_does_not_follow_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let outside = temp_dir.path().join("outside");
        fs::create_dir(&outside).unwrap();
        fs::write(outside.join("keep.txt"), b"keep").unwrap();

        let root = temp_dir.path().join("root");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(&outside, root.join("link")).unwrap();

        delete_tree(&root, 8).unwrap();

        assert!(!root.exists());
        assert!(outside.join("keep.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn delete_stops_at_first_entry_that_cannot_be_removed() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("root");
        let locked = root.join("locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("inner.txt"), b"kept").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o500)).unwrap();

        // Privileged users ignore directory permissions
        if fs::write(locked.join("write-check"), b"").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o700)).unwrap();
            return;
        }

        let result = delete_tree(&root, 8);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o700)).unwrap();

        match result {
            Err(FilesError::IoFailure { path, .. }) => assert_eq!(path, locked.join("inner.txt")),
            other => panic!("expected an I/O failure, got {:?}", other),
        }
        assert_eq!(fs::read(locked.join("inner.txt")).unwrap(), b"kept");
        assert!(root.is_dir());
    }

    #[test]
    fn copy_reproduces_structure_and_content() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let destination = temp_dir.path().join("dst");
        build_tree(&source);

        let report = copy_tree(&source, &destination, 8);

        assert!(report.is_complete());
        assert_eq!(report.files_copied, 3);
        assert_eq!(report.directories_created, 4);
        assert_eq!(report.bytes_copied, 10);
        assert_eq!(fs::read(destination.join("top.txt")).unwrap(), b"top");
        assert_eq!(
            fs::read(destination.join("a/b/two.bin")).unwrap(),
            [0u8, 1, 2, 255]
        );
        assert!(destination.join("c").is_dir());
    }

    #[test]
    fn copy_into_existing_destination_overwrites_files() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let destination = temp_dir.path().join("dst");
        build_tree(&source);
        fs::create_dir(&destination).unwrap();
        fs::write(destination.join("top.txt"), b"old contents").unwrap();

        let report = copy_tree(&source, &destination, 8);

        assert!(report.is_complete());
        assert_eq!(report.directories_created, 3);
        assert_eq!(fs::read(destination.join("top.txt")).unwrap(), b"top");
    }

    #[test]
    fn copy_records_depth_failures_and_continues() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src");
        let destination = temp_dir.path().join("dst");
        build_tree(&source);

        let report = copy_tree(&source, &destination, 2);

        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0], FilesError::DepthExceeded(_)));
        assert!(destination.join("a/one.txt").exists());
        assert!(!destination.join("a/b").exists());
    }
}
