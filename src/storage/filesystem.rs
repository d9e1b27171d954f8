//! File system helpers
//!
//! Small wrappers shared by the storage operations.

use std::fs;
use std::io::Result;
use std::path::{Component, Path, PathBuf};

/// Create a directory and any missing ancestors
pub fn create_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
}

/// Check if file exists
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Check if directory exists
pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Check if anything occupies `path`, including a dangling symlink
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Number of entries directly inside `path`
pub fn count_entries(path: &Path) -> Result<usize> {
    Ok(fs::read_dir(path)?.count())
}

/// True when both paths exist and lead to the same file
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Absolute form of `path` with symlinks and `..` resolved.
///
/// The longest existing prefix is canonicalized; components below it do not
/// exist yet, so they are applied lexically.
pub fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let components: Vec<Component> = absolute.components().collect();

    for split in (1..=components.len()).rev() {
        let prefix: PathBuf = components[..split].iter().collect();
        let Ok(mut resolved) = fs::canonicalize(&prefix) else {
            continue;
        };

        for component in &components[split..] {
            match component {
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(name) => resolved.push(name),
                _ => {}
            }
        }
        return Ok(resolved);
    }

    Ok(absolute)
}

/// Make a directory writable by its owner
#[cfg(unix)]
pub fn make_writable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o700);
    fs::set_permissions(path, permissions)
}

/// Make a directory writable by its owner
#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
pub fn make_writable(path: &Path) -> Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_readonly(false);
    fs::set_permissions(path, permissions)
}
