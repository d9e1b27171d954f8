//! Write engine
//!
//! Persists an incoming file into a directory without ever replacing
//! something that is already there.

use log::{debug, error, info, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::FilesError;
use crate::storage::filesystem::{create_directory, directory_exists, entry_exists};
use crate::storage::paths::check_entry_name;
use crate::storage::requests::{FileSource, IncomingFile};
use crate::storage::results::UploadResult;

/// Store `file` as `directory/name`.
///
/// The directory and its missing ancestors are created first. Fails with
/// `AlreadyExists` when the destination is occupied, and with
/// `InvalidRequest` when `name` is not a plain entry name.
pub fn write_file(
    file: IncomingFile,
    directory: &Path,
    name: &str,
) -> Result<UploadResult, FilesError> {
    check_entry_name(name)?;

    if !directory_exists(directory) {
        create_directory(directory).map_err(|e| FilesError::io(directory, e))?;
        info!("Created directory {}", directory.display());
    }

    let destination = directory.join(name);
    if entry_exists(&destination) {
        return Err(FilesError::AlreadyExists(destination));
    }

    let bytes_written = match file.source {
        FileSource::Staged(staged) => persist_staged(&staged, &destination)?,
        FileSource::Reader(mut reader) => persist_stream(&mut reader, &destination)?,
    };

    info!(
        "Stored {} as {} ({} bytes)",
        file.name,
        destination.display(),
        bytes_written
    );

    Ok(UploadResult {
        file_path: destination,
        bytes_written,
    })
}

/// Move a staged upload into place, copying when a rename is not possible
fn persist_staged(staged: &Path, destination: &Path) -> Result<u64, FilesError> {
    let size = fs::metadata(staged)
        .map_err(|e| FilesError::io(staged, e))?
        .len();

    match fs::rename(staged, destination) {
        Ok(()) => Ok(size),
        Err(e) => {
            debug!(
                "Rename {} -> {} failed ({}), copying instead",
                staged.display(),
                destination.display(),
                e
            );

            let mut source = File::open(staged).map_err(|e| FilesError::io(staged, e))?;
            let bytes = persist_stream(&mut source, destination)?;

            if let Err(e) = fs::remove_file(staged) {
                warn!("Failed to remove staged file {}: {}", staged.display(), e);
            }

            Ok(bytes)
        }
    }
}

/// Copy a stream into a file that must not exist yet
fn persist_stream<R: Read + ?Sized>(reader: &mut R, destination: &Path) -> Result<u64, FilesError> {
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
        .map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => FilesError::AlreadyExists(destination.to_path_buf()),
            _ => FilesError::io(destination, e),
        })?;

    let copied = io::copy(reader, &mut output).and_then(|bytes| output.flush().map(|()| bytes));

    match copied {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            error!("Failed to write {}: {}", destination.display(), e);
            drop(output);
            if let Err(e) = fs::remove_file(destination) {
                warn!("Failed to remove partial file {}: {}", destination.display(), e);
            }
            Err(FilesError::io(destination, e))
        }
    }
}
