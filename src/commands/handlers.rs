//! Command handlers
//!
//! Turns a parsed command into a storage request, runs it and prints the
//! outcome. Everything here blocks; the binary runs it on a worker thread.

use log::{info, warn};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use crate::commands::parser::Command;
use crate::config::StorageConfig;
use crate::error::{AppError, FilesError};
use crate::storage::requests::extension_of;
use crate::storage::{
    self, DuplicateRequest, DuplicateResult, FileSource, IncomingFile, RemovalRequest,
    RemoveOutcome, UploadConfig,
};

/// Run a single command to completion
pub fn run(command: Command, config: &StorageConfig) -> Result<(), AppError> {
    match command {
        Command::Upload {
            source,
            dir,
            name,
            max_size,
            allowed,
            no_validate,
            consume,
        } => {
            let mut upload = UploadConfig::from_defaults(config);
            upload.directory = dir;
            upload.file_name = name;
            if max_size.is_some() {
                upload.max_size = max_size;
            }
            if !allowed.is_empty() {
                upload.allowed_extensions = Some(allowed);
            }
            handle_upload(config, &source, &upload, no_validate, consume)
        }
        Command::List { path } => handle_list(config, path.as_deref()),
        Command::Download { name, dir, output } => {
            handle_download(config, &name, dir.as_deref(), output.as_deref())
        }
        Command::Remove {
            name,
            dir,
            remove_if_empty,
        } => handle_remove(
            config,
            &RemovalRequest {
                file_name: name,
                path: dir,
                remove_if_empty,
            },
        ),
        Command::Duplicate {
            from,
            file,
            to,
            rename,
        } => handle_duplicate(
            config,
            &DuplicateRequest {
                source_path: from,
                source_file_name: file,
                destination_path: to,
                destination_file_name: rename,
            },
        ),
    }
}

/// Wrap a local file as an incoming upload
pub fn incoming_from_path(path: &Path, consume: bool) -> Result<IncomingFile, FilesError> {
    if consume {
        return IncomingFile::from_staged(path);
    }

    let metadata = fs::metadata(path).map_err(|e| FilesError::io(path, e))?;
    if !metadata.is_file() {
        return Err(FilesError::FileNotFound(path.to_path_buf()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = extension_of(&name).to_string();
    let reader = File::open(path).map_err(|e| FilesError::io(path, e))?;

    Ok(IncomingFile::new(
        name,
        extension,
        metadata.len(),
        FileSource::Reader(Box::new(reader)),
    ))
}

fn handle_upload(
    config: &StorageConfig,
    source: &Path,
    upload: &UploadConfig,
    no_validate: bool,
    consume: bool,
) -> Result<(), AppError> {
    let file = incoming_from_path(source, consume)?;

    let result = if no_validate {
        storage::save_file(config, file, upload)?
    } else {
        storage::upload(config, file, upload)?
    };

    println!(
        "Stored {} ({} bytes)",
        result.file_path.display(),
        result.bytes_written
    );
    Ok(())
}

fn handle_list(config: &StorageConfig, path: Option<&Path>) -> Result<(), AppError> {
    let listing = storage::list_directory(config, path)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for entry in &listing.entries {
        writeln!(out, "{}", entry)?;
    }
    out.flush()?;
    Ok(())
}

fn handle_download(
    config: &StorageConfig,
    name: &str,
    dir: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), AppError> {
    let download = storage::prepare_download(config, name, dir)?;
    let mut input = File::open(&download.file_path)
        .map_err(|e| FilesError::io(&download.file_path, e))?;

    let copied = match output {
        Some(target) => {
            let mut file = File::create(target).map_err(|e| FilesError::io(target, e))?;
            io::copy(&mut input, &mut file)?
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let copied = io::copy(&mut input, &mut out)?;
            out.flush()?;
            copied
        }
    };

    info!(
        "Served {} ({} of {} bytes)",
        download.file_path.display(),
        copied,
        download.size
    );
    Ok(())
}

fn handle_remove(config: &StorageConfig, request: &RemovalRequest) -> Result<(), AppError> {
    match storage::remove(config, request)? {
        RemoveOutcome::NothingToRemove => println!("Nothing to remove"),
        RemoveOutcome::Removed {
            path,
            entries_removed,
            directory_removed,
        } => {
            println!("Removed {} entries from {}", entries_removed, path.display());
            if directory_removed {
                println!("Removed empty directory {}", path.display());
            }
        }
    }
    Ok(())
}

fn handle_duplicate(config: &StorageConfig, request: &DuplicateRequest) -> Result<(), AppError> {
    match storage::duplicate(config, request)? {
        DuplicateResult::File { destination, bytes } => {
            println!("Copied to {} ({} bytes)", destination.display(), bytes);
        }
        DuplicateResult::Tree {
            destination,
            report,
        } => {
            println!(
                "Copied {} files ({} bytes) into {}",
                report.files_copied,
                report.bytes_copied,
                destination.display()
            );
            for failure in &report.failures {
                warn!("Not copied: {}", failure);
            }
        }
    }
    Ok(())
}

