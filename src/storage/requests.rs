//! Storage request types
//!
//! Value objects a caller builds for a single operation. Nothing here
//! outlives the call it is passed to.

use std::fmt;
use std::fs;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use crate::config::StorageConfig;
use crate::error::FilesError;

/// Where the bytes of an incoming file come from
pub enum FileSource {
    /// A file already written to disk by the upload handler; persisted by rename
    Staged(PathBuf),
    /// Any readable stream; persisted by copying into a new file
    Reader(Box<dyn Read + Send>),
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileSource::Staged(path) => f.debug_tuple("Staged").field(path).finish(),
            FileSource::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// An uploaded file prior to persistence
#[derive(Debug)]
pub struct IncomingFile {
    pub name: String,
    pub extension: String,
    pub size: u64,
    pub source: FileSource,
}

impl IncomingFile {
    /// Build from declared metadata, as an upload handler reports it
    pub fn new(
        name: impl Into<String>,
        extension: impl Into<String>,
        size: u64,
        source: FileSource,
    ) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
            size,
            source,
        }
    }

    /// Build from in-memory content; extension and size are derived
    pub fn from_bytes(name: impl Into<String>, content: Vec<u8>) -> Self {
        let name = name.into();
        let extension = extension_of(&name).to_string();
        let size = content.len() as u64;
        Self {
            name,
            extension,
            size,
            source: FileSource::Reader(Box::new(Cursor::new(content))),
        }
    }

    /// Build from a staged file on disk
    pub fn from_staged(path: impl Into<PathBuf>) -> Result<Self, FilesError> {
        let path = path.into();
        let metadata = fs::metadata(&path).map_err(|e| FilesError::io(&path, e))?;
        if !metadata.is_file() {
            return Err(FilesError::FileNotFound(path));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = extension_of(&name).to_string();

        Ok(Self {
            name,
            extension,
            size: metadata.len(),
            source: FileSource::Staged(path),
        })
    }
}

/// Extension of a file name without the dot, or "" when there is none
pub fn extension_of(name: &str) -> &str {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
}

/// Validation and destination parameters for an upload.
/// Unset fields disable the matching check or fall back to a default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadConfig {
    pub directory: Option<PathBuf>,
    pub file_name: Option<String>,
    pub max_size: Option<u64>,
    pub allowed_extensions: Option<Vec<String>>,
}

impl UploadConfig {
    /// Limits taken from the process configuration, no destination overrides
    pub fn from_defaults(config: &StorageConfig) -> Self {
        Self {
            directory: None,
            file_name: None,
            max_size: config.max_file_size_bytes,
            allowed_extensions: config.allowed_extensions.clone(),
        }
    }

    pub fn directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directory = Some(dir.into());
        self
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }
}

/// Parameters for duplicating a file or a directory tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuplicateRequest {
    pub source_path: Option<PathBuf>,
    /// Present selects single-file mode
    pub source_file_name: Option<String>,
    pub destination_path: Option<PathBuf>,
    pub destination_file_name: Option<String>,
}

impl DuplicateRequest {
    /// Whole-directory copy from `source` into `destination`
    pub fn directory(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source_path: Some(source.into()),
            destination_path: Some(destination.into()),
            ..Self::default()
        }
    }

    /// Single-file copy of `source/name` into `destination`
    pub fn file(
        source: impl Into<PathBuf>,
        name: impl Into<String>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source_path: Some(source.into()),
            source_file_name: Some(name.into()),
            destination_path: Some(destination.into()),
            destination_file_name: None,
        }
    }

    pub fn rename_to(mut self, name: impl Into<String>) -> Self {
        self.destination_file_name = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.source_path.is_none()
            && self.source_file_name.is_none()
            && self.destination_path.is_none()
            && self.destination_file_name.is_none()
    }
}

/// Parameters for removing a file or the contents of a directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovalRequest {
    pub file_name: Option<String>,
    pub path: Option<PathBuf>,
    pub remove_if_empty: bool,
}

impl RemovalRequest {
    /// Remove one file; the directory defaults to the upload directory
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            file_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Remove everything inside `path`
    pub fn contents_of(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn in_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn remove_if_empty(mut self, flag: bool) -> Self {
        self.remove_if_empty = flag;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_derives_metadata() {
        let file = IncomingFile::from_bytes("report.final.pdf", b"abc".to_vec());
        assert_eq!(file.name, "report.final.pdf");
        assert_eq!(file.extension, "pdf");
        assert_eq!(file.size, 3);
    }

    #[test]
    fn extension_of_handles_edge_cases() {
        assert_eq!(extension_of("a.txt"), "txt");
        assert_eq!(extension_of("IMAGE.PNG"), "PNG");
        assert_eq!(extension_of("no_ext"), "");
        assert_eq!(extension_of(".hidden"), "");
    }

    #[test]
    fn empty_duplicate_request() {
        assert!(DuplicateRequest::default().is_empty());
        assert!(!DuplicateRequest::directory("a", "b").is_empty());
    }

    #[test]
    fn upload_config_from_defaults_copies_limits() {
        let config = StorageConfig {
            max_file_size_bytes: Some(10),
            allowed_extensions: Some(vec!["txt".into()]),
            ..StorageConfig::default()
        };
        let upload = UploadConfig::from_defaults(&config);
        assert_eq!(upload.max_size, Some(10));
        assert_eq!(upload.allowed_extensions, Some(vec!["txt".to_string()]));
        assert!(upload.directory.is_none());
    }
}
