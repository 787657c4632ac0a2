//! Filesystem core: path confinement, directory listing, uploads and directory creation.
//!
//! Everything in here works below a single root directory. Client input only ever
//! reaches the filesystem after [`PathResolver::resolve`] has confined it to that root.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub mod mkdir;
pub mod resolver;
pub mod scanner;
pub mod upload;

pub use mkdir::make_directory;
pub use resolver::{join_logical, logical_parent, resolve, PathResolver};
pub use scanner::{DirectoryScanner, EntryFilter};
pub use upload::{validate_filename, StoredUpload, UploadManager};

/// Errors produced by the filesystem core.
#[derive(Debug, Error)]
pub enum FsError {
    /// Traversal attempt or malformed logical path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The resolved path does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A file or directory name with reserved characters.
    #[error("invalid filename: {0}")]
    InvalidFilename(String),

    /// Upload or mkdir collided with an existing entry.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("payload exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    /// The directory itself could not be opened or read.
    #[error("cannot read directory {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The client's upload stream broke off or was malformed.
    #[error("upload stream error: {0}")]
    Stream(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FsError {
    /// Maps an I/O error on `what` onto the matching domain variant.
    pub(crate) fn from_io(err: io::Error, what: &str) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(what.to_string()),
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists(what.to_string()),
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied(what.to_string()),
            _ => FsError::Io(err),
        }
    }
}
