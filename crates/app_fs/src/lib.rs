//! PhotoSieve File System Layer
//!
//! Provides the file system collaborators of a culling session:
//! - Image listing for a picked directory
//! - Export (copy) of the kept set
//! - Opening paths with the OS handler

mod browser;
mod file_operations;

pub use browser::{ListOptions, SortBy, list_images, has_extension, DEFAULT_IMAGE_EXTENSIONS};
pub use file_operations::{DefaultFileOperations, FileOpError, FileOperations};

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, FsError>;
