//! Application error types

use thiserror::Error;

/// Errors raised by the gallery state machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GalleryError {
    /// Construction with no items, or navigation/discard after the last
    /// item was discarded
    #[error("Gallery has no items")]
    EmptyCollection,

    #[error("Duplicate item in gallery: {0}")]
    DuplicateItem(String),
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Recoverable Errors (notify user, continue) =====
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error(transparent)]
    Gallery(#[from] GalleryError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    // ===== Fatal Errors (application termination) =====
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization failed: {0}")]
    Init(String),
}

impl AppError {
    /// Is this error recoverable?
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Io(_)
                | AppError::FileNotFound(_)
                | AppError::InvalidPath(_)
                | AppError::Gallery(_)
                | AppError::Export(_)
                | AppError::InvalidCommand(_)
        )
    }

    /// Is this a fatal error?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Is this the "nothing to browse" condition the host answers with a
    /// retry-or-cancel prompt?
    pub fn is_empty_collection(&self) -> bool {
        matches!(self, AppError::Gallery(GalleryError::EmptyCollection))
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::FileNotFound(path) => format!("Folder not found: {}", path),
            AppError::InvalidPath(msg) => msg.clone(),
            AppError::Export(msg) => format!("Could not copy images: {}", msg),
            _ => self.to_string(),
        }
    }
}

impl From<app_fs::FsError> for AppError {
    fn from(e: app_fs::FsError) -> Self {
        match e {
            app_fs::FsError::NotFound(p) => AppError::FileNotFound(p),
            app_fs::FsError::InvalidPath(msg) => AppError::InvalidPath(msg),
            app_fs::FsError::Io(e) => AppError::Io(e),
        }
    }
}

impl From<app_fs::FileOpError> for AppError {
    fn from(e: app_fs::FileOpError) -> Self {
        AppError::Export(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let empty = AppError::from(GalleryError::EmptyCollection);
        assert!(empty.is_recoverable());
        assert!(empty.is_empty_collection());
        assert_eq!(empty.user_message(), "Gallery has no items");

        assert!(AppError::Init("x".into()).is_fatal());
        assert!(!AppError::Export("x".into()).is_empty_collection());
    }

    #[test]
    fn test_fs_error_mapping() {
        let err: AppError = app_fs::FsError::NotFound("/nope".into()).into();
        assert!(matches!(err, AppError::FileNotFound(ref p) if p == "/nope"));
    }
}
