//! File operations module
//! Provides the copy and open operations used to export a culled set

use std::path::{Path, PathBuf};
use thiserror::Error;

/// File operation errors
#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("File already exists: {0}")]
    AlreadyExists(PathBuf),
}

pub type Result<T> = std::result::Result<T, FileOpError>;

/// File operations trait
pub trait FileOperations {
    /// Copy one file into `target_dir`, keeping its file name
    fn copy_file(&self, source: &Path, target_dir: &Path, overwrite: bool) -> Result<PathBuf>;

    /// Create a directory (and missing parents)
    fn create_dir(&self, path: &Path) -> Result<()>;

    /// Open a file or folder with the default application
    fn open_external(&self, path: &Path) -> Result<()>;
}

/// Default implementation of file operations
#[derive(Debug, Default)]
pub struct DefaultFileOperations;

impl DefaultFileOperations {
    pub fn new() -> Self {
        Self
    }
}

impl FileOperations for DefaultFileOperations {
    fn copy_file(&self, source: &Path, target_dir: &Path, overwrite: bool) -> Result<PathBuf> {
        if !target_dir.exists() {
            return Err(FileOpError::NotFound(target_dir.to_path_buf()));
        }

        if !target_dir.is_dir() {
            return Err(FileOpError::InvalidOperation(
                "Target must be a directory".to_string(),
            ));
        }

        if !source.is_file() {
            return Err(FileOpError::NotFound(source.to_path_buf()));
        }

        let file_name = source
            .file_name()
            .ok_or_else(|| FileOpError::InvalidOperation("Invalid file name".to_string()))?;
        let target = target_dir.join(file_name);

        if target == source {
            return Err(FileOpError::InvalidOperation(format!(
                "Source and target are the same file: {}",
                source.display()
            )));
        }

        if !overwrite && target.exists() {
            return Err(FileOpError::AlreadyExists(target));
        }

        std::fs::copy(source, &target)?;
        tracing::debug!("Copied: {} -> {}", source.display(), target.display());

        Ok(target)
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        if path.is_dir() {
            return Ok(());
        }

        if path.exists() {
            return Err(FileOpError::AlreadyExists(path.to_path_buf()));
        }

        std::fs::create_dir_all(path)?;
        tracing::info!("Created directory: {}", path.display());

        Ok(())
    }

    #[cfg(feature = "open-external")]
    fn open_external(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(FileOpError::NotFound(path.to_path_buf()));
        }

        open::that(path).map_err(|e| {
            FileOpError::InvalidOperation(format!("Failed to open externally: {}", e))
        })?;

        tracing::info!("Opened externally: {}", path.display());
        Ok(())
    }

    #[cfg(not(feature = "open-external"))]
    fn open_external(&self, _path: &Path) -> Result<()> {
        Err(FileOpError::InvalidOperation(
            "Open external feature not enabled".to_string(),
        ))
    }
}
