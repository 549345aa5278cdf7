//! Typed error definitions for bucket_copy.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BucketCopyError {
    #[error("Source directory does not exist: {0}")]
    SourceNotFound(PathBuf),

    #[error("Source path is not a directory: {0}")]
    SourceNotDirectory(PathBuf),

    #[error("Destination exists but is not a directory: {0}")]
    DestinationNotDirectory(PathBuf),

    #[error("Destination must differ from the source directory: {0}")]
    SourceIsDestination(PathBuf),

    #[error("Failed to create destination {path}: {message}")]
    DestinationCreate { path: PathBuf, message: String },

    #[error("Copy failed for {path}: {message}")]
    Copy { path: PathBuf, message: String },

    #[error("No free name left for {0}")]
    NamesExhausted(PathBuf),

    #[error("Operation interrupted by user")]
    Interrupted,
}

impl BucketCopyError {
    /// Stable numeric code, emitted as a structured log field.
    pub fn code(&self) -> u16 {
        match self {
            BucketCopyError::SourceNotFound(_) => 10,
            BucketCopyError::SourceNotDirectory(_) => 11,
            BucketCopyError::DestinationNotDirectory(_) => 12,
            BucketCopyError::SourceIsDestination(_) => 13,
            BucketCopyError::DestinationCreate { .. } => 14,
            BucketCopyError::Copy { .. } => 20,
            BucketCopyError::NamesExhausted(_) => 21,
            BucketCopyError::Interrupted => 30,
        }
    }

    /// Short machine-friendly label.
    pub fn kind(&self) -> &'static str {
        match self {
            BucketCopyError::SourceNotFound(_) => "source_not_found",
            BucketCopyError::SourceNotDirectory(_) => "source_not_directory",
            BucketCopyError::DestinationNotDirectory(_) => "destination_not_directory",
            BucketCopyError::SourceIsDestination(_) => "source_is_destination",
            BucketCopyError::DestinationCreate { .. } => "destination_create",
            BucketCopyError::Copy { .. } => "copy",
            BucketCopyError::NamesExhausted(_) => "names_exhausted",
            BucketCopyError::Interrupted => "interrupted",
        }
    }

    /// True for errors that abort the whole run before any file is touched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            BucketCopyError::SourceNotFound(_)
                | BucketCopyError::SourceNotDirectory(_)
                | BucketCopyError::DestinationNotDirectory(_)
                | BucketCopyError::SourceIsDestination(_)
                | BucketCopyError::DestinationCreate { .. }
        )
    }
}
