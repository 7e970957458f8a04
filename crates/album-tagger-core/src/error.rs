use std::path::PathBuf;
use thiserror::Error;

use crate::sidecar::SidecarError;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the album-tagger library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found error
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The selected root exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Sidecar metadata could not be read or written
    #[error("Sidecar error: {0}")]
    Sidecar(#[from] SidecarError),

    /// A newer root selection started while this one was loading
    #[error("Selection of {0} was superseded by a newer selection")]
    Superseded(PathBuf),

    /// A tag operation was issued before any root was opened
    #[error("No root directory has been opened")]
    NoRootSelected,

    /// Path is not one of the current images
    #[error("No image at {0}")]
    UnknownImage(String),

    /// Tag is empty after trimming
    #[error("Invalid tag: {0:?}")]
    InvalidTag(String),
}
