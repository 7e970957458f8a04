use std::io;
use std::path::PathBuf;

/// Result type for sidecar operations
pub type SidecarResult<T> = Result<T, SidecarError>;

/// Sidecar-specific errors
#[derive(Debug)]
pub enum SidecarError {
    /// The sidecar exists but could not be read
    Read(PathBuf, io::Error),

    /// The sidecar is not a valid metadata document
    Parse(PathBuf, serde_json::Error),

    /// The document could not be serialized
    Serialize(serde_json::Error),

    /// The sidecar could not be written or replaced
    Write(PathBuf, io::Error),
}

impl std::fmt::Display for SidecarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read(path, err) => write!(f, "Failed to read {}: {}", path.display(), err),
            Self::Parse(path, err) => write!(f, "Failed to parse {}: {}", path.display(), err),
            Self::Serialize(err) => write!(f, "Failed to serialize metadata: {}", err),
            Self::Write(path, err) => write!(f, "Failed to write {}: {}", path.display(), err),
        }
    }
}

impl std::error::Error for SidecarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(_, err) | Self::Write(_, err) => Some(err),
            Self::Parse(_, err) | Self::Serialize(err) => Some(err),
        }
    }
}
