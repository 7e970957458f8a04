use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Recognized image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    /// Determine format from file extension, case-insensitively
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }
}

/// Opaque reference to the bytes of a scanned image.
///
/// Holds no OS resources; the file is only opened on demand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRef(PathBuf);

impl ContentRef {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(path)
    }

    /// Absolute location of the content on disk
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Open the underlying bytes for reading
    pub fn open(&self) -> io::Result<File> {
        File::open(&self.0)
    }
}

/// One recognized image file found under the scanned root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRecord {
    /// File name including extension
    pub name: String,

    /// Slash-joined path from the scanned root, unique within one scan
    pub relative_path: String,

    /// Parent path segments, empty for files directly in the root
    pub folder: String,

    /// Last modified timestamp
    pub last_modified: SystemTime,

    /// File size in bytes
    pub size: u64,

    /// Image format
    pub format: ImageFormat,

    /// Reference to the file bytes
    pub content: ContentRef,
}
