use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::log_scan_issue;
use crate::sidecar::SIDECAR_FILE_NAME;
use crate::types::{ContentRef, ImageFormat, ImageRecord};

/// An entry that was skipped because it could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanIssue {
    /// Path of the unreadable file or directory, when known
    pub path: Option<PathBuf>,

    /// Human-readable cause
    pub message: String,
}

/// Materialized output of one scan
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Images in traversal order
    pub images: Vec<ImageRecord>,

    /// Subtrees and files that were skipped
    pub issues: Vec<ScanIssue>,
}

/// Depth-first iterator over the images below a root.
///
/// Every call to [`walk_images`] starts a fresh traversal. Unreadable
/// directories and files are skipped and recorded rather than ending the walk.
pub struct ImageWalker {
    root: PathBuf,
    entries: walkdir::IntoIter,
    issues: Vec<ScanIssue>,
}

impl ImageWalker {
    /// Issues collected so far
    pub fn issues(&self) -> &[ScanIssue] {
        &self.issues
    }

    /// Stop walking and hand back the collected issues
    pub fn into_issues(self) -> Vec<ScanIssue> {
        self.issues
    }

    fn record_issue(&mut self, path: Option<&Path>, message: String) {
        log_scan_issue(path, &message);
        self.issues.push(ScanIssue {
            path: path.map(Path::to_path_buf),
            message,
        });
    }

    fn to_record(&self, entry: &DirEntry) -> io::Result<Option<ImageRecord>> {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if name == SIDECAR_FILE_NAME {
            return Ok(None);
        }

        let format = match get_image_format(path) {
            Some(format) => format,
            None => return Ok(None),
        };

        let (size, last_modified) = get_file_metadata(path)?;
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let relative_path = join_segments(relative);
        let folder = relative
            .parent()
            .map(join_segments)
            .unwrap_or_default();

        Ok(Some(ImageRecord {
            name,
            relative_path,
            folder,
            last_modified,
            size,
            format,
            content: ContentRef::new(path.to_path_buf()),
        }))
    }
}

impl Iterator for ImageWalker {
    type Item = ImageRecord;

    fn next(&mut self) -> Option<ImageRecord> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf);
                    self.record_issue(path.as_deref(), e.to_string());
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match self.to_record(&entry) {
                Ok(Some(record)) => {
                    log::debug!("Found image {}", record.relative_path);
                    return Some(record);
                }
                Ok(None) => continue,
                Err(e) => self.record_issue(Some(entry.path()), e.to_string()),
            }
        }
    }
}

/// Start a new traversal of `root`
pub fn walk_images(root: &Path, config: &Config) -> Result<ImageWalker> {
    if !root.exists() {
        return Err(Error::FileNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }

    let mut walker = WalkDir::new(root).follow_links(config.follow_links);
    if let Some(max_depth) = config.max_depth {
        walker = walker.max_depth(max_depth);
    }

    Ok(ImageWalker {
        root: root.to_path_buf(),
        entries: walker.into_iter(),
        issues: Vec::new(),
    })
}

/// Scan `root` and collect every recognized image
pub fn discover_images(root: &Path, config: &Config) -> Result<ScanResult> {
    let mut walker = walk_images(root, config)?;
    let images: Vec<ImageRecord> = walker.by_ref().collect();
    let issues = walker.into_issues();

    log::info!(
        "Scanned {}: {} images, {} skipped entries",
        root.display(),
        images.len(),
        issues.len()
    );

    Ok(ScanResult { images, issues })
}

/// Returns if the given path has a recognized image extension
pub fn is_image_path(path: &Path) -> bool {
    get_image_format(path).is_some()
}

/// Get image format from file extension
fn get_image_format(path: &Path) -> Option<ImageFormat> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
}

/// Get file size and modification time
fn get_file_metadata(path: &Path) -> io::Result<(u64, std::time::SystemTime)> {
    let metadata = fs::metadata(path)?;
    Ok((metadata.len(), metadata.modified()?))
}

fn join_segments(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

// -- Tests --
