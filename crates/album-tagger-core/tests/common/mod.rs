#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Create a file with dummy image bytes at `relative` below `root`
pub fn create_test_image(root: &Path, relative: &str) -> PathBuf {
    let file_path = root.join(relative);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    let mut file = File::create(&file_path).unwrap();
    file.write_all(b"DUMMY IMAGE DATA").unwrap();
    file_path
}

/// Build a temporary album from a list of relative file paths
pub fn create_album(files: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for relative in files {
        create_test_image(dir.path(), relative);
    }
    dir
}

/// Write a raw sidecar into `root`
pub fn write_sidecar(root: &Path, json: &str) {
    fs::write(root.join("metadata.json"), json).unwrap();
}

/// Move a file within the album, creating the destination folder
pub fn move_file(root: &Path, from: &str, to: &str) {
    let destination = root.join(to);
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::rename(root.join(from), destination).unwrap();
}

pub fn read_sidecar(root: &Path) -> serde_json::Value {
    let text = fs::read_to_string(root.join("metadata.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}
