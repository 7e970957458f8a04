use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::error::{SidecarError, SidecarResult};
use crate::config::CorruptSidecarPolicy;
use crate::logging::log_sidecar_write;

/// Reserved file name of the sidecar, at the root of the scanned tree
pub const SIDECAR_FILE_NAME: &str = "metadata.json";

const SIDECAR_TEMP_NAME: &str = ".metadata.json.tmp";

/// Unique tags attached to one path.
///
/// Keeps insertion order so the sidecar and the catalog's tag list stay
/// stable, but compares as a set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag; returns false if it was already present
    pub fn insert(&mut self, tag: &str) -> bool {
        if self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Remove a tag; returns false if it was absent
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// True when every tag in `required` is present
    pub fn is_superset_of<'a, I>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        required.into_iter().all(|tag| self.contains(tag))
    }

    /// Add every tag of `other` that is not already present
    pub fn extend_from(&mut self, other: &TagSet) {
        for tag in other.iter() {
            self.insert(tag);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for TagSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.is_superset_of(other.iter())
    }
}

impl Eq for TagSet {}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        let mut set = TagSet::new();
        for tag in &tags {
            set.insert(tag);
        }
        set
    }
}

impl From<TagSet> for Vec<String> {
    fn from(set: TagSet) -> Self {
        set.0
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

/// On-disk shape of one sidecar entry. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SidecarEntry {
    #[serde(default)]
    tags: Option<TagSet>,
}

/// Mapping from relative path to its tags, as stored in `metadata.json`.
///
/// Keys are kept sorted so the written file is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, SidecarEntry>",
    into = "BTreeMap<String, SidecarEntry>"
)]
pub struct MetadataDocument {
    entries: BTreeMap<String, TagSet>,
}

impl MetadataDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&TagSet> {
        self.entries.get(path)
    }

    /// Tags for `path`, empty when the path has no entry
    pub fn tags_for(&self, path: &str) -> TagSet {
        self.entries.get(path).cloned().unwrap_or_default()
    }

    pub fn contains_key(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagSet)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add `tag` to `path`; returns false if it was already there
    pub fn add_tag(&mut self, path: &str, tag: &str) -> bool {
        self.entries.entry(path.to_string()).or_default().insert(tag)
    }

    /// Remove `tag` from `path`; returns false if it was not there.
    /// An entry whose last tag is removed is dropped.
    pub fn remove_tag(&mut self, path: &str, tag: &str) -> bool {
        let Some(tags) = self.entries.get_mut(path) else {
            return false;
        };
        let removed = tags.remove(tag);
        if removed && tags.is_empty() {
            self.entries.remove(path);
        }
        removed
    }

    pub(crate) fn take(&mut self, path: &str) -> Option<TagSet> {
        self.entries.remove(path)
    }

    pub(crate) fn replace(&mut self, path: &str, tags: TagSet) {
        self.entries.insert(path.to_string(), tags);
    }

    pub(crate) fn merge_into(&mut self, path: &str, tags: &TagSet) {
        self.entries
            .entry(path.to_string())
            .or_default()
            .extend_from(tags);
    }
}

impl From<BTreeMap<String, SidecarEntry>> for MetadataDocument {
    fn from(raw: BTreeMap<String, SidecarEntry>) -> Self {
        let entries = raw
            .into_iter()
            .map(|(path, entry)| (path, entry.tags.unwrap_or_default()))
            .collect();
        Self { entries }
    }
}

impl From<MetadataDocument> for BTreeMap<String, SidecarEntry> {
    fn from(document: MetadataDocument) -> Self {
        document
            .entries
            .into_iter()
            .map(|(path, tags)| (path, SidecarEntry { tags: Some(tags) }))
            .collect()
    }
}

/// What `load_document` found at the root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidecarStatus {
    /// No sidecar yet
    Missing,

    /// Parsed successfully
    Loaded,

    /// Present but unreadable or unparsable; replaced by an empty document
    Corrupt,
}

/// A document together with how it was obtained
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: MetadataDocument,
    pub status: SidecarStatus,
}

/// Read `metadata.json` directly inside `root`.
///
/// A missing sidecar is an empty document. A corrupt one is either an empty
/// document or an error, depending on `policy`.
pub fn load_document(root: &Path, policy: CorruptSidecarPolicy) -> SidecarResult<LoadedDocument> {
    let path = root.join(SIDECAR_FILE_NAME);

    if !path.is_file() {
        log::debug!("No sidecar at {}", path.display());
        return Ok(LoadedDocument {
            document: MetadataDocument::new(),
            status: SidecarStatus::Missing,
        });
    }

    let parsed = fs::read_to_string(&path)
        .map_err(|e| SidecarError::Read(path.clone(), e))
        .and_then(|text| {
            serde_json::from_str::<MetadataDocument>(&text)
                .map_err(|e| SidecarError::Parse(path.clone(), e))
        });

    match parsed {
        Ok(document) => {
            log::info!(
                "Loaded {} metadata entries from {}",
                document.len(),
                path.display()
            );
            Ok(LoadedDocument {
                document,
                status: SidecarStatus::Loaded,
            })
        }
        Err(e) => match policy {
            CorruptSidecarPolicy::Fail => Err(e),
            CorruptSidecarPolicy::Reset => {
                log::warn!("{}; starting from an empty document", e);
                Ok(LoadedDocument {
                    document: MetadataDocument::new(),
                    status: SidecarStatus::Corrupt,
                })
            }
        },
    }
}

/// Write the whole document to `root/metadata.json`, replacing it atomically
pub fn persist_document(
    root: &Path,
    document: &MetadataDocument,
    pretty: bool,
) -> SidecarResult<()> {
    let path = root.join(SIDECAR_FILE_NAME);
    let temp_path = root.join(SIDECAR_TEMP_NAME);

    let written = write_json(&temp_path, document, pretty)
        .and_then(|()| fs::rename(&temp_path, &path).map_err(|e| SidecarError::Write(path.clone(), e)));

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    log_sidecar_write(&path, document.len());
    Ok(())
}

fn write_json(temp_path: &Path, document: &MetadataDocument, pretty: bool) -> SidecarResult<()> {
    let io_err = |e: io::Error| SidecarError::Write(temp_path.to_path_buf(), e);

    let file = File::create(temp_path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);

    let serialized = if pretty {
        serde_json::to_writer_pretty(&mut writer, document)
    } else {
        serde_json::to_writer(&mut writer, document)
    };
    serialized.map_err(SidecarError::Serialize)?;

    writer.flush().map_err(io_err)?;
    writer.get_ref().sync_all().map_err(io_err)?;
    Ok(())
}
