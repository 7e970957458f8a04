//! Read-only join of scanned images and their tags.
//!
//! A [`Catalog`] is rebuilt from scratch whenever the image list or the
//! metadata document changes; it is never stored or patched.

use std::collections::HashSet;

use crate::sidecar::{MetadataDocument, TagSet};
use crate::types::ImageRecord;

/// An image together with its tags
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub image: ImageRecord,
    pub tags: TagSet,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Join `images` with `document`, keeping scan order
    pub fn new(images: &[ImageRecord], document: &MetadataDocument) -> Self {
        let entries = images
            .iter()
            .map(|image| CatalogEntry {
                image: image.clone(),
                tags: document.tags_for(&image.relative_path),
            })
            .collect();
        Self { entries }
    }

    pub fn images(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn entry(&self, relative_path: &str) -> Option<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.image.relative_path == relative_path)
    }

    /// Every distinct tag on a current image, in order of first appearance
    pub fn tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut tags = Vec::new();
        for tag in self.entries.iter().flat_map(|e| e.tags.iter()) {
            if seen.insert(tag) {
                tags.push(tag.to_string());
            }
        }
        tags
    }

    /// Images carrying all of `required`; everything when `required` is empty
    pub fn filter_by_tags<S: AsRef<str>>(&self, required: &[S]) -> Vec<&CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.tags.is_superset_of(required.iter().map(S::as_ref)))
            .collect()
    }

    /// Images with no tags at all
    pub fn filter_by_no_tags(&self) -> Vec<&CatalogEntry> {
        self.entries.iter().filter(|e| e.tags.is_empty()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
