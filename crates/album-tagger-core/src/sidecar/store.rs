use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::document::{load_document, persist_document, MetadataDocument, SidecarStatus, TagSet};
use crate::config::{Config, ReconcileStrategy};
use crate::error::{Error, Result};
use crate::reconcile::{reconcile, ReconcileReport};
use crate::types::ImageRecord;

/// Sole owner and writer of the metadata document for one root.
///
/// Mutations are applied to memory first and then written back in full. The
/// document lock is held for the whole apply-then-write sequence, so writes
/// reach the disk in the order the mutations were made and each write carries
/// every earlier mutation. A failed write leaves the in-memory change in place.
pub struct MetadataStore {
    root: PathBuf,
    pretty: bool,
    document: Mutex<MetadataDocument>,
}

impl MetadataStore {
    /// Wrap an already loaded document
    pub fn new(root: &Path, document: MetadataDocument, config: &Config) -> Self {
        Self {
            root: root.to_path_buf(),
            pretty: config.pretty_sidecar,
            document: Mutex::new(document),
        }
    }

    /// Load the sidecar under `root` and take ownership of it
    pub fn open(root: &Path, config: &Config) -> Result<(Self, SidecarStatus)> {
        let loaded = load_document(root, config.corrupt_sidecar)?;
        Ok((Self::new(root, loaded.document, config), loaded.status))
    }

    /// Copy of the current document
    pub fn snapshot(&self) -> MetadataDocument {
        self.lock().clone()
    }

    /// Current tags for `path`
    pub fn tags_for(&self, path: &str) -> TagSet {
        self.lock().tags_for(path)
    }

    /// Add `tag` to `path` and write the document back.
    ///
    /// Returns whether the tag was newly added.
    pub fn add_tag(&self, path: &str, tag: &str) -> Result<bool> {
        let tag = normalize_tag(tag)?;
        self.mutate(|document| document.add_tag(path, tag))
    }

    /// Remove `tag` from `path` and write the document back.
    ///
    /// Returns whether the tag was present.
    pub fn remove_tag(&self, path: &str, tag: &str) -> Result<bool> {
        let tag = normalize_tag(tag)?;
        self.mutate(|document| document.remove_tag(path, tag))
    }

    /// Write the current document again, e.g. after a failed write
    pub fn save(&self) -> Result<()> {
        let document = self.lock();
        persist_document(&self.root, &document, self.pretty)?;
        Ok(())
    }

    /// Repair keys that no longer match `images`, in memory only
    pub fn reconcile(&self, images: &[ImageRecord], strategy: ReconcileStrategy) -> ReconcileReport {
        reconcile(&mut self.lock(), images, strategy)
    }

    fn mutate<F>(&self, apply: F) -> Result<bool>
    where
        F: FnOnce(&mut MetadataDocument) -> bool,
    {
        let mut document = self.lock();
        let changed = apply(&mut document);
        persist_document(&self.root, &document, self.pretty)?;
        Ok(changed)
    }

    fn lock(&self) -> MutexGuard<'_, MetadataDocument> {
        // A panic mid-mutation leaves a usable map; keep serving it
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn normalize_tag(tag: &str) -> Result<&str> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidTag(tag.to_string()));
    }
    Ok(trimmed)
}
