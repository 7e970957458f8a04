//! Root selection and the live catalog state for the selected root.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::discovery::{discover_images, ScanIssue};
use crate::error::{Error, Result};
use crate::reconcile::{orphaned_keys, ReconcileReport};
use crate::sidecar::{load_document, MetadataStore, SidecarStatus};
use crate::types::ImageRecord;

/// Summary of a completed `Album::open`
#[derive(Debug, Clone)]
pub struct OpenReport {
    pub root: PathBuf,
    pub images: usize,
    pub issues: Vec<ScanIssue>,
    pub sidecar: SidecarStatus,
    pub reconcile: ReconcileReport,

    /// Keys were migrated in memory but writing them back failed
    pub unsaved_migrations: bool,
}

struct AlbumState {
    root: PathBuf,
    images: Vec<ImageRecord>,
    store: Arc<MetadataStore>,
}

/// The images and tags of the most recently selected root.
///
/// Opening a root scans the tree and loads the sidecar side by side. If
/// another `open` starts before both finish, the older result is dropped and
/// whatever was visible before stays visible.
pub struct Album {
    config: Config,
    generation: AtomicU64,
    state: RwLock<Option<Arc<AlbumState>>>,
}

impl Album {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            generation: AtomicU64::new(0),
            state: RwLock::new(None),
        }
    }

    /// Root of the currently visible state
    pub fn root(&self) -> Option<PathBuf> {
        self.current().map(|state| state.root.clone())
    }

    /// Scan `root`, load its sidecar, repair moved keys and make it current
    pub fn open(&self, root: &Path) -> Result<OpenReport> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!("Opening {}", root.display());

        let (scan, loaded) = rayon::join(
            || discover_images(root, &self.config),
            || load_document(root, self.config.corrupt_sidecar),
        );
        let scan = scan?;
        let loaded = loaded?;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != generation {
            log::info!("Discarding stale results for {}", root.display());
            return Err(Error::Superseded(root.to_path_buf()));
        }

        // Reopening the current root keeps its store, so tag edits made
        // since the sidecar was read are not dropped
        let store = match state.as_ref().filter(|current| current.root == root) {
            Some(current) => {
                log::debug!("Keeping live metadata for {}", root.display());
                Arc::clone(&current.store)
            }
            None => Arc::new(MetadataStore::new(root, loaded.document, &self.config)),
        };

        let report = store.reconcile(&scan.images, self.config.reconcile_strategy);
        let mut unsaved_migrations = false;
        if !report.migrated.is_empty() {
            if let Err(e) = store.save() {
                log::warn!("Could not save reconciled metadata: {}", e);
                unsaved_migrations = true;
            }
        }

        let open_report = OpenReport {
            root: root.to_path_buf(),
            images: scan.images.len(),
            issues: scan.issues,
            sidecar: loaded.status,
            reconcile: report,
            unsaved_migrations,
        };

        *state = Some(Arc::new(AlbumState {
            root: root.to_path_buf(),
            images: scan.images,
            store,
        }));

        Ok(open_report)
    }

    /// Fresh projection of the current images and tags
    pub fn catalog(&self) -> Result<Catalog> {
        let state = self.require()?;
        Ok(Catalog::new(&state.images, &state.store.snapshot()))
    }

    /// Metadata keys that match no current image
    pub fn orphans(&self) -> Result<Vec<String>> {
        let state = self.require()?;
        let document = state.store.snapshot();
        Ok(orphaned_keys(&document, &state.images)
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    /// Tag a current image
    pub fn add_tag(&self, relative_path: &str, tag: &str) -> Result<bool> {
        let state = self.require()?;
        if !state.images.iter().any(|i| i.relative_path == relative_path) {
            return Err(Error::UnknownImage(relative_path.to_string()));
        }
        state.store.add_tag(relative_path, tag)
    }

    /// Untag a path; orphaned keys may be untagged too
    pub fn remove_tag(&self, relative_path: &str, tag: &str) -> Result<bool> {
        self.require()?.store.remove_tag(relative_path, tag)
    }

    /// Write the current document again
    pub fn save(&self) -> Result<()> {
        self.require()?.store.save()
    }

    fn current(&self) -> Option<Arc<AlbumState>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn require(&self) -> Result<Arc<AlbumState>> {
        self.current().ok_or(Error::NoRootSelected)
    }
}
