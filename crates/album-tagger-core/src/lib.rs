//! Core functionality for cataloguing a tree of images and their tags.
//!
//! This library provides the components behind an album view:
//! - Recursive discovery of image files under a root
//! - The `metadata.json` sidecar that maps relative paths to tags
//! - Reconciliation of sidecar keys after files are moved or renamed
//! - The merged, read-only catalog consumers filter and display

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use album::{Album, OpenReport};
pub use catalog::{Catalog, CatalogEntry};
pub use config::*;
pub use error::{Error, Result};
pub use sidecar::{MetadataDocument, MetadataStore, SidecarStatus, TagSet};
pub use types::*;

// -- Public Modules --
pub mod album;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod logging;
pub mod reconcile;
pub mod sidecar;
pub mod types;
