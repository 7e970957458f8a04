//! The `metadata.json` sidecar: the durable path-to-tags document and the
//! store that owns it.

mod document;
mod error;
mod store;


pub use document::{
    load_document, persist_document, LoadedDocument, MetadataDocument, SidecarStatus, TagSet,
    SIDECAR_FILE_NAME,
};
pub use error::{SidecarError, SidecarResult};
pub use store::MetadataStore;
