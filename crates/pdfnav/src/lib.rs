//! pdfnav: PDF catalog, outline, and named-destination structural layer.
//!
//! This crate builds the document's logical structure over a
//! [`lopdf`] object graph: the catalog with its page delegation and
//! flush guards, the name-tree flattening used to resolve named
//! destinations, and the outline (bookmark) tree with a reverse
//! page→outlines index. It depends on `pdfnav-core` for the
//! backend-independent tree types and does no byte-level PDF parsing of
//! its own.
//!
//! # Example
//!
//! ```
//! use pdfnav::PdfDocument;
//!
//! let mut doc = PdfDocument::new();
//! let page = doc.new_page();
//! doc.add_page(page)?;
//! assert_eq!(doc.page_count(), 1);
//! assert!(doc.outlines(false)?.is_none());
//! # Ok::<(), pdfnav::CatalogError>(())
//! ```

pub mod catalog;
mod destinations;
pub mod document;
pub mod error;
mod name_tree;
pub mod oc_properties;
pub mod outline;
mod pages;
mod text;

pub use catalog::Catalog;
pub use document::{DocumentId, Page, PdfDocument};
pub use error::{CatalogError, Limits};
pub use oc_properties::OcProperties;
pub use outline::{Destination, OUTLINE_ROOT_TITLE};
pub use pdfnav_core;
pub use pdfnav_core::{Bookmark, OutlineId, OutlineNode, OutlineTree};
