//! pdfnav-core: Backend-independent data types for pdfnav-rs.
//!
//! This crate provides the arena-based outline tree ([`OutlineTree`],
//! [`OutlineNode`], [`OutlineId`]) and the flattened [`Bookmark`] summary
//! type used by the lopdf-backed `pdfnav` crate. It has no PDF-library
//! dependency — all functionality is pure Rust.

pub mod bookmark;
pub mod outline;

pub use bookmark::Bookmark;
pub use outline::{OutlineId, OutlineNode, OutlineTree};
