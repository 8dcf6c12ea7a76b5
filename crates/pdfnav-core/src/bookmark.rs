//! Flattened bookmark summaries.
//!
//! Provides [`Bookmark`], the flat depth-annotated view of an outline tree
//! produced by walking it depth-first. Useful for table-of-contents style
//! listings where the tree structure itself is not needed.

/// A single flattened entry of the document outline.
///
/// Each bookmark records its title, its 0-indexed nesting level (top-level
/// outline entries have level 0), and the 0-indexed destination page number
/// when the destination resolved to a page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bookmark {
    /// The bookmark title text.
    pub title: String,
    /// Nesting depth (0-indexed). Top-level bookmarks have level 0.
    pub level: usize,
    /// The 0-indexed destination page number, if resolvable.
    pub page_number: Option<usize>,
}
