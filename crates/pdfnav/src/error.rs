//! Error types and traversal limits for the catalog layer.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides
//! [`CatalogError`] for every structural violation the layer can detect,
//! and [`Limits`] for configuring the bounds that keep recursive tree
//! walks from overflowing on pathological documents.

use lopdf::ObjectId;
use thiserror::Error;

/// Error type for catalog, outline, and named-destination operations.
///
/// Structural violations abort the operation in progress and leave no
/// partial mutation behind. Tolerable malformation (a destination value
/// that does not coerce, a non-string name-tree key) is never reported
/// through this type — such entries are silently dropped.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The trailer has no usable `Root` entry.
    #[error("document has no catalog object")]
    NoCatalog,

    /// A page that was already flushed was passed to add or insert.
    #[error("flushed page {0:?} cannot be added or inserted")]
    FlushedPage(ObjectId),

    /// A page created by a different document was passed to add or insert.
    #[error("page {0:?} belongs to another document and cannot be added")]
    ForeignPage(ObjectId),

    /// The catalog was asked to flush outside the document close sequence.
    #[error("the catalog must not be flushed manually; it is flushed when the document closes")]
    ManualCatalogFlush,

    /// `close` was called on a document that is already closed.
    #[error("document is already closed")]
    AlreadyClosed,

    /// A page index was outside the current page range.
    #[error("page index {index} is out of range for a document with {count} pages")]
    PageIndexOutOfRange {
        /// The requested 0-based index.
        index: usize,
        /// The number of pages in the document.
        count: usize,
    },

    /// An outline item was reached twice during one build.
    #[error("outline item {0:?} was visited twice; the outline tree contains a cycle")]
    OutlineCycle(ObjectId),

    /// An outline item has no `Title` string.
    #[error("outline item {0:?} has no Title entry")]
    MissingOutlineTitle(ObjectId),

    /// A name-tree kid was reached twice during one flattening pass.
    #[error("name tree node {0:?} was visited twice; the name tree contains a cycle")]
    NameTreeCycle(ObjectId),

    /// A `Pages` node was reached twice while loading the page tree.
    #[error("pages node {0:?} was visited twice; the page tree contains a cycle")]
    PageTreeCycle(ObjectId),

    /// A text string carried a UTF-16BE BOM but was not valid UTF-16BE.
    #[error("string is not valid UTF-16BE text")]
    MalformedText,

    /// A configured traversal limit was exceeded.
    #[error("traversal limit exceeded: {limit_name} (limit: {limit_value})")]
    LimitExceeded {
        /// Name of the limit that was exceeded (e.g., "max_outline_depth").
        limit_name: &'static str,
        /// The configured limit value.
        limit_value: usize,
    },

    /// An error from the underlying object graph.
    #[error(transparent)]
    Graph(#[from] lopdf::Error),
}

/// Bounds for the recursive tree walks.
///
/// PDF imposes no depth limit on outline or name trees, so an unguarded
/// walk can overflow the stack or loop forever on malformed input. Each
/// walk checks these bounds and fails with
/// [`CatalogError::LimitExceeded`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum outline nesting depth.
    pub max_outline_depth: usize,
    /// Maximum number of outline items in one build.
    pub max_outline_items: usize,
    /// Maximum name-tree nesting depth.
    pub max_name_tree_depth: usize,
    /// Maximum page-tree nesting depth while loading.
    pub max_page_tree_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_outline_depth: 64,
            max_outline_items: 10_000,
            max_name_tree_depth: 64,
            max_page_tree_depth: 64,
        }
    }
}

impl Limits {
    pub(crate) fn exceeded(limit_name: &'static str, limit_value: usize) -> CatalogError {
        CatalogError::LimitExceeded {
            limit_name,
            limit_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_flush_message() {
        let err = CatalogError::ManualCatalogFlush;
        assert!(err.to_string().contains("must not be flushed manually"));
    }

    #[test]
    fn limit_exceeded_names_the_limit() {
        let err = Limits::exceeded("max_outline_depth", 64);
        assert_eq!(
            err.to_string(),
            "traversal limit exceeded: max_outline_depth (limit: 64)"
        );
    }

    #[test]
    fn out_of_range_reports_index_and_count() {
        let err = CatalogError::PageIndexOutOfRange { index: 9, count: 3 };
        assert!(err.to_string().contains('9'));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn graph_errors_convert() {
        let graph_err = lopdf::Document::new().get_object((7, 0)).unwrap_err();
        let err: CatalogError = graph_err.into();
        assert!(matches!(err, CatalogError::Graph(_)));
    }

    #[test]
    fn default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_outline_depth, 64);
        assert_eq!(limits.max_outline_items, 10_000);
        assert_eq!(limits.max_name_tree_depth, 64);
    }

    #[test]
    fn implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(CatalogError::NoCatalog);
        assert!(err.to_string().contains("no catalog"));
    }
}
