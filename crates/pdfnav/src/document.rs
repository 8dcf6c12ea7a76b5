//! Document wrapper and orchestration.
//!
//! [`PdfDocument`] owns the lopdf object graph together with the
//! [`Catalog`] state and routes every catalog operation: page delegation
//! with its preconditions, the outline accessor and its cache rules, the
//! lazy optional-content properties, and the close sequence — the only
//! code path allowed to flush the catalog.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfnav_core::{Bookmark, OutlineId, OutlineTree};

use crate::catalog::{Catalog, OutlineData, OutlineState};
use crate::destinations;
use crate::error::{CatalogError, Limits};
use crate::oc_properties::OcProperties;
use crate::outline::{self, Destination};

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one open [`PdfDocument`] instance.
///
/// Used to verify that a [`Page`] handle is presented back to the
/// document that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a page object of a specific document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    object_id: ObjectId,
    document: DocumentId,
}

impl Page {
    /// The page's object id in the graph.
    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    /// The document this page was created by.
    pub fn document_id(&self) -> DocumentId {
        self.document
    }
}

/// A document: the lopdf object graph plus the catalog built over it.
#[derive(Debug)]
pub struct PdfDocument {
    graph: Document,
    id: DocumentId,
    catalog: Catalog,
    flushed: HashSet<ObjectId>,
    closed: bool,
    limits: Limits,
}

impl PdfDocument {
    /// Create an empty document with a fresh catalog and page tree.
    pub fn new() -> Self {
        let mut graph = Document::with_version("1.5");
        let mut root = Dictionary::new();
        root.set("Type", Object::Name(b"Catalog".to_vec()));
        let catalog_id = graph.add_object(root);
        graph.trailer.set("Root", catalog_id);
        // A graph built two lines above always carries a catalog.
        Self::from_document(graph).expect("fresh document is well-formed")
    }

    /// Parse PDF bytes and build the catalog layer over them.
    ///
    /// # Errors
    ///
    /// Fails when the bytes are not a readable PDF or the trailer has no
    /// usable `Root` entry.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CatalogError> {
        let graph = Document::load_mem(bytes)?;
        Self::from_document(graph)
    }

    /// Build the catalog layer over an already-parsed object graph.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoCatalog`] when the trailer's `Root`
    /// entry is missing or does not reference a dictionary.
    pub fn from_document(graph: Document) -> Result<Self, CatalogError> {
        let mut graph = graph;
        let limits = Limits::default();
        let catalog = Catalog::load(&mut graph, &limits)?;
        Ok(PdfDocument {
            graph,
            id: DocumentId::next(),
            catalog,
            flushed: HashSet::new(),
            closed: false,
            limits,
        })
    }

    /// This document's instance identity.
    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// Access the underlying object graph.
    pub fn graph(&self) -> &Document {
        &self.graph
    }

    /// Mutable access to the underlying object graph for low-level edits.
    ///
    /// Structural edits made here are only observed by the catalog layer
    /// on the next load or forced rebuild; page bookkeeping done behind
    /// the page tree's back is not reconciled.
    pub fn graph_mut(&mut self) -> &mut Document {
        &mut self.graph
    }

    /// The catalog state.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Mutable catalog state (configuration flags).
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// The traversal limits in force.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Replace the traversal limits. Affects subsequent builds only.
    pub fn set_limits(&mut self, limits: Limits) {
        self.limits = limits;
    }

    /// Whether [`close`](Self::close) has run.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ---- pages -----------------------------------------------------------

    /// Allocate a new empty page object owned by this document. The page
    /// is not part of the page tree until added.
    pub fn new_page(&mut self) -> Page {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Page".to_vec()));
        dict.set("Parent", Object::Reference(self.catalog.pages.pages_id()));
        let object_id = self.graph.add_object(dict);
        Page {
            object_id,
            document: self.id,
        }
    }

    /// Append a page to the page tree.
    ///
    /// # Errors
    ///
    /// Rejected before any page-tree mutation when the page is already
    /// flushed or belongs to a different document.
    pub fn add_page(&mut self, page: Page) -> Result<(), CatalogError> {
        self.check_addable(&page)?;
        self.catalog.pages.add(&mut self.graph, page.object_id)
    }

    /// Insert a page at `index`, shifting later pages right.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`add_page`](Self::add_page), plus
    /// [`CatalogError::PageIndexOutOfRange`] when `index` exceeds the
    /// page count.
    pub fn insert_page(&mut self, index: usize, page: Page) -> Result<(), CatalogError> {
        self.check_addable(&page)?;
        self.catalog.pages.insert(&mut self.graph, index, page.object_id)
    }

    /// The page at `index` (0-based).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::PageIndexOutOfRange`] for a bad index.
    pub fn page(&self, index: usize) -> Result<Page, CatalogError> {
        match self.catalog.pages.get(index) {
            Some(object_id) => Ok(Page {
                object_id,
                document: self.id,
            }),
            None => Err(CatalogError::PageIndexOutOfRange {
                index,
                count: self.catalog.pages.len(),
            }),
        }
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.catalog.pages.len()
    }

    /// The 0-based position of `page`, or `None` when it is not in the
    /// tree (or belongs to another document).
    pub fn page_number(&self, page: &Page) -> Option<usize> {
        if page.document != self.id {
            return None;
        }
        self.catalog.pages.index_of(page.object_id)
    }

    /// Remove a page by handle. Returns whether it was present.
    ///
    /// # Errors
    ///
    /// Propagates object-graph failures while rewriting the page tree.
    pub fn remove_page(&mut self, page: &Page) -> Result<bool, CatalogError> {
        if page.document != self.id {
            return Ok(false);
        }
        self.catalog.pages.remove_by_id(&mut self.graph, page.object_id)
    }

    /// Remove and return the page at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::PageIndexOutOfRange`] for a bad index.
    pub fn remove_page_at(&mut self, index: usize) -> Result<Page, CatalogError> {
        let object_id = self.catalog.pages.remove_at(&mut self.graph, index)?;
        Ok(Page {
            object_id,
            document: self.id,
        })
    }

    /// Flush a single page: registers it as written out, after which it
    /// can no longer be added or inserted.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ForeignPage`] for a page of another
    /// document.
    pub fn flush_page(&mut self, page: &Page) -> Result<(), CatalogError> {
        if page.document != self.id {
            return Err(CatalogError::ForeignPage(page.object_id));
        }
        self.flushed.insert(page.object_id);
        Ok(())
    }

    /// Whether `page` was flushed (individually or by `close`).
    pub fn is_page_flushed(&self, page: &Page) -> bool {
        self.flushed.contains(&page.object_id)
    }

    fn check_addable(&self, page: &Page) -> Result<(), CatalogError> {
        if self.flushed.contains(&page.object_id) {
            return Err(CatalogError::FlushedPage(page.object_id));
        }
        if page.document != self.id {
            return Err(CatalogError::ForeignPage(page.object_id));
        }
        Ok(())
    }

    // ---- outlines and destinations ---------------------------------------

    /// The outline tree, built on first use and cached.
    ///
    /// With `force_refresh` the cached tree and reverse index are
    /// discarded and rebuilt from the object graph. Returns `Ok(None)`
    /// when the catalog has no `Outlines` dictionary; nothing is cached
    /// in that case, so a later call sees document mutations.
    ///
    /// # Errors
    ///
    /// Structural failures (missing titles, cycles, exceeded limits)
    /// abort the build and leave the cache empty — never half-filled.
    pub fn outlines(
        &mut self,
        force_refresh: bool,
    ) -> Result<Option<&OutlineTree<Destination>>, CatalogError> {
        if force_refresh {
            self.catalog.invalidate_outlines();
        }
        if matches!(self.catalog.outline, OutlineState::NotBuilt) {
            let catalog_dict = self.graph.get_object(self.catalog.root_id())?.as_dict()?;
            let built = outline::build(
                &self.graph,
                catalog_dict,
                self.catalog.replace_named_destinations(),
                &self.limits,
            )?;
            let Some(built) = built else {
                return Ok(None);
            };
            // The build succeeded as a whole; only now touch the graph.
            for (item_id, array) in &built.replacements {
                self.graph
                    .get_object_mut(*item_id)?
                    .as_dict_mut()?
                    .set("Dest", Object::Array(array.clone()));
            }
            self.catalog.install_outlines(OutlineData {
                tree: built.tree,
                pages_with_outlines: built.pages_with_outlines,
            });
        }
        Ok(self.catalog.outline_tree())
    }

    /// The reverse page→outlines index from the last outline build.
    pub fn pages_with_outlines(&self) -> Option<&HashMap<ObjectId, Vec<OutlineId>>> {
        self.catalog.pages_with_outlines()
    }

    /// The merged named-destination map: the flat `Dests` dictionary
    /// overlaid by the flattened `Names`→`Dests` tree.
    ///
    /// # Errors
    ///
    /// Propagates name-tree traversal failures.
    pub fn named_destinations(&self) -> Result<HashMap<String, Vec<Object>>, CatalogError> {
        let catalog_dict = self.graph.get_object(self.catalog.root_id())?.as_dict()?;
        destinations::named_destinations(&self.graph, catalog_dict, &self.limits)
    }

    /// Flatten the outline tree (building it if needed) into bookmark
    /// summaries: title, nesting level, and resolved page number.
    ///
    /// # Errors
    ///
    /// Propagates outline build failures.
    pub fn bookmarks(&mut self) -> Result<Vec<Bookmark>, CatalogError> {
        self.outlines(false)?;
        let Some(tree) = self.catalog.outline_tree() else {
            return Ok(Vec::new());
        };
        let mut bookmarks = Vec::new();
        for id in tree.iter_depth_first() {
            if id == tree.root() {
                continue;
            }
            let node = tree.node(id);
            let page_number = node
                .destination()
                .and_then(|dest| dest.page())
                .and_then(|page_id| self.catalog.pages.index_of(page_id));
            bookmarks.push(Bookmark {
                title: node.title().to_owned(),
                level: tree.depth(id) - 1,
                page_number,
            });
        }
        Ok(bookmarks)
    }

    // ---- optional content, actions, close --------------------------------

    /// The optional-content properties handle.
    ///
    /// Reuses a previously materialized handle; otherwise reads the
    /// catalog's `OCProperties` dictionary; otherwise creates an empty
    /// handle only when `create_if_missing` is set. A materialized handle
    /// is written back to the catalog dictionary by [`close`](Self::close).
    ///
    /// # Errors
    ///
    /// Propagates object-graph failures while reading the catalog.
    pub fn oc_properties(
        &mut self,
        create_if_missing: bool,
    ) -> Result<Option<&mut OcProperties>, CatalogError> {
        if self.catalog.oc_properties.is_none() {
            let existing = self
                .graph
                .get_object(self.catalog.root_id())?
                .as_dict()?
                .get(b"OCProperties")
                .ok()
                .map(|obj| resolve(&self.graph, obj))
                .and_then(|obj| obj.as_dict().ok())
                .cloned();
            if let Some(dict) = existing {
                self.catalog.oc_properties = Some(OcProperties::new(dict));
            } else if create_if_missing {
                self.catalog.oc_properties = Some(OcProperties::empty());
            }
        }
        Ok(self.catalog.oc_properties.as_mut())
    }

    /// Set the document open action to an explicit destination array.
    ///
    /// # Errors
    ///
    /// Propagates object-graph failures while writing the catalog.
    pub fn set_open_action(&mut self, destination: Vec<Object>) -> Result<(), CatalogError> {
        self.graph
            .get_object_mut(self.catalog.root_id())?
            .as_dict_mut()?
            .set("OpenAction", Object::Array(destination));
        Ok(())
    }

    /// Close the document: reconstruct touched optional-content
    /// properties into the catalog dictionary, then flush the pages and
    /// the catalog. This is the only code path that flushes the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::AlreadyClosed`] on a second call.
    pub fn close(&mut self) -> Result<(), CatalogError> {
        if self.closed {
            return Err(CatalogError::AlreadyClosed);
        }
        if self.catalog.oc_properties_may_have_changed() {
            if let Some(oc) = &self.catalog.oc_properties {
                let dict = oc.dictionary().clone();
                self.graph
                    .get_object_mut(self.catalog.root_id())?
                    .as_dict_mut()?
                    .set("OCProperties", Object::Dictionary(dict));
            }
        }
        for page_id in self.catalog.pages.ids().to_vec() {
            self.flushed.insert(page_id);
        }
        self.flushed.insert(self.catalog.root_id());
        self.closed = true;
        #[cfg(feature = "tracing")]
        tracing::debug!(pages = self.catalog.pages.len(), "document closed");
        Ok(())
    }
}

impl Default for PdfDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Follow indirect references until a direct object is reached.
///
/// Broken or overly long reference chains end the walk and return the
/// last reference as-is; callers treat it as a non-matching type.
pub(crate) fn resolve<'a>(graph: &'a Document, object: &'a Object) -> &'a Object {
    let mut object = object;
    let mut hops = 0;
    while let Object::Reference(id) = object {
        match graph.get_object(*id) {
            Ok(next) if hops < 32 => object = next,
            _ => break,
        }
        hops += 1;
    }
    object
}
