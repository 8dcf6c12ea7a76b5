//! Catalog state.
//!
//! The catalog is the root of the document's logical structure. This
//! module holds its in-memory state: the catalog dictionary id, the page
//! tree, the outline cache with its reverse page→outlines index, the
//! lazily materialized optional-content properties, and the
//! replace-named-destinations flag. The orchestration that needs the
//! object graph lives on [`crate::document::PdfDocument`].

use std::collections::HashMap;

use lopdf::{Document, Object, ObjectId};
use pdfnav_core::{OutlineId, OutlineTree};

use crate::error::{CatalogError, Limits};
use crate::oc_properties::OcProperties;
use crate::outline::Destination;
use crate::pages::PageTree;

/// The outline cache: either nothing has been built yet, or one complete
/// build (tree plus reverse index) is installed. There is no partial
/// state — a failed rebuild reverts to `NotBuilt`.
#[derive(Debug)]
pub(crate) enum OutlineState {
    NotBuilt,
    Built(OutlineData),
}

#[derive(Debug)]
pub(crate) struct OutlineData {
    pub tree: OutlineTree<Destination>,
    pub pages_with_outlines: HashMap<ObjectId, Vec<OutlineId>>,
}

/// Structural root of a document.
///
/// Exactly one catalog exists per [`PdfDocument`](crate::PdfDocument),
/// which owns it together with the object graph. The catalog is never
/// flushed directly — see [`Catalog::flush`].
#[derive(Debug)]
pub struct Catalog {
    root_id: ObjectId,
    pub(crate) pages: PageTree,
    pub(crate) outline: OutlineState,
    pub(crate) oc_properties: Option<OcProperties>,
    replace_named_destinations: bool,
}

impl Catalog {
    /// Locate and validate the catalog behind the trailer's `Root` entry,
    /// stamping `Type /Catalog` on it as the original writer may have
    /// omitted the entry.
    pub(crate) fn load(graph: &mut Document, limits: &Limits) -> Result<Self, CatalogError> {
        let root_id = match graph.trailer.get(b"Root") {
            Ok(Object::Reference(id)) => *id,
            _ => return Err(CatalogError::NoCatalog),
        };
        let root = graph
            .get_object_mut(root_id)
            .map_err(|_| CatalogError::NoCatalog)?
            .as_dict_mut()
            .map_err(|_| CatalogError::NoCatalog)?;
        root.set("Type", Object::Name(b"Catalog".to_vec()));

        let pages = PageTree::load(graph, root_id, limits)?;
        Ok(Catalog {
            root_id,
            pages,
            outline: OutlineState::NotBuilt,
            oc_properties: None,
            replace_named_destinations: true,
        })
    }

    /// The object id of the catalog dictionary.
    pub fn root_id(&self) -> ObjectId {
        self.root_id
    }

    /// Manual flushing is rejected unconditionally: the catalog is
    /// flushed by the document close sequence and by nothing else.
    pub fn flush(&self) -> Result<(), CatalogError> {
        Err(CatalogError::ManualCatalogFlush)
    }

    /// Whether named destinations found while building outlines are
    /// replaced in place by their resolved explicit arrays.
    pub fn replace_named_destinations(&self) -> bool {
        self.replace_named_destinations
    }

    /// Toggle named-destination replacement. Takes effect on the next
    /// outline build.
    pub fn set_replace_named_destinations(&mut self, replace: bool) {
        self.replace_named_destinations = replace;
    }

    /// The cached outline tree, when one has been built.
    pub fn outline_tree(&self) -> Option<&OutlineTree<Destination>> {
        match &self.outline {
            OutlineState::Built(data) => Some(&data.tree),
            OutlineState::NotBuilt => None,
        }
    }

    /// The reverse page→outlines index from the last build, listing for
    /// each page the outline nodes targeting it in traversal order.
    pub fn pages_with_outlines(&self) -> Option<&HashMap<ObjectId, Vec<OutlineId>>> {
        match &self.outline {
            OutlineState::Built(data) => Some(&data.pages_with_outlines),
            OutlineState::NotBuilt => None,
        }
    }

    /// Drop the cached outline tree and reverse index. The single entry
    /// point for cache invalidation.
    pub(crate) fn invalidate_outlines(&mut self) {
        self.outline = OutlineState::NotBuilt;
    }

    pub(crate) fn install_outlines(&mut self, data: OutlineData) {
        self.outline = OutlineState::Built(data);
    }

    /// True once the optional-content properties handle was materialized;
    /// its dictionary may have been modified and is reconstructed into
    /// the catalog dictionary on close.
    pub fn oc_properties_may_have_changed(&self) -> bool {
        self.oc_properties.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn loaded_catalog() -> (Document, Catalog) {
        let mut graph = Document::with_version("1.5");
        let pages_id = graph.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0i64,
        });
        let catalog_id = graph.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        graph.trailer.set("Root", catalog_id);
        let catalog = Catalog::load(&mut graph, &Limits::default()).unwrap();
        (graph, catalog)
    }

    #[test]
    fn load_requires_a_root_entry() {
        let mut graph = Document::with_version("1.5");
        let err = Catalog::load(&mut graph, &Limits::default()).unwrap_err();
        assert!(matches!(err, CatalogError::NoCatalog));
    }

    #[test]
    fn load_stamps_the_type_entry() {
        let mut graph = Document::with_version("1.5");
        let catalog_id = graph.add_object(lopdf::Dictionary::new());
        graph.trailer.set("Root", catalog_id);

        let catalog = Catalog::load(&mut graph, &Limits::default()).unwrap();
        let dict = graph.get_object(catalog.root_id()).unwrap().as_dict().unwrap();
        assert_eq!(dict.get(b"Type").unwrap(), &Object::Name(b"Catalog".to_vec()));
    }

    #[test]
    fn manual_flush_always_fails() {
        let (_graph, catalog) = loaded_catalog();
        assert!(matches!(
            catalog.flush(),
            Err(CatalogError::ManualCatalogFlush)
        ));
    }

    #[test]
    fn replacement_flag_defaults_on() {
        let (_graph, mut catalog) = loaded_catalog();
        assert!(catalog.replace_named_destinations());
        catalog.set_replace_named_destinations(false);
        assert!(!catalog.replace_named_destinations());
    }

    #[test]
    fn outline_cache_starts_empty() {
        let (_graph, catalog) = loaded_catalog();
        assert!(catalog.outline_tree().is_none());
        assert!(catalog.pages_with_outlines().is_none());
        assert!(!catalog.oc_properties_may_have_changed());
    }
}
