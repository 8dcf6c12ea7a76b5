//! Outline (bookmark) tree construction.
//!
//! The on-disk outline encoding is a first-child/next-sibling linked list
//! of dictionaries: `First` points to an item's first child, `Next` to its
//! following sibling. [`build`] materializes that encoding into the arena
//! tree from `pdfnav-core`, resolving named destinations through the
//! merged map from [`crate::destinations`] and producing a reverse index
//! from target page to the outline nodes pointing at it.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfnav_core::{OutlineId, OutlineTree};

use crate::destinations;
use crate::document::resolve;
use crate::error::{CatalogError, Limits};
use crate::text::{decode_name, decode_text_string};

/// Title given to the synthetic root node of every outline tree.
pub const OUTLINE_ROOT_TITLE: &str = "Outlines";

/// An outline entry's target.
#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    /// An explicit destination array: page reference plus view parameters.
    Explicit(Vec<Object>),
    /// A named destination that was not (or not yet) resolved.
    Named(String),
}

impl Destination {
    /// The target page's object id, when one can be determined.
    ///
    /// Only an explicit array whose first element is a reference names a
    /// page; an unresolved name has no page identity.
    pub fn page(&self) -> Option<ObjectId> {
        match self {
            Destination::Explicit(array) => match array.first() {
                Some(Object::Reference(id)) => Some(*id),
                _ => None,
            },
            Destination::Named(_) => None,
        }
    }

    /// The explicit destination array, if resolved.
    pub fn as_explicit(&self) -> Option<&[Object]> {
        match self {
            Destination::Explicit(array) => Some(array),
            Destination::Named(_) => None,
        }
    }

    /// The destination name, if unresolved.
    pub fn as_named(&self) -> Option<&str> {
        match self {
            Destination::Explicit(_) => None,
            Destination::Named(name) => Some(name),
        }
    }
}

/// Everything one successful outline build produces.
///
/// `replacements` holds the `Dest` rewrites implied by the
/// replace-named-destinations flag; the caller applies them to the object
/// graph only after the whole build has succeeded, so a failed build
/// leaves the graph untouched.
#[derive(Debug)]
pub(crate) struct OutlineBuild {
    pub tree: OutlineTree<Destination>,
    pub pages_with_outlines: HashMap<ObjectId, Vec<OutlineId>>,
    pub replacements: Vec<(ObjectId, Vec<Object>)>,
}

/// Materialize the catalog's outline tree, or `None` when the catalog has
/// no `Outlines` dictionary.
///
/// # Errors
///
/// Fails on a missing or undecodable item title, a revisited item
/// (cycle), an exceeded depth or item-count limit, and name-tree failures
/// from the destination resolver.
pub(crate) fn build(
    graph: &Document,
    catalog_dict: &Dictionary,
    replace_named_destinations: bool,
    limits: &Limits,
) -> Result<Option<OutlineBuild>, CatalogError> {
    let outline_root = match catalog_dict.get(b"Outlines") {
        Ok(obj) => match resolve(graph, obj).as_dict() {
            Ok(dict) => dict,
            Err(_) => return Ok(None),
        },
        Err(_) => return Ok(None),
    };

    // One merged map per build; never persisted beyond it.
    let names = destinations::named_destinations(graph, catalog_dict, limits)?;

    let mut walk = Walk {
        graph,
        names,
        replace_named_destinations,
        limits,
        visited: HashSet::new(),
        item_count: 0,
        tree: OutlineTree::new(OUTLINE_ROOT_TITLE),
        pages_with_outlines: HashMap::new(),
        replacements: Vec::new(),
    };

    if let Ok(Object::Reference(first)) = outline_root.get(b"First") {
        let root = walk.tree.root();
        walk.visit_siblings(*first, root, 1)?;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        items = walk.tree.len() - 1,
        indexed_pages = walk.pages_with_outlines.len(),
        "outline tree built"
    );

    Ok(Some(OutlineBuild {
        tree: walk.tree,
        pages_with_outlines: walk.pages_with_outlines,
        replacements: walk.replacements,
    }))
}

struct Walk<'a> {
    graph: &'a Document,
    names: HashMap<String, Vec<Object>>,
    replace_named_destinations: bool,
    limits: &'a Limits,
    visited: HashSet<ObjectId>,
    item_count: usize,
    tree: OutlineTree<Destination>,
    pages_with_outlines: HashMap<ObjectId, Vec<OutlineId>>,
    replacements: Vec<(ObjectId, Vec<Object>)>,
}

impl Walk<'_> {
    /// Walk a sibling chain. Every item in the chain becomes a child of
    /// `parent`; an item's `First` entry recurses one level deeper with
    /// the item itself as parent. Siblings are iterated, not recursed, so
    /// call depth tracks nesting depth only.
    fn visit_siblings(
        &mut self,
        first: ObjectId,
        parent: OutlineId,
        depth: usize,
    ) -> Result<(), CatalogError> {
        if depth > self.limits.max_outline_depth {
            return Err(Limits::exceeded(
                "max_outline_depth",
                self.limits.max_outline_depth,
            ));
        }

        let mut current = Some(first);
        while let Some(item_id) = current {
            if !self.visited.insert(item_id) {
                return Err(CatalogError::OutlineCycle(item_id));
            }
            self.item_count += 1;
            if self.item_count > self.limits.max_outline_items {
                return Err(Limits::exceeded(
                    "max_outline_items",
                    self.limits.max_outline_items,
                ));
            }

            let item = self.graph.get_object(item_id)?.as_dict()?;
            let node = self.visit_item(item_id, item, parent)?;

            if let Ok(Object::Reference(child)) = item.get(b"First") {
                self.visit_siblings(*child, node, depth + 1)?;
            }
            // The next sibling attaches to this item's parent, not to the
            // item itself.
            current = match item.get(b"Next") {
                Ok(Object::Reference(next)) => Some(*next),
                _ => None,
            };
        }
        Ok(())
    }

    /// Create the node for one item and handle its destination.
    fn visit_item(
        &mut self,
        item_id: ObjectId,
        item: &Dictionary,
        parent: OutlineId,
    ) -> Result<OutlineId, CatalogError> {
        let title = match item.get(b"Title").map(|obj| resolve(self.graph, obj)) {
            Ok(Object::String(bytes, _)) => decode_text_string(bytes)?,
            _ => return Err(CatalogError::MissingOutlineTitle(item_id)),
        };
        let node = self.tree.add_child(parent, title);

        if let Ok(dest_obj) = item.get(b"Dest") {
            if let Some(destination) = self.make_destination(dest_obj)? {
                let (destination, page) = self.resolve_named(item_id, destination);
                if let Some(page) = page {
                    self.pages_with_outlines.entry(page).or_default().push(node);
                }
                self.tree.set_destination(node, destination);
            }
        }
        Ok(node)
    }

    /// Build a [`Destination`] from a raw `Dest` value. Values that are
    /// neither array, string, nor name yield `None` and the item simply
    /// carries no destination.
    fn make_destination(&self, obj: &Object) -> Result<Option<Destination>, CatalogError> {
        Ok(match resolve(self.graph, obj) {
            Object::Array(array) => Some(Destination::Explicit(array.clone())),
            Object::String(bytes, _) => Some(Destination::Named(decode_text_string(bytes)?)),
            Object::Name(name) => Some(Destination::Named(decode_name(name))),
            _ => None,
        })
    }

    /// Resolve a named destination against the merged map, returning the
    /// destination to store on the node together with the target page for
    /// the reverse index.
    ///
    /// The page is resolved through the map whether or not the replace
    /// flag is set; the flag only controls whether the node's destination
    /// (and, via a pending rewrite, the item dictionary's `Dest` entry)
    /// becomes the explicit array. Unresolved names are left as-is and
    /// have no page identity.
    fn resolve_named(
        &mut self,
        item_id: ObjectId,
        destination: Destination,
    ) -> (Destination, Option<ObjectId>) {
        let Destination::Named(name) = &destination else {
            let page = destination.page();
            return (destination, page);
        };
        let Some(array) = self.names.get(name) else {
            #[cfg(feature = "tracing")]
            tracing::trace!(name = %name, "named destination did not resolve");
            return (destination, None);
        };
        let page = match array.first() {
            Some(Object::Reference(id)) => Some(*id),
            _ => None,
        };
        if self.replace_named_destinations {
            self.replacements.push((item_id, array.clone()));
            (Destination::Explicit(array.clone()), page)
        } else {
            (destination, page)
        }
    }
}
