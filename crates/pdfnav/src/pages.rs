//! Page tree contract.
//!
//! The catalog delegates page bookkeeping here. The tree's internal
//! indexing strategy is not part of this layer's contract, so the
//! implementation keeps a flat, ordered list of page object ids mirrored
//! into the `Pages` dictionary (`Kids` and `Count`). Loading accepts
//! nested `Pages` nodes and flattens their leaves in order.

use std::collections::HashSet;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::document::resolve;
use crate::error::{CatalogError, Limits};

#[derive(Debug)]
pub(crate) struct PageTree {
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl PageTree {
    /// Load the page tree referenced by the catalog dictionary's `Pages`
    /// entry, creating an empty one when the entry is missing.
    pub(crate) fn load(
        graph: &mut Document,
        catalog_id: ObjectId,
        limits: &Limits,
    ) -> Result<Self, CatalogError> {
        let pages_entry = graph
            .get_object(catalog_id)?
            .as_dict()?
            .get(b"Pages")
            .ok()
            .cloned();

        let pages_id = match pages_entry {
            Some(Object::Reference(id)) => id,
            Some(Object::Dictionary(dict)) => {
                // An inline Pages dictionary gets promoted to an indirect
                // object so pages can reference it as their Parent.
                let id = graph.add_object(Object::Dictionary(dict));
                graph
                    .get_object_mut(catalog_id)?
                    .as_dict_mut()?
                    .set("Pages", Object::Reference(id));
                id
            }
            _ => {
                let mut pages = Dictionary::new();
                pages.set("Type", Object::Name(b"Pages".to_vec()));
                pages.set("Kids", Object::Array(Vec::new()));
                pages.set("Count", Object::Integer(0));
                let id = graph.add_object(Object::Dictionary(pages));
                graph
                    .get_object_mut(catalog_id)?
                    .as_dict_mut()?
                    .set("Pages", Object::Reference(id));
                id
            }
        };

        let mut kids = Vec::new();
        let mut visited = HashSet::new();
        collect_leaves(graph, pages_id, &mut kids, &mut visited, 0, limits)?;
        Ok(PageTree { pages_id, kids })
    }

    pub(crate) fn pages_id(&self) -> ObjectId {
        self.pages_id
    }

    pub(crate) fn ids(&self) -> &[ObjectId] {
        &self.kids
    }

    pub(crate) fn len(&self) -> usize {
        self.kids.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<ObjectId> {
        self.kids.get(index).copied()
    }

    pub(crate) fn index_of(&self, page_id: ObjectId) -> Option<usize> {
        self.kids.iter().position(|&id| id == page_id)
    }

    /// Append a page.
    pub(crate) fn add(&mut self, graph: &mut Document, page_id: ObjectId) -> Result<(), CatalogError> {
        self.kids.push(page_id);
        self.wire_parent(graph, page_id)?;
        self.sync(graph)
    }

    /// Insert a page at `index` (existing pages shift right).
    pub(crate) fn insert(
        &mut self,
        graph: &mut Document,
        index: usize,
        page_id: ObjectId,
    ) -> Result<(), CatalogError> {
        if index > self.kids.len() {
            return Err(CatalogError::PageIndexOutOfRange {
                index,
                count: self.kids.len(),
            });
        }
        self.kids.insert(index, page_id);
        self.wire_parent(graph, page_id)?;
        self.sync(graph)
    }

    /// Remove a page by identity. Returns whether it was present.
    pub(crate) fn remove_by_id(
        &mut self,
        graph: &mut Document,
        page_id: ObjectId,
    ) -> Result<bool, CatalogError> {
        match self.index_of(page_id) {
            Some(index) => {
                self.kids.remove(index);
                self.sync(graph)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the page at `index` and return its id.
    pub(crate) fn remove_at(
        &mut self,
        graph: &mut Document,
        index: usize,
    ) -> Result<ObjectId, CatalogError> {
        if index >= self.kids.len() {
            return Err(CatalogError::PageIndexOutOfRange {
                index,
                count: self.kids.len(),
            });
        }
        let removed = self.kids.remove(index);
        self.sync(graph)?;
        Ok(removed)
    }

    fn wire_parent(&self, graph: &mut Document, page_id: ObjectId) -> Result<(), CatalogError> {
        graph
            .get_object_mut(page_id)?
            .as_dict_mut()?
            .set("Parent", Object::Reference(self.pages_id));
        Ok(())
    }

    /// Mirror the flat page list into the root `Pages` dictionary.
    fn sync(&self, graph: &mut Document) -> Result<(), CatalogError> {
        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        let pages = graph.get_object_mut(self.pages_id)?.as_dict_mut()?;
        pages.set("Kids", Object::Array(kids));
        pages.set("Count", Object::Integer(self.kids.len() as i64));
        Ok(())
    }
}

/// Depth-first walk over a `Pages` subtree, collecting leaf page ids in
/// order. Nodes typed `Pages` (or carrying `Kids`) recurse; everything
/// else is a leaf.
fn collect_leaves(
    graph: &Document,
    node_id: ObjectId,
    out: &mut Vec<ObjectId>,
    visited: &mut HashSet<ObjectId>,
    depth: usize,
    limits: &Limits,
) -> Result<(), CatalogError> {
    if depth >= limits.max_page_tree_depth {
        return Err(Limits::exceeded(
            "max_page_tree_depth",
            limits.max_page_tree_depth,
        ));
    }
    if !visited.insert(node_id) {
        return Err(CatalogError::PageTreeCycle(node_id));
    }

    let node = graph.get_object(node_id)?.as_dict()?;
    let kids = match node.get(b"Kids").map(|obj| resolve(graph, obj)) {
        Ok(Object::Array(kids)) => kids.clone(),
        _ => return Ok(()),
    };
    for kid in kids {
        let Object::Reference(kid_id) = kid else {
            continue;
        };
        let is_pages_node = graph
            .get_object(kid_id)
            .ok()
            .and_then(|obj| obj.as_dict().ok())
            .is_some_and(|dict| {
                matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name == b"Pages")
                    || dict.has(b"Kids")
            });
        if is_pages_node {
            collect_leaves(graph, kid_id, out, visited, depth + 1, limits)?;
        } else {
            out.push(kid_id);
        }
    }
    Ok(())
}
