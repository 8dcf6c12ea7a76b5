//! Arena-based outline (bookmark) tree.
//!
//! PDF encodes the outline tree on disk as a first-child/next-sibling
//! linked structure with parent back-pointers. Mirroring that directly in
//! Rust would create ownership cycles, so this module stores all nodes in a
//! single arena ([`OutlineTree`]) addressed by stable [`OutlineId`] indices.
//! Parents own their children through id vectors; the parent link is a
//! plain index, never an owning reference.

/// Stable handle to a node inside an [`OutlineTree`].
///
/// Ids are only meaningful for the tree that created them. They stay valid
/// for the lifetime of that tree; rebuilding a tree produces fresh ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutlineId(usize);

impl OutlineId {
    /// The position of this node in the arena, in creation order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single outline entry: a title, tree links, and an optional destination
/// payload of type `D`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutlineNode<D> {
    title: String,
    parent: Option<OutlineId>,
    children: Vec<OutlineId>,
    destination: Option<D>,
}

impl<D> OutlineNode<D> {
    /// The decoded title text of this entry.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The parent of this node, `None` for the root.
    pub fn parent(&self) -> Option<OutlineId> {
        self.parent
    }

    /// Child ids in sibling order.
    pub fn children(&self) -> &[OutlineId] {
        &self.children
    }

    /// The destination attached to this entry, if any.
    pub fn destination(&self) -> Option<&D> {
        self.destination.as_ref()
    }
}

/// An n-ary outline tree stored as a node arena.
///
/// The tree always has a root node (id [`OutlineTree::root`]) created at
/// construction time; real outline entries hang below it. `D` is the
/// destination payload type — the backend crate instantiates it with its
/// destination representation, tests can use anything.
///
/// # Example
///
/// ```
/// use pdfnav_core::OutlineTree;
///
/// let mut tree: OutlineTree<u32> = OutlineTree::new("Outlines");
/// let chapter = tree.add_child(tree.root(), "Chapter 1");
/// let section = tree.add_child(chapter, "Section 1.1");
/// tree.set_destination(section, 7);
///
/// assert_eq!(tree.node(chapter).children(), &[section]);
/// assert_eq!(tree.node(section).parent(), Some(chapter));
/// assert_eq!(tree.depth(section), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutlineTree<D> {
    nodes: Vec<OutlineNode<D>>,
}

impl<D> OutlineTree<D> {
    /// Create a tree containing only a root node with the given title.
    pub fn new(root_title: impl Into<String>) -> Self {
        OutlineTree {
            nodes: vec![OutlineNode {
                title: root_title.into(),
                parent: None,
                children: Vec::new(),
                destination: None,
            }],
        }
    }

    /// The root node id.
    pub fn root(&self) -> OutlineId {
        OutlineId(0)
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` when the tree holds only the root node.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Access a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was created by a different tree.
    pub fn node(&self, id: OutlineId) -> &OutlineNode<D> {
        &self.nodes[id.0]
    }

    /// Append a new child under `parent`, returning its id.
    ///
    /// Children are kept in insertion order, so callers that append in
    /// traversal order preserve the on-disk sibling order.
    pub fn add_child(&mut self, parent: OutlineId, title: impl Into<String>) -> OutlineId {
        let id = OutlineId(self.nodes.len());
        self.nodes.push(OutlineNode {
            title: title.into(),
            parent: Some(parent),
            children: Vec::new(),
            destination: None,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Attach or replace the destination payload of a node.
    pub fn set_destination(&mut self, id: OutlineId, destination: D) {
        self.nodes[id.0].destination = Some(destination);
    }

    /// Number of edges between `id` and the root (the root has depth 0).
    pub fn depth(&self, id: OutlineId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.nodes[current.0].parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Pre-order traversal of the whole tree, root first.
    ///
    /// Children are visited in sibling order, so the yielded sequence
    /// matches the order entries were discovered during construction.
    pub fn iter_depth_first(&self) -> DepthFirst<'_, D> {
        DepthFirst {
            tree: self,
            stack: vec![self.root()],
        }
    }
}

/// Iterator returned by [`OutlineTree::iter_depth_first`].
pub struct DepthFirst<'a, D> {
    tree: &'a OutlineTree<D>,
    stack: Vec<OutlineId>,
}

impl<D> Iterator for DepthFirst<'_, D> {
    type Item = OutlineId;

    fn next(&mut self) -> Option<OutlineId> {
        let id = self.stack.pop()?;
        // Push children reversed so the leftmost sibling pops first.
        for &child in self.tree.nodes[id.0].children.iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }
}
