//! Tree module for rooted time trees.
//!
//! This module provides:
//! - [RootedTree]: the read-only view of a tree that the clock models consume.
//! - [TimeTree]: a binary time tree using the arena pattern, implementing [RootedTree].
//! - [post_order] and [pre_order]: traversals over any [RootedTree].

use crate::model::leaf_label_map::{LabelIndex, LeafLabelMap};
use crate::model::vertex::{Height, Vertex};

/// Identifier of a node; dense in `0..node_count` and stable as long as the
/// topology is unchanged.
pub type NodeId = usize;

/// *During construction only*, index for unset root.
const NO_ROOT_SET_INDEX: NodeId = usize::MAX;

// =#========================================================================#=
// ROOTED TREE (Trait)
// =#========================================================================#=
/// Read-only access to a rooted tree with node heights.
///
/// Clock models never mutate a tree; they only query its shape, its leaf
/// labels and the heights of its nodes. Node identifiers must be dense, i.e.
/// every node has an id in `0..node_count()`.
pub trait RootedTree {
    /// Returns the number of nodes, including root and leaves.
    fn node_count(&self) -> usize;

    /// Returns the id of the root.
    fn root(&self) -> NodeId;

    /// Returns the parent of `node`, `None` for the root.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Returns the children of `node`; empty for leaves.
    fn children(&self, node: NodeId) -> &[NodeId];

    /// Returns the label of a leaf, `None` for non-leaves.
    fn label(&self, node: NodeId) -> Option<&str>;

    /// Returns the height (time before present) of `node`.
    fn height(&self, node: NodeId) -> f64;

    /// Returns `true` if `node` has no children.
    fn is_leaf(&self, node: NodeId) -> bool {
        self.children(node).is_empty()
    }

    /// Returns `true` if `node` is the root.
    fn is_root(&self, node: NodeId) -> bool {
        node == self.root()
    }

    /// Returns the length of the branch above `node`, zero for the root.
    fn branch_length(&self, node: NodeId) -> f64 {
        match self.parent(node) {
            Some(parent) => self.height(parent) - self.height(node),
            None => 0.0,
        }
    }
}

// =#========================================================================#=
// TIME TREE
// =#========================================================================#=
/// A binary time tree represented using the arena pattern on [Vertex].
///
/// Vertices are stored in a contiguous vector and referenced by [NodeId].
///
/// # Structure
/// - All vertices (root, internal, and leaves) are stored in the arena
/// - Index of root is maintained
/// - No assumption on order of indices (e.g. leaves need not be first `n` indices)
/// - Leaves contain a [LabelIndex] pointing into the tree's own [LeafLabelMap]
/// - Every vertex has a [Height]; parents are never lower than their children
///
/// # Construction
/// Specify the number of leaves, then add vertices bottom-up.
/// Test validity with [TimeTree::is_valid].
///
/// # Example
/// ```
/// use flexclock::model::{Height, RootedTree, TimeTree};
///
/// // ((A:1,B:1):1,C:2);
/// let mut tree = TimeTree::new(3);
/// let a = tree.add_leaf(Height::ZERO, "A");
/// let b = tree.add_leaf(Height::ZERO, "B");
/// let c = tree.add_leaf(Height::ZERO, "C");
/// let ab = tree.add_internal_vertex([a, b], Height::new(1.0));
/// tree.add_root([ab, c], Height::new(2.0));
///
/// assert!(tree.is_valid());
/// assert_eq!(tree.branch_length(ab), 1.0);
/// assert_eq!(tree.branch_length(c), 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct TimeTree {
    /// Number of leaves this tree is built for
    num_leaves_init: usize,

    /// Vertices of this tree (arena pattern)
    vertices: Vec<Vertex>,

    /// Index of the root of this tree
    root_index: NodeId,

    /// Labels of the leaves
    labels: LeafLabelMap,
}

// ============================================================================
// New, Getters / Accessors, etc. (pub)
// ============================================================================
impl TimeTree {
    /// Creates a new tree with capacity for a binary tree with `num_leaves` leaves.
    ///
    /// # Panics
    /// Panics if `num_leaves` is zero.
    pub fn new(num_leaves: usize) -> Self {
        assert!(num_leaves > 0);
        TimeTree {
            num_leaves_init: num_leaves,
            vertices: Vec::with_capacity(2 * num_leaves - 1),
            root_index: NO_ROOT_SET_INDEX,
            labels: LeafLabelMap::new(num_leaves),
        }
    }

    /// Adds a root to the tree and returns its index.
    pub fn add_root(&mut self, children: [NodeId; 2], height: Height) -> NodeId {
        let index = self.vertices.len();
        self.vertices.push(Vertex::new_root(index, children, height));

        self.root_index = index;
        for child in children {
            self[child].set_parent(index);
        }

        index
    }

    /// Adds an internal vertex to the tree and returns its index.
    pub fn add_internal_vertex(&mut self, children: [NodeId; 2], height: Height) -> NodeId {
        let index = self.vertices.len();
        self.vertices.push(Vertex::new_internal(index, children, height));

        for child in children {
            self[child].set_parent(index);
        }

        index
    }

    /// Adds a leaf with the given label to the tree and returns its index.
    pub fn add_leaf(&mut self, height: Height, label: &str) -> NodeId {
        let index = self.vertices.len();
        let label_index = self.labels.get_or_insert(label);
        self.vertices.push(Vertex::new_leaf(index, height, label_index));
        index
    }

    /// Validates the tree structure, all index references and heights.
    ///
    /// Checks:
    /// - Root index is valid and points to a Root vertex
    /// - All vertex indices match their position in the arena
    /// - There are the right number of leaves, with distinct labels, and only one root
    /// - All child indices are valid and point back to correct parent
    /// - No vertex is higher than its parent
    pub fn is_valid(&self) -> bool {
        if self.root_index == NO_ROOT_SET_INDEX || self.root_index >= self.vertices.len() {
            return false;
        }
        if !self.vertices[self.root_index].is_root() {
            return false;
        }

        let mut leaf_count = 0;
        let mut root_count = 0;
        for (index, vertex) in self.vertices.iter().enumerate() {
            if vertex.index() != index {
                return false;
            }

            if vertex.is_root() {
                root_count += 1;
            }
            if vertex.is_leaf() {
                leaf_count += 1;
            }

            for &child in vertex.children() {
                if child >= self.vertices.len() {
                    return false;
                }
                let child_vertex = &self.vertices[child];
                if child_vertex.parent_index() != Some(index) {
                    return false;
                }
                if *child_vertex.height() > *vertex.height() {
                    return false;
                }
            }

            if !vertex.is_root() && !vertex.has_parent() {
                return false;
            }
        }

        root_count == 1
            && leaf_count == self.num_leaves_init
            && self.labels.num_labels() == self.num_leaves_init
    }

    /// Fixes the leaf count to the leaves actually added, for readers that
    /// only guessed it up front.
    pub(crate) fn settle_num_leaves(&mut self) {
        self.num_leaves_init = self.num_leaves();
    }

    /// Returns whether root of tree has been set.
    pub fn is_root_set(&self) -> bool {
        self.root_index != NO_ROOT_SET_INDEX
    }

    /// Returns a reference to the root vertex.
    ///
    /// # Panics
    /// Panics if the root hasn't been set yet.
    pub fn root_vertex(&self) -> &Vertex {
        &self[self.root_index]
    }

    /// Returns a reference to the vertex at the given index.
    pub fn vertex(&self, index: NodeId) -> &Vertex {
        &self[index]
    }

    /// Returns the leaf labels of this tree.
    pub fn labels(&self) -> &LeafLabelMap {
        &self.labels
    }

    /// Returns the leaf carrying `label`, if any.
    pub fn leaf_by_label(&self, label: &str) -> Option<NodeId> {
        let label_index: LabelIndex = self.labels.get_index(label)?;
        self.vertices
            .iter()
            .find(|v| v.label_index() == Some(label_index))
            .map(Vertex::index)
    }

    /// Returns the number of leaves in this tree.
    pub fn num_leaves(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_leaf()).count()
    }

    /// Returns the number of internal vertices in this tree (root excluded).
    pub fn num_internal(&self) -> usize {
        self.vertices.iter().filter(|&v| v.is_internal()).count()
    }

    /// Returns the number of vertices in this tree.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the sum of all branch lengths.
    pub fn total_branch_length(&self) -> f64 {
        (0..self.vertices.len()).map(|v| self.branch_length(v)).sum()
    }

    /// Moves a vertex to a new height, as a sampler's height proposal would.
    ///
    /// # Panics
    /// Panics if the new height is below one of its children or above its parent.
    pub fn set_height(&mut self, index: NodeId, height: Height) {
        let vertex = &self.vertices[index];
        for &child in vertex.children() {
            assert!(
                *self.vertices[child].height() <= *height,
                "Vertex {index} would be lower than its child {child}"
            );
        }
        if let Some(parent) = vertex.parent_index() {
            assert!(
                *height <= *self.vertices[parent].height(),
                "Vertex {index} would be higher than its parent {parent}"
            );
        }
        self.vertices[index].set_height(height);
    }

    /// Exchanges the subtrees rooted at `a` and `b` by swapping their parents,
    /// as a narrow or wide exchange proposal would. Node ids are kept.
    ///
    /// # Panics
    /// Panics if either vertex is the root, if they share a parent, if one is an
    /// ancestor of the other, or if the swap would place a vertex above its new parent.
    pub fn exchange_subtrees(&mut self, a: NodeId, b: NodeId) {
        let parent_a = self.vertices[a].parent_index().expect("Cannot exchange the root");
        let parent_b = self.vertices[b].parent_index().expect("Cannot exchange the root");
        assert_ne!(parent_a, parent_b, "Vertices {a} and {b} are siblings");
        assert!(!self.is_ancestor(a, b) && !self.is_ancestor(b, a), "Nested subtrees cannot be exchanged");
        assert!(
            *self.vertices[a].height() <= *self.vertices[parent_b].height()
                && *self.vertices[b].height() <= *self.vertices[parent_a].height(),
            "Exchange of {a} and {b} violates heights"
        );

        self.vertices[parent_a].replace_child(a, b);
        self.vertices[parent_b].replace_child(b, a);
        self.vertices[a].set_parent(parent_b);
        self.vertices[b].set_parent(parent_a);
    }

    /// Returns `true` if `ancestor` lies on the path from `node` to the root.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.vertices[node].parent_index();
        while let Some(index) = current {
            if index == ancestor {
                return true;
            }
            current = self.vertices[index].parent_index();
        }
        false
    }

    /// Returns an iterator over the tree in post-order (children before parents).
    pub fn post_order_iter(&self) -> PostOrderIter<'_, Self> {
        post_order(self)
    }

    /// Returns an iterator over the tree in pre-order (parents before children).
    pub fn pre_order_iter(&self) -> PreOrderIter<'_, Self> {
        pre_order(self)
    }
}

impl RootedTree for TimeTree {
    fn node_count(&self) -> usize {
        self.vertices.len()
    }

    fn root(&self) -> NodeId {
        self.root_index
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.vertices[node].parent_index()
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.vertices[node].children()
    }

    fn label(&self, node: NodeId) -> Option<&str> {
        self.vertices[node]
            .label_index()
            .and_then(|index| self.labels.get_label(index))
    }

    fn height(&self, node: NodeId) -> f64 {
        *self.vertices[node].height()
    }

    fn is_leaf(&self, node: NodeId) -> bool {
        self.vertices[node].is_leaf()
    }
}

impl std::ops::Index<NodeId> for TimeTree {
    type Output = Vertex;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.vertices[index]
    }
}

impl std::ops::IndexMut<NodeId> for TimeTree {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output {
        &mut self.vertices[index]
    }
}

// =#========================================================================#=
// ITERATORS
// =#========================================================================#=
/// Returns an iterator over `tree` in post-order (children before parents).
pub fn post_order<T: RootedTree + ?Sized>(tree: &T) -> PostOrderIter<'_, T> {
    PostOrderIter {
        tree,
        stack: vec![(tree.root(), false)],
    }
}

/// Returns an iterator over `tree` in pre-order (parents before children).
pub fn pre_order<T: RootedTree + ?Sized>(tree: &T) -> PreOrderIter<'_, T> {
    PreOrderIter {
        tree,
        stack: vec![tree.root()],
    }
}

/// Iterator for post-order traversal (children before parents).
///
/// Stack based, so deep trees do not overflow the call stack.
pub struct PostOrderIter<'a, T: RootedTree + ?Sized> {
    tree: &'a T,
    stack: Vec<(NodeId, bool)>, // (index, children_visited)
}

impl<T: RootedTree + ?Sized> Iterator for PostOrderIter<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, children_visited)) = self.stack.pop() {
            let children = self.tree.children(index);
            if children_visited || children.is_empty() {
                return Some(index);
            }

            self.stack.push((index, true));
            // Push in reverse, so first child is processed first
            for &child in children.iter().rev() {
                self.stack.push((child, false));
            }
        }
        None
    }
}

/// Iterator for pre-order traversal (parents before children).
pub struct PreOrderIter<'a, T: RootedTree + ?Sized> {
    tree: &'a T,
    stack: Vec<NodeId>,
}

impl<T: RootedTree + ?Sized> Iterator for PreOrderIter<'_, T> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        for &child in self.tree.children(index).iter().rev() {
            self.stack.push(child);
        }
        Some(index)
    }
}
