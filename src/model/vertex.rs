//! Vertex module for time tree representation.

use crate::model::leaf_label_map::LabelIndex;
use crate::model::tree::NodeId;
use std::ops::Deref;

/// During construction, Internal and Leaf vertex might not have parent set yet.
const NO_PARENT_SET: NodeId = usize::MAX;

// =#========================================================================#=
// VERTEX
// =#========================================================================#=
/// Represents a vertex (node) in a binary time tree.
///
/// A vertex can be either:
/// - **Root**: Has two children, no parent
/// - **Internal**: Has a parent and two children, no label
/// - **Leaf**: Has a parent and a label (via index), no children
///
/// Every vertex carries a [Height] (time before present). The length of the
/// branch above a non-root vertex is the height of its parent minus its own.
///
/// # Invariants
/// - `index` is index in arena
/// - Internal vertices and leaves have `parent` set; `NO_PARENT_SET = usize::MAX` only during construction
/// - Leaf vertices have a `label_index` into the tree's [LeafLabelMap](crate::model::LeafLabelMap)
#[derive(PartialEq, Debug, Clone)]
pub enum Vertex {
    /// Root vertex of the tree (has no parent, has two children)
    Root {
        /// Index of this vertex in the tree arena
        index: NodeId,
        /// Indices of the two child vertices
        children: [NodeId; 2],
        /// Height of this vertex
        height: Height,
    },
    /// Internal vertex (has parent and two children, no label)
    Internal {
        /// Index of this vertex in the tree arena
        index: NodeId,
        /// Index of the parent vertex
        parent: NodeId,
        /// Indices of the two child vertices
        children: [NodeId; 2],
        /// Height of this vertex
        height: Height,
    },
    /// Leaf vertex (has parent and label, no children)
    Leaf {
        /// Index of this vertex in the tree arena
        index: NodeId,
        /// Index into the label map
        label_index: LabelIndex,
        /// Index of the parent vertex
        parent: NodeId,
        /// Height of this vertex (zero for contemporaneous samples)
        height: Height,
    },
}

impl Vertex {
    /// Creates a new root vertex.
    pub fn new_root(index: NodeId, children: [NodeId; 2], height: Height) -> Self {
        Vertex::Root {
            index,
            children,
            height,
        }
    }

    /// Creates a new internal (non-leaf, non-root) vertex.
    pub fn new_internal(index: NodeId, children: [NodeId; 2], height: Height) -> Self {
        Vertex::Internal {
            index,
            parent: NO_PARENT_SET,
            children,
            height,
        }
    }

    /// Creates a new leaf vertex.
    pub fn new_leaf(index: NodeId, height: Height, label_index: LabelIndex) -> Self {
        Vertex::Leaf {
            index,
            label_index,
            parent: NO_PARENT_SET,
            height,
        }
    }

    /// Returns the index of this vertex.
    pub fn index(&self) -> NodeId {
        match self {
            Vertex::Root { index, .. } => *index,
            Vertex::Internal { index, .. } => *index,
            Vertex::Leaf { index, .. } => *index,
        }
    }

    /// Returns the height of this vertex.
    pub fn height(&self) -> Height {
        match self {
            Vertex::Root { height, .. } => *height,
            Vertex::Internal { height, .. } => *height,
            Vertex::Leaf { height, .. } => *height,
        }
    }

    /// Sets a new height.
    pub fn set_height(&mut self, new_height: Height) {
        match self {
            Vertex::Root { height, .. }
            | Vertex::Internal { height, .. }
            | Vertex::Leaf { height, .. } => *height = new_height,
        }
    }

    /// Returns label index if this is a leaf, else `None`.
    pub fn label_index(&self) -> Option<LabelIndex> {
        match self {
            Vertex::Leaf { label_index, .. } => Some(*label_index),
            _ => None,
        }
    }

    /// Returns `true` if this vertex is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Vertex::Leaf { .. })
    }

    /// Returns `true` if this vertex is an internal vertex.
    pub fn is_internal(&self) -> bool {
        matches!(self, Vertex::Internal { .. })
    }

    /// Returns `true` if this vertex is a root.
    pub fn is_root(&self) -> bool {
        matches!(self, Vertex::Root { .. })
    }

    /// Returns the children as a slice; empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        match self {
            Vertex::Root { children, .. } | Vertex::Internal { children, .. } => children,
            Vertex::Leaf { .. } => &[],
        }
    }

    /// Replaces the child `old` by `new`.
    ///
    /// # Panics
    /// Panics if called on a leaf or if `old` is not a child of this vertex.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) {
        match self {
            Vertex::Root { children, .. } | Vertex::Internal { children, .. } => {
                let slot = children
                    .iter_mut()
                    .find(|c| **c == old)
                    .unwrap_or_else(|| panic!("{old} is not a child of this vertex"));
                *slot = new;
            }
            Vertex::Leaf { .. } => panic!("Cannot replace child of a leaf"),
        }
    }

    /// Sets new parent for non-root vertex.
    ///
    /// # Panics
    /// Panics if called on root.
    pub fn set_parent(&mut self, parent: NodeId) {
        match self {
            Vertex::Root { .. } => panic!("Cannot set parent on root vertex"),
            Vertex::Internal { parent: p, .. } => *p = parent,
            Vertex::Leaf { parent: p, .. } => *p = parent,
        }
    }

    /// Returns the index of parent if this a non-root vertex, else `None`.
    ///
    /// Note that parent might not be set yet during construction.
    pub fn parent_index(&self) -> Option<NodeId> {
        match self {
            Vertex::Internal { parent, .. } | Vertex::Leaf { parent, .. } => {
                if *parent == NO_PARENT_SET {
                    None
                } else {
                    Some(*parent)
                }
            }
            Vertex::Root { .. } => None,
        }
    }

    /// Returns `true` if this vertex has a parent set.
    pub fn has_parent(&self) -> bool {
        self.parent_index().is_some()
    }
}

// =#========================================================================#=
// HEIGHT
// =#========================================================================#=
/// Height of a vertex in a time tree, enforced non-negative and finite.
///
/// Measured backwards from the present, so leaves sampled today have height zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Height(f64);

impl Height {
    /// Creates a new height.
    ///
    /// # Panics
    /// Panics if `height` is negative or not finite.
    pub fn new(height: f64) -> Self {
        assert!(height >= 0.0, "Height must be non-negative, got {}", height);
        assert!(height.is_finite(), "Height must be finite, got {}", height);
        Height(height)
    }

    /// Height zero, e.g. for contemporaneous leaves.
    pub const ZERO: Height = Height(0.0);
}

impl Deref for Height {
    type Target = f64;
    fn deref(&self) -> &f64 {
        &self.0
    }
}
