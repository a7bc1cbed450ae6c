//! Data model for rooted time trees and clades.
//!
//! # Tree representation
//! Clock models read trees through the [RootedTree] trait, so any tree type
//! with dense node ids and node heights can be used. [TimeTree] is the
//! provided implementation: a binary tree using the arena pattern to store
//! [Vertex] nodes, each either a `Root`, `Internal`, or `Leaf`, referenced by
//! [NodeId].
//!
//! # Clades
//! A [TaxonSet] names a set of leaf labels; a clade is the subtree whose leaf
//! labels are exactly that set.

pub mod leaf_label_map;
pub mod taxon_set;
pub mod tree;
pub mod vertex;

pub use leaf_label_map::{LabelIndex, LeafLabelMap};
pub use taxon_set::TaxonSet;
pub use tree::{NodeId, PostOrderIter, PreOrderIter, RootedTree, TimeTree, post_order, pre_order};
pub use vertex::{Height, Vertex};
