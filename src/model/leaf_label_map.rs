//! Leaf labels of a time tree.
//!
//! - [LeafLabelMap]: deduplicated storage of leaf labels with lookup in both directions.

use std::collections::HashMap;
use std::fmt;

/// Index of a leaf label in a [LeafLabelMap].
pub type LabelIndex = usize;

// =#========================================================================#=
// LEAF LABEL MAP
// =#========================================================================#=
/// Maps leaf labels (strings) to compact indices and back.
///
/// Leaves of a [TimeTree](crate::model::TimeTree) store only a [LabelIndex].
/// Inserting the same label twice returns the same index.
///
/// # Example
/// ```
/// use flexclock::model::LeafLabelMap;
///
/// let mut labels = LeafLabelMap::new(3);
///
/// let idx_a = labels.get_or_insert("A");
/// let idx_b = labels.get_or_insert("B");
/// let idx_a2 = labels.get_or_insert("A");
///
/// assert_eq!(idx_a, idx_a2);
/// assert_ne!(idx_a, idx_b);
/// assert_eq!(labels.get_label(idx_b), Some("B"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LeafLabelMap {
    labels: Vec<String>,
    map: HashMap<String, LabelIndex>,
}

impl LeafLabelMap {
    /// Creates a new map with room for `num_leaves` labels.
    pub fn new(num_leaves: usize) -> Self {
        LeafLabelMap {
            labels: Vec::with_capacity(num_leaves),
            map: HashMap::with_capacity(num_leaves),
        }
    }

    /// Gets the index for a label, inserting it if it doesn't exist.
    pub fn get_or_insert(&mut self, label: &str) -> LabelIndex {
        if let Some(&index) = self.map.get(label) {
            return index;
        }

        let index = self.labels.len();
        self.labels.push(label.to_string());
        self.map.insert(label.to_string(), index);
        index
    }

    /// Retrieves the index for a given label, `None` if unknown.
    pub fn get_index(&self, label: &str) -> Option<LabelIndex> {
        self.map.get(label).copied()
    }

    /// Retrieves the label for a given index, `None` if out of bounds.
    pub fn get_label(&self, index: LabelIndex) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Checks if a label exists in the map.
    pub fn contains_label(&self, label: &str) -> bool {
        self.map.contains_key(label)
    }

    /// Returns the number of labels currently stored.
    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    /// Returns the labels in insertion order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl fmt::Display for LeafLabelMap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "LeafLabelMap ({} labels):", self.labels.len())?;
        for (idx, label) in self.labels.iter().enumerate() {
            writeln!(f, "  [{}] {}", idx, label)?;
        }
        Ok(())
    }
}

impl std::ops::Index<LabelIndex> for LeafLabelMap {
    type Output = str;

    fn index(&self, index: LabelIndex) -> &Self::Output {
        &self.labels[index]
    }
}
