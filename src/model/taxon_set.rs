//! Named sets of leaf labels identifying clades.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// An immutable, named set of unique leaf labels.
///
/// A taxon set identifies a clade structurally: the clade is the subtree whose
/// set of descendant leaf labels equals this set. Labels are kept sorted, so
/// two taxon sets with the same labels compare equal regardless of the order
/// in which the labels were given.
///
/// # Example
/// ```
/// use flexclock::model::TaxonSet;
///
/// let kiwis = TaxonSet::new("kiwis", ["Great Spotted", "Little Spotted", "Great Spotted"]);
/// assert_eq!(kiwis.len(), 2);
/// assert!(kiwis.contains("Little Spotted"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonSet {
    name: String,
    labels: BTreeSet<String>,
}

impl TaxonSet {
    /// Creates a taxon set from a name and any collection of labels; duplicates collapse.
    pub fn new<N, I, S>(name: N, labels: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TaxonSet {
            name: name.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the name of this taxon set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the labels, sorted.
    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the set holds no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Checks whether `label` belongs to this set.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Checks whether this set equals the given sorted set of descendant labels.
    pub fn matches(&self, descendants: &BTreeSet<&str>) -> bool {
        self.labels.len() == descendants.len()
            && self
                .labels
                .iter()
                .zip(descendants)
                .all(|(own, other)| own.as_str() == *other)
    }
}

impl fmt::Display for TaxonSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{label}")?;
        }
        write!(f, "}}")
    }
}
