//! Assignment of branches to rate regimes by clade.
//!
//! A [CladeDeclaration] puts the clade identified by a [TaxonSet] under a
//! regime, either including its stem branch or not. The [CladeAssigner] turns
//! declarations into a [BranchAssignment] for a given tree with two walks:
//! 1. **Post-order**: collect the descendant labels of every node. At the
//!    first declaration whose taxon set equals them, the clade starts: with
//!    stem, at the node itself; without stem, at each of its children.
//!    The root is never matched.
//! 2. **Pre-order**: every node not claimed by a clade takes the regime of its
//!    parent, where the root stands for the background regime.
//!
//! Declarations are tried in the order they were added, and the first match
//! wins. A declaration matching no subtree has no effect.

use crate::clock::error::ClockError;
use crate::clock::regime::RegimeId;
use crate::model::{NodeId, RootedTree, TaxonSet, post_order, pre_order};
use std::collections::BTreeSet;
use tracing::debug;

// =#========================================================================#=
// CLADE DECLARATION
// =#========================================================================#=
/// A clade put under a rate regime.
#[derive(Debug, Clone, PartialEq)]
pub struct CladeDeclaration {
    taxa: TaxonSet,
    include_stem: bool,
    regime: RegimeId,
}

impl CladeDeclaration {
    pub fn new(taxa: TaxonSet, include_stem: bool, regime: RegimeId) -> Self {
        CladeDeclaration { taxa, include_stem, regime }
    }

    pub fn taxa(&self) -> &TaxonSet {
        &self.taxa
    }

    /// Returns `true` if the branch above the clade's MRCA belongs to the clade.
    pub fn include_stem(&self) -> bool {
        self.include_stem
    }

    pub fn regime(&self) -> RegimeId {
        self.regime
    }
}

// =#========================================================================#=
// BRANCH ASSIGNMENT
// =#========================================================================#=
/// Regime and local index of one branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchEntry {
    pub regime: RegimeId,
    /// Index of the branch among the branches of its regime
    pub local_index: usize,
}

/// Mapping from every non-root node to the regime governing its branch.
///
/// Within a regime, governed nodes are numbered `0..n` in ascending node id;
/// that number is the node's local index into the regime's per-branch state.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchAssignment {
    entries: Vec<Option<BranchEntry>>,
    governed: Vec<Vec<NodeId>>,
}

impl BranchAssignment {
    /// Builds the assignment from the regime of every node (`None` for the root).
    fn from_regimes(regimes: &[Option<RegimeId>], num_regimes: usize) -> Self {
        let mut governed = vec![Vec::new(); num_regimes];
        let entries = regimes
            .iter()
            .enumerate()
            .map(|(node, regime)| {
                regime.map(|regime| {
                    let nodes = &mut governed[regime.index()];
                    nodes.push(node);
                    BranchEntry { regime, local_index: nodes.len() - 1 }
                })
            })
            .collect();
        BranchAssignment { entries, governed }
    }

    /// Returns the entry of `node`, `None` for the root and unknown nodes.
    pub fn get(&self, node: NodeId) -> Option<BranchEntry> {
        self.entries.get(node).copied().flatten()
    }

    /// Returns the regime of `node`, `None` for the root.
    pub fn regime_of(&self, node: NodeId) -> Option<RegimeId> {
        self.get(node).map(|entry| entry.regime)
    }

    /// Returns the nodes governed by `regime`, ordered by local index.
    pub fn governed(&self, regime: RegimeId) -> &[NodeId] {
        self.governed.get(regime.index()).map_or(&[], Vec::as_slice)
    }

    /// Returns the number of branches governed by `regime`.
    pub fn governed_count(&self, regime: RegimeId) -> usize {
        self.governed(regime).len()
    }

    /// Returns the number of nodes of the assigned tree.
    pub fn node_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of regimes, background included.
    pub fn num_regimes(&self) -> usize {
        self.governed.len()
    }

    /// Returns an iterator over `(node, entry)` of all non-root nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, BranchEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(node, entry)| entry.map(|entry| (node, entry)))
    }
}

// =#========================================================================#=
// CLADE ASSIGNER
// =#========================================================================#=
/// Assigns branches to regimes based on clade declarations.
#[derive(Debug, Clone, Default)]
pub struct CladeAssigner {
    declarations: Vec<CladeDeclaration>,
}

impl CladeAssigner {
    pub fn new(declarations: Vec<CladeDeclaration>) -> Self {
        CladeAssigner { declarations }
    }

    /// Adds a declaration; it ranks after all earlier ones.
    pub fn add(&mut self, declaration: CladeDeclaration) {
        self.declarations.push(declaration);
    }

    pub fn declarations(&self) -> &[CladeDeclaration] {
        &self.declarations
    }

    /// Assigns every non-root branch of `tree` to a regime.
    ///
    /// # Arguments
    /// * `tree` - tree to assign
    /// * `num_regimes` - number of regimes including the background, so that
    ///   the result lists the governed branches of every regime
    ///
    /// # Errors
    /// [ClockError::UnknownRegime] if a declaration refers to a regime `>= num_regimes`.
    pub fn assign<T: RootedTree + ?Sized>(&self, tree: &T, num_regimes: usize) -> Result<BranchAssignment, ClockError> {
        if let Some(declaration) = self
            .declarations
            .iter()
            .find(|declaration| declaration.regime.index() >= num_regimes)
        {
            return Err(ClockError::UnknownRegime(declaration.regime));
        }

        let claims = self.claim_clade_roots(tree);

        // Pre-order walk: inherit the parent's regime unless claimed
        let mut regimes: Vec<Option<RegimeId>> = vec![None; tree.node_count()];
        for node in pre_order(tree) {
            if let Some(parent) = tree.parent(node) {
                let inherited = regimes[parent].unwrap_or(RegimeId::BACKGROUND);
                regimes[node] = Some(claims[node].unwrap_or(inherited));
            }
        }

        let assignment = BranchAssignment::from_regimes(&regimes, num_regimes);
        debug!(
            branches = tree.node_count().saturating_sub(1),
            background = assignment.governed_count(RegimeId::BACKGROUND),
            "Assigned branches to rate regimes"
        );
        Ok(assignment)
    }

    /// Post-order walk recording, per node, the regime of a clade starting there.
    fn claim_clade_roots<T: RootedTree + ?Sized>(&self, tree: &T) -> Vec<Option<RegimeId>> {
        let mut claims: Vec<Option<RegimeId>> = vec![None; tree.node_count()];
        let mut descendants: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); tree.node_count()];
        let mut matched = vec![false; self.declarations.len()];

        for node in post_order(tree) {
            let children = tree.children(node);
            let mut labels = BTreeSet::new();
            if children.is_empty() {
                labels.extend(tree.label(node));
            } else {
                for &child in children {
                    labels.append(&mut descendants[child]);
                }
            }

            if !tree.is_root(node) {
                let found = self
                    .declarations
                    .iter()
                    .position(|declaration| declaration.taxa.matches(&labels));
                if let Some(index) = found {
                    matched[index] = true;
                    let declaration = &self.declarations[index];
                    if declaration.include_stem {
                        claims[node] = Some(declaration.regime);
                    } else {
                        // Node keeps the inherited regime, the clade starts below it
                        for &child in children {
                            claims[child] = Some(declaration.regime);
                        }
                    }
                }
            }

            descendants[node] = labels;
        }

        for (declaration, _) in self.declarations.iter().zip(&matched).filter(|(_, found)| !**found) {
            debug!(clade = %declaration.taxa, "Clade matches no subtree and governs no branch");
        }

        claims
    }
}
