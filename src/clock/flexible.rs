//! The flexible local clock: one background regime plus clade regimes.

use crate::clock::clade::{BranchAssignment, CladeAssigner, CladeDeclaration};
use crate::clock::error::ClockError;
use crate::clock::regime::{RateRegime, RegimeChange, RegimeId};
use crate::clock::summary::ClockSummary;
use crate::model::{NodeId, RootedTree, TaxonSet};
use rand::Rng;
use std::sync::OnceLock;
use tracing::info;

/// A change reported to a [FlexibleLocalClock] after the sampler moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// State owned by one regime changed, see [RegimeChange]
    Regime(RegimeId, RegimeChange),
    /// Node heights changed; every regime's normalization is stale
    BranchLengths,
    /// The topology changed; the branch assignment is rebuilt on the next read
    Topology,
}

// =#========================================================================#=
// BUILDER
// =#========================================================================#=
/// Builder for a [FlexibleLocalClock].
///
/// Regimes are registered first, then clades are declared under them.
/// Several clades may share one regime, e.g. one relaxed clock for a group of
/// unrelated clades.
#[derive(Debug)]
pub struct FlexibleLocalClockBuilder {
    regimes: Vec<RateRegime>,
    assigner: CladeAssigner,
}

impl FlexibleLocalClockBuilder {
    /// Starts a clock whose background regime governs every branch not claimed by a clade.
    pub fn new(background: impl Into<RateRegime>) -> Self {
        FlexibleLocalClockBuilder {
            regimes: vec![background.into()],
            assigner: CladeAssigner::default(),
        }
    }

    /// Registers a clade regime and returns its id.
    pub fn add_regime(&mut self, regime: impl Into<RateRegime>) -> RegimeId {
        self.regimes.push(regime.into());
        RegimeId::new(self.regimes.len() - 1)
    }

    /// Declares the clade `taxa` under `regime`.
    ///
    /// Declarations are matched in the order they are added; the first match wins.
    pub fn add_clade(&mut self, taxa: TaxonSet, include_stem: bool, regime: RegimeId) -> &mut Self {
        self.assigner.add(CladeDeclaration::new(taxa, include_stem, regime));
        self
    }

    /// Assigns the branches of `tree` and initializes every regime for its branches.
    ///
    /// # Errors
    /// [ClockError::UnknownRegime] if a clade refers to an unregistered regime.
    pub fn build<T: RootedTree + ?Sized, R: Rng>(self, tree: &T, rng: &mut R) -> Result<FlexibleLocalClock, ClockError> {
        let FlexibleLocalClockBuilder { mut regimes, assigner } = self;

        let assignment = assigner.assign(tree, regimes.len())?;
        let mut governed_counts = Vec::with_capacity(regimes.len());
        for (index, regime) in regimes.iter_mut().enumerate() {
            let count = assignment.governed_count(RegimeId::new(index));
            regime.initialize(count, rng);
            governed_counts.push(count);
        }

        info!(
            clocks = regimes.len(),
            clades = assigner.declarations().len(),
            "Initialized flexible local clock"
        );

        Ok(FlexibleLocalClock {
            regimes,
            assigner,
            assignment: OnceLock::from(Ok(assignment)),
            governed_counts,
            topology_changed_since_store: false,
        })
    }
}

// =#========================================================================#=
// FLEXIBLE LOCAL CLOCK
// =#========================================================================#=
/// Branch rate model combining a background regime with clade regimes.
///
/// The root has rate one. Every other branch is rated by the regime the
/// [BranchAssignment] gives it. The assignment is computed once and only
/// rebuilt after a [Change::Topology].
///
/// Reads take `&self` and can be shared between threads; reporting changes
/// and storing or restoring state take `&mut self`.
#[derive(Debug)]
pub struct FlexibleLocalClock {
    regimes: Vec<RateRegime>,
    assigner: CladeAssigner,
    assignment: OnceLock<Result<BranchAssignment, ClockError>>,
    /// Branches per regime at initialization; relaxed regimes keep this fixed
    governed_counts: Vec<usize>,
    topology_changed_since_store: bool,
}

// ============================================================================
// Rates (pub)
// ============================================================================
impl FlexibleLocalClock {
    /// Returns the rate of the branch above `node`; one for the root.
    ///
    /// # Errors
    /// Numerical failures of the governing regime, and
    /// [ClockError::GovernedBranchCountChanged] if a rebuilt assignment does
    /// not fit a relaxed regime anymore.
    pub fn rate_for_branch<T: RootedTree + ?Sized>(&self, tree: &T, node: NodeId) -> Result<f64, ClockError> {
        if tree.is_root(node) {
            return Ok(1.0);
        }

        let assignment = self.assignment(tree)?;
        let entry = assignment.get(node).ok_or(ClockError::UnassignedNode(node))?;
        self.regimes[entry.regime.index()].rate_for_branch(tree, assignment.governed(entry.regime), entry.local_index)
    }

    /// Returns the rates of all branches, indexed by node.
    pub fn branch_rates<T: RootedTree + ?Sized>(&self, tree: &T) -> Result<Vec<f64>, ClockError> {
        (0..tree.node_count())
            .map(|node| self.rate_for_branch(tree, node))
            .collect()
    }

    /// Returns the current branch assignment, rebuilding it if it was invalidated.
    pub fn assignment<T: RootedTree + ?Sized>(&self, tree: &T) -> Result<&BranchAssignment, ClockError> {
        self.assignment
            .get_or_init(|| self.rebuild_assignment(tree))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Returns the rate statistics of every regime governing at least one branch.
    pub fn summaries<T: RootedTree + ?Sized>(&self, tree: &T) -> Result<Vec<ClockSummary>, ClockError> {
        let assignment = self.assignment(tree)?;
        let mut summaries = Vec::new();
        for (index, regime) in self.regimes.iter().enumerate() {
            let id = RegimeId::new(index);
            let governed = assignment.governed(id);
            if governed.is_empty() {
                continue;
            }

            let mut rates = Vec::with_capacity(governed.len());
            let mut lengths = Vec::with_capacity(governed.len());
            for (local, &node) in governed.iter().enumerate() {
                rates.push(regime.rate_for_branch(tree, governed, local)?);
                lengths.push(tree.branch_length(node));
            }
            summaries.push(ClockSummary::from_rates(id, regime.name(), &rates, &lengths));
        }
        Ok(summaries)
    }
}

// ============================================================================
// Invalidation, store and restore (pub)
// ============================================================================
impl FlexibleLocalClock {
    /// Discards the cached state that `change` makes stale.
    ///
    /// Tree-wide changes reach every regime even if one of them fails; a
    /// failing strict regime keeps its previous rate.
    ///
    /// # Errors
    /// [ClockError::UnknownRegime] for an unknown regime, and the first
    /// [ClockError::NonPositiveRate] of a strict regime re-reading a bad rate.
    pub fn invalidate(&mut self, change: Change) -> Result<(), ClockError> {
        match change {
            Change::Regime(id, regime_change) => self.regime_mut(id)?.invalidate(regime_change),
            Change::BranchLengths => self.invalidate_all(RegimeChange::BranchLengths),
            Change::Topology => {
                self.assignment.take();
                self.topology_changed_since_store = true;
                self.invalidate_all(RegimeChange::Topology)
            }
        }
    }

    /// Saves the state of every regime.
    pub fn store(&mut self) {
        for regime in &mut self.regimes {
            regime.store();
        }
        self.topology_changed_since_store = false;
    }

    /// Restores the state saved by the last [FlexibleLocalClock::store].
    ///
    /// The caller restores the tree alongside; if the topology changed in
    /// between, the assignment is rebuilt for the restored tree on the next read.
    pub fn restore(&mut self) {
        for regime in &mut self.regimes {
            regime.restore();
        }
        if self.topology_changed_since_store {
            self.assignment.take();
            self.topology_changed_since_store = false;
        }
    }
}

// ============================================================================
// Getters (pub)
// ============================================================================
impl FlexibleLocalClock {
    pub fn regime(&self, id: RegimeId) -> Result<&RateRegime, ClockError> {
        self.regimes.get(id.index()).ok_or(ClockError::UnknownRegime(id))
    }

    /// Returns a regime for direct changes, e.g. replacing a distribution.
    pub fn regime_mut(&mut self, id: RegimeId) -> Result<&mut RateRegime, ClockError> {
        self.regimes.get_mut(id.index()).ok_or(ClockError::UnknownRegime(id))
    }

    pub fn background(&self) -> &RateRegime {
        &self.regimes[RegimeId::BACKGROUND.index()]
    }

    pub fn regimes(&self) -> &[RateRegime] {
        &self.regimes
    }

    /// Returns the number of clocks: the clade regimes plus the background.
    pub fn number_of_clocks(&self) -> usize {
        self.regimes.len()
    }

    pub fn declarations(&self) -> &[CladeDeclaration] {
        self.assigner.declarations()
    }
}

// ============================================================================
// Helpers (private)
// ============================================================================
impl FlexibleLocalClock {
    /// Invalidates every regime, also those after a failing one.
    fn invalidate_all(&mut self, change: RegimeChange) -> Result<(), ClockError> {
        let mut first_error = None;
        for regime in &mut self.regimes {
            if let Err(err) = regime.invalidate(change) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn rebuild_assignment<T: RootedTree + ?Sized>(&self, tree: &T) -> Result<BranchAssignment, ClockError> {
        let assignment = self.assigner.assign(tree, self.regimes.len())?;
        for (index, regime) in self.regimes.iter().enumerate() {
            let id = RegimeId::new(index);
            let found = assignment.governed_count(id);
            let expected = self.governed_counts[index];
            if regime.is_relaxed() && found != expected {
                return Err(ClockError::GovernedBranchCountChanged { regime: id, expected, found });
            }
        }
        Ok(assignment)
    }
}
