use crate::clock::error::ClockError;
use crate::clock::relaxed::RelaxedClock;
use crate::clock::strict::StrictClock;
use crate::model::{NodeId, RootedTree};
use rand::Rng;
use std::fmt;

/// Identifier of a rate regime within a [FlexibleLocalClock](crate::clock::FlexibleLocalClock).
///
/// The background regime always has id [RegimeId::BACKGROUND]; clade regimes
/// are numbered in the order they are added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegimeId(usize);

impl RegimeId {
    /// Id of the background (lineage) regime
    pub const BACKGROUND: RegimeId = RegimeId(0);

    pub(crate) fn new(index: usize) -> Self {
        RegimeId(index)
    }

    /// Returns the position of the regime in its clock.
    pub fn index(self) -> usize {
        self.0
    }

    pub fn is_background(self) -> bool {
        self == Self::BACKGROUND
    }
}

impl fmt::Display for RegimeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A change of external state that can make cached rates of a regime stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegimeChange {
    /// Parameters of the rate distribution changed, or it was replaced
    Distribution,
    /// Per-branch categories or quantiles changed
    Rates,
    /// The mean rate (or a strict clock's rate) changed
    MeanRate,
    /// Node heights changed
    BranchLengths,
    /// The tree topology changed
    Topology,
}

// =#========================================================================#=
// RATE REGIME
// =#========================================================================#=
/// A rate model governing a set of branches: strict or relaxed.
#[derive(Debug)]
pub enum RateRegime {
    Strict(StrictClock),
    Relaxed(RelaxedClock),
}

impl RateRegime {
    pub fn name(&self) -> &str {
        match self {
            RateRegime::Strict(clock) => clock.name(),
            RateRegime::Relaxed(clock) => clock.name(),
        }
    }

    pub fn is_relaxed(&self) -> bool {
        matches!(self, RateRegime::Relaxed(_))
    }

    pub fn as_strict(&self) -> Option<&StrictClock> {
        match self {
            RateRegime::Strict(clock) => Some(clock),
            RateRegime::Relaxed(_) => None,
        }
    }

    pub fn as_relaxed(&self) -> Option<&RelaxedClock> {
        match self {
            RateRegime::Relaxed(clock) => Some(clock),
            RateRegime::Strict(_) => None,
        }
    }

    pub fn as_relaxed_mut(&mut self) -> Option<&mut RelaxedClock> {
        match self {
            RateRegime::Relaxed(clock) => Some(clock),
            RateRegime::Strict(_) => None,
        }
    }

    /// Prepares the regime for `assigned_branch_count` branches; strict clocks need nothing.
    pub fn initialize<R: Rng>(&mut self, assigned_branch_count: usize, rng: &mut R) {
        if let RateRegime::Relaxed(clock) = self {
            clock.initialize(assigned_branch_count, rng);
        }
    }

    /// Returns the rate of the branch with local index `local`.
    ///
    /// `governed[local]` is the node whose branch is rated.
    pub fn rate_for_branch<T: RootedTree + ?Sized>(
        &self,
        tree: &T,
        governed: &[NodeId],
        local: usize,
    ) -> Result<f64, ClockError> {
        match self {
            RateRegime::Strict(clock) => Ok(clock.rate()),
            RateRegime::Relaxed(clock) => clock.rate_for_branch(tree, governed, local),
        }
    }

    /// Discards cached state made stale by `change`; strict clocks re-read their rate.
    pub fn invalidate(&mut self, change: RegimeChange) -> Result<(), ClockError> {
        match self {
            RateRegime::Strict(clock) => clock.invalidate(),
            RateRegime::Relaxed(clock) => {
                clock.invalidate(change);
                Ok(())
            }
        }
    }

    pub fn store(&mut self) {
        match self {
            RateRegime::Strict(clock) => clock.store(),
            RateRegime::Relaxed(clock) => clock.store(),
        }
    }

    pub fn restore(&mut self) {
        match self {
            RateRegime::Strict(clock) => clock.restore(),
            RateRegime::Relaxed(clock) => clock.restore(),
        }
    }
}

impl From<StrictClock> for RateRegime {
    fn from(clock: StrictClock) -> Self {
        RateRegime::Strict(clock)
    }
}

impl From<RelaxedClock> for RateRegime {
    fn from(clock: RelaxedClock) -> Self {
        RateRegime::Relaxed(clock)
    }
}
