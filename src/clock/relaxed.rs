//! Uncorrelated relaxed clock.
//!
//! Every governed branch draws its rate from a mean-one [RateDistribution],
//! either through a discrete category or through a continuous quantile:
//! - **Discrete** ([RateInputs::Categories]): the distribution is approximated
//!   by a lattice of `K` rates, category `c` having rate
//!   `F^-1((c + 0.5) / K)`. Rates are computed on first use and cached until
//!   the distribution changes.
//! - **Quantile** ([RateInputs::Quantiles]): a branch with quantile `q` has
//!   rate `F^-1(q)`, computed on every call.
//!
//! With normalization enabled, raw rates are rescaled so that their
//! branch-length weighted mean over the governed branches is one. The
//! returned rate is `raw * scale_factor * mean_rate`.
//!
//! # Caching contract
//! Rate reads take `&self` and may run concurrently; each cache cell is filled
//! by exactly one thread. The owner must report changes with
//! [RelaxedClock::invalidate] before the next read:
//!
//! | Change                         | Rate table | Scale factor |
//! |--------------------------------|------------|--------------|
//! | [RegimeChange::Distribution]   | cleared    | cleared      |
//! | any other [RegimeChange]       | kept       | cleared      |

use crate::clock::config::{DERIVE_LATTICE_SIZE, RateInputs, RelaxedClockConfig};
use crate::clock::distribution::RateDistribution;
use crate::clock::error::ClockError;
use crate::clock::parameter::RealParameter;
use crate::clock::regime::RegimeChange;
use crate::model::{NodeId, RootedTree};
use rand::Rng;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Largest accepted deviation of the distribution mean from one
const MEAN_TOLERANCE: f64 = 1e-6;

/// Lazily computed rate; failures are kept so they are not retried.
type RateCell = OnceLock<Result<f64, ClockError>>;

fn cell_from(value: Option<Result<f64, ClockError>>) -> RateCell {
    match value {
        Some(value) => OnceLock::from(value),
        None => OnceLock::new(),
    }
}

/// Saved rate table and scale factor, for rolling back a rejected proposal.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    table: Vec<Option<Result<f64, ClockError>>>,
    scale_factor: Option<Result<f64, ClockError>>,
}

// =#========================================================================#=
// RELAXED CLOCK
// =#========================================================================#=
/// An uncorrelated relaxed clock over the branches it governs.
///
/// Branches are addressed by their local index `0..assigned_branch_count`,
/// which indexes the per-branch categories or quantiles.
///
/// # Lifecycle
/// 1. Create with [RelaxedClock::new], choosing the mode through [RateInputs].
/// 2. Call [RelaxedClock::initialize] with the number of governed branches,
///    which seeds the per-branch state uniformly at random.
/// 3. Read rates with [RelaxedClock::rate_for_branch]; report changes with
///    [RelaxedClock::invalidate]; roll back with [RelaxedClock::store] and
///    [RelaxedClock::restore].
#[derive(Debug)]
pub struct RelaxedClock {
    name: String,
    distribution: Box<dyn RateDistribution>,
    inputs: RateInputs,
    config: RelaxedClockConfig,
    mean_rate: RealParameter,

    assigned_branch_count: usize,
    lattice_size: usize,

    table: Vec<RateCell>,
    scale_factor: RateCell,
    snapshot: Snapshot,
}

// ============================================================================
// New, Getters, etc. (pub)
// ============================================================================
impl RelaxedClock {
    /// Creates a relaxed clock; the mean rate defaults to one.
    ///
    /// # Errors
    /// [ClockError::LatticeSizeWithQuantiles] if a number of discrete rates is
    /// configured while quantiles are used.
    pub fn new<D: RateDistribution + 'static>(
        name: impl Into<String>,
        distribution: D,
        inputs: RateInputs,
        config: RelaxedClockConfig,
    ) -> Result<Self, ClockError> {
        if inputs.uses_quantiles() && config.number_of_discrete_rates != DERIVE_LATTICE_SIZE {
            return Err(ClockError::LatticeSizeWithQuantiles(config.number_of_discrete_rates));
        }

        let name = name.into();
        check_mean(&name, &distribution);

        Ok(RelaxedClock {
            name,
            distribution: Box::new(distribution),
            inputs,
            config,
            mean_rate: RealParameter::scalar(1.0),
            assigned_branch_count: 0,
            lattice_size: 0,
            table: Vec::new(),
            scale_factor: OnceLock::new(),
            snapshot: Snapshot::default(),
        })
    }

    /// Sets the handle of the mean rate multiplying every rate.
    ///
    /// The value is read on every rate evaluation and must then be positive
    /// and finite.
    pub fn with_mean_rate(mut self, mean_rate: RealParameter) -> Self {
        self.mean_rate = mean_rate;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RelaxedClockConfig {
        &self.config
    }

    /// Returns the per-branch categories or quantiles.
    pub fn inputs(&self) -> &RateInputs {
        &self.inputs
    }

    pub fn distribution(&self) -> &dyn RateDistribution {
        self.distribution.as_ref()
    }

    pub fn mean_rate(&self) -> &RealParameter {
        &self.mean_rate
    }

    pub fn uses_quantiles(&self) -> bool {
        self.inputs.uses_quantiles()
    }

    /// Returns the number of branches governed since the last [RelaxedClock::initialize].
    pub fn assigned_branch_count(&self) -> usize {
        self.assigned_branch_count
    }

    /// Returns the number of discrete rate categories, zero in quantile mode.
    pub fn lattice_size(&self) -> usize {
        self.lattice_size
    }

    /// Returns the cached rate of `category`, if it has been computed.
    pub fn cached_rate(&self, category: usize) -> Option<f64> {
        self.table.get(category)?.get()?.as_ref().ok().copied()
    }

    /// Returns the cached normalization scale factor, if it has been computed.
    pub fn cached_scale_factor(&self) -> Option<f64> {
        self.scale_factor.get()?.as_ref().ok().copied()
    }
}

// ============================================================================
// Initialization and rates (pub)
// ============================================================================
impl RelaxedClock {
    /// Prepares the clock for `assigned_branch_count` branches.
    ///
    /// Resizes the per-branch state and seeds it uniformly at random: a
    /// category in `[0, K)` or a quantile in `[0, 1)`. All cached rates and
    /// the stored snapshot are discarded.
    pub fn initialize<R: Rng>(&mut self, assigned_branch_count: usize, rng: &mut R) {
        self.assigned_branch_count = assigned_branch_count;

        match &self.inputs {
            RateInputs::Categories(categories) => {
                let lattice_size = self.config.lattice_size(assigned_branch_count);
                let initial = (0..assigned_branch_count)
                    .map(|_| rng.random_range(0..lattice_size))
                    .collect();
                categories.set_values(initial);
                self.lattice_size = lattice_size;
                info!(
                    clock = %self.name,
                    "Using {lattice_size} rate categories to approximate rate distribution across {assigned_branch_count} branches"
                );
            }
            RateInputs::Quantiles(quantiles) => {
                let initial = (0..assigned_branch_count).map(|_| rng.random::<f64>()).collect();
                quantiles.set_values(initial);
                self.lattice_size = 0;
                info!(
                    clock = %self.name,
                    "Using quantiles for rate distribution across {assigned_branch_count} branches"
                );
            }
        }

        self.table = (0..self.lattice_size).map(|_| OnceLock::new()).collect();
        self.scale_factor = OnceLock::new();
        self.snapshot = Snapshot {
            table: vec![None; self.lattice_size],
            scale_factor: None,
        };
    }

    /// Returns the rate of the branch with local index `local`.
    ///
    /// # Arguments
    /// * `tree` - the tree, read for branch lengths when normalizing
    /// * `governed` - node of each local index, i.e. `governed[local]` is the
    ///   node whose branch is rated
    /// * `local` - local index of the branch
    ///
    /// # Errors
    /// Numerical failures of the distribution, out-of-range per-branch state,
    /// degenerate normalization, and [ClockError::NonPositiveRate] for an
    /// empty, non-positive or non-finite mean rate. Failures of cached computations are
    /// returned again on every read until the cache is invalidated.
    pub fn rate_for_branch<T: RootedTree + ?Sized>(
        &self,
        tree: &T,
        governed: &[NodeId],
        local: usize,
    ) -> Result<f64, ClockError> {
        let mean_rate = self.mean_rate.positive_value()?;
        let raw = self.raw_rate(local)?;
        let scale_factor = self.scale_factor(tree, governed)?;
        Ok(raw * scale_factor * mean_rate)
    }

    /// Returns the rate of the branch with local index `local` before scaling.
    pub fn raw_rate(&self, local: usize) -> Result<f64, ClockError> {
        match &self.inputs {
            RateInputs::Categories(categories) => {
                let category = categories.get(local).ok_or_else(|| self.index_error(local))?;
                let cell = self.table.get(category).ok_or(ClockError::CategoryOutOfRange {
                    category,
                    lattice_size: self.lattice_size,
                })?;
                cell.get_or_init(|| self.category_rate(category)).clone()
            }
            RateInputs::Quantiles(quantiles) => {
                let quantile = quantiles.get(local).ok_or_else(|| self.index_error(local))?;
                Ok(self.distribution.inverse_cumulative_probability(quantile)?)
            }
        }
    }

    /// Returns the normalization scale factor; one if normalization is disabled.
    ///
    /// The factor is `sum(length) / sum(raw_rate * length)` over the governed
    /// branches, computed once and cached until the next invalidation.
    pub fn scale_factor<T: RootedTree + ?Sized>(&self, tree: &T, governed: &[NodeId]) -> Result<f64, ClockError> {
        if !self.config.normalize {
            return Ok(1.0);
        }
        self.scale_factor
            .get_or_init(|| self.compute_scale_factor(tree, governed))
            .clone()
    }
}

// ============================================================================
// Invalidation, store and restore (pub)
// ============================================================================
impl RelaxedClock {
    /// Discards the cached state that `change` makes stale.
    pub fn invalidate(&mut self, change: RegimeChange) {
        if change == RegimeChange::Distribution {
            for cell in &mut self.table {
                cell.take();
            }
        }
        self.scale_factor.take();
    }

    /// Replaces the distribution and discards all cached rates.
    pub fn set_distribution<D: RateDistribution + 'static>(&mut self, distribution: D) {
        check_mean(&self.name, &distribution);
        self.distribution = Box::new(distribution);
        self.invalidate(RegimeChange::Distribution);
    }

    /// Saves the rate table (discrete mode) and the scale factor.
    pub fn store(&mut self) {
        self.snapshot = Snapshot {
            table: self.table.iter().map(|cell| cell.get().cloned()).collect(),
            scale_factor: self.scale_factor.get().cloned(),
        };
    }

    /// Restores the rate table and scale factor saved by the last [RelaxedClock::store].
    pub fn restore(&mut self) {
        self.table = self.snapshot.table.iter().cloned().map(cell_from).collect();
        self.scale_factor = cell_from(self.snapshot.scale_factor.clone());
    }
}

// ============================================================================
// Helpers (private)
// ============================================================================
impl RelaxedClock {
    fn category_rate(&self, category: usize) -> Result<f64, ClockError> {
        let p = (category as f64 + 0.5) / self.lattice_size as f64;
        Ok(self.distribution.inverse_cumulative_probability(p)?)
    }

    fn compute_scale_factor<T: RootedTree + ?Sized>(&self, tree: &T, governed: &[NodeId]) -> Result<f64, ClockError> {
        let mut tree_rate = 0.0;
        let mut tree_time = 0.0;
        for (local, &node) in governed.iter().enumerate() {
            let length = tree.branch_length(node);
            tree_rate += self.raw_rate(local)? * length;
            tree_time += length;
        }

        if !(tree_time > 0.0) {
            return Err(ClockError::DegenerateNormalization(format!(
                "branches of clock {} have total length {tree_time}",
                self.name
            )));
        }
        if !(tree_rate > 0.0 && tree_rate.is_finite()) {
            return Err(ClockError::DegenerateNormalization(format!(
                "length-weighted rate sum of clock {} is {tree_rate}",
                self.name
            )));
        }

        let scale_factor = tree_time / tree_rate;
        debug!(clock = %self.name, scale_factor, "Normalized rates");
        Ok(scale_factor)
    }

    fn index_error(&self, index: usize) -> ClockError {
        ClockError::BranchIndexOutOfRange {
            index,
            count: self.inputs.len(),
        }
    }
}

/// Warns if the distribution's mean is not one.
fn check_mean(name: &str, distribution: &dyn RateDistribution) {
    match distribution.mean() {
        Ok(mean) if (mean - 1.0).abs() > MEAN_TOLERANCE => {
            warn!(clock = %name, mean, "Mean of distribution for relaxed clock is not 1.0");
        }
        Ok(_) => {}
        Err(err) => debug!(clock = %name, %err, "Mean of distribution for relaxed clock unknown"),
    }
}
