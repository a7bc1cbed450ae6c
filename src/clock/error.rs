//! Error types of the clock models.
//!
//! [ClockError] covers configuration mistakes, numerical failures and
//! structural mismatches. It is `Clone`, since lazily computed rates cache
//! their failures together with their values.

use crate::clock::regime::RegimeId;
use crate::model::NodeId;
use thiserror::Error;

// =#========================================================================#=
// DISTRIBUTION ERROR
// =#========================================================================#=
/// Failure of a rate distribution to produce a mean or a quantile.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistributionError {
    #[error("Probability {0} outside of [0, 1]")]
    InvalidProbability(f64),
    #[error("Invalid distribution parameters - {0}")]
    InvalidParameters(String),
    #[error("Inverse cumulative probability of {0} is not finite")]
    NonFiniteQuantile(f64),
    #[error("Distribution has no defined mean")]
    UndefinedMean,
}

// =#========================================================================#=
// CLOCK ERROR
// =#========================================================================#=
/// Errors that can occur while configuring or evaluating clock models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClockError {
    #[error("Can't specify both rate categories and rate quantiles")]
    ConflictingRateInputs,
    #[error("Either rate categories or rate quantiles must be specified")]
    MissingRateInputs,
    #[error("Can't specify both number of discrete rates ({0}) and rate quantiles")]
    LatticeSizeWithQuantiles(i32),
    #[error("Clock rate must be positive but is {value}")]
    NonPositiveRate { value: f64 },
    #[error("Rate category {category} outside of lattice of size {lattice_size}")]
    CategoryOutOfRange { category: usize, lattice_size: usize },
    #[error("No rate state for local branch index {index} (clock governs {count} branches)")]
    BranchIndexOutOfRange { index: usize, count: usize },
    #[error("Failed to compute inverse cumulative probability - {0}")]
    Distribution(#[from] DistributionError),
    #[error("Regime {regime} governed {expected} branches but now governs {found}")]
    GovernedBranchCountChanged { regime: RegimeId, expected: usize, found: usize },
    #[error("Node {0} has no regime; was a topology change reported?")]
    UnassignedNode(NodeId),
    #[error("Unknown regime {0}")]
    UnknownRegime(RegimeId),
    #[error("Cannot normalize rates - {0}")]
    DegenerateNormalization(String),
    #[error("Invalid configuration - {0}")]
    Config(String),
}

impl From<toml::de::Error> for ClockError {
    fn from(err: toml::de::Error) -> Self {
        ClockError::Config(err.to_string())
    }
}
