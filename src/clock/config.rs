//! Configuration of strict and relaxed clocks.
//!
//! Configs are plain values with defaults, adjustable with `with_*` methods or
//! loaded from TOML:
//! ```
//! use flexclock::clock::RelaxedClockConfig;
//!
//! let config = RelaxedClockConfig::from_toml_str("number_of_discrete_rates = 20").unwrap();
//! assert_eq!(config, RelaxedClockConfig::default().with_number_of_discrete_rates(20));
//! assert!(!config.normalize);
//! ```

use crate::clock::error::ClockError;
use crate::clock::parameter::{CategoryParameter, QuantileParameter};
use serde::{Deserialize, Serialize};

/// Lattice size meaning "one rate category per governed branch"
pub const DERIVE_LATTICE_SIZE: i32 = -1;

// =#========================================================================#=
// RELAXED CLOCK CONFIG
// =#========================================================================#=
/// Settings of a relaxed clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelaxedClockConfig {
    /// Number of discrete rate categories approximating the distribution.
    /// A value `<= 0` uses one category per governed branch.
    /// Must stay at its default when rate quantiles are used.
    pub number_of_discrete_rates: i32,

    /// Whether to rescale rates so that their branch-length weighted mean
    /// equals the mean rate.
    pub normalize: bool,
}

impl Default for RelaxedClockConfig {
    fn default() -> Self {
        RelaxedClockConfig {
            number_of_discrete_rates: DERIVE_LATTICE_SIZE,
            normalize: false,
        }
    }
}

impl RelaxedClockConfig {
    /// Sets the number of discrete rate categories.
    pub fn with_number_of_discrete_rates(mut self, number_of_discrete_rates: i32) -> Self {
        self.number_of_discrete_rates = number_of_discrete_rates;
        self
    }

    /// Enables or disables normalization.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Loads a config from TOML; missing keys take their defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, ClockError> {
        Ok(toml::from_str(toml)?)
    }

    /// Returns the lattice size for `assigned_branch_count` branches.
    pub fn lattice_size(&self, assigned_branch_count: usize) -> usize {
        if self.number_of_discrete_rates <= 0 {
            assigned_branch_count
        } else {
            self.number_of_discrete_rates as usize
        }
    }
}

// =#========================================================================#=
// STRICT CLOCK CONFIG
// =#========================================================================#=
/// Settings of a strict clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrictClockConfig {
    /// Constant rate of every governed branch; must be positive.
    pub rate: f64,
}

impl Default for StrictClockConfig {
    fn default() -> Self {
        StrictClockConfig { rate: 1.0 }
    }
}

impl StrictClockConfig {
    /// Sets the rate.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Loads a config from TOML; missing keys take their defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, ClockError> {
        Ok(toml::from_str(toml)?)
    }
}

// =#========================================================================#=
// RATE INPUTS
// =#========================================================================#=
/// Per-branch state of a relaxed clock: either discrete categories or quantiles.
#[derive(Debug, Clone)]
pub enum RateInputs {
    /// Each branch holds a category in `[0, K)` of a lattice of `K` rates.
    Categories(CategoryParameter),
    /// Each branch holds a quantile in `[0, 1)` of the rate distribution.
    Quantiles(QuantileParameter),
}

impl RateInputs {
    /// Selects the mode from whichever handle is supplied.
    ///
    /// # Errors
    /// [ClockError::ConflictingRateInputs] if both are supplied,
    /// [ClockError::MissingRateInputs] if neither is.
    pub fn from_options(
        categories: Option<CategoryParameter>,
        quantiles: Option<QuantileParameter>,
    ) -> Result<Self, ClockError> {
        match (categories, quantiles) {
            (Some(_), Some(_)) => Err(ClockError::ConflictingRateInputs),
            (Some(categories), None) => Ok(RateInputs::Categories(categories)),
            (None, Some(quantiles)) => Ok(RateInputs::Quantiles(quantiles)),
            (None, None) => Err(ClockError::MissingRateInputs),
        }
    }

    /// Returns `true` in quantile mode.
    pub fn uses_quantiles(&self) -> bool {
        matches!(self, RateInputs::Quantiles(_))
    }

    /// Returns the number of per-branch values currently held.
    pub fn len(&self) -> usize {
        match self {
            RateInputs::Categories(categories) => categories.len(),
            RateInputs::Quantiles(quantiles) => quantiles.len(),
        }
    }

    /// Returns `true` if no per-branch values are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
