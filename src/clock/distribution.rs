//! Mean-one rate distributions for relaxed clocks.
//!
//! Relaxed clocks only consume the [RateDistribution] trait. Three families
//! backed by `statrs` are provided, each parameterized so that its mean is one:
//! - [LogNormalRates]: log-normal with standard deviation `s` in log space and
//!   location `-s^2/2`
//! - [GammaRates]: gamma with shape `k` and rate `k`
//! - [ExponentialRates]: exponential with rate one
//!
//! Shape parameters are shared [RealParameter] handles and are read on every
//! call, so a sampler can perturb them. After doing so, the clock must be told
//! via [RegimeChange::Distribution](crate::clock::RegimeChange::Distribution).

use crate::clock::error::DistributionError;
use crate::clock::parameter::RealParameter;
use statrs::distribution::{ContinuousCDF, Exp, Gamma, LogNormal};
use statrs::statistics::Distribution;
use std::fmt::Debug;

/// A parametric distribution over rates.
///
/// Rates of relaxed clocks are defined relative to a neutral rate of one, so
/// implementations are expected to have mean one. A mean further than `1e-6`
/// from one is accepted but logged as a warning when a clock is created.
pub trait RateDistribution: Debug + Send + Sync {
    /// Returns the mean of the distribution.
    fn mean(&self) -> Result<f64, DistributionError>;

    /// Returns the rate `x` with `P(X <= x) = p`.
    ///
    /// # Errors
    /// Returns [DistributionError::InvalidProbability] if `p` lies outside
    /// `[0, 1]`, and [DistributionError::NonFiniteQuantile] if the result is
    /// not finite (e.g. `p = 1` for unbounded support).
    fn inverse_cumulative_probability(&self, p: f64) -> Result<f64, DistributionError>;
}

/// Checks `p` and the quantile a `statrs` distribution computes for it.
fn checked_inverse_cdf<D: ContinuousCDF<f64, f64>>(distribution: &D, p: f64) -> Result<f64, DistributionError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(DistributionError::InvalidProbability(p));
    }
    let x = distribution.inverse_cdf(p);
    if x.is_finite() {
        Ok(x)
    } else {
        Err(DistributionError::NonFiniteQuantile(p))
    }
}

fn invalid_parameters<E: ToString>(err: E) -> DistributionError {
    DistributionError::InvalidParameters(err.to_string())
}

fn empty_parameter(name: &str) -> DistributionError {
    DistributionError::InvalidParameters(format!("{name} parameter holds no value"))
}

// =#========================================================================#=
// LOG-NORMAL
// =#========================================================================#=
/// Log-normal distribution with mean one.
///
/// # Example
/// ```
/// use flexclock::clock::{LogNormalRates, RateDistribution, RealParameter};
///
/// let rates = LogNormalRates::new(RealParameter::scalar(0.5));
/// let median = rates.inverse_cumulative_probability(0.5).unwrap();
/// assert!((median - (-0.125f64).exp()).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct LogNormalRates {
    log_sd: RealParameter,
}

impl LogNormalRates {
    /// Creates a log-normal with the standard deviation in log space given by `log_sd`.
    pub fn new(log_sd: RealParameter) -> Self {
        LogNormalRates { log_sd }
    }

    /// Returns the handle to the standard deviation in log space.
    pub fn log_sd(&self) -> &RealParameter {
        &self.log_sd
    }

    fn build(&self) -> Result<LogNormal, DistributionError> {
        let s = self.log_sd.value().ok_or_else(|| empty_parameter("log_sd"))?;
        LogNormal::new(-0.5 * s * s, s).map_err(invalid_parameters)
    }
}

impl RateDistribution for LogNormalRates {
    fn mean(&self) -> Result<f64, DistributionError> {
        self.build()?.mean().ok_or(DistributionError::UndefinedMean)
    }

    fn inverse_cumulative_probability(&self, p: f64) -> Result<f64, DistributionError> {
        checked_inverse_cdf(&self.build()?, p)
    }
}

// =#========================================================================#=
// GAMMA
// =#========================================================================#=
/// Gamma distribution with mean one, i.e. shape and rate equal.
#[derive(Debug, Clone)]
pub struct GammaRates {
    shape: RealParameter,
}

impl GammaRates {
    /// Creates a gamma distribution whose shape (and rate) is given by `shape`.
    pub fn new(shape: RealParameter) -> Self {
        GammaRates { shape }
    }

    /// Returns the handle to the shape.
    pub fn shape(&self) -> &RealParameter {
        &self.shape
    }

    fn build(&self) -> Result<Gamma, DistributionError> {
        let k = self.shape.value().ok_or_else(|| empty_parameter("shape"))?;
        Gamma::new(k, k).map_err(invalid_parameters)
    }
}

impl RateDistribution for GammaRates {
    fn mean(&self) -> Result<f64, DistributionError> {
        self.build()?.mean().ok_or(DistributionError::UndefinedMean)
    }

    fn inverse_cumulative_probability(&self, p: f64) -> Result<f64, DistributionError> {
        checked_inverse_cdf(&self.build()?, p)
    }
}

// =#========================================================================#=
// EXPONENTIAL
// =#========================================================================#=
/// Exponential distribution with rate (and mean) one.
#[derive(Debug, Clone, Default)]
pub struct ExponentialRates;

impl RateDistribution for ExponentialRates {
    fn mean(&self) -> Result<f64, DistributionError> {
        Ok(1.0)
    }

    fn inverse_cumulative_probability(&self, p: f64) -> Result<f64, DistributionError> {
        let exp = Exp::new(1.0).map_err(invalid_parameters)?;
        checked_inverse_cdf(&exp, p)
    }
}
