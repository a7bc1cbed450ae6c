//! Branch rate models: strict, relaxed and flexible local clocks.
//!
//! # Overview
//! A [FlexibleLocalClock] rates every branch of a tree:
//! - The root has rate one.
//! - A [CladeAssigner] maps every other branch to a regime: the background
//!   regime, or the regime of the first declared clade containing it (see
//!   [clade] for the rules on stems and conflicts).
//! - A [RateRegime] rates the branch: a [StrictClock] returns its constant
//!   rate, a [RelaxedClock] draws it from a [RateDistribution] through a
//!   discrete rate category or a quantile.
//!
//! # Working with a sampler
//! Clocks cache what they compute. A sampler that perturbs a parameter handle
//! (e.g. [CategoryParameter]) or the tree reports it with
//! [FlexibleLocalClock::invalidate]:
//! - [Change::Regime] with [RegimeChange::Distribution] after changing a
//!   distribution's parameters,
//! - [Change::Regime] with [RegimeChange::Rates] or [RegimeChange::MeanRate]
//!   after changing categories, quantiles or rates,
//! - [Change::BranchLengths] after moving node heights,
//! - [Change::Topology] after changing the topology.
//!
//! Before a proposal the sampler calls [FlexibleLocalClock::store], and on
//! rejection [FlexibleLocalClock::restore].

pub mod clade;
pub mod config;
pub mod distribution;
pub mod error;
pub mod flexible;
pub mod parameter;
pub mod regime;
pub mod relaxed;
pub mod strict;
pub mod summary;

pub use clade::{BranchAssignment, BranchEntry, CladeAssigner, CladeDeclaration};
pub use config::{RateInputs, RelaxedClockConfig, StrictClockConfig};
pub use distribution::{ExponentialRates, GammaRates, LogNormalRates, RateDistribution};
pub use error::{ClockError, DistributionError};
pub use flexible::{Change, FlexibleLocalClock, FlexibleLocalClockBuilder};
pub use parameter::{CategoryParameter, Parameter, QuantileParameter, RealParameter};
pub use regime::{RateRegime, RegimeChange, RegimeId};
pub use relaxed::RelaxedClock;
pub use strict::StrictClock;
pub use summary::ClockSummary;
