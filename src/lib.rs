//! Flexclock is a library of flexible local clocks for phylogenetic trees.
//!
//! A flexible local clock computes a substitution-rate multiplier for every
//! branch of a rooted time tree. Branches outside any declared clade follow a
//! background clock, while declared clades (optionally with their stem branch)
//! follow their own clock. Each clock is either strict or an uncorrelated
//! relaxed clock, whose per-branch rates are drawn from a mean-one
//! distribution through discrete rate categories or continuous quantiles.
//!
//! Core functionality provided:
//! - Clock models: see [crate::clock] for the composite
//!   [FlexibleLocalClock](clock::FlexibleLocalClock), the
//!   [StrictClock](clock::StrictClock) and the
//!   [RelaxedClock](clock::RelaxedClock).
//! - Tree model: the [RootedTree](model::RootedTree) trait consumed by the
//!   clocks, and [TimeTree](model::TimeTree), an arena-based binary time tree.
//! - Newick: read binary Newick strings into time trees, see [crate::newick].
//!
//! Limitations:
//! - Only binary trees are read
//! - Only leaf labels are considered
//!
//! # Usage patterns
//!
//! ## Example
//!
//! Two strict clocks on a four-taxon tree:
//! ```
//! use flexclock::clock::{FlexibleLocalClockBuilder, RateRegime, StrictClock};
//! use flexclock::model::{RootedTree, TaxonSet};
//! use flexclock::parse_newick_str;
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let tree = parse_newick_str("((A:1,B:1):1,(C:1,D:1):1);").unwrap();
//! let background = RateRegime::Strict(StrictClock::with_rate("background", 1.0).unwrap());
//!
//! let mut builder = FlexibleLocalClockBuilder::new(background);
//! let fast = builder.add_regime(RateRegime::Strict(StrictClock::with_rate("fast", 2.0).unwrap()));
//! builder.add_clade(TaxonSet::new("AB", ["A", "B"]), true, fast);
//! let clock = builder.build(&tree, &mut StdRng::seed_from_u64(1)).unwrap();
//!
//! let a = tree.leaf_by_label("A").unwrap();
//! let c = tree.leaf_by_label("C").unwrap();
//! assert_eq!(clock.rate_for_branch(&tree, a).unwrap(), 2.0);
//! assert_eq!(clock.rate_for_branch(&tree, c).unwrap(), 1.0);
//! assert_eq!(clock.rate_for_branch(&tree, tree.root()).unwrap(), 1.0);
//! ```

pub mod clock;
pub mod model;
pub mod newick;
pub mod parser;

use crate::model::TimeTree;
use crate::parser::ParsingError;
use std::path::Path;

/// Reads a single Newick string into a [TimeTree].
///
/// Quick access to [newick::parse_str].
pub fn parse_newick_str<S: AsRef<str>>(newick: S) -> Result<TimeTree, ParsingError> {
    newick::parse_str(newick)
}

/// Reads all trees of a file of Newick strings.
///
/// Quick access to [newick::parse_file].
pub fn parse_newick_file<P: AsRef<Path>>(path: P) -> Result<Vec<TimeTree>, ParsingError> {
    newick::parse_file(path)
}
