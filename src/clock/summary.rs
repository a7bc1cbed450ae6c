use crate::clock::regime::RegimeId;
use statrs::statistics::Statistics;

/// Rate statistics of one regime over the branches it governs.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockSummary {
    pub regime: RegimeId,
    pub name: String,
    pub branch_count: usize,
    /// Mean rate weighted by branch length
    pub mean: f64,
    /// Sample variance of the branch rates
    pub variance: f64,
    /// Standard deviation of the branch rates over their (unweighted) mean
    pub coefficient_of_variation: f64,
}

impl ClockSummary {
    /// Summarizes the rates of a regime's branches.
    ///
    /// Variance and coefficient of variation are `NaN` for fewer than two branches.
    pub fn from_rates(regime: RegimeId, name: &str, rates: &[f64], lengths: &[f64]) -> Self {
        let total_length: f64 = lengths.iter().sum();
        let weighted_rate: f64 = rates.iter().zip(lengths).map(|(rate, length)| rate * length).sum();

        let variance = rates.variance();
        let coefficient_of_variation = variance.sqrt() / rates.mean();

        ClockSummary {
            regime,
            name: name.to_string(),
            branch_count: rates.len(),
            mean: weighted_rate / total_length,
            variance,
            coefficient_of_variation,
        }
    }
}
