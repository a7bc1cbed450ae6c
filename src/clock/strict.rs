use crate::clock::config::StrictClockConfig;
use crate::clock::error::ClockError;
use crate::clock::parameter::RealParameter;

/// A clock with one constant rate for all branches it governs.
///
/// The rate is read from a shared [RealParameter]. The clock holds the last
/// value read and only re-reads the parameter on [StrictClock::invalidate], so
/// a sampler perturbing the rate must invalidate the clock afterwards.
#[derive(Debug, Clone)]
pub struct StrictClock {
    name: String,
    rate_parameter: RealParameter,
    rate: f64,
    stored_rate: f64,
}

impl StrictClock {
    /// Creates a strict clock reading its rate from `rate_parameter`.
    ///
    /// # Errors
    /// [ClockError::NonPositiveRate] if the current value is not a positive finite number.
    pub fn new(name: impl Into<String>, rate_parameter: RealParameter) -> Result<Self, ClockError> {
        let rate = rate_parameter.positive_value()?;
        Ok(StrictClock {
            name: name.into(),
            rate_parameter,
            rate,
            stored_rate: rate,
        })
    }

    /// Creates a strict clock with a fixed rate.
    pub fn with_rate(name: impl Into<String>, rate: f64) -> Result<Self, ClockError> {
        Self::new(name, RealParameter::scalar(rate))
    }

    /// Creates a strict clock from its config.
    pub fn from_config(name: impl Into<String>, config: &StrictClockConfig) -> Result<Self, ClockError> {
        Self::with_rate(name, config.rate)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the rate of every governed branch.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Returns the handle the rate is read from.
    pub fn rate_parameter(&self) -> &RealParameter {
        &self.rate_parameter
    }

    /// Re-reads the rate parameter.
    ///
    /// # Errors
    /// [ClockError::NonPositiveRate] if the new value is not positive; the
    /// previous rate is kept in that case.
    pub fn invalidate(&mut self) -> Result<(), ClockError> {
        self.rate = self.rate_parameter.positive_value()?;
        Ok(())
    }

    pub fn store(&mut self) {
        self.stored_rate = self.rate;
    }

    pub fn restore(&mut self) {
        self.rate = self.stored_rate;
    }
}
