//! Shared parameter handles.
//!
//! A sampler owns the state it perturbs (rates, rate categories, quantiles,
//! distribution shapes) and hands clones of the same handle to the clocks that
//! read it. A handle is cheap to clone; all clones see the same values.
//!
//! After changing a value the sampler must tell the reading clock which
//! cached state became stale, see [Change](crate::clock::Change).

use crate::clock::error::ClockError;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared, interior-mutable vector of values.
#[derive(Debug, Default)]
pub struct Parameter<T> {
    values: Arc<RwLock<Vec<T>>>,
}

/// A real-valued parameter, e.g. a clock rate or a distribution shape.
pub type RealParameter = Parameter<f64>;

/// Per-branch discrete rate categories of a relaxed clock.
pub type CategoryParameter = Parameter<usize>;

/// Per-branch rate quantiles of a relaxed clock.
pub type QuantileParameter = Parameter<f64>;

impl<T> Clone for Parameter<T> {
    fn clone(&self) -> Self {
        Parameter { values: Arc::clone(&self.values) }
    }
}

impl<T: Copy> Parameter<T> {
    /// Creates a parameter holding the given values.
    pub fn new(values: Vec<T>) -> Self {
        Parameter { values: Arc::new(RwLock::new(values)) }
    }

    /// Creates a parameter holding a single value.
    pub fn scalar(value: T) -> Self {
        Self::new(vec![value])
    }

    /// Returns the value at `index`, if present.
    pub fn get(&self, index: usize) -> Option<T> {
        self.read().get(index).copied()
    }

    /// Sets the value at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn set(&self, index: usize, value: T) {
        self.write()[index] = value;
    }

    /// Returns a copy of all values.
    pub fn values(&self) -> Vec<T> {
        self.read().clone()
    }

    /// Replaces all values.
    pub fn set_values(&self, values: Vec<T>) {
        *self.write() = values;
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if the parameter holds no values.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns `true` if both handles share the same values.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }

    // A panicking writer leaves plain values behind, which remain readable.
    fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Parameter<f64> {
    /// Returns the first value, the value of a scalar parameter; `None` if empty.
    pub fn value(&self) -> Option<f64> {
        self.get(0)
    }

    /// Returns the value of a scalar rate parameter.
    ///
    /// # Errors
    /// [ClockError::NonPositiveRate] if the parameter is empty, or its value
    /// is not positive or not finite (`NaN` is reported for an empty parameter).
    pub fn positive_value(&self) -> Result<f64, ClockError> {
        let value = self.value().unwrap_or(f64::NAN);
        if value > 0.0 && value.is_finite() {
            Ok(value)
        } else {
            Err(ClockError::NonPositiveRate { value })
        }
    }
}

impl<T: Copy> From<Vec<T>> for Parameter<T> {
    fn from(values: Vec<T>) -> Self {
        Self::new(values)
    }
}
