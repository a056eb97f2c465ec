//! Core traits for histogram building

use nicebin_core::{Result, Value, ValueType};

use crate::builders::Binner;
use crate::types::Histogram;

/// A binning strategy for one resolved [`ValueType`]
///
/// Strategies receive the raw input and are responsible for dropping values
/// that are missing or not an instance of their type before deriving
/// boundaries.
pub trait BinningStrategy {
    /// Type this strategy bins
    fn value_type(&self) -> ValueType;

    /// Build a histogram from the given values
    fn build(&self, values: &[Value]) -> Result<Histogram>;

    /// Compute the per-value bin assignment without counting
    fn binner(&self, values: &[Value]) -> Result<Binner>;

    /// Whether the strategy produces a dense, gap-filled histogram
    fn is_dense(&self) -> bool {
        true
    }
}
