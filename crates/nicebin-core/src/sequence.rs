//! Range-sequence generation
//!
//! Values are computed as `start + i * step` rather than by repeated
//! addition, so long sequences do not accumulate rounding drift.

use crate::{Error, Result};

/// Largest sequence [`range`] will materialize
pub const MAX_RANGE_LEN: usize = 100_000_000;

/// Generate `start, start + step, ...` up to but excluding `stop`
///
/// A negative `step` counts down. An empty vector is returned when `stop`
/// lies behind `start` in the direction of travel.
///
/// # Examples
///
/// ```rust
/// use nicebin_core::sequence::range;
///
/// assert_eq!(range(0.0, 5.0, 2.0).unwrap(), vec![0.0, 2.0, 4.0]);
/// assert_eq!(range(3.0, 0.0, -1.0).unwrap(), vec![3.0, 2.0, 1.0]);
/// assert!(range(0.0, 1.0, 0.0).is_err());
/// ```
pub fn range(start: f64, stop: f64, step: f64) -> Result<Vec<f64>> {
    if !start.is_finite() || !stop.is_finite() {
        return Err(Error::invalid_range(start, stop));
    }
    if step == 0.0 || !step.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "step must be non-zero and finite, got {step}"
        )));
    }

    let n = ((stop - start) / step).ceil();
    if n <= 0.0 {
        return Ok(Vec::new());
    }
    if n > MAX_RANGE_LEN as f64 {
        return Err(Error::InvalidParameter(format!(
            "range of {n} values exceeds the limit of {MAX_RANGE_LEN}"
        )));
    }

    Ok((0..n as usize).map(|i| start + i as f64 * step).collect())
}

/// Generate integers `start, start + step, ...` up to but excluding `stop`
pub fn range_i64(start: i64, stop: i64, step: i64) -> Result<Vec<i64>> {
    if step == 0 {
        return Err(Error::InvalidParameter("step must be non-zero".to_string()));
    }
    let values = range(start as f64, stop as f64, step as f64)?;
    Ok(values.into_iter().map(|v| v.round() as i64).collect())
}
