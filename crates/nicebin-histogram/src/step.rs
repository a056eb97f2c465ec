//! Nice-step selection for numeric ranges
//!
//! Chooses a `{start, stop, step}` triple whose step is a "nice" number,
//! 1, 2 or 5 times a power of the base, such that the range is covered by at
//! most `maxbins` intervals. When a minimum step is set it always wins over
//! the bin-count bound.

use nicebin_core::{check_range, sequence, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

/// Tolerance added before flooring to absorb representation error
pub const EPSILON: f64 = 1e-15;

/// Upper bound on the coarsening loop; a finite span needs far fewer rounds
const MAX_SCALE_ITERATIONS: usize = 2048;

/// Constraints for numeric bin selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinOptions {
    /// Maximum number of intervals
    pub maxbins: usize,
    /// Base of the nice step powers
    pub base: f64,
    /// Divisors tried once each, in order, to refine the step downward
    pub div: Vec<f64>,
    /// Smallest acceptable step
    pub minstep: Option<f64>,
    /// Fixed step, bypassing all selection
    pub step: Option<f64>,
    /// Candidate steps; the first one that fits `maxbins` is used
    pub steps: Option<Vec<f64>>,
}

impl Default for BinOptions {
    fn default() -> Self {
        Self {
            maxbins: 15,
            base: 10.0,
            div: vec![5.0, 2.0],
            minstep: None,
            step: None,
            steps: None,
        }
    }
}

impl BinOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of intervals
    pub fn with_maxbins(mut self, maxbins: usize) -> Self {
        self.maxbins = maxbins;
        self
    }

    /// Set the logarithm base
    pub fn with_base(mut self, base: f64) -> Self {
        self.base = base;
        self
    }

    /// Set the refinement divisors
    pub fn with_div(mut self, div: Vec<f64>) -> Self {
        self.div = div;
        self
    }

    /// Set the minimum step
    pub fn with_minstep(mut self, minstep: f64) -> Self {
        self.minstep = Some(minstep);
        self
    }

    /// Use a fixed step
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Restrict the step to the given candidates
    pub fn with_steps(mut self, steps: Vec<f64>) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Check the options for values that cannot produce a valid spec
    pub fn validate(&self) -> Result<()> {
        if self.maxbins == 0 {
            return Err(Error::InvalidParameter(
                "maxbins must be at least 1".to_string(),
            ));
        }
        if !self.base.is_finite() || self.base <= 1.0 {
            return Err(Error::InvalidParameter(format!(
                "base must be finite and greater than 1, got {}",
                self.base
            )));
        }
        if let Some(&d) = self.div.iter().find(|d| !is_positive(**d)) {
            return Err(Error::not_positive("div", d));
        }
        if let Some(minstep) = self.minstep {
            if !minstep.is_finite() || minstep < 0.0 {
                return Err(Error::InvalidParameter(format!(
                    "minstep must be finite and non-negative, got {minstep}"
                )));
            }
        }
        if let Some(step) = self.step {
            if !is_positive(step) {
                return Err(Error::not_positive("step", step));
            }
        }
        if let Some(steps) = &self.steps {
            if steps.is_empty() {
                return Err(Error::InvalidParameter(
                    "steps must contain at least one candidate".to_string(),
                ));
            }
            if let Some(&s) = steps.iter().find(|s| !is_positive(**s)) {
                return Err(Error::not_positive("steps", s));
            }
        }
        Ok(())
    }
}

fn is_positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

/// Bin boundaries for a numeric range
///
/// `start` and `stop` are whole multiples of `step`. The dense bucket range
/// runs over the closed tick sequence `start, start + step, ..., stop`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
    /// Fractional digits (in the chosen base) needed to print the step
    pub precision: u32,
}

impl BinSpec {
    /// Number of whole steps between `start` and `stop`
    pub fn intervals(&self) -> usize {
        ((self.stop - self.start) / self.step).round().max(0.0) as usize
    }

    /// Number of buckets in the dense range, one per tick
    pub fn bucket_count(&self) -> usize {
        self.intervals().saturating_add(1)
    }

    /// Bucket index for `v`, or `None` when it falls outside the range
    pub fn index(&self, v: f64) -> Option<usize> {
        let i = ((v - self.start) / self.step + EPSILON).floor();
        if !i.is_finite() || i < 0.0 || i >= self.bucket_count() as f64 {
            return None;
        }
        Some(i as usize)
    }

    /// Lower edge of the step-aligned bucket holding `v`
    pub fn value(&self, v: f64) -> f64 {
        self.step * (v / self.step + EPSILON).floor()
    }

    /// Lower edge of bucket `i`
    pub fn edge(&self, i: usize) -> f64 {
        self.step * (self.first_multiple() + i as f64)
    }

    /// Tick positions `start..=stop`
    pub fn ticks(&self) -> Result<Vec<f64>> {
        let k = self.first_multiple();
        let ticks = sequence::range(k, k + self.bucket_count() as f64, 1.0)?;
        Ok(ticks.into_iter().map(|k| k * self.step).collect())
    }

    fn first_multiple(&self) -> f64 {
        (self.start / self.step).round()
    }
}

/// Choose nice bin boundaries covering `[min, max]`
///
/// An explicit `step` is used as is; otherwise `steps` candidates are tried
/// in order; otherwise a power of `base` is scaled until the range fits into
/// `maxbins` intervals and then refined by the `div` divisors.
///
/// # Examples
///
/// ```rust
/// use nicebin_histogram::{bin, BinOptions};
///
/// let spec = bin(1.354, 98.432, &BinOptions::default().with_maxbins(11)).unwrap();
/// assert_eq!((spec.start, spec.stop, spec.step), (0.0, 100.0, 10.0));
/// ```
#[instrument(level = "debug", skip(options))]
pub fn bin(min: f64, max: f64, options: &BinOptions) -> Result<BinSpec> {
    check_range(min, max)?;
    options.validate()?;

    let span = max - min;
    if !span.is_finite() {
        return Err(Error::InvalidRange(format!(
            "span of [{min}, {max}] overflows"
        )));
    }
    let step = match (options.step, &options.steps) {
        (Some(step), _) => step,
        (None, Some(steps)) => pick_candidate(steps, span, options)?,
        (None, None) => nice_step(min, max, options),
    };
    if !is_positive(step) {
        return Err(Error::not_positive("step", step));
    }

    let precision = precision(step, options.base);
    let (first, last) = extent(min, max, step, options.base);
    let intervals = last - first;
    if !(intervals <= sequence::MAX_RANGE_LEN as f64) {
        return Err(Error::InvalidParameter(format!(
            "step {step} yields {intervals} intervals over [{min}, {max}], above the limit of {}",
            sequence::MAX_RANGE_LEN
        )));
    }
    // a step this fine loses whole multiples to rounding
    if first * step > min || last * step < max {
        return Err(Error::InvalidParameter(format!(
            "step {step} is too fine to cover [{min}, {max}]"
        )));
    }
    if !(first * step).is_finite() || !(last * step).is_finite() {
        return Err(Error::InvalidRange(format!(
            "bin boundaries for [{min}, {max}] exceed the float range"
        )));
    }

    // adding zero folds -0.0 into 0.0
    let spec = BinSpec {
        start: first * step + 0.0,
        stop: last * step + 0.0,
        step,
        precision,
    };
    debug!(
        start = spec.start,
        stop = spec.stop,
        step = spec.step,
        intervals = spec.intervals(),
        "selected bins"
    );
    Ok(spec)
}

/// First candidate that fits `maxbins`, falling back to the last one
fn pick_candidate(steps: &[f64], span: f64, options: &BinOptions) -> Result<f64> {
    let maxb = options.maxbins as f64;
    let minstep = options.minstep.unwrap_or(0.0);
    let chosen = steps
        .iter()
        .copied()
        .find(|&c| c >= minstep && span / c <= maxb)
        .or_else(|| steps.last().copied())
        .ok_or_else(|| {
            Error::InvalidParameter("steps must contain at least one candidate".to_string())
        })?;
    Ok(chosen.max(minstep))
}

fn nice_step(min: f64, max: f64, options: &BinOptions) -> f64 {
    let base = options.base;
    let maxb = options.maxbins as f64;
    let minstep = options.minstep.unwrap_or(0.0);

    // a degenerate range is scaled as if it spanned one unit
    let (min, max) = if max > min {
        (min, max)
    } else {
        let pad = 1f64.max(min.abs() * f64::EPSILON * 4.0);
        if (min + pad).is_finite() {
            (min, min + pad)
        } else {
            (min - pad, min)
        }
    };
    let span = max - min;
    let count = |step: f64| {
        let (first, last) = extent(min, max, step, base);
        last - first
    };

    let log_base = base.ln();
    let level = (maxb.ln() / log_base).ceil();
    let exponent = (span.ln() / log_base).round() - level;
    let mut step = minstep.max(base.powi(exponent as i32));
    if !(step > 0.0 && step.is_finite()) {
        step = span;
    }

    // once the step exceeds the span, at most two intervals remain
    let mut iterations = 0;
    while count(step) > maxb
        && step < span * base
        && (step * base).is_finite()
        && iterations < MAX_SCALE_ITERATIONS
    {
        step *= base;
        iterations += 1;
    }

    for &d in &options.div {
        let v = step / d;
        if v >= minstep && count(v) <= maxb {
            trace!(from = step, to = v, divisor = d, "refined step");
            step = v;
        }
    }
    step
}

/// Step multiples `(first, last)` enclosing `[min, max]`
fn extent(min: f64, max: f64, step: f64, base: f64) -> (f64, f64) {
    let eps = base.powi(-(precision(step, base) as i32) - 1);
    let mut first = (min / step + eps).floor();
    if first * step > min {
        first -= 1.0;
    }
    let mut last = (max / step - eps).ceil();
    if last * step < max {
        last += 1.0;
    }
    (first, last)
}

fn precision(step: f64, base: f64) -> u32 {
    let digits = -(step.ln() / base.ln());
    if digits <= 0.0 {
        0
    } else {
        (digits - 1e-9).ceil().max(0.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triple(spec: BinSpec) -> (f64, f64, f64) {
        (spec.start, spec.stop, spec.step)
    }

    #[test]
    fn test_integer_range_with_minstep() {
        let opts = BinOptions::default().with_minstep(1.0);
        assert_eq!(triple(bin(0.0, 10.0, &opts).unwrap()), (0.0, 10.0, 1.0));
        assert_eq!(triple(bin(-1.0, 10.0, &opts).unwrap()), (-1.0, 10.0, 1.0));
    }

    #[test]
    fn test_numeric_maxbins() {
        let spec = bin(1.354, 98.432, &BinOptions::default().with_maxbins(11)).unwrap();
        assert_eq!(triple(spec), (0.0, 100.0, 10.0));

        let spec = bin(1.354, 98.432, &BinOptions::default().with_maxbins(6)).unwrap();
        assert_eq!(triple(spec), (0.0, 100.0, 20.0));

        let opts = BinOptions::default().with_maxbins(21).with_div(vec![5.0, 2.0]);
        assert_eq!(triple(bin(1.354, 98.432, &opts).unwrap()), (0.0, 100.0, 5.0));
    }

    #[test]
    fn test_minstep_bounds_refinement() {
        let opts = BinOptions::default().with_minstep(1.0).with_maxbins(101);
        assert_eq!(triple(bin(0.0, 10.0, &opts).unwrap()), (0.0, 10.0, 1.0));

        let spec = bin(0.0, 10.0, &BinOptions::default().with_maxbins(110)).unwrap();
        assert_relative_eq!(spec.start, 0.0);
        assert_relative_eq!(spec.stop, 10.0, epsilon = 1e-12);
        assert_relative_eq!(spec.step, 0.1, epsilon = 1e-15);
        assert_eq!(spec.precision, 1);
        assert_eq!(spec.intervals(), 100);
    }

    #[test]
    fn test_minstep_wins_over_maxbins() {
        let opts = BinOptions::default().with_minstep(1.0).with_maxbins(5);
        let spec = bin(0.0, 100.0, &opts).unwrap();
        assert!(spec.step >= 1.0);
        assert!(spec.intervals() <= 5);

        let opts = BinOptions::default().with_minstep(7.0).with_maxbins(1000);
        let spec = bin(0.0, 100.0, &opts).unwrap();
        assert_eq!(spec.step, 7.0);
        assert_eq!(spec.intervals(), 15);
    }

    #[test]
    fn test_fixed_step() {
        let spec = bin(0.0, 9.0, &BinOptions::default().with_step(3.0)).unwrap();
        assert_eq!(triple(spec), (0.0, 9.0, 3.0));

        let spec = bin(1.0, 8.0, &BinOptions::default().with_step(3.0)).unwrap();
        assert_eq!(triple(spec), (0.0, 9.0, 3.0));
    }

    #[test]
    fn test_step_candidates() {
        let opts = BinOptions::default().with_steps(vec![4.0, 10.0]);
        assert_eq!(triple(bin(0.0, 20.0, &opts).unwrap()), (0.0, 20.0, 4.0));

        let opts = opts.with_maxbins(3);
        assert_eq!(triple(bin(0.0, 20.0, &opts).unwrap()), (0.0, 20.0, 10.0));

        // nothing fits: last candidate
        let opts = BinOptions::default().with_steps(vec![1.0, 2.0]).with_maxbins(2);
        assert_eq!(bin(0.0, 20.0, &opts).unwrap().step, 2.0);
    }

    #[test]
    fn test_degenerate_range() {
        let spec = bin(5.0, 5.0, &BinOptions::default()).unwrap();
        assert!(spec.step > 0.0);
        assert!(spec.start <= 5.0 && spec.stop >= 5.0);
        assert_eq!(spec.bucket_count(), 1);

        let spec = bin(0.0, 0.0, &BinOptions::default().with_minstep(1.0)).unwrap();
        assert_eq!(triple(spec), (0.0, 0.0, 1.0));
    }

    #[test]
    fn test_negative_ranges() {
        let spec = bin(-98.432, -1.354, &BinOptions::default().with_maxbins(11)).unwrap();
        assert_eq!(triple(spec), (-100.0, 0.0, 10.0));

        let spec = bin(-0.3, 0.7, &BinOptions::default()).unwrap();
        assert!(spec.start <= -0.3 && spec.stop >= 0.7);
        assert!(spec.intervals() <= 15);
    }

    #[test]
    fn test_other_base() {
        let opts = BinOptions::default().with_base(2.0).with_div(vec![2.0]).with_maxbins(8);
        let spec = bin(0.0, 100.0, &opts).unwrap();
        assert_eq!(spec.step, 16.0);
        assert_eq!(triple(spec), (0.0, 112.0, 16.0));
    }

    #[test]
    fn test_invalid_range() {
        let opts = BinOptions::default();
        assert!(matches!(bin(10.0, 0.0, &opts), Err(Error::InvalidRange(_))));
        assert!(matches!(bin(f64::NAN, 0.0, &opts), Err(Error::InvalidRange(_))));
        assert!(matches!(
            bin(0.0, f64::INFINITY, &opts),
            Err(Error::InvalidRange(_))
        ));
    }

    #[test]
    fn test_overflowing_span() {
        for opts in [BinOptions::default(), BinOptions::default().with_minstep(1.0)] {
            assert!(matches!(
                bin(-1e308, 1e308, &opts),
                Err(Error::InvalidRange(_))
            ));
            assert!(matches!(
                bin(f64::MIN, f64::MAX, &opts),
                Err(Error::InvalidRange(_))
            ));
        }

        let spec = bin(-1e307, 1e307, &BinOptions::default()).unwrap();
        assert!(spec.step.is_finite() && spec.step > 0.0);
        assert!(spec.start <= -1e307 && spec.stop >= 1e307);
    }

    #[test]
    fn test_step_too_fine_for_range() {
        let opts = BinOptions::default().with_step(1e-300);
        assert!(matches!(bin(0.0, 1.0, &opts), Err(Error::InvalidParameter(_))));

        let opts = BinOptions::default().with_step(1e-6);
        assert!(matches!(bin(0.0, 1e6, &opts), Err(Error::InvalidParameter(_))));

        // nothing fits: the fallback candidate is still bounded
        let opts = BinOptions::default().with_steps(vec![1e-9]);
        assert!(matches!(bin(0.0, 1e3, &opts), Err(Error::InvalidParameter(_))));

        let opts = BinOptions::default().with_maxbins(usize::MAX);
        assert!(matches!(bin(0.0, 1.0, &opts), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_bucket_count_saturates() {
        let spec = BinSpec {
            start: 0.0,
            stop: 1.0,
            step: 1e-300,
            precision: 0,
        };
        assert_eq!(spec.bucket_count(), usize::MAX);
    }

    #[test]
    fn test_invalid_options() {
        let cases = vec![
            BinOptions::default().with_maxbins(0),
            BinOptions::default().with_base(1.0),
            BinOptions::default().with_div(vec![0.0]),
            BinOptions::default().with_minstep(-1.0),
            BinOptions::default().with_step(0.0),
            BinOptions::default().with_step(f64::NAN),
            BinOptions::default().with_steps(vec![]),
            BinOptions::default().with_steps(vec![2.0, -1.0]),
        ];
        for opts in cases {
            assert!(
                matches!(bin(0.0, 1.0, &opts), Err(Error::InvalidParameter(_))),
                "{opts:?}"
            );
        }
    }

    #[test]
    fn test_spec_lookup() {
        let spec = bin(1.0, 7.0, &BinOptions::default().with_maxbins(10)).unwrap();
        assert_eq!(triple(spec), (1.0, 7.0, 1.0));
        assert_eq!(spec.intervals(), 6);
        assert_eq!(spec.bucket_count(), 7);
        assert_eq!(spec.index(1.0), Some(0));
        assert_eq!(spec.index(6.99), Some(5));
        assert_eq!(spec.index(7.0), Some(6));
        assert_eq!(spec.index(8.0), None);
        assert_eq!(spec.index(0.5), None);
        assert_eq!(spec.value(3.7), 3.0);
        assert_eq!(spec.edge(2), 3.0);
        assert_eq!(
            spec.ticks().unwrap(),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]
        );
    }

    #[test]
    fn test_options_from_json() {
        let opts: BinOptions = serde_json::from_str(r#"{"maxbins": 3, "steps": [4, 10]}"#).unwrap();
        assert_eq!(opts.maxbins, 3);
        assert_eq!(opts.base, 10.0);
        assert_eq!(opts.div, vec![5.0, 2.0]);
        assert_eq!(opts.steps, Some(vec![4.0, 10.0]));
    }
}
