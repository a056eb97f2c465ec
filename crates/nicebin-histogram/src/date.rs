//! Calendar-aware bin selection
//!
//! Dates are binned in the integer count space of a [`DateUnit`]: the unit is
//! picked (or given), both bounds are converted to unit counts and the numeric
//! chooser selects an integer step there.

use chrono::NaiveDateTime;
use nicebin_core::{sequence, DateUnit, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::step::{bin, BinOptions, BinSpec};

/// Constraints for date bin selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateBinOptions {
    /// Explicit unit; picked from the span when absent
    pub unit: Option<DateUnit>,
    pub maxbins: usize,
    /// Lower bound used only by automatic unit selection
    pub minbins: usize,
}

impl Default for DateBinOptions {
    fn default() -> Self {
        Self {
            unit: None,
            maxbins: 20,
            minbins: 4,
        }
    }
}

impl DateBinOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, unit: DateUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_maxbins(mut self, maxbins: usize) -> Self {
        self.maxbins = maxbins;
        self
    }

    pub fn with_minbins(mut self, minbins: usize) -> Self {
        self.minbins = minbins;
        self
    }
}

/// Bin boundaries for a date range
///
/// The inner [`BinSpec`] is expressed in unit counts, so `start`, `stop`
/// and `step` are whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateBinSpec {
    unit: DateUnit,
    bins: BinSpec,
}

impl DateBinSpec {
    pub fn unit(&self) -> DateUnit {
        self.unit
    }

    /// Boundaries in unit counts
    pub fn bins(&self) -> &BinSpec {
        &self.bins
    }

    /// Step in whole units
    pub fn step(&self) -> i64 {
        self.bins.step.round() as i64
    }

    pub fn start(&self) -> i64 {
        self.bins.start.round() as i64
    }

    pub fn stop(&self) -> i64 {
        self.bins.stop.round() as i64
    }

    pub fn start_date(&self) -> Option<NaiveDateTime> {
        self.unit.date(self.start())
    }

    pub fn stop_date(&self) -> Option<NaiveDateTime> {
        self.unit.date(self.stop())
    }

    pub fn bucket_count(&self) -> usize {
        self.bins.bucket_count()
    }

    /// Bucket index for `date`
    pub fn index(&self, date: NaiveDateTime) -> Option<usize> {
        self.bins.index(self.unit.count(date) as f64)
    }

    /// Start date of the step-aligned bucket holding `date`
    pub fn value(&self, date: NaiveDateTime) -> Option<NaiveDateTime> {
        let count = self.bins.value(self.unit.count(date) as f64);
        self.unit.date(count.round() as i64)
    }

    /// Half-open date interval covered by bucket `index`
    pub fn bucket_bounds(&self, index: usize) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let offset = i64::try_from(index).ok()?.checked_mul(self.step())?;
        let lo = self.unit.date(self.start().checked_add(offset)?)?;
        let hi = self.unit.offset(lo, self.step())?;
        Some((lo, hi))
    }

    /// Start dates of every bucket, `start_date()..=stop_date()`
    pub fn ticks(&self) -> Result<Vec<NaiveDateTime>> {
        sequence::range_i64(self.start(), self.stop() + 1, self.step())?
            .into_iter()
            .map(|n| {
                self.unit
                    .date(n)
                    .ok_or_else(|| Error::out_of_calendar(&format!("{} {n}", self.unit)))
            })
            .collect()
    }
}

/// Choose calendar bins covering `[min, max]`
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use nicebin_core::DateUnit;
/// use nicebin_histogram::{bin_date, DateBinOptions};
///
/// let day = |y| NaiveDate::from_ymd_opt(y, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let spec = bin_date(day(2000), day(2010), &DateBinOptions::default()).unwrap();
/// assert_eq!(spec.unit(), DateUnit::Year);
/// assert_eq!(spec.step(), 1);
/// ```
#[instrument(level = "debug", skip(options))]
pub fn bin_date(
    min: NaiveDateTime,
    max: NaiveDateTime,
    options: &DateBinOptions,
) -> Result<DateBinSpec> {
    if min > max {
        return Err(Error::invalid_range(min, max));
    }

    let span_ms = max.signed_duration_since(min).num_milliseconds() as f64;
    let unit = options
        .unit
        .unwrap_or_else(|| DateUnit::find(span_ms, options.minbins, options.maxbins));
    let (lo, hi) = unit
        .domain()
        .unwrap_or_else(|| (unit.count(min), unit.count(max)));

    let bin_options = BinOptions::default().with_maxbins(options.maxbins);
    let bin_options = match unit.steps() {
        Some(steps) => bin_options.with_steps(steps.to_vec()),
        None => bin_options.with_minstep(unit.min_step()),
    };
    let bins = bin(lo as f64, hi as f64, &bin_options)?;

    debug!(%unit, step = bins.step, buckets = bins.bucket_count(), "selected date bins");
    Ok(DateBinSpec { unit, bins })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_bin_across_years() {
        let spec = bin_date(at(2000, 1, 1), at(2010, 1, 1), &DateBinOptions::default()).unwrap();
        assert_eq!(spec.step(), 1);
        assert_eq!(spec.unit(), DateUnit::Year);
        assert_eq!((spec.start(), spec.stop()), (2000, 2010));
        assert_eq!(spec.start_date(), Some(at(2000, 1, 1)));
        assert_eq!(spec.stop_date(), Some(at(2010, 1, 1)));
    }

    #[test]
    fn test_explicit_units() {
        let opts = DateBinOptions::default().with_unit(DateUnit::Month);
        let spec = bin_date(at(2000, 1, 1), at(2001, 1, 1), &opts).unwrap();
        assert_eq!(spec.step(), 1);
        assert_eq!(spec.unit(), DateUnit::Month);

        let spec = bin_date(at(2000, 1, 1), at(2010, 1, 1), &opts).unwrap();
        assert_eq!(spec.step(), 6);
        assert_eq!(spec.unit(), DateUnit::Month);
        assert_eq!(spec.bucket_count(), 21);
    }

    #[test]
    fn test_automatic_unit_for_short_spans() {
        let min = at(2020, 3, 1);
        let spec = bin_date(min, at(2020, 3, 11), &DateBinOptions::default()).unwrap();
        assert_eq!(spec.unit(), DateUnit::Day);
        assert_eq!(spec.step(), 1);

        let max = min + chrono::TimeDelta::try_hours(8).unwrap();
        let spec = bin_date(min, max, &DateBinOptions::default()).unwrap();
        assert_eq!(spec.unit(), DateUnit::Hour);
    }

    #[test]
    fn test_zero_length_range() {
        let d = at(1999, 12, 31);
        let spec = bin_date(d, d, &DateBinOptions::default()).unwrap();
        assert_eq!(spec.bucket_count(), 1);
        assert_eq!(spec.index(d), Some(0));
        assert_eq!(spec.ticks().unwrap(), vec![d]);
    }

    #[test]
    fn test_periodic_unit_uses_fixed_domain() {
        let opts = DateBinOptions::default().with_unit(DateUnit::Months);
        let spec = bin_date(at(2001, 3, 1), at(2001, 5, 1), &opts).unwrap();
        assert_eq!((spec.start(), spec.stop(), spec.step()), (0, 11, 1));
        assert_eq!(spec.bucket_count(), 12);
        assert_eq!(spec.index(at(1988, 12, 25)), Some(11));
        assert_eq!(spec.value(at(1988, 12, 25)), Some(at(1970, 12, 1)));
    }

    #[test]
    fn test_lookup_and_bounds() {
        let opts = DateBinOptions::default().with_unit(DateUnit::Month);
        let spec = bin_date(at(2000, 1, 1), at(2010, 1, 1), &opts).unwrap();

        let d = at(2003, 8, 14);
        assert_eq!(spec.value(d), Some(at(2003, 7, 1)));
        assert_eq!(spec.index(d), Some(7));
        assert_eq!(
            spec.bucket_bounds(7),
            Some((at(2003, 7, 1), at(2004, 1, 1)))
        );

        let ticks = spec.ticks().unwrap();
        assert_eq!(ticks.len(), spec.bucket_count());
        assert_eq!(ticks[0], at(2000, 1, 1));
        assert_eq!(ticks[1], at(2000, 7, 1));
        assert_eq!(ticks[20], at(2010, 1, 1));
    }

    #[test]
    fn test_invalid_range() {
        let err = bin_date(at(2010, 1, 1), at(2000, 1, 1), &DateBinOptions::default());
        assert!(matches!(err, Err(Error::InvalidRange(_))));

        let opts = DateBinOptions::default().with_maxbins(0);
        let err = bin_date(at(2000, 1, 1), at(2010, 1, 1), &opts);
        assert!(matches!(err, Err(Error::InvalidParameter(_))));
    }
}
