//! Histogram building strategies
//!
//! [`HistogramBuilder`] resolves the value type once, then hands the raw
//! values to one of three strategies: [`NumericStrategy`] (numbers and
//! integers), [`DateStrategy`] and [`CategoricalStrategy`].

use chrono::NaiveDateTime;
use nicebin_core::{CategoryKey, DateUnit, Error, Result, Value, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use crate::date::{bin_date, DateBinOptions, DateBinSpec};
use crate::step::{bin, BinOptions, BinSpec};
use crate::traits::BinningStrategy;
use crate::types::{BinScheme, Histogram, HistogramBin};

/// Output order of categorical histograms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryOrder {
    /// Ascending key order
    #[default]
    Value,
    /// Descending count, ties in key order
    Count,
}

/// Histogram configuration
///
/// Unset fields fall back to the defaults of [`BinOptions`] or
/// [`DateBinOptions`], depending on the resolved type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramOptions {
    /// Explicit type; detected from the first valid value when absent
    #[serde(rename = "type")]
    pub value_type: Option<ValueType>,
    pub maxbins: Option<usize>,
    pub minbins: Option<usize>,
    pub minstep: Option<f64>,
    pub step: Option<f64>,
    pub steps: Option<Vec<f64>>,
    pub div: Option<Vec<f64>>,
    pub base: Option<f64>,
    pub unit: Option<DateUnit>,
    pub order: CategoryOrder,
}

impl HistogramOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, value_type: ValueType) -> Self {
        self.value_type = Some(value_type);
        self
    }

    pub fn with_maxbins(mut self, maxbins: usize) -> Self {
        self.maxbins = Some(maxbins);
        self
    }

    pub fn with_minbins(mut self, minbins: usize) -> Self {
        self.minbins = Some(minbins);
        self
    }

    pub fn with_minstep(mut self, minstep: f64) -> Self {
        self.minstep = Some(minstep);
        self
    }

    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn with_steps(mut self, steps: Vec<f64>) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn with_div(mut self, div: Vec<f64>) -> Self {
        self.div = Some(div);
        self
    }

    pub fn with_base(mut self, base: f64) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_unit(mut self, unit: DateUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_order(mut self, order: CategoryOrder) -> Self {
        self.order = order;
        self
    }

    /// Numeric constraints; integer binning never steps below one
    pub fn bin_options(&self, integer: bool) -> BinOptions {
        let defaults = BinOptions::default();
        let mut minstep = self.minstep;
        let mut step = self.step;
        if integer {
            minstep = Some(minstep.unwrap_or(1.0).max(1.0));
            step = step.map(|s| s.max(1.0));
        }
        BinOptions {
            maxbins: self.maxbins.unwrap_or(defaults.maxbins),
            base: self.base.unwrap_or(defaults.base),
            div: self.div.clone().unwrap_or(defaults.div),
            minstep,
            step,
            steps: self.steps.clone(),
        }
    }

    pub fn date_options(&self) -> DateBinOptions {
        let defaults = DateBinOptions::default();
        DateBinOptions {
            unit: self.unit,
            maxbins: self.maxbins.unwrap_or(defaults.maxbins),
            minbins: self.minbins.unwrap_or(defaults.minbins),
        }
    }
}

/// Per-value bin assignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binner {
    Numeric(BinSpec),
    Date(DateBinSpec),
    /// Categorical values are their own bin
    Identity,
}

impl Binner {
    /// Representative value of the bin holding `value`; `Null` when the
    /// value cannot be binned
    pub fn apply(&self, value: &Value) -> Value {
        match (self, value) {
            (Binner::Numeric(spec), Value::Number(n)) if n.is_finite() => {
                Value::Number(spec.value(*n))
            }
            (Binner::Date(spec), Value::Date(d)) => spec.value(*d).map_or(Value::Null, Value::Date),
            (Binner::Identity, v) if v.is_valid() => v.clone(),
            _ => Value::Null,
        }
    }

    /// Bucket index of `value` in the dense range
    pub fn index(&self, value: &Value) -> Option<usize> {
        match (self, value) {
            (Binner::Numeric(spec), Value::Number(n)) => spec.index(*n),
            (Binner::Date(spec), Value::Date(d)) => spec.index(*d),
            _ => None,
        }
    }
}

/// Strategy for numbers and integers
#[derive(Debug, Clone)]
pub struct NumericStrategy {
    value_type: ValueType,
    options: BinOptions,
}

impl NumericStrategy {
    pub fn new(options: BinOptions) -> Self {
        Self {
            value_type: ValueType::Number,
            options,
        }
    }

    /// Integer binning, with the step floored at one
    pub fn integer(mut options: BinOptions) -> Self {
        options.minstep = Some(options.minstep.unwrap_or(1.0).max(1.0));
        Self {
            value_type: ValueType::Integer,
            options,
        }
    }

    fn valid(&self, values: &[Value]) -> Vec<f64> {
        values
            .iter()
            .filter(|v| self.value_type.accepts(v))
            .filter_map(Value::as_number)
            .collect()
    }

    fn spec(&self, valid: &[f64]) -> Result<BinSpec> {
        let (min, max) = valid
            .iter()
            .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .ok_or(Error::EmptyDataset)?;
        bin(min, max, &self.options)
    }
}

impl BinningStrategy for NumericStrategy {
    fn value_type(&self) -> ValueType {
        self.value_type
    }

    fn build(&self, values: &[Value]) -> Result<Histogram> {
        let valid = self.valid(values);
        debug!(
            valid = valid.len(),
            skipped = values.len() - valid.len(),
            "filtered numeric values"
        );
        let spec = self.spec(&valid)?;

        let mut counts = vec![0usize; spec.bucket_count()];
        for v in valid {
            if let Some(i) = spec.index(v) {
                counts[i] += 1;
            }
        }

        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin::new(Value::Number(spec.edge(i)), count))
            .collect();
        Ok(Histogram::new(
            bins,
            Some(BinScheme::Numeric(spec)),
            self.value_type,
        ))
    }

    fn binner(&self, values: &[Value]) -> Result<Binner> {
        Ok(Binner::Numeric(self.spec(&self.valid(values))?))
    }
}

/// Strategy for dates
#[derive(Debug, Clone)]
pub struct DateStrategy {
    options: DateBinOptions,
}

impl DateStrategy {
    pub fn new(options: DateBinOptions) -> Self {
        Self { options }
    }

    fn valid(values: &[Value]) -> Vec<NaiveDateTime> {
        values.iter().filter_map(Value::as_date).collect()
    }

    fn spec(&self, valid: &[NaiveDateTime]) -> Result<DateBinSpec> {
        let min = valid.iter().min().ok_or(Error::EmptyDataset)?;
        let max = valid.iter().max().ok_or(Error::EmptyDataset)?;
        bin_date(*min, *max, &self.options)
    }
}

impl BinningStrategy for DateStrategy {
    fn value_type(&self) -> ValueType {
        ValueType::Date
    }

    fn build(&self, values: &[Value]) -> Result<Histogram> {
        let valid = Self::valid(values);
        debug!(
            valid = valid.len(),
            skipped = values.len() - valid.len(),
            "filtered date values"
        );
        let spec = self.spec(&valid)?;

        let mut counts = vec![0usize; spec.bucket_count()];
        for d in valid {
            if let Some(i) = spec.index(d) {
                counts[i] += 1;
            }
        }

        let bins = spec
            .ticks()?
            .into_iter()
            .zip(counts)
            .map(|(tick, count)| HistogramBin::new(Value::Date(tick), count))
            .collect();
        Ok(Histogram::new(bins, Some(BinScheme::Date(spec)), ValueType::Date))
    }

    fn binner(&self, values: &[Value]) -> Result<Binner> {
        Ok(Binner::Date(self.spec(&Self::valid(values))?))
    }
}

/// Strategy for discrete values, counted by exact equality
#[derive(Debug, Clone, Default)]
pub struct CategoricalStrategy {
    order: CategoryOrder,
}

impl CategoricalStrategy {
    pub fn new(order: CategoryOrder) -> Self {
        Self { order }
    }
}

impl BinningStrategy for CategoricalStrategy {
    fn value_type(&self) -> ValueType {
        ValueType::Categorical
    }

    fn build(&self, values: &[Value]) -> Result<Histogram> {
        let mut counts: BTreeMap<CategoryKey, usize> = BTreeMap::new();
        for key in values.iter().filter_map(CategoryKey::from_value) {
            *counts.entry(key).or_insert(0) += 1;
        }
        if counts.is_empty() {
            return Err(Error::EmptyDataset);
        }
        debug!(categories = counts.len(), "counted categorical values");

        let mut entries: Vec<(CategoryKey, usize)> = counts.into_iter().collect();
        if self.order == CategoryOrder::Count {
            // stable, so equal counts keep key order
            entries.sort_by(|a, b| b.1.cmp(&a.1));
        }

        let bins = entries
            .into_iter()
            .map(|(key, count)| HistogramBin::new(key.into_value(), count))
            .collect();
        Ok(Histogram::new(bins, None, ValueType::Categorical))
    }

    fn binner(&self, _values: &[Value]) -> Result<Binner> {
        Ok(Binner::Identity)
    }

    fn is_dense(&self) -> bool {
        false
    }
}

/// Builds histograms from loosely typed values
///
/// # Examples
///
/// ```rust
/// use nicebin_core::Value;
/// use nicebin_histogram::{HistogramBuilder, HistogramOptions};
///
/// let values: Vec<Value> = [1, 2, 3, 4, 5, 6, 7, 1, 2, 3, 4, 5, 1, 2, 3]
///     .into_iter()
///     .map(Value::from)
///     .collect();
/// let hist = HistogramBuilder::new(HistogramOptions::new().with_maxbins(10))
///     .build(&values)
///     .unwrap();
/// assert_eq!(hist.counts(), vec![3, 3, 3, 2, 2, 1, 1]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HistogramBuilder {
    options: HistogramOptions,
}

impl HistogramBuilder {
    pub fn new(options: HistogramOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HistogramOptions {
        &self.options
    }

    /// Resolve the value type: explicit configuration wins over detection
    pub fn resolve_type(&self, values: &[Value]) -> Result<ValueType> {
        self.options
            .value_type
            .or_else(|| ValueType::detect(values))
            .ok_or(Error::EmptyDataset)
    }

    /// Strategy for a resolved type
    pub fn strategy(&self, value_type: ValueType) -> Box<dyn BinningStrategy> {
        match value_type {
            ValueType::Number => Box::new(NumericStrategy::new(self.options.bin_options(false))),
            ValueType::Integer => {
                Box::new(NumericStrategy::integer(self.options.bin_options(true)))
            }
            ValueType::Date => Box::new(DateStrategy::new(self.options.date_options())),
            ValueType::Categorical => Box::new(CategoricalStrategy::new(self.options.order)),
        }
    }

    /// Build a histogram, skipping missing and mistyped values
    #[instrument(skip(self, values), fields(n = values.len()))]
    pub fn build(&self, values: &[Value]) -> Result<Histogram> {
        let value_type = self.resolve_type(values)?;
        debug!(%value_type, "resolved value type");
        self.strategy(value_type).build(values)
    }

    /// Build a histogram over a field of each record
    pub fn build_by<R, F>(&self, records: &[R], accessor: F) -> Result<Histogram>
    where
        F: Fn(&R) -> Value,
    {
        let values: Vec<Value> = records.iter().map(accessor).collect();
        self.build(&values)
    }

    /// Bin assignment for the given values
    pub fn binner(&self, values: &[Value]) -> Result<Binner> {
        let value_type = self.resolve_type(values)?;
        self.strategy(value_type).binner(values)
    }
}
