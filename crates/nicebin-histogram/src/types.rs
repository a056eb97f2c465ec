//! Core types for histogram representation

use nicebin_core::{Value, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::date::DateBinSpec;
use crate::step::BinSpec;

/// A single bucket in a histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// Representative value: lower edge, bucket start date or category
    pub value: Value,
    /// Number of values in this bucket
    pub count: usize,
}

impl HistogramBin {
    pub fn new(value: Value, count: usize) -> Self {
        Self { value, count }
    }

    /// Get the relative frequency (count / total_count)
    pub fn frequency(&self, total_count: usize) -> f64 {
        if total_count > 0 {
            self.count as f64 / total_count as f64
        } else {
            0.0
        }
    }
}

impl fmt::Display for HistogramBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: count={}", self.value, self.count)
    }
}

/// Boundaries a histogram was built with
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BinScheme {
    Numeric(BinSpec),
    Date(DateBinSpec),
}

/// A histogram: ordered value/count buckets plus the scheme behind them
///
/// Numeric and date histograms are dense: one bucket per tick of the scheme,
/// zero counts included. Categorical histograms have no scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    bins: Vec<HistogramBin>,
    scheme: Option<BinScheme>,
    value_type: ValueType,
    total_count: usize,
}

impl Histogram {
    /// Create a new histogram
    pub(crate) fn new(
        bins: Vec<HistogramBin>,
        scheme: Option<BinScheme>,
        value_type: ValueType,
    ) -> Self {
        let total_count = bins.iter().map(|b| b.count).sum();
        Self {
            bins,
            scheme,
            value_type,
            total_count,
        }
    }

    /// Get the bins
    pub fn bins(&self) -> &[HistogramBin] {
        &self.bins
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistogramBin> {
        self.bins.iter()
    }

    /// Get the number of bins
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    /// Check if the histogram is empty
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Number of values counted, equal to the number of valid inputs
    pub fn total_count(&self) -> usize {
        self.total_count
    }

    /// Type the data was binned as
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Scheme used for numeric and date data
    pub fn scheme(&self) -> Option<&BinScheme> {
        self.scheme.as_ref()
    }

    /// Numeric boundaries, when the data was numeric
    pub fn bin_spec(&self) -> Option<&BinSpec> {
        match &self.scheme {
            Some(BinScheme::Numeric(spec)) => Some(spec),
            _ => None,
        }
    }

    /// Date boundaries, when the data was dates
    pub fn date_spec(&self) -> Option<&DateBinSpec> {
        match &self.scheme {
            Some(BinScheme::Date(spec)) => Some(spec),
            _ => None,
        }
    }

    /// Get the maximum count in any bin
    pub fn max_count(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).max().unwrap_or(0)
    }

    /// Find which bin holds a given value
    pub fn find_bin(&self, value: &Value) -> Option<usize> {
        match (&self.scheme, value) {
            (Some(BinScheme::Numeric(spec)), Value::Number(n)) => spec.index(*n),
            (Some(BinScheme::Date(spec)), Value::Date(d)) => spec.index(*d),
            (Some(_), _) => None,
            (None, v) => self.bins.iter().position(|bin| &bin.value == v),
        }
    }

    /// Get counts as a vector
    pub fn counts(&self) -> Vec<usize> {
        self.bins.iter().map(|bin| bin.count).collect()
    }

    /// Get representative values as a vector
    pub fn values(&self) -> Vec<Value> {
        self.bins.iter().map(|bin| bin.value.clone()).collect()
    }

    /// Get frequencies as a vector
    pub fn frequencies(&self) -> Vec<f64> {
        self.bins
            .iter()
            .map(|bin| bin.frequency(self.total_count))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Histogram {
    type Item = &'a HistogramBin;
    type IntoIter = std::slice::Iter<'a, HistogramBin>;

    fn into_iter(self) -> Self::IntoIter {
        self.bins.iter()
    }
}

impl fmt::Display for Histogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Histogram({}, {} bins, n={})",
            self.value_type,
            self.len(),
            self.total_count
        )?;
        if let Some(spec) = self.bin_spec() {
            write!(f, " [{}, {}] step {}", spec.start, spec.stop, spec.step)?;
        }
        if let Some(spec) = self.date_spec() {
            write!(f, " step {} {}", spec.step(), spec.unit())?;
        }
        Ok(())
    }
}
