//! Nice axis bin boundaries and dense histograms
//!
//! Facade over the workspace crates:
//!
//! - [`nicebin_core`]: values, calendar units, sequences and errors
//! - [`nicebin_histogram`]: bin selection and histogram building
//!
//! # Example
//!
//! ```rust
//! use nicebin::{histogram, HistogramOptions, Value};
//!
//! let values: Vec<Value> = [1, 2, 3, 4, 5, 6, 7, 1, 2, 3, 4, 5, 1, 2, 3]
//!     .into_iter()
//!     .map(Value::from)
//!     .collect();
//! let hist = histogram(&values, &HistogramOptions::new().with_maxbins(10)).unwrap();
//! assert_eq!(hist.counts(), vec![3, 3, 3, 2, 2, 1, 1]);
//! ```

pub use nicebin_core::{
    range, sequence, units, value, CategoryKey, DateUnit, Error, Result, Value, ValueType,
};
pub use nicebin_histogram::{
    bin, bin_date, histogram, BinOptions, BinScheme, BinSpec, Binner, BinningStrategy,
    CategoryOrder, DateBinOptions, DateBinSpec, Histogram, HistogramBin, HistogramBuilder,
    HistogramOptions,
};
