//! Nice axis bins and dense histograms
//!
//! This crate chooses human-friendly bin boundaries for numeric, integer and
//! date data and builds histograms over them. Steps are 1, 2 or 5 times a
//! power of ten (or of another base), or whole calendar units for dates.
//!
//! # Key Features
//!
//! - **Nice steps**: [`bin`] picks `{start, stop, step}` under `maxbins`,
//!   `minstep`, fixed `step` or candidate `steps` constraints
//! - **Calendar bins**: [`bin_date`] picks a unit and an integer step
//! - **Dense histograms**: every bucket of the range is reported, zero counts
//!   included
//! - **Mixed input**: missing, NaN and mistyped values are skipped; the value
//!   type is configured or detected from the first valid value
//!
//! # Examples
//!
//! ## Choosing Bins
//!
//! ```rust
//! use nicebin_histogram::{bin, BinOptions};
//!
//! let spec = bin(0.0, 20.0, &BinOptions::default().with_steps(vec![4.0, 10.0])).unwrap();
//! assert_eq!(spec.step, 4.0);
//!
//! let spec = bin(0.0, 20.0, &BinOptions::default().with_steps(vec![4.0, 10.0]).with_maxbins(3)).unwrap();
//! assert_eq!(spec.step, 10.0);
//! ```
//!
//! ## Building a Histogram
//!
//! ```rust
//! use nicebin_core::Value;
//! use nicebin_histogram::{histogram, HistogramOptions};
//!
//! let values = vec![Value::from(1), Value::Null, Value::from(2), Value::from(f64::NAN), Value::from(2)];
//! let hist = histogram(&values, &HistogramOptions::default()).unwrap();
//!
//! for bin in hist.bins() {
//!     println!("{bin}");
//! }
//! assert_eq!(hist.total_count(), 3);
//! ```

pub mod builders;
pub mod date;
pub mod step;
pub mod traits;
pub mod types;

// Re-export main types and traits
pub use builders::{
    Binner, CategoricalStrategy, CategoryOrder, DateStrategy, HistogramBuilder, HistogramOptions,
    NumericStrategy,
};
pub use date::{bin_date, DateBinOptions, DateBinSpec};
pub use step::{bin, BinOptions, BinSpec};
pub use traits::BinningStrategy;
pub use types::{BinScheme, Histogram, HistogramBin};

/// Build a histogram with the given options
pub fn histogram(
    values: &[nicebin_core::Value],
    options: &HistogramOptions,
) -> crate::Result<Histogram> {
    HistogramBuilder::new(options.clone()).build(values)
}

pub use nicebin_core::Result;
