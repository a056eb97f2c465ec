//! Core value model, calendar units and errors for nice axis binning
//!
//! This crate holds the capabilities the binning algorithms build on:
//!
//! 1. **Values** - a loosely typed scalar ([`Value`]) with type detection
//!    ([`ValueType`]) and ordered categorical keys ([`CategoryKey`])
//! 2. **Calendar units** - [`DateUnit`] maps instants to integer unit counts
//!    and back, and picks a unit for a time span
//! 3. **Sequences** - [`sequence::range`] materializes tick sequences
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use nicebin_core::{DateUnit, Value, ValueType};
//!
//! let date = NaiveDate::from_ymd_opt(1982, 3, 19).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! assert_eq!(DateUnit::Year.count(date), 1982);
//!
//! let values = vec![Value::Null, Value::from(date)];
//! assert_eq!(ValueType::detect(&values), Some(ValueType::Date));
//! ```

pub mod error;
pub mod sequence;
pub mod units;
pub mod value;

// Re-export core types
pub use error::{check_range, Error, Result};
pub use sequence::{range, range_i64};
pub use units::DateUnit;
pub use value::{CategoryKey, Value, ValueType};
