//! Dynamic scalar values and their binning types
//!
//! Histogram input arrives as loosely typed scalars: numbers, dates, text,
//! booleans and holes. [`Value`] carries one such scalar, [`ValueType`] is the
//! closed set of binning types a dataset resolves to, and [`CategoryKey`] is
//! the totally ordered key used to count categorical data.

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A single loosely typed input value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing entry
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    /// Civil date-time, no timezone attached
    Date(NaiveDateTime),
    Text(String),
}

impl Value {
    /// Whether the value is present: not null and not NaN
    pub fn is_valid(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Number(n) => !n.is_nan(),
            _ => true,
        }
    }

    /// Numeric payload, if any
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Date payload, if any
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S%.3f")),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Number(v as f64)
                }
            }
        )*
    };
}

number_from!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v.and_time(chrono::NaiveTime::MIN))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Binning type of a dataset
///
/// Resolved once per histogram, either from explicit configuration or from
/// the first valid value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Number,
    /// Numbers binned with a step of at least one
    Integer,
    Date,
    /// Discrete values counted by exact equality
    Categorical,
}

impl ValueType {
    /// Detect the type from the first valid value
    ///
    /// Numbers detect as [`ValueType::Number`]; integer binning is only ever
    /// chosen explicitly.
    pub fn detect<'a, I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        values.into_iter().find(|v| v.is_valid()).map(Self::of)
    }

    fn of(value: &Value) -> Self {
        match value {
            Value::Number(_) => ValueType::Number,
            Value::Date(_) => ValueType::Date,
            _ => ValueType::Categorical,
        }
    }

    /// Whether `value` is a valid instance of this type
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::Number, Value::Number(n)) => n.is_finite(),
            (ValueType::Integer, Value::Number(n)) => n.is_finite() && n.fract() == 0.0,
            (ValueType::Date, Value::Date(_)) => true,
            (ValueType::Categorical, v) => v.is_valid(),
            _ => false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Number => "number",
            ValueType::Integer => "integer",
            ValueType::Date => "date",
            ValueType::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "number" | "numeric" => Ok(ValueType::Number),
            "integer" => Ok(ValueType::Integer),
            "date" => Ok(ValueType::Date),
            "categorical" | "string" | "boolean" => Ok(ValueType::Categorical),
            other => Err(Error::InvalidParameter(format!("unknown value type '{other}'"))),
        }
    }
}

/// Totally ordered key for categorical counting
///
/// Orders booleans before numbers before dates before text; within a kind
/// the natural order applies.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryKey {
    Boolean(bool),
    Number(OrderedFloat<f64>),
    Date(NaiveDateTime),
    Text(String),
}

impl CategoryKey {
    /// Key for a valid value; `None` for holes
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => Some(CategoryKey::Number(OrderedFloat(*n))),
            Value::Boolean(b) => Some(CategoryKey::Boolean(*b)),
            Value::Date(d) => Some(CategoryKey::Date(*d)),
            Value::Text(s) => Some(CategoryKey::Text(s.clone())),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            CategoryKey::Boolean(b) => Value::Boolean(b),
            CategoryKey::Number(n) => Value::Number(n.into_inner()),
            CategoryKey::Date(d) => Value::Date(d),
            CategoryKey::Text(s) => Value::Text(s),
        }
    }
}
