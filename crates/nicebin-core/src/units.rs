//! Calendar units for date binning
//!
//! Every unit maps an instant to an integer count and back. Absolute units
//! count whole units elapsed since the base date `0000-01-01T00:00:00`, so the
//! count of a year-unit date is simply its year. Periodic units report the
//! position inside the enclosing period (month of year, hour of day, ...) and
//! map counts back onto reference dates in 1970.
//!
//! Dates are civil date-times without a timezone.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

const MS_PER_SECOND: f64 = 1e3;
const MS_PER_MINUTE: f64 = 6e4;
const MS_PER_HOUR: f64 = 3.6e6;
const MS_PER_DAY: f64 = 8.64e7;
const MS_PER_WEEK: f64 = 6.048e8;
const MS_PER_MONTH: f64 = 2.592e9;
const MS_PER_YEAR: f64 = 3.1536e10;

/// 0000-01-01 is a Saturday
const BASE_WEEKDAY_FROM_SUNDAY: i64 = 6;

/// `num_days_from_ce` of 0000-01-01
const BASE_DAYS_FROM_CE: i64 = -365;

/// Approximate interval durations, coarse to fine, with the unit that bins them
const LADDER: [(f64, DateUnit); 23] = [
    (MS_PER_YEAR, DateUnit::Year),
    (3.0 * MS_PER_MONTH, DateUnit::Month),
    (MS_PER_MONTH, DateUnit::Month),
    (2.0 * MS_PER_WEEK, DateUnit::Week),
    (MS_PER_WEEK, DateUnit::Week),
    (2.0 * MS_PER_DAY, DateUnit::Day),
    (MS_PER_DAY, DateUnit::Day),
    (12.0 * MS_PER_HOUR, DateUnit::Hour),
    (6.0 * MS_PER_HOUR, DateUnit::Hour),
    (3.0 * MS_PER_HOUR, DateUnit::Hour),
    (MS_PER_HOUR, DateUnit::Hour),
    (30.0 * MS_PER_MINUTE, DateUnit::Minute),
    (15.0 * MS_PER_MINUTE, DateUnit::Minute),
    (5.0 * MS_PER_MINUTE, DateUnit::Minute),
    (MS_PER_MINUTE, DateUnit::Minute),
    (30.0 * MS_PER_SECOND, DateUnit::Second),
    (15.0 * MS_PER_SECOND, DateUnit::Second),
    (5.0 * MS_PER_SECOND, DateUnit::Second),
    (MS_PER_SECOND, DateUnit::Second),
    (500.0, DateUnit::Millisecond),
    (100.0, DateUnit::Millisecond),
    (10.0, DateUnit::Millisecond),
    (1.0, DateUnit::Millisecond),
];

/// A calendar unit
///
/// The derived ordering runs coarse to fine for the absolute units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateUnit {
    Year,
    Month,
    /// Weeks starting on Sunday
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    /// Month of year, 0-11
    Months,
    /// Day of month, 1-31
    Dates,
    /// Day of week from Sunday, 0-6
    Weekdays,
    /// Hour of day, 0-23
    Hours,
    /// Minute of hour, 0-59
    Minutes,
    /// Second of minute, 0-59
    Seconds,
}

impl DateUnit {
    /// Absolute units tried by automatic selection, coarsest first
    pub const COARSE_TO_FINE: [DateUnit; 8] = [
        DateUnit::Year,
        DateUnit::Month,
        DateUnit::Week,
        DateUnit::Day,
        DateUnit::Hour,
        DateUnit::Minute,
        DateUnit::Second,
        DateUnit::Millisecond,
    ];

    pub const PERIODIC: [DateUnit; 6] = [
        DateUnit::Months,
        DateUnit::Dates,
        DateUnit::Weekdays,
        DateUnit::Hours,
        DateUnit::Minutes,
        DateUnit::Seconds,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DateUnit::Year => "year",
            DateUnit::Month => "month",
            DateUnit::Week => "week",
            DateUnit::Day => "day",
            DateUnit::Hour => "hour",
            DateUnit::Minute => "minute",
            DateUnit::Second => "second",
            DateUnit::Millisecond => "millisecond",
            DateUnit::Months => "months",
            DateUnit::Dates => "dates",
            DateUnit::Weekdays => "weekdays",
            DateUnit::Hours => "hours",
            DateUnit::Minutes => "minutes",
            DateUnit::Seconds => "seconds",
        }
    }

    pub fn is_periodic(&self) -> bool {
        Self::PERIODIC.contains(self)
    }

    /// Fixed count domain of a periodic unit
    pub fn domain(&self) -> Option<(i64, i64)> {
        match self {
            DateUnit::Months => Some((0, 11)),
            DateUnit::Dates => Some((1, 31)),
            DateUnit::Weekdays => Some((0, 6)),
            DateUnit::Hours => Some((0, 23)),
            DateUnit::Minutes | DateUnit::Seconds => Some((0, 59)),
            _ => None,
        }
    }

    /// Allowed step sizes, when the unit restricts them
    pub fn steps(&self) -> Option<&'static [f64]> {
        match self {
            DateUnit::Day => Some(&[1.0, 7.0]),
            DateUnit::Month => Some(&[1.0, 3.0, 6.0]),
            DateUnit::Months | DateUnit::Dates | DateUnit::Weekdays => Some(&[1.0]),
            _ => None,
        }
    }

    /// Smallest step allowed when no step list applies
    pub fn min_step(&self) -> f64 {
        1.0
    }

    /// Approximate duration of one unit in milliseconds
    pub fn approx_millis(&self) -> f64 {
        match self {
            DateUnit::Year => MS_PER_YEAR,
            DateUnit::Month | DateUnit::Months => MS_PER_MONTH,
            DateUnit::Week => MS_PER_WEEK,
            DateUnit::Day | DateUnit::Dates | DateUnit::Weekdays => MS_PER_DAY,
            DateUnit::Hour | DateUnit::Hours => MS_PER_HOUR,
            DateUnit::Minute | DateUnit::Minutes => MS_PER_MINUTE,
            DateUnit::Second | DateUnit::Seconds => MS_PER_SECOND,
            DateUnit::Millisecond => 1.0,
        }
    }

    /// Pick an absolute unit for a span of `span_ms` milliseconds
    ///
    /// Walks the duration ladder from coarse to fine and settles on the first
    /// interval that yields at least `minbins` bins, backing off to the
    /// previous rung as soon as an interval would exceed `maxbins`.
    pub fn find(span_ms: f64, minbins: usize, maxbins: usize) -> DateUnit {
        let (minb, maxb) = (minbins as f64, maxbins as f64);
        for i in 1..LADDER.len() {
            let (duration, unit) = LADDER[i];
            if span_ms > duration {
                let bins = span_ms / duration;
                if bins > maxb {
                    return LADDER[i - 1].1;
                }
                if bins >= minb {
                    return unit;
                }
            }
        }
        LADDER[LADDER.len() - 1].1
    }

    /// Integer count of this unit for `date`
    pub fn count(&self, date: NaiveDateTime) -> i64 {
        let days = days_since_base(date.date());
        let hours = days * 24 + i64::from(date.hour());
        let minutes = hours * 60 + i64::from(date.minute());
        let seconds = minutes * 60 + i64::from(date.second());
        match self {
            DateUnit::Year => i64::from(date.year()),
            DateUnit::Month => i64::from(date.year()) * 12 + i64::from(date.month0()),
            DateUnit::Week => (days + BASE_WEEKDAY_FROM_SUNDAY).div_euclid(7),
            DateUnit::Day => days,
            DateUnit::Hour => hours,
            DateUnit::Minute => minutes,
            DateUnit::Second => seconds,
            DateUnit::Millisecond => {
                seconds * 1000 + i64::from((date.nanosecond() / 1_000_000).min(999))
            }
            DateUnit::Months => i64::from(date.month0()),
            DateUnit::Dates => i64::from(date.day()),
            DateUnit::Weekdays => i64::from(date.weekday().num_days_from_sunday()),
            DateUnit::Hours => i64::from(date.hour()),
            DateUnit::Minutes => i64::from(date.minute()),
            DateUnit::Seconds => i64::from(date.second()),
        }
    }

    /// Date at the start of count `n`; inverse of [`DateUnit::count`]
    pub fn date(&self, n: i64) -> Option<NaiveDateTime> {
        match self {
            DateUnit::Year => ymd(n, 1),
            DateUnit::Month => ymd(n.div_euclid(12), n.rem_euclid(12) as u32 + 1),
            DateUnit::Week => base_day(7 * n - BASE_WEEKDAY_FROM_SUNDAY),
            DateUnit::Day => base_day(n),
            DateUnit::Hour => base_day(n.div_euclid(24))?
                .checked_add_signed(TimeDelta::try_hours(n.rem_euclid(24))?),
            DateUnit::Minute => base_day(n.div_euclid(1440))?
                .checked_add_signed(TimeDelta::try_minutes(n.rem_euclid(1440))?),
            DateUnit::Second => base_day(n.div_euclid(86_400))?
                .checked_add_signed(TimeDelta::try_seconds(n.rem_euclid(86_400))?),
            DateUnit::Millisecond => base_day(n.div_euclid(86_400_000))?
                .checked_add_signed(TimeDelta::try_milliseconds(n.rem_euclid(86_400_000))?),
            DateUnit::Months => shift_months(reference(1970, 1, 1)?, n),
            DateUnit::Dates => reference(1970, 1, 1)?.checked_add_signed(TimeDelta::try_days(n - 1)?),
            DateUnit::Weekdays => reference(1970, 1, 4)?.checked_add_signed(TimeDelta::try_days(n)?),
            DateUnit::Hours => reference(1970, 1, 1)?.checked_add_signed(TimeDelta::try_hours(n)?),
            DateUnit::Minutes => {
                reference(1970, 1, 1)?.checked_add_signed(TimeDelta::try_minutes(n)?)
            }
            DateUnit::Seconds => {
                reference(1970, 1, 1)?.checked_add_signed(TimeDelta::try_seconds(n)?)
            }
        }
    }

    /// Start of the unit containing `date`
    ///
    /// For periodic units this is the reference date of the period position.
    pub fn floor(&self, date: NaiveDateTime) -> Option<NaiveDateTime> {
        self.date(self.count(date))
    }

    /// Shift `date` by `n` units, keeping finer fields where the calendar allows
    pub fn offset(&self, date: NaiveDateTime, n: i64) -> Option<NaiveDateTime> {
        match self {
            DateUnit::Year => shift_months(date, n.checked_mul(12)?),
            DateUnit::Month | DateUnit::Months => shift_months(date, n),
            DateUnit::Week => date.checked_add_signed(TimeDelta::try_weeks(n)?),
            DateUnit::Day | DateUnit::Dates | DateUnit::Weekdays => {
                date.checked_add_signed(TimeDelta::try_days(n)?)
            }
            DateUnit::Hour | DateUnit::Hours => date.checked_add_signed(TimeDelta::try_hours(n)?),
            DateUnit::Minute | DateUnit::Minutes => {
                date.checked_add_signed(TimeDelta::try_minutes(n)?)
            }
            DateUnit::Second | DateUnit::Seconds => {
                date.checked_add_signed(TimeDelta::try_seconds(n)?)
            }
            DateUnit::Millisecond => date.checked_add_signed(TimeDelta::try_milliseconds(n)?),
        }
    }
}

fn days_since_base(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - BASE_DAYS_FROM_CE
}

fn base_day(days: i64) -> Option<NaiveDateTime> {
    let ce = i32::try_from(days + BASE_DAYS_FROM_CE).ok()?;
    Some(NaiveDate::from_num_days_from_ce_opt(ce)?.and_time(NaiveTime::MIN))
}

fn ymd(year: i64, month: u32) -> Option<NaiveDateTime> {
    let year = i32::try_from(year).ok()?;
    Some(NaiveDate::from_ymd_opt(year, month, 1)?.and_time(NaiveTime::MIN))
}

fn reference(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
    Some(NaiveDate::from_ymd_opt(year, month, day)?.and_time(NaiveTime::MIN))
}

fn shift_months(date: NaiveDateTime, n: i64) -> Option<NaiveDateTime> {
    let months = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
    if n >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}

impl fmt::Display for DateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DateUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase();
        Self::COARSE_TO_FINE
            .iter()
            .chain(Self::PERIODIC.iter())
            .find(|unit| unit.name() == name)
            .copied()
            .ok_or_else(|| Error::InvalidParameter(format!("unknown date unit '{name}'")))
    }
}
