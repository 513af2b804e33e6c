//! Sampling interval of a basis series.
//!
//! The engine treats the interval as opaque apart from two derived values:
//! the persistence key handed to the storage collaborator and the number of
//! periods in a continuously traded year.

use std::fmt;
use std::str::FromStr;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::{CALENDAR_DAYS_PER_YEAR, ContangoError, Result};

/// Unit of a [`SamplingInterval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntervalUnit {
    /// Minutes (`m`).
    Minute,
    /// Hours (`h`).
    Hour,
    /// Days (`d`).
    Day,
    /// Weeks (`w`).
    Week,
}

impl IntervalUnit {
    /// Short suffix used in exchange interval strings.
    #[must_use]
    pub const fn suffix(&self) -> char {
        match self {
            Self::Minute => 'm',
            Self::Hour => 'h',
            Self::Day => 'd',
            Self::Week => 'w',
        }
    }

    /// Word used in persistence keys.
    #[must_use]
    pub const fn word(&self) -> &'static str {
        match self {
            Self::Minute => "min",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
        }
    }

    const fn minutes(&self) -> i64 {
        match self {
            Self::Minute => 1,
            Self::Hour => 60,
            Self::Day => 60 * 24,
            Self::Week => 60 * 24 * 7,
        }
    }
}

/// A sampling interval such as `1h` or `1d`.
///
/// # Example
///
/// ```
/// use contango_traits::SamplingInterval;
///
/// let interval: SamplingInterval = "1h".parse().unwrap();
/// assert_eq!(interval.storage_key(), "1hour");
/// assert_eq!(interval.periods_per_year(), 8760.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SamplingInterval {
    count: u32,
    unit: IntervalUnit,
}

impl SamplingInterval {
    /// One hour.
    pub const HOURLY: Self = Self::new(1, IntervalUnit::Hour);

    /// One day.
    pub const DAILY: Self = Self::new(1, IntervalUnit::Day);

    /// Create an interval of `count` units.
    #[must_use]
    pub const fn new(count: u32, unit: IntervalUnit) -> Self {
        Self { count, unit }
    }

    /// Number of units per sample.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// The unit of the interval.
    #[must_use]
    pub const fn unit(&self) -> IntervalUnit {
        self.unit
    }

    /// Wall-clock length of one sample.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        TimeDelta::minutes(self.unit.minutes() * i64::from(self.count))
    }

    /// Key under which the persistence collaborator stores frames for this
    /// interval, e.g. `1h` → `1hour`, `1d` → `1day`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        format!("{}{}", self.count, self.unit.word())
    }

    /// Artifact name of the analysed frame.
    #[must_use]
    pub fn data_artifact(&self) -> String {
        format!("advanced_basis_data_{}", self.storage_key())
    }

    /// Artifact name of the summary statistics table.
    #[must_use]
    pub fn stats_artifact(&self) -> String {
        format!("advanced_basis_stats_{}", self.storage_key())
    }

    /// Samples per year for a market that trades around the clock.
    #[must_use]
    pub fn periods_per_year(&self) -> f64 {
        let minutes_per_year = CALENDAR_DAYS_PER_YEAR * 24.0 * 60.0;
        minutes_per_year / (self.unit.minutes() as f64 * f64::from(self.count))
    }
}

impl Default for SamplingInterval {
    fn default() -> Self {
        Self::HOURLY
    }
}

impl fmt::Display for SamplingInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.unit.suffix())
    }
}

impl FromStr for SamplingInterval {
    type Err = ContangoError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut chars = s.chars();
        let unit = match chars.next_back() {
            Some('m') => IntervalUnit::Minute,
            Some('h') => IntervalUnit::Hour,
            Some('d') => IntervalUnit::Day,
            Some('w') => IntervalUnit::Week,
            _ => {
                return Err(ContangoError::invalid_parameter(
                    "interval",
                    format!("unknown unit in `{s}`, expected one of m, h, d, w"),
                ));
            }
        };

        let count: u32 = chars.as_str().parse().map_err(|_| {
            ContangoError::invalid_parameter("interval", format!("bad count in `{s}`"))
        })?;
        if count == 0 {
            return Err(ContangoError::invalid_parameter(
                "interval",
                "count must be positive",
            ));
        }

        Ok(Self::new(count, unit))
    }
}

impl TryFrom<String> for SamplingInterval {
    type Error = ContangoError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SamplingInterval> for String {
    fn from(value: SamplingInterval) -> Self {
        value.to_string()
    }
}
