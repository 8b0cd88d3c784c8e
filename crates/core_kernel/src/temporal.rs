//! Temporal types for fiscal periods and tenant-local time
//!
//! Policy checks compare claim dates against tenant-configured windows and
//! fiscal years. All boundaries are computed in the tenant's timezone so a
//! claim filed late at night is judged against the tenant's calendar day.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Timezone wrapper for tenant jurisdictions
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the tenant-local calendar date for a UTC instant
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        utc.with_timezone(&self.0).date_naive()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid period: start {start} must not be after end {end}")]
    InvalidPeriod { start: String, end: String },

    #[error("Invalid fiscal year start month: {0} (expected 1-12)")]
    InvalidStartMonth(u32),
}

/// A half-open date range [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidPeriod {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Returns true if the date falls within [start, end)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// A tenant's fiscal year, defined by its start month
///
/// The current cycle begins on the first day of the start month in the most
/// recent year where that day is not in the future, and ends the same day
/// one year later (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiscalYear {
    start_month: u32,
}

impl FiscalYear {
    /// Creates a fiscal year starting at the given month (1 = January)
    pub fn starting_in(start_month: u32) -> Result<Self, TemporalError> {
        if !(1..=12).contains(&start_month) {
            return Err(TemporalError::InvalidStartMonth(start_month));
        }
        Ok(Self { start_month })
    }

    pub fn start_month(&self) -> u32 {
        self.start_month
    }

    /// Returns the fiscal cycle containing the reference date
    pub fn cycle_containing(&self, reference: NaiveDate) -> DateRange {
        let year = if reference.month() >= self.start_month {
            reference.year()
        } else {
            reference.year() - 1
        };

        // The first of a month always exists
        let start = NaiveDate::from_ymd_opt(year, self.start_month, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(year + 1, self.start_month, 1).unwrap();

        DateRange { start, end }
    }

    /// Returns true if `date` falls within the cycle containing `reference`
    pub fn contains(&self, date: NaiveDate, reference: NaiveDate) -> bool {
        self.cycle_containing(reference).contains(date)
    }
}

impl Default for FiscalYear {
    fn default() -> Self {
        // April start, the common fiscal year for Indian tenants
        Self { start_month: 4 }
    }
}
