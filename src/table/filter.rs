//! Filter registry: discrete-value filters and the optional date-range filter

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// Day formats accepted from the command line and the date prompt
const DAY_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

pub fn parse_day(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    DAY_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .with_context(|| format!("Invalid date '{}' (expected YYYY-MM-DD)", text))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// One discrete filter control. `id` names a column or a logical row field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDescriptor {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub options: Vec<FilterOption>,
}

impl FilterDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            options: Vec::new(),
        }
    }

    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(FilterOption::new(value, label));
        self
    }

    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}

/// Registered discrete filters, unique by id
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    filters: Vec<FilterDescriptor>,
}

impl FilterRegistry {
    pub fn new(filters: Vec<FilterDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(filters.len());
        for filter in filters {
            if seen.insert(filter.id.clone()) {
                unique.push(filter);
            } else {
                warn!("Dropping duplicate filter id '{}'", filter.id);
            }
        }
        Self { filters: unique }
    }

    pub fn get(&self, id: &str) -> Option<&FilterDescriptor> {
        self.filters.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Selected date interval in epoch milliseconds, both bounds inclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl DateRange {
    pub fn new(from: Option<i64>, to: Option<i64>) -> Self {
        Self { from, to }
    }

    /// Whole calendar days: `from` at midnight, `to` at the last millisecond
    pub fn from_days(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        let start = from
            .and_then(|d| d.and_hms_milli_opt(0, 0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp_millis());
        let end = to
            .and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999))
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp_millis());
        Self {
            from: start,
            to: end,
        }
    }

    /// Whole-day range from optional day strings; blank bounds are open
    pub fn parse_bounds(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let day = |text: Option<&str>| -> Result<Option<NaiveDate>> {
            match text.map(str::trim) {
                Some(t) if !t.is_empty() => parse_day(t).map(Some),
                _ => Ok(None),
            }
        };
        Ok(Self::from_days(day(from)?, day(to)?))
    }

    /// `from..to`, `from..`, `..to`, a single day, or blank for no range
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::default());
        }
        match input.split_once("..") {
            Some((from, to)) => Self::parse_bounds(Some(from), Some(to)),
            None if input.contains(' ') => bail!("Use 'from..to' to give a date range"),
            None => Self::parse_bounds(Some(input), Some(input)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        self.from.map_or(true, |from| timestamp >= from)
            && self.to.map_or(true, |to| timestamp <= to)
    }
}

impl fmt::Display for DateRange {
    /// Bounds as calendar days, in the form [`DateRange::parse`] accepts
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = |ms: Option<i64>| {
            ms.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        if self.is_active() {
            write!(f, "{}..{}", day(self.from), day(self.to))
        } else {
            Ok(())
        }
    }
}
