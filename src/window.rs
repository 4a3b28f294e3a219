use crate::models::Entry;
use chrono::{Days, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseWindowError {
    #[error("window must look like 7d, 3m or 1y, got {0:?}")]
    Format(String),
    #[error("window amount must be positive")]
    ZeroAmount,
    #[error("window {0:?} is longer than {MAX_WINDOW_DAYS} days")]
    TooLong(String),
}

/// Longest window a selector may name.
pub const MAX_WINDOW_DAYS: i64 = 100 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindowUnit {
    Day,
    Month,
    Year,
}

impl WindowUnit {
    fn days(self) -> i64 {
        match self {
            WindowUnit::Day => 1,
            WindowUnit::Month => 30,
            WindowUnit::Year => 365,
        }
    }

    fn suffix(self) -> char {
        match self {
            WindowUnit::Day => 'd',
            WindowUnit::Month => 'm',
            WindowUnit::Year => 'y',
        }
    }
}

/// The user's time window choice: all time, or `<amount><unit>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowSelector {
    #[default]
    AllTime,
    Span { amount: u32, unit: WindowUnit },
}

impl WindowSelector {
    pub fn days(&self) -> Option<i64> {
        match self {
            WindowSelector::AllTime => None,
            WindowSelector::Span { amount, unit } => Some(i64::from(*amount) * unit.days()),
        }
    }

    pub fn is_all_time(&self) -> bool {
        matches!(self, WindowSelector::AllTime)
    }

    /// The inclusive range this window covers when it ends on `today`.
    /// `None` for all time, and for spans reaching past the calendar.
    pub fn range_ending(&self, today: NaiveDate) -> Option<DateRange> {
        let back = u64::try_from(self.days()? - 1).ok()?;
        let start = today.checked_sub_days(Days::new(back))?;
        Some(DateRange { start, end: today })
    }
}

impl FromStr for WindowSelector {
    type Err = ParseWindowError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let value = raw.trim().to_ascii_lowercase();
        if value.is_empty() {
            return Ok(WindowSelector::AllTime);
        }

        let split = value.len() - value.chars().last().map_or(0, char::len_utf8);
        let (digits, suffix) = value.split_at(split);
        let unit = match suffix {
            "d" => WindowUnit::Day,
            "m" => WindowUnit::Month,
            "y" => WindowUnit::Year,
            _ => return Err(ParseWindowError::Format(raw.to_owned())),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseWindowError::Format(raw.to_owned()));
        }
        let amount: u32 = digits
            .parse()
            .map_err(|_| ParseWindowError::Format(raw.to_owned()))?;
        if amount == 0 {
            return Err(ParseWindowError::ZeroAmount);
        }
        if i64::from(amount) * unit.days() > MAX_WINDOW_DAYS {
            return Err(ParseWindowError::TooLong(raw.to_owned()));
        }
        Ok(WindowSelector::Span { amount, unit })
    }
}

impl fmt::Display for WindowSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowSelector::AllTime => Ok(()),
            WindowSelector::Span { amount, unit } => write!(f, "{amount}{}", unit.suffix()),
        }
    }
}

impl Serialize for WindowSelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Concrete inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn day_count(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// An x-axis interval as reported by a chart: two date or datetime strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub start: String,
    pub end: String,
}

impl VisibleRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parsed bounds, or `None` when either end is not a readable date.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((parse_axis_value(&self.start)?, parse_axis_value(&self.end)?))
    }
}

impl From<DateRange> for VisibleRange {
    fn from(range: DateRange) -> Self {
        Self::new(range.start.to_string(), range.end.to_string())
    }
}

pub fn resolve_window(selector: &str) -> Option<DateRange> {
    resolve_window_at(Local::now().date_naive(), selector)
}

/// `None` for all time and for anything unparseable.
pub fn resolve_window_at(today: NaiveDate, selector: &str) -> Option<DateRange> {
    selector.parse::<WindowSelector>().ok()?.range_ending(today)
}

/// Entries whose day (taken at midnight) lies inside `range`, in their
/// original order. An absent or unreadable range keeps everything.
pub fn filter_by_range(entries: &[Entry], range: Option<&VisibleRange>) -> Vec<Entry> {
    let Some((start, end)) = range.and_then(VisibleRange::bounds) else {
        return entries.to_vec();
    };
    entries
        .iter()
        .filter(|entry| {
            let day = entry.date.and_time(NaiveTime::MIN);
            start <= day && day <= end
        })
        .cloned()
        .collect()
}

pub fn filter_by_window(entries: &[Entry], selector: &str) -> Vec<Entry> {
    filter_by_window_at(Local::now().date_naive(), entries, selector)
}

pub fn filter_by_window_at(today: NaiveDate, entries: &[Entry], selector: &str) -> Vec<Entry> {
    let range = resolve_window_at(today, selector).map(VisibleRange::from);
    filter_by_range(entries, range.as_ref())
}

fn parse_axis_value(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}
