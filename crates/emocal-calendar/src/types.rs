use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalendarError;

/// Years outside this range are rejected so every date in a month grid
/// (which may reach into the neighbouring months) formats as `YYYY-MM-DD`.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// A calendar month, e.g. October 2026.
///
/// Serialized as `"YYYY-MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    first: NaiveDate,
    last: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalendarError::YearOutOfRange(year));
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or(CalendarError::InvalidMonth { year, month })?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|d| d.pred_opt())
            .ok_or(CalendarError::InvalidMonth { year, month })?;
        Ok(Self { first, last })
    }

    /// The month containing `date`.
    pub fn containing(date: NaiveDate) -> Result<Self, CalendarError> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn num_days(&self) -> u32 {
        self.last.day()
    }

    /// Whole-month range `[first, last]`.
    pub fn range(&self) -> DateRange {
        DateRange::new(self.first, self.last)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    /// Move by `delta` months, crossing year boundaries.
    pub fn shift(&self, delta: i32) -> Result<Self, CalendarError> {
        let index = i64::from(self.year()) * 12 + i64::from(self.month()) - 1 + i64::from(delta);
        let year = index.div_euclid(12);
        let month = index.rem_euclid(12) + 1;
        let year = i32::try_from(year).map_err(|_| CalendarError::YearOutOfRange(i32::MAX))?;
        Self::new(year, month as u32)
    }

    /// Human label, e.g. "October 2026"
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| CalendarError::Parse(s.to_string()))?;
        let year = year
            .parse()
            .map_err(|_| CalendarError::Parse(s.to_string()))?;
        let month = month
            .parse()
            .map_err(|_| CalendarError::Parse(s.to_string()))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Closed date range `[start, end]`; empty when `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered; 0 when empty.
    pub fn len(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.end - self.start).num_days().unsigned_abs() + 1
        }
    }

    /// Every date in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// `[start, start + days]`, saturating at the last representable date.
    pub fn forward(start: NaiveDate, days: u32) -> Self {
        let end = start
            .checked_add_days(Days::new(u64::from(days)))
            .unwrap_or(NaiveDate::MAX);
        Self { start, end }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \u{2192} {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        let feb_leap = YearMonth::new(2028, 2).unwrap();
        assert_eq!(feb_leap.first_day(), date(2028, 2, 1));
        assert_eq!(feb_leap.last_day(), date(2028, 2, 29));
        assert_eq!(YearMonth::new(2026, 2).unwrap().num_days(), 28);
        assert_eq!(YearMonth::new(2026, 12).unwrap().last_day(), date(2026, 12, 31));
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert_eq!(
            YearMonth::new(2026, 13),
            Err(CalendarError::InvalidMonth {
                year: 2026,
                month: 13
            })
        );
        assert!(YearMonth::new(2026, 0).is_err());
        assert_eq!(
            YearMonth::new(10000, 1),
            Err(CalendarError::YearOutOfRange(10000))
        );
    }

    #[test]
    fn test_shift_crosses_years() {
        let oct = YearMonth::new(2026, 10).unwrap();
        assert_eq!(oct.shift(3).unwrap(), YearMonth::new(2027, 1).unwrap());
        assert_eq!(oct.shift(-10).unwrap(), YearMonth::new(2025, 12).unwrap());
        assert_eq!(oct.shift(0).unwrap(), oct);
        assert_eq!(oct.shift(-24).unwrap(), YearMonth::new(2024, 10).unwrap());
        assert!(YearMonth::new(9999, 12).unwrap().shift(1).is_err());
    }

    #[test]
    fn test_containing_and_label() {
        let ym = YearMonth::containing(date(2026, 10, 16)).unwrap();
        assert_eq!(ym.label(), "October 2026");
        assert!(ym.contains(date(2026, 10, 31)));
        assert!(!ym.contains(date(2026, 11, 1)));
    }

    #[test]
    fn test_parse_and_serde() {
        let ym: YearMonth = "2026-03".parse().unwrap();
        assert_eq!(ym, YearMonth::new(2026, 3).unwrap());
        assert_eq!(ym.to_string(), "2026-03");
        assert!("2026/03".parse::<YearMonth>().is_err());

        let json = serde_json::to_string(&ym).unwrap();
        assert_eq!(json, "\"2026-03\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym);
        assert!(serde_json::from_str::<YearMonth>("\"2026-13\"").is_err());
    }

    #[test]
    fn test_date_range_len_and_days() {
        let range = DateRange::new(date(2026, 10, 30), date(2026, 11, 2));
        assert_eq!(range.len(), 4);
        assert_eq!(
            range.days().collect::<Vec<_>>(),
            vec![
                date(2026, 10, 30),
                date(2026, 10, 31),
                date(2026, 11, 1),
                date(2026, 11, 2)
            ]
        );

        let empty = DateRange::new(date(2026, 11, 2), date(2026, 10, 30));
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
        assert_eq!(empty.days().count(), 0);
    }

    #[test]
    fn test_forward_range() {
        let range = DateRange::forward(date(2026, 10, 16), 15);
        assert_eq!(range.end, date(2026, 10, 31));
        assert_eq!(range.len(), 16);
        assert_eq!(range.to_string(), "2026-10-16 \u{2192} 2026-10-31");
    }
}
