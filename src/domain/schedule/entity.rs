use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::event::{EventSummary, UserSummary};

/// One event on a user's personal schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: i64,

    #[serde(default)]
    pub user: Option<UserSummary>,

    pub event: EventSummary,

    pub created_at: NaiveDateTime,
}

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MonthRange {
    pub year: i32,
    pub month: u32,
}

impl MonthRange {
    /// Returns None if `month` is not in 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.next().first_day().and_then(|d| d.pred_opt())
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            Self { year: self.year - 1, month: 12 }
        } else {
            Self { year: self.year, month: self.month - 1 }
        }
    }
}

impl Default for MonthRange {
    fn default() -> Self {
        Self::current()
    }
}

/// Filter for `GET /api/schedules/`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleQuery {
    All,
    /// Events overlapping the month
    Month(MonthRange),
    /// Events running on the day
    Date(NaiveDate),
}

impl ScheduleQuery {
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            ScheduleQuery::All => Vec::new(),
            ScheduleQuery::Month(range) => vec![
                ("year", range.year.to_string()),
                ("month", range.month.to_string()),
            ],
            ScheduleQuery::Date(date) => vec![("date", date.format("%Y-%m-%d").to_string())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_range_rejects_invalid_month() {
        assert!(MonthRange::new(2025, 0).is_none());
        assert!(MonthRange::new(2025, 13).is_none());
        assert!(MonthRange::new(2025, 12).is_some());
    }

    #[test]
    fn test_month_bounds() {
        let feb = MonthRange::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29));

        let dec = MonthRange::new(2025, 12).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2025, 12, 31));
        assert_eq!(dec.next(), MonthRange { year: 2026, month: 1 });
        assert_eq!(dec.next().previous(), dec);
    }

    #[test]
    fn test_query_pairs() {
        let month = ScheduleQuery::Month(MonthRange { year: 2025, month: 5 });
        assert_eq!(
            month.to_query_pairs(),
            vec![("year", "2025".to_string()), ("month", "5".to_string())]
        );

        let day = ScheduleQuery::Date(NaiveDate::from_ymd_opt(2025, 5, 3).unwrap());
        assert_eq!(day.to_query_pairs(), vec![("date", "2025-05-03".to_string())]);

        assert!(ScheduleQuery::All.to_query_pairs().is_empty());
    }
}
