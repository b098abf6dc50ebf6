pub mod month;
pub mod year;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Monthly rollup key. Records with an unreadable date keep their own
/// bucket so totals stay auditable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub enum MonthKey {
    Month { year: i32, month: u32 },
    Unknown,
}

impl MonthKey {
    pub fn from_date(date: Option<NaiveDate>) -> MonthKey {
        match date {
            Some(date) => MonthKey::Month {
                year: date.year(),
                month: date.month(),
            },
            None => MonthKey::Unknown,
        }
    }

    pub fn year(&self) -> YearKey {
        match self {
            MonthKey::Month { year, .. } => YearKey::Year(*year),
            MonthKey::Unknown => YearKey::Unknown,
        }
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> String {
        match key {
            MonthKey::Month { year, month } => format!("{:04}-{:02}", year, month),
            MonthKey::Unknown => "unknown".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub enum YearKey {
    Year(i32),
    Unknown,
}

impl From<YearKey> for String {
    fn from(key: YearKey) -> String {
        match key {
            YearKey::Year(year) => format!("{:04}", year),
            YearKey::Unknown => "unknown".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_key() {
        let key = MonthKey::from_date(NaiveDate::from_ymd_opt(2024, 3, 15));
        assert_eq!(MonthKey::Month { year: 2024, month: 3 }, key);
        assert_eq!("2024-03", String::from(key));
        assert_eq!(YearKey::Year(2024), key.year());

        let unknown = MonthKey::from_date(None);
        assert_eq!("unknown", String::from(unknown));
        assert_eq!(YearKey::Unknown, unknown.year());
    }

    #[test]
    fn test_key_ordering() {
        let jan = MonthKey::Month { year: 2024, month: 1 };
        let feb = MonthKey::Month { year: 2024, month: 2 };
        let prev = MonthKey::Month { year: 2023, month: 12 };
        assert!(prev < jan && jan < feb && feb < MonthKey::Unknown);
    }
}
