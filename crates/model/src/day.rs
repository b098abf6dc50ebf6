use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Weekdays hosting lessons on the fixed weekly grid.
pub const CLASS_DAYS: [Weekday; 3] = [Weekday::Mon, Weekday::Thu, Weekday::Sat];

/// The month view is always six full weeks, Monday first.
pub const GRID_DAYS: usize = 42;

/// One cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDay {
    pub date: NaiveDate,
    pub in_month: bool,
}

/// 42 consecutive days covering the given month, padded with the
/// surrounding weeks. Empty for an invalid year/month pair.
pub fn month_grid(year: i32, month: u32) -> Vec<GridDay> {
    let first = match NaiveDate::from_ymd_opt(year, month, 1) {
        Some(first) => first,
        None => return Vec::new(),
    };
    let lead = first.weekday().num_days_from_monday() as i64;
    let start = first - Duration::days(lead);

    (0..GRID_DAYS as i64)
        .map(|offset| {
            let date = start + Duration::days(offset);
            GridDay {
                date,
                in_month: date.year() == year && date.month() == month,
            }
        })
        .collect()
}

pub fn is_class_day(date: NaiveDate) -> bool {
    CLASS_DAYS.contains(&date.weekday())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_grid_shape() {
        let grid = month_grid(2024, 10);
        assert_eq!(GRID_DAYS, grid.len());
        assert_eq!(Weekday::Mon, grid[0].date.weekday());

        // October 2024 starts on a Tuesday, so one leading padding day.
        assert_eq!(date(2024, 9, 30), grid[0].date);
        assert!(!grid[0].in_month);
        assert_eq!(date(2024, 10, 1), grid[1].date);
        assert!(grid[1].in_month);

        let in_month = grid.iter().filter(|d| d.in_month).count();
        assert_eq!(31, in_month);
    }

    #[test]
    fn test_grid_month_starting_on_monday() {
        let grid = month_grid(2024, 7);
        assert_eq!(date(2024, 7, 1), grid[0].date);
        assert!(grid[0].in_month);
    }

    #[test]
    fn test_invalid_month_is_empty() {
        assert!(month_grid(2024, 13).is_empty());
    }

    #[test]
    fn test_class_days() {
        assert!(is_class_day(date(2024, 10, 7))); // Monday
        assert!(is_class_day(date(2024, 10, 10))); // Thursday
        assert!(is_class_day(date(2024, 10, 12))); // Saturday
        assert!(!is_class_day(date(2024, 10, 8))); // Tuesday
        assert!(!is_class_day(date(2024, 10, 13))); // Sunday
    }
}
