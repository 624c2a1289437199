use crate::model::CalendarError;
use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn first_day(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    /// Weekday headings in display order.
    pub fn headings(self) -> [&'static str; 7] {
        match self {
            WeekStart::Sunday => ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
            WeekStart::Monday => ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"],
        }
    }

    fn offset(self, date: NaiveDate) -> i64 {
        match self {
            WeekStart::Sunday => date.weekday().num_days_from_sunday() as i64,
            WeekStart::Monday => date.weekday().num_days_from_monday() as i64,
        }
    }
}

/// Inclusive, week-aligned span of days shown for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl GridRange {
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn len(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

pub fn grid_range(date: NaiveDate, week_start: WeekStart) -> Result<GridRange, CalendarError> {
    let start = start_of_week(start_of_month(date), week_start)?;
    let end = end_of_week(end_of_month(date)?, week_start)?;
    Ok(GridRange { start, end })
}

pub fn start_of_week(date: NaiveDate, week_start: WeekStart) -> Result<NaiveDate, CalendarError> {
    date.checked_sub_signed(Duration::days(week_start.offset(date)))
        .ok_or_else(|| out_of_range("start of week", date))
}

pub fn end_of_week(date: NaiveDate, week_start: WeekStart) -> Result<NaiveDate, CalendarError> {
    date.checked_add_signed(Duration::days(6 - week_start.offset(date)))
        .ok_or_else(|| out_of_range("end of week", date))
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn end_of_month(date: NaiveDate) -> Result<NaiveDate, CalendarError> {
    start_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .ok_or_else(|| out_of_range("end of month", date))
}

/// Shifts by whole months, clamping the day to the target month's length.
pub fn add_months(date: NaiveDate, months: i32) -> Result<NaiveDate, CalendarError> {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.ok_or_else(|| out_of_range("month shift", date))
}

pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn out_of_range(what: &str, date: NaiveDate) -> CalendarError {
    CalendarError::InvalidRange(format!("{} of {} is outside the calendar", what, date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn march_2024_grid_with_sunday_weeks() {
        let range = grid_range(day(2024, 3, 15), WeekStart::Sunday).unwrap();
        assert_eq!(range.start, day(2024, 2, 25));
        assert_eq!(range.end, day(2024, 4, 6));
        assert_eq!(range.len(), 42);
    }

    #[test]
    fn monday_weeks_shift_the_boundaries() {
        let range = grid_range(day(2024, 3, 1), WeekStart::Monday).unwrap();
        assert_eq!(range.start, day(2024, 2, 26));
        assert_eq!(range.end, day(2024, 3, 31));
        assert_eq!(range.len(), 35);
    }

    #[test]
    fn february_that_fills_exactly_four_weeks() {
        let range = grid_range(day(2015, 2, 10), WeekStart::Sunday).unwrap();
        assert_eq!(range.start, day(2015, 2, 1));
        assert_eq!(range.end, day(2015, 2, 28));
        assert_eq!(range.days().count(), 28);
    }

    #[test]
    fn every_month_of_a_decade_is_week_aligned() {
        for week_start in [WeekStart::Sunday, WeekStart::Monday] {
            let mut month = day(2020, 1, 1);
            while month.year() < 2030 {
                let range = grid_range(month, week_start).unwrap();
                assert_eq!(range.len() % 7, 0);
                assert_eq!(range.start.weekday(), week_start.first_day());
                assert!(range.start <= month);
                assert!(range.end >= end_of_month(month).unwrap());
                month = add_months(month, 1).unwrap();
            }
        }
    }

    #[test]
    fn add_months_clamps_day_of_month() {
        assert_eq!(add_months(day(2024, 1, 31), 1).unwrap(), day(2024, 2, 29));
        assert_eq!(add_months(day(2024, 3, 31), -1).unwrap(), day(2024, 2, 29));
        assert_eq!(add_months(day(2024, 1, 1), -2).unwrap(), day(2023, 11, 1));
    }

    #[test]
    fn ranges_at_the_calendar_edge_are_invalid() {
        let err = grid_range(NaiveDate::MAX, WeekStart::Sunday).unwrap_err();
        assert!(matches!(err, CalendarError::InvalidRange(_)));
    }
}
