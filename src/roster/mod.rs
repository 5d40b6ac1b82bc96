//! Roster core: duty generation from timeslot templates and the
//! grab/drop/transfer lifecycle.

pub mod access;
pub mod auto_generate;
pub mod error;
pub mod generator;
pub mod lifecycle;

pub use auto_generate::spawn_generation_task;
pub use error::RosterError;
pub use generator::{DutyGenerator, GenerationStats};
pub use lifecycle::{drop_duties, grab_duties, grabable_duties, DropOutcome, DropTarget};

use chrono::{Datelike, Duration, NaiveDate};

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Inclusive date range covering `num_weeks` whole weeks from `start`.
pub fn generation_range(start: NaiveDate, num_weeks: u32) -> (NaiveDate, NaiveDate) {
    (start, start + Duration::days(num_weeks as i64 * 7 - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start() {
        // 2024-01-03 is a Wednesday
        assert_eq!(week_start(date(2024, 1, 3)), date(2024, 1, 1));
        // Monday maps to itself
        assert_eq!(week_start(date(2024, 1, 1)), date(2024, 1, 1));
        // Sunday belongs to the week that started six days earlier
        assert_eq!(week_start(date(2024, 1, 7)), date(2024, 1, 1));
    }

    #[test]
    fn test_generation_range() {
        let (start, end) = generation_range(date(2024, 1, 1), 2);
        assert_eq!(start, date(2024, 1, 1));
        assert_eq!(end, date(2024, 1, 14));

        let (start, end) = generation_range(date(2024, 1, 1), 1);
        assert_eq!(start, date(2024, 1, 1));
        assert_eq!(end, date(2024, 1, 7));
    }
}
