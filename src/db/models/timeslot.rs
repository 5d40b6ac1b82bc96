//! Timeslot templates: the weekly default assignment for a
//! place/weekday/time-range cell.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Weekday names as stored in the `timeslots.day` column, indexed by the
/// day number used in availability rows (0 = Sunday).
pub const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Map a stored weekday name to its 0 = Sunday index.
pub fn day_index(name: &str) -> Option<usize> {
    DAY_NAMES.iter().position(|d| *d == name)
}

/// At most one template exists per (place, weekday, time range); duty
/// generation relies on that uniqueness.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Timeslot {
    pub id: String,
    pub place_id: String,
    /// Weekday name, e.g. "Tuesday".
    pub day: String,
    pub time_range_id: String,
    /// Default assignee copied onto generated duties; may be absent.
    pub default_user_id: Option<String>,
    /// Restricts grab eligibility to privileged (mc) users.
    pub mc_only: bool,
    pub created_at: String,
}

impl Timeslot {
    pub fn weekday(&self) -> Option<Weekday> {
        self.day.parse::<Weekday>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_index_round_trip() {
        for (i, name) in DAY_NAMES.iter().enumerate() {
            assert_eq!(day_index(name), Some(i));
        }
        assert_eq!(day_index("Funday"), None);
    }

    #[test]
    fn test_weekday_parse() {
        let slot = Timeslot {
            id: "ts".to_string(),
            place_id: "p".to_string(),
            day: "Tuesday".to_string(),
            time_range_id: "tr".to_string(),
            default_user_id: None,
            mc_only: false,
            created_at: String::new(),
        };
        assert_eq!(slot.weekday(), Some(Weekday::Tue));
    }
}
