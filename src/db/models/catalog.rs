//! Reference catalog: places needing coverage and the shared set of named
//! time-of-day intervals. Both are provisioned by seeders or operators and
//! are read-only input to duty generation.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A physical location requiring coverage.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

/// A half-open time-of-day interval, globally shared reference data.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimeRange {
    pub id: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: String,
}

impl TimeRange {
    /// Invariant check: the interval must be non-empty.
    pub fn is_valid(&self) -> bool {
        self.start_time < self.end_time
    }
}
