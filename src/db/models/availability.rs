//! Per-user weekly availability declarations, consumed by the admin
//! assignment view when picking default users for timeslot templates.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Availability {
    pub id: String,
    pub user_id: String,
    /// Day number, 0 = Sunday through 6 = Saturday.
    pub day: i64,
    pub time_range_id: String,
    pub status: bool,
    pub created_at: String,
}
