//! Weekly availability grid for the current user.

use axum::{extract::State, Json};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::db::{Availability, TimeRange, User, DAY_NAMES};
use crate::AppState;

use super::error::ApiError;

/// One cell of the grid: a (weekday, time range) pair and whether the
/// user declared themselves available for it.
#[derive(Debug, Serialize)]
pub struct AvailabilityCell {
    pub id: String,
    pub day: i64,
    pub day_name: String,
    pub time_range_id: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: bool,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityGrid {
    /// Seven rows, Sunday first, each covering every catalog time range.
    pub days: Vec<Vec<AvailabilityCell>>,
}

/// The actor's weekly availability grid, creating missing cells on first
/// read
///
/// GET /api/availabilities
pub async fn my_availabilities(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<AvailabilityGrid>, ApiError> {
    let ranges: Vec<TimeRange> =
        sqlx::query_as("SELECT * FROM time_ranges ORDER BY start_time")
            .fetch_all(&state.db)
            .await?;

    let existing: Vec<Availability> =
        sqlx::query_as("SELECT * FROM availabilities WHERE user_id = ?")
            .bind(&user.id)
            .fetch_all(&state.db)
            .await?;
    let mut by_cell: HashMap<(i64, String), Availability> = existing
        .into_iter()
        .map(|a| ((a.day, a.time_range_id.clone()), a))
        .collect();

    let mut days = Vec::with_capacity(7);
    for day in 0..7i64 {
        let mut row = Vec::with_capacity(ranges.len());
        for range in &ranges {
            let availability = match by_cell.remove(&(day, range.id.clone())) {
                Some(availability) => availability,
                None => create_cell(&state.db, &user.id, day, &range.id).await?,
            };
            row.push(AvailabilityCell {
                id: availability.id,
                day,
                day_name: DAY_NAMES[day as usize].to_string(),
                time_range_id: range.id.clone(),
                start_time: range.start_time,
                end_time: range.end_time,
                status: availability.status,
            });
        }
        days.push(row);
    }

    Ok(Json(AvailabilityGrid { days }))
}

async fn create_cell(
    db: &crate::db::DbPool,
    user_id: &str,
    day: i64,
    time_range_id: &str,
) -> Result<Availability, sqlx::Error> {
    let id = uuid::Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO availabilities (id, user_id, day, time_range_id, status) \
         VALUES (?, ?, ?, ?, 0)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(day)
    .bind(time_range_id)
    .execute(db)
    .await?;
    sqlx::query_as("SELECT * FROM availabilities WHERE id = ?")
        .bind(&id)
        .fetch_one(db)
        .await
}

#[derive(Debug, Deserialize)]
pub struct UpdateAvailabilitiesRequest {
    /// The cells to mark available; every other cell of the actor's grid
    /// becomes unavailable.
    pub availability_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateAvailabilitiesResponse {
    pub message: String,
    pub available: u64,
}

/// Replace the actor's availability selection
///
/// PUT /api/availabilities
pub async fn update_availabilities(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(request): Json<UpdateAvailabilitiesRequest>,
) -> Result<Json<UpdateAvailabilitiesResponse>, ApiError> {
    let mut tx = state.db.begin().await?;

    sqlx::query("UPDATE availabilities SET status = 0 WHERE user_id = ?")
        .bind(&user.id)
        .execute(&mut *tx)
        .await?;

    let mut available = 0u64;
    for id in &request.availability_ids {
        let result =
            sqlx::query("UPDATE availabilities SET status = 1 WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(&user.id)
                .execute(&mut *tx)
                .await?;
        available += result.rows_affected();
    }

    tx.commit().await?;

    Ok(Json(UpdateAvailabilitiesResponse {
        message: "Availability updated!".to_string(),
        available,
    }))
}
