//! Places and the admin view for assigning default users to timeslot
//! templates, informed by declared availability.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::db::{day_index, Place, User};
use crate::AppState;

use super::error::ApiError;
use crate::roster::access::{self, Action};

/// List all places
///
/// GET /api/places
pub async fn list_places(
    State(state): State<Arc<AppState>>,
    _user: User,
) -> Result<Json<Vec<Place>>, ApiError> {
    let places: Vec<Place> = sqlx::query_as("SELECT * FROM places ORDER BY name")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(places))
}

#[derive(Debug, FromRow)]
struct SlotRow {
    id: String,
    day: String,
    time_range_id: String,
    default_user_id: Option<String>,
    mc_only: bool,
    start_time: NaiveTime,
    end_time: NaiveTime,
}

/// One timeslot of the place with its current default user and the users
/// who declared themselves available for that weekday/time range.
#[derive(Debug, Serialize)]
pub struct AssignmentSlot {
    pub timeslot_id: String,
    pub day: String,
    pub time_range_id: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub mc_only: bool,
    pub default_user_id: Option<String>,
    pub available_user_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentsResponse {
    pub place: Place,
    pub slots: Vec<AssignmentSlot>,
}

/// The assignment view for a place (admin only)
///
/// GET /api/places/:id/assignments
pub async fn place_assignments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: User,
) -> Result<Json<AssignmentsResponse>, ApiError> {
    if !access::can(&user, Action::ManageAssignments) {
        return Err(ApiError::forbidden(
            "You are not authorized to access this page.",
        ));
    }

    let place: Place = sqlx::query_as("SELECT * FROM places WHERE id = ?")
        .bind(&id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Place not found"))?;

    let slots: Vec<SlotRow> = sqlx::query_as(
        "SELECT t.id, t.day, t.time_range_id, t.default_user_id, t.mc_only, \
                tr.start_time, tr.end_time \
         FROM timeslots t \
         JOIN time_ranges tr ON tr.id = t.time_range_id \
         WHERE t.place_id = ? \
         ORDER BY t.day, tr.start_time",
    )
    .bind(&id)
    .fetch_all(&state.db)
    .await?;

    // Who volunteered for which (day, time range) cell
    let declared: Vec<(i64, String, String)> = sqlx::query_as(
        "SELECT day, time_range_id, user_id FROM availabilities WHERE status = 1",
    )
    .fetch_all(&state.db)
    .await?;
    let mut available: HashMap<(i64, String), HashSet<String>> = HashMap::new();
    for (day, time_range_id, user_id) in declared {
        available
            .entry((day, time_range_id))
            .or_default()
            .insert(user_id);
    }

    let slots = slots
        .into_iter()
        .map(|slot| {
            let mut available_user_ids: Vec<String> = day_index(&slot.day)
                .and_then(|day| available.get(&(day as i64, slot.time_range_id.clone())))
                .map(|users| users.iter().cloned().collect())
                .unwrap_or_default();
            available_user_ids.sort();
            AssignmentSlot {
                timeslot_id: slot.id,
                day: slot.day,
                time_range_id: slot.time_range_id,
                start_time: slot.start_time,
                end_time: slot.end_time,
                mc_only: slot.mc_only,
                default_user_id: slot.default_user_id,
                available_user_ids,
            }
        })
        .collect();

    Ok(Json(AssignmentsResponse { place, slots }))
}

#[derive(Debug, Deserialize)]
pub struct AssignmentUpdate {
    pub timeslot_id: String,
    pub default_user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentsRequest {
    pub assignments: Vec<AssignmentUpdate>,
}

#[derive(Debug, Serialize)]
pub struct UpdateAssignmentsResponse {
    pub message: String,
    pub updated: u64,
}

/// Update default users on the place's timeslots, skipping unchanged
/// entries (admin only)
///
/// PUT /api/places/:id/assignments
pub async fn update_assignments(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    user: User,
    Json(request): Json<UpdateAssignmentsRequest>,
) -> Result<Json<UpdateAssignmentsResponse>, ApiError> {
    if !access::can(&user, Action::ManageAssignments) {
        return Err(ApiError::forbidden(
            "You are not authorized to access this page.",
        ));
    }

    let mut tx = state.db.begin().await?;
    let mut updated = 0u64;

    for assignment in &request.assignments {
        let current: Option<(Option<String>,)> = sqlx::query_as(
            "SELECT default_user_id FROM timeslots WHERE id = ? AND place_id = ?",
        )
        .bind(&assignment.timeslot_id)
        .bind(&id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((current,)) = current else {
            return Err(ApiError::not_found("Timeslot not found"));
        };
        if current == assignment.default_user_id {
            continue;
        }

        sqlx::query("UPDATE timeslots SET default_user_id = ? WHERE id = ?")
            .bind(&assignment.default_user_id)
            .bind(&assignment.timeslot_id)
            .execute(&mut *tx)
            .await?;
        updated += 1;
    }

    tx.commit().await?;

    tracing::info!(user = %user.username, place = %id, updated, "Assignments updated");

    Ok(Json(UpdateAssignmentsResponse {
        message: "Assignments updated!".to_string(),
        updated,
    }))
}
