//! Duty endpoints: the roster week view, generation, and the
//! grab/drop/transfer workflow.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::db::{Duty, DutyDetail, User, DUTY_DETAIL_COLUMNS};
use crate::roster::{
    self,
    access::{self, Action},
    DropTarget, DutyGenerator,
};
use crate::AppState;

use super::error::ApiError;
use super::validation::validate_num_weeks;

const DUTY_DETAIL_QUERY: &str = "FROM duties d \
     JOIN timeslots t ON t.id = d.timeslot_id \
     JOIN time_ranges tr ON tr.id = t.time_range_id \
     JOIN places p ON p.id = t.place_id \
     LEFT JOIN users u ON u.id = d.user_id";

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    /// Defaults to the Monday of the current week.
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct RosterResponse {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duties: Vec<DutyDetail>,
}

/// One week of the roster, joined with places, time ranges, and owners
///
/// GET /api/duties?start_date=2024-01-01
pub async fn list_duties(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RosterQuery>,
    _user: User,
) -> Result<Json<RosterResponse>, ApiError> {
    let start_date = query
        .start_date
        .unwrap_or_else(|| roster::week_start(chrono::Local::now().date_naive()));
    let end_date = start_date + chrono::Duration::days(6);

    let duties: Vec<DutyDetail> = sqlx::query_as(&format!(
        "SELECT {DUTY_DETAIL_COLUMNS} {DUTY_DETAIL_QUERY} \
         WHERE d.date BETWEEN ? AND ? \
         ORDER BY d.date, tr.start_time, p.name"
    ))
    .bind(start_date)
    .bind(end_date)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(RosterResponse {
        start_date,
        end_date,
        duties,
    }))
}

/// The actor's upcoming duties
///
/// GET /api/duties/mine
pub async fn my_duties(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Vec<DutyDetail>>, ApiError> {
    let today = chrono::Local::now().date_naive();
    let duties: Vec<DutyDetail> = sqlx::query_as(&format!(
        "SELECT {DUTY_DETAIL_COLUMNS} {DUTY_DETAIL_QUERY} \
         WHERE d.user_id = ? AND d.free = 0 AND d.date >= ? \
         ORDER BY d.date, tr.start_time"
    ))
    .bind(&user.id)
    .bind(today)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(duties))
}

/// Duties the actor could grab right now
///
/// GET /api/duties/grabable
pub async fn grabable_duties(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Vec<DutyDetail>>, ApiError> {
    let now = chrono::Local::now().naive_local();
    let duties = roster::grabable_duties(&state.db, &user, now).await?;
    Ok(Json(duties))
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Defaults to the Monday of the current week.
    pub start_date: Option<NaiveDate>,
    pub num_weeks: u32,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: String,
    pub created: u64,
    pub existing: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Materialize duties from templates over a date range (admin only)
///
/// POST /api/duties/generate
pub async fn generate_duties(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if !access::can(&user, Action::GenerateDuties) {
        return Err(ApiError::forbidden(
            "You are not authorized to access this page.",
        ));
    }
    if let Err(e) = validate_num_weeks(request.num_weeks) {
        return Err(ApiError::validation_field("num_weeks", e));
    }

    let start = request
        .start_date
        .unwrap_or_else(|| roster::week_start(chrono::Local::now().date_naive()));
    let (start, end) = roster::generation_range(start, request.num_weeks);

    let stats = DutyGenerator::new(state.db.clone())
        .generate(start, end)
        .await?;

    tracing::info!(
        user = %user.username,
        created = stats.created,
        %start,
        %end,
        "Duties generated via API"
    );

    Ok(Json(GenerateResponse {
        message: "Duties successfully generated!".to_string(),
        created: stats.created,
        existing: stats.existing,
        start_date: start,
        end_date: end,
    }))
}

#[derive(Debug, Deserialize)]
pub struct GrabRequest {
    pub duty_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct GrabResponse {
    pub message: String,
    pub duties: Vec<Duty>,
}

/// Take ownership of a batch of duties, all or nothing
///
/// POST /api/duties/grab
pub async fn grab_duties(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(request): Json<GrabRequest>,
) -> Result<Json<GrabResponse>, ApiError> {
    // Set semantics: duplicate ids collapse
    let duty_ids: BTreeSet<String> = request.duty_ids.into_iter().collect();

    let duties = roster::grab_duties(&state.db, &user, &duty_ids).await?;

    Ok(Json(GrabResponse {
        message: "Duty successfully grabbed!".to_string(),
        duties,
    }))
}

#[derive(Debug, Deserialize)]
pub struct DropRequest {
    pub duty_ids: Vec<String>,
    /// Absent, empty, or "0" means anyone may grab the dropped duties.
    #[serde(default)]
    pub target_user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DropResponse {
    pub message: String,
    pub duties: Vec<DutyDetail>,
}

/// Give up a batch of owned duties, freeing them or proposing a transfer
///
/// POST /api/duties/drop
pub async fn drop_duties(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(request): Json<DropRequest>,
) -> Result<Json<DropResponse>, ApiError> {
    let duty_ids: BTreeSet<String> = request.duty_ids.into_iter().collect();
    let target = match request.target_user_id.as_deref() {
        None | Some("") | Some("0") => DropTarget::Anyone,
        Some(id) => DropTarget::User(id.to_string()),
    };

    let now = chrono::Local::now().naive_local();
    let lead_hours = state.config.duties.drop_lead_hours;

    let outcome = roster::drop_duties(&state.db, &user, &duty_ids, target, now, lead_hours).await?;

    // Fire and forget: delivery failures never affect roster state
    let notifier = state.notifier.clone();
    let duties = outcome.duties.clone();
    let recipients = outcome.recipients;
    tokio::spawn(async move {
        if let Err(e) = notifier.duties_dropped(&duties, &recipients).await {
            tracing::error!(error = %e, "Failed to send duty drop notification");
        }
    });

    Ok(Json(DropResponse {
        message: "Duty successfully dropped!".to_string(),
        duties: outcome.duties,
    }))
}
