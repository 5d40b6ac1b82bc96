//! User directory, used when picking a transfer target.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::db::{User, UserResponse};
use crate::AppState;

use super::error::ApiError;

/// The other users, for choosing who to offer a duty to
///
/// GET /api/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users: Vec<User> =
        sqlx::query_as("SELECT * FROM users WHERE id != ? ORDER BY username")
            .bind(&user.id)
            .fetch_all(&state.db)
            .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}
