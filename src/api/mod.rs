mod availabilities;
pub mod auth;
mod duties;
mod error;
mod places;
mod users;
mod validation;

pub use error::{ApiError, ErrorCode};

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/validate", get(auth::validate));

    // Protected API routes
    let api_routes = Router::new()
        // Duties
        .route("/duties", get(duties::list_duties))
        .route("/duties/mine", get(duties::my_duties))
        .route("/duties/grabable", get(duties::grabable_duties))
        .route("/duties/generate", post(duties::generate_duties))
        .route("/duties/grab", post(duties::grab_duties))
        .route("/duties/drop", post(duties::drop_duties))
        // Availability grid
        .route("/availabilities", get(availabilities::my_availabilities))
        .route("/availabilities", put(availabilities::update_availabilities))
        // Places and default assignments
        .route("/places", get(places::list_places))
        .route("/places/:id/assignments", get(places::place_assignments))
        .route("/places/:id/assignments", put(places::update_assignments))
        // User directory
        .route("/users", get(users::list_users))
        // Protected by auth
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
