pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

pub use middleware::require_user;
pub use state::AppState;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use rest::{
    accessible_days_handler, badges_handler, complete_day_handler, current_day_handler,
    day_access_handler, day_bundle_handler, freeze_status_handler, journal_handler,
    overview_handler, progress_handler, reset_handler, start_handler, status_handler,
    use_freeze_handler,
};

/// Builds the challenge API routes. Every route requires the `x-user-id` header.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/challenge", delete(reset_handler))
        .route("/challenge/start", post(start_handler))
        .route("/challenge/progress", get(progress_handler))
        .route("/challenge/status", get(status_handler))
        .route("/challenge/overview", get(overview_handler))
        .route("/challenge/current-day", get(current_day_handler))
        .route("/challenge/days/accessible", get(accessible_days_handler))
        .route("/challenge/days/{day}", get(day_bundle_handler))
        .route("/challenge/days/{day}/access", get(day_access_handler))
        .route("/challenge/days/{day}/complete", post(complete_day_handler))
        .route("/challenge/days/{day}/journal", put(journal_handler))
        .route("/challenge/badges", get(badges_handler))
        .route(
            "/challenge/freeze",
            get(freeze_status_handler).post(use_freeze_handler),
        )
        .layer(axum_middleware::from_fn(require_user))
        .with_state(app_state)
}
