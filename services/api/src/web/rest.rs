//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::protocol::{
    AccessResponse, AccessibleDaysResponse, BadgeDto, BadgesResponse, CompleteDayRequest,
    CompletionResponse, ContentDto, CurrentDayResponse, DayBundleResponse, FreezeResponse,
    JournalRequest, OverviewResponse, ProgressResponse, StatusDto, StatusResponse,
};
use crate::web::state::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use challenge_core::{EngineError, PortError};
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        start_handler,
        progress_handler,
        status_handler,
        overview_handler,
        current_day_handler,
        accessible_days_handler,
        day_bundle_handler,
        day_access_handler,
        complete_day_handler,
        journal_handler,
        badges_handler,
        freeze_status_handler,
        use_freeze_handler,
        reset_handler,
    ),
    components(
        schemas(
            AccessResponse,
            AccessibleDaysResponse,
            BadgeDto,
            BadgesResponse,
            CompleteDayRequest,
            CompletionResponse,
            ContentDto,
            CurrentDayResponse,
            DayBundleResponse,
            FreezeResponse,
            JournalRequest,
            OverviewResponse,
            ProgressResponse,
            StatusDto,
            StatusResponse,
        )
    ),
    tags(
        (name = "Challenge API", description = "Endpoints for tracking progress through the daily challenge.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

type HandlerError = (StatusCode, String);

/// Maps an engine failure to a status code. Server-side failures are logged and their
/// details kept out of the response body.
fn engine_failure(action: &str, err: EngineError) -> HandlerError {
    let status = match &err {
        EngineError::InvalidDay { .. } => StatusCode::BAD_REQUEST,
        EngineError::NotStarted
        | EngineError::AlreadyCompleted
        | EngineError::FreezeUnavailable => StatusCode::CONFLICT,
        EngineError::Content(PortError::NotFound(_)) => StatusCode::NOT_FOUND,
        EngineError::Content(_) => StatusCode::BAD_GATEWAY,
        EngineError::Storage(_) | EngineError::MalformedRecord(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    if status.is_server_error() {
        error!("Failed to {}: {:?}", action, err);
        (status, format!("Failed to {}", action))
    } else {
        warn!("Rejected request to {}: {}", action, err);
        (status, err.to_string())
    }
}

//=========================================================================================
// Lifecycle Handlers
//=========================================================================================

/// Start (or restart) the challenge, discarding in-progress work. A completed
/// challenge must be reset first.
#[utoipa::path(
    post,
    path = "/challenge/start",
    responses(
        (status = 201, description = "Challenge started", body = ProgressResponse),
        (status = 409, description = "Challenge already completed; reset first"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn start_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let record = app_state
        .engine_for(user_id)
        .start()
        .await
        .map_err(|e| engine_failure("start challenge", e))?;
    Ok((StatusCode::CREATED, Json(ProgressResponse::from(&record))))
}

/// Fetch the raw progress record.
#[utoipa::path(
    get,
    path = "/challenge/progress",
    responses(
        (status = 200, description = "The stored progress record", body = ProgressResponse),
        (status = 404, description = "The challenge has not been started"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn progress_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<ProgressResponse>, HandlerError> {
    let record = app_state
        .engine_for(user_id)
        .get_progress()
        .await
        .map_err(|e| engine_failure("load progress", e))?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "No challenge in progress".to_string()))?;
    Ok(Json(ProgressResponse::from(&record)))
}

#[utoipa::path(
    get,
    path = "/challenge/status",
    responses(
        (status = 200, description = "Lifecycle status", body = StatusResponse),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn status_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<StatusResponse>, HandlerError> {
    let status = app_state
        .engine_for(user_id)
        .status()
        .await
        .map_err(|e| engine_failure("load status", e))?;
    Ok(Json(StatusResponse {
        status: status.into(),
    }))
}

/// Everything the dashboard needs in one call.
#[utoipa::path(
    get,
    path = "/challenge/overview",
    responses(
        (status = 200, description = "Progress overview", body = OverviewResponse),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn overview_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<OverviewResponse>, HandlerError> {
    let overview = app_state
        .engine_for(user_id)
        .overview()
        .await
        .map_err(|e| engine_failure("load overview", e))?;
    Ok(Json(overview.into()))
}

/// Delete all progress and return to the not-started state.
#[utoipa::path(
    delete,
    path = "/challenge",
    responses(
        (status = 204, description = "Progress deleted"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn reset_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .engine_for(user_id)
        .reset()
        .await
        .map_err(|e| engine_failure("reset challenge", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Day Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/challenge/current-day",
    responses(
        (status = 200, description = "The day calendar time has reached", body = CurrentDayResponse),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn current_day_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<CurrentDayResponse>, HandlerError> {
    let engine = app_state.engine_for(user_id);
    let current_day = engine
        .current_day()
        .await
        .map_err(|e| engine_failure("load current day", e))?;
    Ok(Json(CurrentDayResponse {
        current_day,
        total_days: engine.program().total_days(),
    }))
}

#[utoipa::path(
    get,
    path = "/challenge/days/accessible",
    responses(
        (status = 200, description = "Every day the user may open, ascending", body = AccessibleDaysResponse),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn accessible_days_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<AccessibleDaysResponse>, HandlerError> {
    let days = app_state
        .engine_for(user_id)
        .accessible_days()
        .await
        .map_err(|e| engine_failure("load accessible days", e))?;
    Ok(Json(AccessibleDaysResponse { days }))
}

/// Fetch a day's descriptor, hydrated content and the user's progress on it.
#[utoipa::path(
    get,
    path = "/challenge/days/{day}",
    responses(
        (status = 200, description = "The day bundle", body = DayBundleResponse),
        (status = 400, description = "Day outside the program"),
        (status = 404, description = "Referenced content is missing"),
        (status = 502, description = "Content provider failed"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("day" = u32, Path, description = "1-based program day."),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn day_bundle_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(day): Path<u32>,
) -> Result<Json<DayBundleResponse>, HandlerError> {
    let bundle = app_state
        .engine_for(user_id)
        .day_bundle(day, app_state.content.as_ref())
        .await
        .map_err(|e| engine_failure("assemble day", e))?;
    Ok(Json(bundle.into()))
}

#[utoipa::path(
    get,
    path = "/challenge/days/{day}/access",
    responses(
        (status = 200, description = "Whether the day may be opened", body = AccessResponse),
        (status = 400, description = "Day outside the program"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("day" = u32, Path, description = "1-based program day."),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn day_access_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(day): Path<u32>,
) -> Result<Json<AccessResponse>, HandlerError> {
    let accessible = app_state
        .engine_for(user_id)
        .is_day_accessible(day)
        .await
        .map_err(|e| engine_failure("check day access", e))?;
    Ok(Json(AccessResponse { day, accessible }))
}

/// Mark a day as completed, optionally with a reflection.
///
/// Completing a day twice is safe; the second call only updates the reflection.
#[utoipa::path(
    post,
    path = "/challenge/days/{day}/complete",
    request_body(content = CompleteDayRequest, description = "Optional reflection. The body may be empty."),
    responses(
        (status = 200, description = "Updated progress and what the completion earned", body = CompletionResponse),
        (status = 400, description = "Day outside the program"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("day" = u32, Path, description = "1-based program day."),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn complete_day_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(day): Path<u32>,
    body: Bytes,
) -> Result<Json<CompletionResponse>, HandlerError> {
    let request: CompleteDayRequest = if body.is_empty() {
        CompleteDayRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid completion payload: {}", e),
            )
        })?
    };
    let journal = request.journal;
    let outcome = app_state
        .engine_for(user_id)
        .complete_day(day, journal)
        .await
        .map_err(|e| engine_failure("complete day", e))?;
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    put,
    path = "/challenge/days/{day}/journal",
    request_body = JournalRequest,
    responses(
        (status = 200, description = "Updated progress", body = ProgressResponse),
        (status = 400, description = "Day outside the program"),
        (status = 409, description = "The challenge has not been started"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("day" = u32, Path, description = "1-based program day."),
        ("x-user-id" = Uuid, Header, description = "The unique ID of the user.")
    )
)]
pub async fn journal_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(day): Path<u32>,
    Json(body): Json<JournalRequest>,
) -> Result<Json<ProgressResponse>, HandlerError> {
    let record = app_state
        .engine_for(user_id)
        .save_journal_entry(day, body.text)
        .await
        .map_err(|e| engine_failure("save journal entry", e))?;
    Ok(Json(ProgressResponse::from(&record)))
}

//=========================================================================================
// Badge and Freeze Handlers
//=========================================================================================

#[utoipa::path(
    get,
    path = "/challenge/badges",
    responses(
        (status = 200, description = "Badges earned so far, in day order", body = BadgesResponse),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn badges_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<BadgesResponse>, HandlerError> {
    let badges = app_state
        .engine_for(user_id)
        .earned_badges()
        .await
        .map_err(|e| engine_failure("load badges", e))?;
    Ok(Json(BadgesResponse {
        badges: badges.into_iter().map(BadgeDto::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/challenge/freeze",
    responses(
        (status = 200, description = "Whether the streak freeze is still available", body = FreezeResponse),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn freeze_status_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<FreezeResponse>, HandlerError> {
    let can_use_freeze = app_state
        .engine_for(user_id)
        .can_use_freeze()
        .await
        .map_err(|e| engine_failure("check streak freeze", e))?;
    Ok(Json(FreezeResponse { can_use_freeze }))
}

/// Spend the one-time streak freeze.
#[utoipa::path(
    post,
    path = "/challenge/freeze",
    responses(
        (status = 204, description = "Freeze used"),
        (status = 409, description = "Not started, or the freeze was already used"),
        (status = 500, description = "Internal server error")
    ),
    params(("x-user-id" = Uuid, Header, description = "The unique ID of the user."))
)]
pub async fn use_freeze_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<StatusCode, HandlerError> {
    app_state
        .engine_for(user_id)
        .use_freeze()
        .await
        .map_err(|e| engine_failure("use streak freeze", e))?;
    Ok(StatusCode::NO_CONTENT)
}
