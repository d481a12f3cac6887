//! services/api/src/web/middleware.rs
//!
//! Identifies the user a request acts for.

use axum::{extract::Request, http::StatusCode, middleware::Next, response::Response};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Middleware that reads the `x-user-id` header and stores the parsed user id in the
/// request extensions for handlers to use.
///
/// A missing or malformed header returns 400 Bad Request. The header is trusted as-is;
/// authenticating it is the job of whatever sits in front of this service.
pub async fn require_user(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .ok_or(StatusCode::BAD_REQUEST)?;

    req.extensions_mut().insert(user_id);
    Ok(next.run(req).await)
}
