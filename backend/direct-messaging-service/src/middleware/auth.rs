//! Caller identity.
//!
//! Authentication happens upstream (gateway). By the time a request reaches this service
//! the verified user id travels in [`CALLER_ID_HEADER`]; it is trusted as-is.

use crate::error::AppError;
use actix_web::HttpRequest;
use uuid::Uuid;

pub const CALLER_ID_HEADER: &str = "x-user-id";

pub fn caller_id(req: &HttpRequest) -> Result<Uuid, AppError> {
    let raw = req
        .headers()
        .get(CALLER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    Uuid::parse_str(raw.trim()).map_err(|_| {
        tracing::warn!("rejecting request with malformed caller id header");
        AppError::Unauthorized
    })
}
