use actix_web::{get, put, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::AppError, middleware::guards::User, services::KeyService, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PublishKeyRequest {
    pub public_key_hex: String,
}

/// PUT /api/v1/keys
/// Publish (or replace) the caller's X25519 public key
#[put("/keys")]
pub async fn publish_key(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<PublishKeyRequest>,
) -> Result<HttpResponse, AppError> {
    let published = KeyService::publish(state.keys.as_ref(), user.id, &body.public_key_hex).await?;
    Ok(HttpResponse::Ok().json(published))
}

/// GET /api/v1/keys/{user_id}
#[get("/keys/{user_id}")]
pub async fn get_public_key(
    state: web::Data<AppState>,
    _user: User,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let key = KeyService::fetch(state.keys.as_ref(), user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(key))
}
