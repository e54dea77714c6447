use actix_web::{get, post, web, HttpResponse};
use uuid::Uuid;

use crate::{
    error::AppError, middleware::guards::User, models::SendMessageRequest,
    services::MessageService, state::AppState,
};

/// POST /api/v1/messages
/// Store an encrypted envelope from the caller. Live delivery is a separate WebSocket event.
#[post("/messages")]
pub async fn send_message(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let stored = MessageService::send_message(
        state.messages.as_ref(),
        user.id,
        body.into_inner(),
        state.config.max_ciphertext_bytes,
    )
    .await?;

    Ok(HttpResponse::Created().json(stored))
}

/// GET /api/v1/messages/{peer_id}
#[get("/messages/{peer_id}")]
pub async fn get_messages(
    state: web::Data<AppState>,
    user: User,
    peer_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let history =
        MessageService::get_history(state.messages.as_ref(), user.id, peer_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(history))
}
