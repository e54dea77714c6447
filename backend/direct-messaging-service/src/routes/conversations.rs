use actix_web::{get, web, HttpResponse};

use crate::{
    error::AppError, middleware::guards::User, services::ConversationService, state::AppState,
};

/// GET /api/v1/conversations
/// Caller's conversations, most recently active first
#[get("/conversations")]
pub async fn get_conversations(
    state: web::Data<AppState>,
    user: User,
) -> Result<HttpResponse, AppError> {
    let views = ConversationService::list_conversation_views(
        state.messages.as_ref(),
        state.users.as_ref(),
        user.id,
    )
    .await?;
    Ok(HttpResponse::Ok().json(views))
}
