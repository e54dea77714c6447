use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

use crate::{middleware::guards::User, state::AppState, websocket::session::WsSession};

/// GET /ws
/// Upgrade to the realtime protocol. The caller identity comes from the same header as
/// the REST API; rooms are joined afterwards with a `join` frame.
#[get("/ws")]
pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
    user: User,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(
        user.id,
        state.router.clone(),
        state.config.websocket.clone(),
        state.config.max_ciphertext_bytes,
    );
    ws::start(session, &req, stream)
}
