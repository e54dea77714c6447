pub mod conversations;
pub mod keys;
pub mod messages;
pub mod wsroute;

use actix_web::{web, HttpResponse};

use crate::error::AppError;

/// Register every endpoint of the service
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Malformed bodies get the same JSON error shape as every other failure
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(err.to_string()).into());

    cfg.app_data(json_config)
        .route("/health", web::get().to(|| async { HttpResponse::Ok().body("OK") }))
        .service(wsroute::ws_handler)
        .service(
            web::scope("/api/v1")
                .service(messages::send_message)
                .service(messages::get_messages)
                .service(conversations::get_conversations)
                .service(keys::publish_key)
                .service(keys::get_public_key),
        );
}
