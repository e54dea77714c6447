use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use direct_messaging_service::{
    config, db, error, logging,
    repository::{InMemoryStore, PgStore},
    routes,
    state::AppState,
};
use tracing_actix_web::TracingLogger;

#[actix_web::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);

    let state = match &cfg.database {
        Some(db_cfg) => {
            let pool = db::init_pool(db_cfg)
                .await
                .map_err(|e| error::AppError::StartServer(format!("db: {e}")))?;
            db::run_migrations(&pool)
                .await
                .map_err(|e| error::AppError::StartServer(format!("migrations: {e}")))?;
            AppState::postgres(cfg.clone(), PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, messages are kept in memory only");
            AppState::in_memory(cfg.clone(), InMemoryStore::new())
        }
    };

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting direct-messaging-service");

    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure_routes)
    })
    .bind(&bind_addr)
    .map_err(|e| error::AppError::StartServer(format!("bind: {e}")))?
    .run()
    .await
    .map_err(|e| error::AppError::StartServer(format!("server: {e}")))
}
