use std::time::Duration;

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::{Config as PgConfig, NoTls};
use tracing::{error, info};

use crate::config::DatabaseConfig;
use crate::repository::StoreError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const MIGRATIONS: &[(&str, &str)] = &[(
    "0001_direct_messages",
    include_str!("../migrations/0001_direct_messages.sql"),
)];

/// Build a deadpool-postgres pool and verify one connection
pub async fn init_pool(config: &DatabaseConfig) -> Result<Pool, StoreError> {
    let pg_config: PgConfig = config.url.parse()?;

    let mgr_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, mgr_config);
    let pool = Pool::builder(mgr)
        .max_size(config.max_connections)
        .build()
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

    match tokio::time::timeout(CONNECT_TIMEOUT, async {
        let client = pool.get().await?;
        client.simple_query("SELECT 1").await?;
        Ok::<(), StoreError>(())
    })
    .await
    {
        Ok(Ok(())) => {
            info!(
                max_connections = config.max_connections,
                "Database pool created and verified"
            );
            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Database connection verification failed");
            Err(e)
        }
        Err(_) => {
            error!(
                timeout_secs = CONNECT_TIMEOUT.as_secs(),
                "Database connection verification timeout"
            );
            Err(StoreError::Unavailable("connection verification timed out".into()))
        }
    }
}

/// Apply the embedded schema. Every statement is idempotent.
pub async fn run_migrations(pool: &Pool) -> Result<(), StoreError> {
    let client = pool.get().await?;
    for (name, sql) in MIGRATIONS {
        client.batch_execute(sql).await?;
        info!(migration = %name, "Migration applied");
    }
    Ok(())
}
