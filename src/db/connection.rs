use crate::config::DatabaseConfig;
use crate::error::{MigrateError, Result};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;
use tracing::debug;

/// Connect to the target database with a 5-second timeout.
///
/// Connection failures carry a password-masked URL so they can be printed
/// verbatim.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.dbname)
        .username(&config.user)
        .password(&config.password);

    debug!("Connecting to {}", config.masked_url());

    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
        .map_err(|source| MigrateError::Connection {
            url: config.masked_url(),
            source,
        })
}
