use crate::constants::TRACKING_TABLE;
use crate::error::{MigrateError, Result};
use sqlx::{PgConnection, PgPool, Row};

/// Idempotently create the ledger table.
///
/// Safe to run on every invocation; every engine operation calls this before
/// touching the ledger.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id SERIAL PRIMARY KEY,
            version VARCHAR(255) UNIQUE NOT NULL,
            applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
        TRACKING_TABLE
    ))
    .execute(pool)
    .await
    .map_err(|source| MigrateError::Execution {
        script: TRACKING_TABLE.to_string(),
        source,
    })?;

    Ok(())
}

/// All applied versions, ascending by version.
///
/// Ordering is by version string, not apply timestamp, so it matches the
/// script store's ordering.
pub async fn applied(pool: &PgPool) -> Result<Vec<String>> {
    let rows = sqlx::query(&format!(
        "SELECT version FROM {} ORDER BY version",
        TRACKING_TABLE
    ))
    .fetch_all(pool)
    .await
    .map_err(|source| MigrateError::Execution {
        script: TRACKING_TABLE.to_string(),
        source,
    })?;

    Ok(rows.iter().map(|row| row.get("version")).collect())
}

/// Applied versions with their timestamps, for status reporting.
pub async fn applied_entries(pool: &PgPool) -> Result<Vec<(String, String)>> {
    sqlx::query_as(&format!(
        "SELECT version, applied_at::TEXT FROM {} ORDER BY version",
        TRACKING_TABLE
    ))
    .fetch_all(pool)
    .await
    .map_err(|source| MigrateError::Execution {
        script: TRACKING_TABLE.to_string(),
        source,
    })
}

/// Record a version as applied, inside the caller's transaction.
///
/// A duplicate insert surfaces as `LedgerConflict`: the version was already
/// applied and must not run twice.
pub async fn record(conn: &mut PgConnection, version: &str) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO {} (version) VALUES ($1)",
        TRACKING_TABLE
    ))
    .bind(version)
    .execute(conn)
    .await
    .map_err(|err| MigrateError::from_sqlx(version, err))?;

    Ok(())
}

/// Remove a version from the ledger, inside the caller's transaction.
/// Deleting an absent version is a no-op.
pub async fn forget(conn: &mut PgConnection, version: &str) -> Result<()> {
    sqlx::query(&format!(
        "DELETE FROM {} WHERE version = $1",
        TRACKING_TABLE
    ))
    .bind(version)
    .execute(conn)
    .await
    .map_err(|source| MigrateError::Execution {
        script: version.to_string(),
        source,
    })?;

    Ok(())
}
