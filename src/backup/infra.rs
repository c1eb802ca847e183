use sqlx::PgPool;

use crate::constants::METADATA_TABLE;
use crate::db::{self, qualified, quote_ident, validate_identifier};
use crate::error::BackupError;

/// Create the backup schema if it is missing
pub async fn ensure_backup_schema(pool: &PgPool, backup_schema: &str) -> Result<(), BackupError> {
    validate_identifier(backup_schema)?;

    let exists = db::schema_exists(pool, backup_schema)
        .await
        .map_err(BackupError::db("check backup schema", backup_schema, ""))?;
    if exists {
        return Ok(());
    }

    let sql = format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(backup_schema));
    sqlx::query(&sql)
        .execute(pool)
        .await
        .map_err(BackupError::db("create backup schema", backup_schema, ""))?;

    Ok(())
}

/// Create the append-only metadata ledger if it is missing
pub async fn ensure_metadata_table(pool: &PgPool, backup_schema: &str) -> Result<(), BackupError> {
    validate_identifier(backup_schema)?;

    let sql = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id BIGSERIAL PRIMARY KEY,
            source_schema TEXT NOT NULL,
            source_table TEXT NOT NULL,
            backup_schema TEXT NOT NULL,
            backup_table TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            row_count BIGINT NOT NULL,
            notes TEXT
        )
        "#,
        qualified(backup_schema, METADATA_TABLE)
    );
    sqlx::query(&sql)
        .execute(pool)
        .await
        .map_err(BackupError::db(
            "create metadata table",
            backup_schema,
            METADATA_TABLE,
        ))?;

    Ok(())
}

/// Both of the above, in dependency order
pub async fn ensure_infrastructure(pool: &PgPool, backup_schema: &str) -> Result<(), BackupError> {
    ensure_backup_schema(pool, backup_schema).await?;
    ensure_metadata_table(pool, backup_schema).await
}
