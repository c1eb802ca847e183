use sqlx::PgPool;

use crate::constants::METADATA_TABLE;
use crate::db::{self, qualified, validate_identifier};
use crate::error::BackupError;
use crate::models::BackupMetadataRecord;

/// Ledger rows for one source table, newest first
///
/// Includes rows whose physical backups have since been pruned. Empty when the
/// ledger has not been created yet.
pub async fn list_backup_history(
    pool: &PgPool,
    backup_schema: &str,
    table: &str,
) -> Result<Vec<BackupMetadataRecord>, BackupError> {
    validate_identifier(backup_schema)?;

    let exists = db::table_exists(pool, backup_schema, METADATA_TABLE)
        .await
        .map_err(BackupError::db("check metadata table", backup_schema, METADATA_TABLE))?;
    if !exists {
        return Ok(Vec::new());
    }

    let sql = format!(
        r#"
        SELECT id, source_schema, source_table, backup_schema, backup_table,
               created_at, row_count, notes
        FROM {}
        WHERE source_table = $1
        ORDER BY created_at DESC, id DESC
        "#,
        qualified(backup_schema, METADATA_TABLE)
    );

    sqlx::query_as::<_, BackupMetadataRecord>(&sql)
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(BackupError::db("read metadata", backup_schema, METADATA_TABLE))
}
