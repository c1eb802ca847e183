use std::collections::HashSet;

use chrono::Utc;
use sqlx::PgPool;

use crate::backup::infra::ensure_infrastructure;
use crate::backup::naming::resolve_name;
use crate::constants::{MAX_CREATE_CONFLICTS, METADATA_TABLE};
use crate::db::{self, qualified, validate_identifier};
use crate::error::BackupError;
use crate::models::{BackupTableRef, SourceTableRef};

/// SQLSTATEs raised when another session created the same table name first
const DUPLICATE_TABLE: &str = "42P07";
const UNIQUE_VIOLATION: &str = "23505";

/// Whether a failed CREATE means the name was taken by another session
fn is_name_conflict(sqlstate: Option<&str>) -> bool {
    matches!(sqlstate, Some(DUPLICATE_TABLE) | Some(UNIQUE_VIOLATION))
}

enum CopyError {
    /// CREATE lost a race on the chosen name; retry with another one
    NameTaken(sqlx::Error),
    Failed(sqlx::Error),
}

/// Copy `source_schema.table` into `backup_schema` under a fresh backup name
///
/// Returns the backup table name. The copy, the row count and the ledger row
/// are committed together, so a failed copy never leaves a metadata record.
pub async fn create_backup(
    pool: &PgPool,
    source_schema: &str,
    table: &str,
    backup_schema: &str,
) -> Result<String, BackupError> {
    create_backup_with_notes(pool, source_schema, table, backup_schema, None).await
}

/// [`create_backup`] with a free-form note stored in the ledger
pub async fn create_backup_with_notes(
    pool: &PgPool,
    source_schema: &str,
    table: &str,
    backup_schema: &str,
    notes: Option<&str>,
) -> Result<String, BackupError> {
    validate_identifier(source_schema)?;
    validate_identifier(table)?;
    validate_identifier(backup_schema)?;

    let source = SourceTableRef::new(source_schema, table);

    let exists = db::table_exists(pool, source_schema, table)
        .await
        .map_err(BackupError::db("check source table", source_schema, table))?;
    if !exists {
        tracing::warn!("Backup requested for missing table {}", source);
        return Err(BackupError::SourceMissing {
            schema: source_schema.to_string(),
            table: table.to_string(),
        });
    }

    ensure_infrastructure(pool, backup_schema).await?;

    let mut taken: HashSet<String> = db::list_tables(pool, backup_schema)
        .await
        .map_err(BackupError::db("list backups", backup_schema, table))?
        .into_iter()
        .collect();

    let mut conflicts = 0;
    loop {
        let backup_table = resolve_name(table, Utc::now(), &taken)?;

        match copy_and_record(pool, source_schema, table, backup_schema, &backup_table, notes)
            .await
        {
            Ok(row_count) => {
                let target = BackupTableRef {
                    backup_schema: backup_schema.to_string(),
                    backup_table,
                };
                tracing::info!("Backed up {} to {} ({} rows)", source, target, row_count);
                return Ok(target.backup_table);
            }
            Err(CopyError::NameTaken(_)) if conflicts < MAX_CREATE_CONFLICTS => {
                conflicts += 1;
                tracing::warn!(
                    "Backup name {}.{} was taken concurrently, retrying ({}/{})",
                    backup_schema,
                    backup_table,
                    conflicts,
                    MAX_CREATE_CONFLICTS
                );
                taken.insert(backup_table);
            }
            Err(CopyError::NameTaken(e)) | Err(CopyError::Failed(e)) => {
                tracing::error!(
                    "Backup of {} into {}.{} failed: {}",
                    source,
                    backup_schema,
                    backup_table,
                    e
                );
                return Err(BackupError::CopyFailed {
                    schema: source_schema.to_string(),
                    table: table.to_string(),
                    backup_schema: backup_schema.to_string(),
                    backup_table,
                    source: e,
                });
            }
        }
    }
}

async fn copy_and_record(
    pool: &PgPool,
    source_schema: &str,
    table: &str,
    backup_schema: &str,
    backup_table: &str,
    notes: Option<&str>,
) -> Result<i64, CopyError> {
    let mut tx = pool.begin().await.map_err(CopyError::Failed)?;

    let create = format!(
        "CREATE TABLE {} AS TABLE {}",
        qualified(backup_schema, backup_table),
        qualified(source_schema, table)
    );
    if let Err(e) = sqlx::query(&create).execute(&mut *tx).await {
        return Err(if is_name_conflict(db::sqlstate(&e).as_deref()) {
            CopyError::NameTaken(e)
        } else {
            CopyError::Failed(e)
        });
    }

    let row_count = db::count_rows(&mut *tx, backup_schema, backup_table)
        .await
        .map_err(CopyError::Failed)?;

    let insert = format!(
        r#"
        INSERT INTO {} (source_schema, source_table, backup_schema, backup_table, row_count, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
        qualified(backup_schema, METADATA_TABLE)
    );
    sqlx::query(&insert)
        .bind(source_schema)
        .bind(table)
        .bind(backup_schema)
        .bind(backup_table)
        .bind(row_count)
        .bind(notes)
        .execute(&mut *tx)
        .await
        .map_err(CopyError::Failed)?;

    tx.commit().await.map_err(CopyError::Failed)?;

    Ok(row_count)
}
