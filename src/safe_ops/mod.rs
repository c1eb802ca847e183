//! Guarded destructive operations.
//!
//! Each operation validates its inputs and backup preconditions before any
//! mutating statement runs, then performs the mutation in one transaction.

pub mod frame;
pub mod load;

pub use frame::{ColumnKind, Frame};
pub use load::{ColumnBinding, LoadMode};

use crate::backup::BackupContext;
use crate::db::{self, qualified, validate_identifier};
use crate::error::SafeOpsError;

/// Check that `sql` is a SELECT and strip trailing terminators
pub fn validate_select(sql: &str) -> Result<&str, SafeOpsError> {
    let trimmed = sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    let keyword: String = trimmed
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    if !keyword.eq_ignore_ascii_case("select") {
        return Err(SafeOpsError::InvalidQuery(preview(sql)));
    }

    Ok(trimmed)
}

fn preview(sql: &str) -> String {
    const MAX: usize = 80;
    let sql = sql.trim();
    match sql.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &sql[..idx]),
        None => sql.to_string(),
    }
}

impl BackupContext {
    /// Drop `schema.table` with CASCADE, optionally requiring a backup first
    ///
    /// A missing table is a no-op. When `require_backup` is set and discovery
    /// finds no backup of the table, nothing is executed.
    pub async fn safe_drop_table(
        &self,
        table: &str,
        schema: &str,
        require_backup: bool,
    ) -> Result<(), SafeOpsError> {
        validate_identifier(schema)?;
        validate_identifier(table)?;

        if require_backup {
            let backups = self
                .existing_backups(table)
                .await
                .map_err(|source| SafeOpsError::BackupCheck {
                    schema: schema.to_string(),
                    table: table.to_string(),
                    source,
                })?;

            if backups.is_empty() {
                tracing::warn!(
                    "Refusing to drop {}.{}: no backup in {}",
                    schema,
                    table,
                    self.backup_schema
                );
                return Err(SafeOpsError::BackupRequired {
                    schema: schema.to_string(),
                    table: table.to_string(),
                    backup_schema: self.backup_schema.clone(),
                });
            }
        }

        let exists = db::table_exists(&self.pool, schema, table)
            .await
            .map_err(SafeOpsError::db("check table", schema, table))?;
        if !exists {
            tracing::info!("Table {}.{} does not exist, nothing to drop", schema, table);
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(SafeOpsError::db("begin drop", schema, table))?;
        let sql = format!("DROP TABLE {} CASCADE", qualified(schema, table));
        sqlx::query(&sql)
            .execute(&mut *tx)
            .await
            .map_err(SafeOpsError::db("drop table", schema, table))?;
        tx.commit()
            .await
            .map_err(SafeOpsError::db("commit drop", schema, table))?;

        tracing::info!("Dropped table {}.{}", schema, table);

        Ok(())
    }

    /// `CREATE TABLE schema.table AS <select_sql>`; returns the new row count
    ///
    /// Refuses non-SELECT queries and existing targets without touching the
    /// database state.
    pub async fn safe_create_table_as(
        &self,
        schema: &str,
        table: &str,
        select_sql: &str,
    ) -> Result<i64, SafeOpsError> {
        let select_sql = validate_select(select_sql)?;
        validate_identifier(schema)?;
        validate_identifier(table)?;

        let exists = db::table_exists(&self.pool, schema, table)
            .await
            .map_err(SafeOpsError::db("check table", schema, table))?;
        if exists {
            tracing::warn!("Refusing to create {}.{}: already exists", schema, table);
            return Err(SafeOpsError::AlreadyExists {
                schema: schema.to_string(),
                table: table.to_string(),
            });
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(SafeOpsError::db("begin create", schema, table))?;
        let sql = format!("CREATE TABLE {} AS {}", qualified(schema, table), select_sql);
        sqlx::query(&sql)
            .execute(&mut *tx)
            .await
            .map_err(SafeOpsError::db("create table as", schema, table))?;
        let row_count = db::count_rows(&mut *tx, schema, table)
            .await
            .map_err(SafeOpsError::db("count rows", schema, table))?;
        tx.commit()
            .await
            .map_err(SafeOpsError::db("commit create", schema, table))?;

        tracing::info!("Created {}.{} with {} rows", schema, table, row_count);

        Ok(row_count)
    }

    /// Load `frame` into `schema.table`, backing the table up first on replace
    ///
    /// In replace mode an existing table is backed up (and its old backups
    /// pruned) before anything is written; a failed backup aborts the load.
    /// Returns the number of rows written.
    pub async fn bulk_load_with_backup(
        &self,
        frame: &Frame,
        table: &str,
        schema: &str,
        mode: LoadMode,
    ) -> Result<u64, SafeOpsError> {
        validate_identifier(schema)?;
        validate_identifier(table)?;

        let exists = db::table_exists(&self.pool, schema, table)
            .await
            .map_err(SafeOpsError::db("check table", schema, table))?;

        let bindings = match mode {
            LoadMode::Replace if exists => {
                let backup = self
                    .backup_table_noted(table, schema, Some("before replace load"))
                    .await
                    .map_err(|source| {
                        tracing::error!(
                            "Backup of {}.{} failed, aborting load: {}",
                            schema,
                            table,
                            source
                        );
                        SafeOpsError::BackupFailed {
                            schema: schema.to_string(),
                            table: table.to_string(),
                            source,
                        }
                    })?;
                tracing::info!("Backed up {}.{} as {} before replace", schema, table, backup);
                load::inferred_bindings(frame)
            }
            LoadMode::Append if exists => {
                let existing = db::list_columns(&self.pool, schema, table)
                    .await
                    .map_err(SafeOpsError::db("list columns", schema, table))?;
                load::existing_bindings(frame, &existing).map_err(|missing| {
                    SafeOpsError::ColumnMismatch {
                        schema: schema.to_string(),
                        table: table.to_string(),
                        missing,
                    }
                })?
            }
            _ => load::inferred_bindings(frame),
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(SafeOpsError::db("begin load", schema, table))?;

        if mode == LoadMode::Replace {
            let drop = format!("DROP TABLE IF EXISTS {}", qualified(schema, table));
            sqlx::query(&drop)
                .execute(&mut *tx)
                .await
                .map_err(SafeOpsError::db("drop for replace", schema, table))?;
        }

        let create = load::create_table_sql(schema, table, frame, mode == LoadMode::Append);
        sqlx::query(&create)
            .execute(&mut *tx)
            .await
            .map_err(SafeOpsError::db("create load target", schema, table))?;

        let written = load::insert_rows(&mut *tx, schema, table, frame, &bindings)
            .await
            .map_err(SafeOpsError::db("insert rows", schema, table))?;

        tx.commit()
            .await
            .map_err(SafeOpsError::db("commit load", schema, table))?;

        tracing::info!(
            "Loaded {} rows into {}.{} ({})",
            written,
            schema,
            table,
            mode
        );

        Ok(written)
    }
}
