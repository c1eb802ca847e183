use std::collections::BTreeMap;

use sqlx::PgPool;

use crate::backup::creator::create_backup_with_notes;
use crate::backup::discovery::get_existing_backups;
use crate::backup::retention::prune_backups_keeping;
use crate::constants::DEFAULT_BACKUP_SCHEMA;
use crate::error::BackupError;
use crate::models::{BackupInfo, TableOutcome};

/// Connection pool plus the backup namespace every operation targets
///
/// Cheap to clone; this is what ETL jobs and the admin server hold instead
/// of a global connection.
#[derive(Clone, Debug)]
pub struct BackupContext {
    pub pool: PgPool,
    pub backup_schema: String,
}

impl BackupContext {
    pub fn new(pool: PgPool, backup_schema: impl Into<String>) -> Self {
        Self {
            pool,
            backup_schema: backup_schema.into(),
        }
    }

    /// Context using the default `backups` namespace
    pub fn with_default_schema(pool: PgPool) -> Self {
        Self::new(pool, DEFAULT_BACKUP_SCHEMA)
    }

    /// Back up `schema.table`, then prune its older backups
    ///
    /// Pruning failures are logged and do not fail the call; the new backup
    /// is never pruned.
    pub async fn backup_table(&self, table: &str, schema: &str) -> Result<String, BackupError> {
        self.backup_table_noted(table, schema, None).await
    }

    pub(crate) async fn backup_table_noted(
        &self,
        table: &str,
        schema: &str,
        notes: Option<&str>,
    ) -> Result<String, BackupError> {
        let backup =
            create_backup_with_notes(&self.pool, schema, table, &self.backup_schema, notes).await?;

        match prune_backups_keeping(&self.pool, table, &self.backup_schema, Some(&backup)).await {
            Ok(deleted) if !deleted.is_empty() => {
                tracing::info!(
                    "Pruned {} old backup(s) of {}.{}",
                    deleted.len(),
                    schema,
                    table
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Pruning after backup of {}.{} failed: {}", schema, table, e);
            }
        }

        Ok(backup)
    }

    /// Back up several tables in order, continuing past failures
    ///
    /// Every distinct requested table gets exactly one entry in the result.
    pub async fn backup_tables<S: AsRef<str>>(
        &self,
        tables: &[S],
        schema: &str,
    ) -> BTreeMap<String, TableOutcome> {
        let mut results = BTreeMap::new();

        for table in tables {
            let table = table.as_ref();
            if results.contains_key(table) {
                tracing::debug!("Skipping duplicate table {} in batch", table);
                continue;
            }

            let outcome = match self.backup_table(table, schema).await {
                Ok(backup) => TableOutcome::BackedUp { backup },
                Err(e) => {
                    tracing::warn!("Batch backup of {}.{} failed: {}", schema, table, e);
                    TableOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.insert(table.to_string(), outcome);
        }

        let failed = results.values().filter(|o| !o.success()).count();
        tracing::info!(
            "Batch backup finished: {} succeeded, {} failed",
            results.len() - failed,
            failed
        );

        results
    }

    /// Discovery against this context's backup namespace
    pub async fn existing_backups(&self, table: &str) -> Result<Vec<BackupInfo>, BackupError> {
        get_existing_backups(&self.pool, table, &self.backup_schema).await
    }
}
