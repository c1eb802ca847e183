use sqlx::PgPool;

use crate::backup::discovery::get_existing_backups;
use crate::db::{self, qualified, validate_identifier};
use crate::error::BackupError;
use crate::models::{BackupInfo, BackupName};

/// Drop every backup of `table` except the newest
///
/// Each drop is its own transaction. A failed drop is logged and skipped; the
/// returned list holds only the names that were actually removed.
pub async fn prune_backups(
    pool: &PgPool,
    table: &str,
    backup_schema: &str,
) -> Result<Vec<String>, BackupError> {
    prune_backups_keeping(pool, table, backup_schema, None).await
}

/// [`prune_backups`] that keeps `keep` instead of the newest when it is present
pub async fn prune_backups_keeping(
    pool: &PgPool,
    table: &str,
    backup_schema: &str,
    keep: Option<&str>,
) -> Result<Vec<String>, BackupError> {
    let backups = get_existing_backups(pool, table, backup_schema).await?;
    let doomed = select_for_pruning(&backups, keep);
    if doomed.is_empty() {
        return Ok(Vec::new());
    }

    let mut deleted = Vec::with_capacity(doomed.len());
    for name in doomed {
        match drop_backup_table(pool, backup_schema, name).await {
            Ok(()) => {
                tracing::info!("Pruned backup {}.{}", backup_schema, name);
                deleted.push(name.to_string());
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to prune backup {}.{}: {}",
                    backup_schema,
                    name,
                    e
                );
            }
        }
    }

    Ok(deleted)
}

/// Names to drop from a newest-first list, leaving exactly one survivor
pub fn select_for_pruning<'a>(backups: &'a [BackupInfo], keep: Option<&str>) -> Vec<&'a str> {
    if backups.len() <= 1 {
        return Vec::new();
    }

    let survivor = keep
        .filter(|k| backups.iter().any(|b| b.name == *k))
        .unwrap_or(backups[0].name.as_str());

    backups
        .iter()
        .map(|b| b.name.as_str())
        .filter(|name| *name != survivor)
        .collect()
}

/// Explicitly remove one backup of `table`
///
/// Only names that decode as backups of `table` are accepted, so this cannot
/// be pointed at the metadata ledger or unrelated tables. Returns whether a
/// table was dropped.
pub async fn delete_backup(
    pool: &PgPool,
    table: &str,
    backup_schema: &str,
    backup_name: &str,
) -> Result<bool, BackupError> {
    validate_identifier(backup_schema)?;
    validate_identifier(backup_name)?;

    if BackupName::parse(table, backup_name).is_none() {
        return Err(BackupError::NotABackup {
            backup_schema: backup_schema.to_string(),
            name: backup_name.to_string(),
        });
    }

    let exists = db::table_exists(pool, backup_schema, backup_name)
        .await
        .map_err(BackupError::db("check backup", backup_schema, backup_name))?;
    if !exists {
        return Ok(false);
    }

    drop_backup_table(pool, backup_schema, backup_name)
        .await
        .map_err(BackupError::db("drop backup", backup_schema, backup_name))?;

    tracing::info!("Deleted backup {}.{}", backup_schema, backup_name);

    Ok(true)
}

async fn drop_backup_table(pool: &PgPool, backup_schema: &str, name: &str) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    let sql = format!("DROP TABLE IF EXISTS {}", qualified(backup_schema, name));
    sqlx::query(&sql).execute(&mut *tx).await?;
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::discovery::backups_of;

    fn catalog() -> Vec<BackupInfo> {
        backups_of(
            "orders",
            vec![
                "orders_20250101_120000".to_string(),
                "orders_20250102_120000".to_string(),
                "orders_20250103_120000".to_string(),
            ],
        )
    }

    #[test]
    fn test_nothing_to_prune() {
        assert!(select_for_pruning(&[], None).is_empty());
        let single = backups_of("orders", vec!["orders_20250101_120000".to_string()]);
        assert!(select_for_pruning(&single, None).is_empty());
    }

    #[test]
    fn test_keeps_newest() {
        let backups = catalog();
        let doomed = select_for_pruning(&backups, None);
        assert_eq!(
            doomed,
            vec!["orders_20250102_120000", "orders_20250101_120000"]
        );
    }

    #[test]
    fn test_keeps_requested_backup() {
        let backups = catalog();
        let doomed = select_for_pruning(&backups, Some("orders_20250102_120000"));
        assert_eq!(
            doomed,
            vec!["orders_20250103_120000", "orders_20250101_120000"]
        );
    }

    #[test]
    fn test_unknown_keep_falls_back_to_newest() {
        let backups = catalog();
        let doomed = select_for_pruning(&backups, Some("orders_20240101_000000"));
        assert!(!doomed.contains(&"orders_20250103_120000"));
        assert_eq!(doomed.len(), 2);
    }
}
