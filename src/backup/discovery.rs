use sqlx::PgPool;

use crate::db;
use crate::error::BackupError;
use crate::models::{BackupInfo, BackupName};

/// Backups of `table` physically present in `backup_schema`, newest first
///
/// Derived from the catalog, not the metadata ledger. A missing schema yields
/// an empty list.
pub async fn get_existing_backups(
    pool: &PgPool,
    table: &str,
    backup_schema: &str,
) -> Result<Vec<BackupInfo>, BackupError> {
    let names = db::list_tables(pool, backup_schema)
        .await
        .map_err(BackupError::db("list backups", backup_schema, table))?;

    Ok(backups_of(table, names))
}

/// Filter catalog names down to parseable backups of `table` and sort them
pub fn backups_of(table: &str, names: impl IntoIterator<Item = String>) -> Vec<BackupInfo> {
    let mut backups: Vec<BackupInfo> = names
        .into_iter()
        .filter_map(|name| {
            let parsed = BackupName::parse(table, &name)?;
            Some(BackupInfo {
                name,
                created_at: parsed.created_at,
                counter: parsed.counter,
            })
        })
        .collect();

    backups.sort_by(BackupInfo::newest_first);
    backups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_backups_of_filters_and_sorts() {
        let catalog = names(&[
            "backup_metadata",
            "orders_20250101_120000",
            "orders_archive_20250301_000000",
            "orders_20250201_090000_250",
            "orders_20250201_090000",
            "orders_copy",
            "customers_20250401_000000",
        ]);

        let backups = backups_of("orders", catalog);
        let found: Vec<&str> = backups.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(
            found,
            vec![
                "orders_20250201_090000_250",
                "orders_20250201_090000",
                "orders_20250101_120000",
            ]
        );
    }

    #[test]
    fn test_backups_of_empty() {
        assert!(backups_of("orders", Vec::new()).is_empty());
        assert!(backups_of("orders", names(&["orders", "orders_x"])).is_empty());
    }

    #[test]
    fn test_order_is_non_increasing() {
        let catalog = names(&[
            "t_20240101_000000",
            "t_20251231_235959_999",
            "t_20250615_120000_001_2",
            "t_20250615_120000_001",
            "t_20250615_120000",
        ]);
        let backups = backups_of("t", catalog);
        assert_eq!(backups.len(), 5);
        assert!(backups.windows(2).all(|w| w[0].created_at >= w[1].created_at));
        assert_eq!(backups[0].name, "t_20251231_235959_999");
    }
}
