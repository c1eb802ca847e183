use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{BackupTableRef, SourceTableRef};

/// One row of the append-only backup ledger
///
/// Rows outlive the physical backups they describe; pruning never touches them.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BackupMetadataRecord {
    pub id: i64,
    pub source_schema: String,
    pub source_table: String,
    pub backup_schema: String,
    pub backup_table: String,
    pub created_at: DateTime<Utc>,
    pub row_count: i64,
    pub notes: Option<String>,
}

impl BackupMetadataRecord {
    pub fn source(&self) -> SourceTableRef {
        SourceTableRef::new(&self.source_schema, &self.source_table)
    }

    pub fn backup(&self) -> BackupTableRef {
        BackupTableRef {
            backup_schema: self.backup_schema.clone(),
            backup_table: self.backup_table.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refs_display() {
        let record = BackupMetadataRecord {
            id: 1,
            source_schema: "masterdatabase".to_string(),
            source_table: "orders".to_string(),
            backup_schema: "backups".to_string(),
            backup_table: "orders_20250101_120000".to_string(),
            created_at: Utc::now(),
            row_count: 3,
            notes: None,
        };

        assert_eq!(record.source().to_string(), "masterdatabase.orders");
        assert_eq!(record.backup().to_string(), "backups.orders_20250101_120000");
    }
}
