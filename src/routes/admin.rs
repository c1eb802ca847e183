use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::backup::list_backup_history;
use crate::db::validate_identifier;
use crate::error::{BackupError, Result};
use crate::models::{BackupInfo, BackupMetadataRecord};
use crate::routes::require_admin_key;
use crate::AppState;

/// Query parameters for admin read endpoints
#[derive(Debug, Deserialize)]
pub struct AdminQuery {
    /// Admin secret key for authentication
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct ListBackupsResponse {
    pub table: String,
    pub backup_schema: String,
    pub backups: Vec<BackupInfo>,
}

#[derive(Debug, Serialize)]
pub struct BackupHistoryResponse {
    pub table: String,
    pub records: Vec<BackupMetadataRecord>,
}

/// List physical backups of a table, newest first
///
/// GET /api/backups/:table?key=<admin_secret_key>
pub async fn list_backups(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<AdminQuery>,
) -> Result<Json<ListBackupsResponse>> {
    require_admin_key(&state.config, &params.key)?;
    validate_identifier(&table).map_err(BackupError::from)?;

    let backups = state.backups.existing_backups(&table).await?;

    tracing::info!("Listed {} backups of {}", backups.len(), table);

    Ok(Json(ListBackupsResponse {
        table,
        backup_schema: state.backups.backup_schema.clone(),
        backups,
    }))
}

/// Metadata ledger for a table, including pruned backups
///
/// GET /api/backups/:table/history?key=<admin_secret_key>
pub async fn backup_history(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<AdminQuery>,
) -> Result<Json<BackupHistoryResponse>> {
    require_admin_key(&state.config, &params.key)?;
    validate_identifier(&table).map_err(BackupError::from)?;

    let records =
        list_backup_history(&state.backups.pool, &state.backups.backup_schema, &table).await?;

    Ok(Json(BackupHistoryResponse { table, records }))
}
