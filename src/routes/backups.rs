use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::backup::{delete_backup, prune_backups};
use crate::constants::{ERR_EMPTY_TABLE_LIST, ERR_NUL_IN_NAME};
use crate::db::validate_identifier;
use crate::error::{AppError, BackupError, Result};
use crate::models::TableOutcome;
use crate::routes::validate_signed_request;
use crate::security::batch_subject;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct BatchBackupRequest {
    pub tables: Vec<String>,
    /// Source schema; defaults to the configured one
    pub schema: Option<String>,
    /// HMAC over the schema as sent and the table names, NUL-separated
    pub signature: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct BatchBackupResponse {
    pub schema: String,
    pub results: BTreeMap<String, TableOutcome>,
}

/// Signature envelope for requests whose subject is in the path
#[derive(Debug, Deserialize)]
pub struct SignedRequest {
    pub signature: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct PruneResponse {
    pub table: String,
    pub deleted: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteBackupResponse {
    pub backup: String,
    pub deleted: bool,
}

/// Back up a list of tables, best effort
///
/// POST /api/backups
///
/// Per-table failures are reported in the body; the request itself only
/// fails on authentication or malformed input.
pub async fn batch_backup(
    State(state): State<AppState>,
    Json(payload): Json<BatchBackupRequest>,
) -> Result<Json<BatchBackupResponse>> {
    let subject = batch_subject(payload.schema.as_deref(), &payload.tables).ok_or_else(|| {
        AppError::InvalidInput(ERR_NUL_IN_NAME.to_string())
    })?;

    validate_signed_request(
        &subject,
        &payload.signature,
        payload.timestamp,
        &state.config.app_secret_key,
    )?;

    if payload.tables.is_empty() {
        return Err(AppError::InvalidInput(ERR_EMPTY_TABLE_LIST.to_string()));
    }

    let schema = payload
        .schema
        .unwrap_or_else(|| state.config.source_schema.clone());
    validate_identifier(&schema).map_err(BackupError::from)?;

    let results = state.backups.backup_tables(&payload.tables, &schema).await;

    Ok(Json(BatchBackupResponse { schema, results }))
}

/// Prune all but the newest backup of a table
///
/// POST /api/backups/:table/prune
pub async fn prune(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(payload): Json<SignedRequest>,
) -> Result<Json<PruneResponse>> {
    validate_signed_request(
        &table,
        &payload.signature,
        payload.timestamp,
        &state.config.app_secret_key,
    )?;
    validate_identifier(&table).map_err(BackupError::from)?;

    let deleted = prune_backups(&state.backups.pool, &table, &state.backups.backup_schema).await?;

    Ok(Json(PruneResponse { table, deleted }))
}

/// Explicitly delete one backup of a table
///
/// DELETE /api/backups/:table/:backup
pub async fn delete(
    State(state): State<AppState>,
    Path((table, backup)): Path<(String, String)>,
    Json(payload): Json<SignedRequest>,
) -> Result<Json<DeleteBackupResponse>> {
    validate_signed_request(
        &backup,
        &payload.signature,
        payload.timestamp,
        &state.config.app_secret_key,
    )?;

    let deleted = delete_backup(
        &state.backups.pool,
        &table,
        &state.backups.backup_schema,
        &backup,
    )
    .await?;

    Ok(Json(DeleteBackupResponse { backup, deleted }))
}
