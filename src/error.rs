use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::IdentifierError;

/// Failures of the backup lifecycle (create, discover, prune, cleanup)
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("source table does not exist: {schema}.{table}")]
    SourceMissing { schema: String, table: String },

    #[error("could not generate a unique backup name for {table} after {attempts} attempts")]
    NameExhausted { table: String, attempts: u32 },

    #[error("backup name {name} is longer than the {max}-byte identifier limit")]
    NameTooLong { name: String, max: usize },

    #[error("{name} is not a backup of any table in {backup_schema}")]
    NotABackup { backup_schema: String, name: String },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("failed to copy {schema}.{table} into {backup_schema}.{backup_table}: {source}")]
    CopyFailed {
        schema: String,
        table: String,
        backup_schema: String,
        backup_table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("database error during {operation} on {schema}.{table}: {source}")]
    Database {
        operation: &'static str,
        schema: String,
        table: String,
        #[source]
        source: sqlx::Error,
    },
}

impl BackupError {
    pub(crate) fn db(operation: &'static str, schema: &str, table: &str) -> impl FnOnce(sqlx::Error) -> Self {
        let schema = schema.to_string();
        let table = table.to_string();
        move |source| BackupError::Database {
            operation,
            schema,
            table,
            source,
        }
    }
}

/// Failures of the guarded destructive operations
#[derive(Error, Debug)]
pub enum SafeOpsError {
    #[error("refusing to drop {schema}.{table}: no backup exists in {backup_schema}")]
    BackupRequired {
        schema: String,
        table: String,
        backup_schema: String,
    },

    #[error("table {schema}.{table} already exists")]
    AlreadyExists { schema: String, table: String },

    #[error("query must be a SELECT statement: {0}")]
    InvalidQuery(String),

    #[error("unknown load mode {0:?}, expected \"replace\" or \"append\"")]
    InvalidMode(String),

    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("columns {missing:?} do not exist in {schema}.{table}")]
    ColumnMismatch {
        schema: String,
        table: String,
        missing: Vec<String>,
    },

    #[error("could not check backups of {schema}.{table}: {source}")]
    BackupCheck {
        schema: String,
        table: String,
        #[source]
        source: BackupError,
    },

    #[error("backup of {schema}.{table} failed, load aborted: {source}")]
    BackupFailed {
        schema: String,
        table: String,
        #[source]
        source: BackupError,
    },

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] IdentifierError),

    #[error("database error during {operation} on {schema}.{table}: {source}")]
    Database {
        operation: &'static str,
        schema: String,
        table: String,
        #[source]
        source: sqlx::Error,
    },
}

impl SafeOpsError {
    pub(crate) fn db(operation: &'static str, schema: &str, table: &str) -> impl FnOnce(sqlx::Error) -> Self {
        let schema = schema.to_string();
        let table = table.to_string();
        move |source| SafeOpsError::Database {
            operation,
            schema,
            table,
            source,
        }
    }
}

/// Admin server error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),

    #[error("Safe operation error: {0}")]
    SafeOps(#[from] SafeOpsError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Unauthorized")]
    Unauthorized,
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_message) = match self {
            AppError::Backup(BackupError::SourceMissing { .. }) => {
                (StatusCode::NOT_FOUND, message)
            }
            AppError::Backup(
                BackupError::InvalidIdentifier(_)
                | BackupError::NotABackup { .. }
                | BackupError::NameTooLong { .. },
            ) => (StatusCode::BAD_REQUEST, message),
            AppError::Backup(ref e) => {
                tracing::error!("Backup error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::SafeOps(SafeOpsError::BackupRequired { .. })
            | AppError::SafeOps(SafeOpsError::AlreadyExists { .. }) => {
                (StatusCode::CONFLICT, message)
            }
            AppError::SafeOps(
                SafeOpsError::InvalidQuery(_)
                | SafeOpsError::InvalidMode(_)
                | SafeOpsError::InvalidFrame(_)
                | SafeOpsError::ColumnMismatch { .. }
                | SafeOpsError::InvalidIdentifier(_),
            ) => (StatusCode::BAD_REQUEST, message),
            AppError::SafeOps(ref e) => {
                tracing::error!("Safe operation error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidSignature => (
                StatusCode::UNAUTHORIZED,
                "Invalid signature".to_string(),
            ),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Result type alias for admin handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_error_carries_context() {
        let err = BackupError::SourceMissing {
            schema: "masterdatabase".to_string(),
            table: "orders".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("source table does not exist"));
        assert!(msg.contains("masterdatabase.orders"));
    }

    #[test]
    fn test_status_mapping() {
        let missing = AppError::from(BackupError::SourceMissing {
            schema: "s".to_string(),
            table: "t".to_string(),
        });
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let required = AppError::from(SafeOpsError::BackupRequired {
            schema: "s".to_string(),
            table: "t".to_string(),
            backup_schema: "backups".to_string(),
        });
        assert_eq!(required.into_response().status(), StatusCode::CONFLICT);

        let bad_query = AppError::from(SafeOpsError::InvalidQuery("DELETE".to_string()));
        assert_eq!(bad_query.into_response().status(), StatusCode::BAD_REQUEST);

        let internal = AppError::from(BackupError::Database {
            operation: "list backups",
            schema: "backups".to_string(),
            table: "t".to_string(),
            source: sqlx::Error::PoolTimedOut,
        });
        assert_eq!(
            internal.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
