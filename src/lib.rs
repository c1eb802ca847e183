//! Table Backup Guard
//!
//! Safety layer for destructive table rewrites in ETL pipelines: every
//! replace-in-place operation can be made contingent on a verified sibling
//! backup in a dedicated schema, with newest-only retention and an
//! append-only metadata ledger.

pub mod backup;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod safe_ops;
pub mod security;

pub use backup::BackupContext;
pub use config::Config;
pub use error::{AppError, BackupError, Result, SafeOpsError};
pub use safe_ops::{Frame, LoadMode};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub backups: BackupContext,
    pub config: Config,
}

impl AppState {
    /// Create a new AppState from a pool and configuration
    pub fn new(pool: sqlx::PgPool, config: Config) -> Self {
        let backups = BackupContext::new(pool, config.backup_schema.clone());
        Self { backups, config }
    }
}
