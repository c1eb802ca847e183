pub mod admin;
pub mod backups;
pub mod health;
pub mod validation;

use axum::{
    routing::{delete, get, post},
    Router,
};

pub use admin::{backup_history, list_backups};
pub use backups::{batch_backup, prune};
pub use health::health_check;
pub use validation::{require_admin_key, validate_signed_request};

use crate::AppState;

/// Admin router with every endpoint mounted
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/backups", post(batch_backup))
        .route("/api/backups/:table", get(list_backups))
        .route("/api/backups/:table/history", get(backup_history))
        .route("/api/backups/:table/prune", post(prune))
        .route("/api/backups/:table/:backup", delete(backups::delete))
        .with_state(state)
}
