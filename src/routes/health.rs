use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::db;
use crate::AppState;

/// Health check endpoint
///
/// Returns the health status of the server and database connection.
/// Used by load balancers and schedulers before they kick off ETL runs.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let db_status = match db::ping(&state.backups.pool).await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            "disconnected"
        }
    };

    Json(json!({
        "status": if db_status == "connected" { "healthy" } else { "unhealthy" },
        "database": db_status,
        "backup_schema": state.backups.backup_schema,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
