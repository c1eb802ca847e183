use std::net::SocketAddr;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use table_backup_guard::backup::ensure_infrastructure;
use table_backup_guard::db::create_pool;
use table_backup_guard::{routes, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "table_backup_guard=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Table Backup Guard...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Environment: {}, Server: {}, Backup schema: {}",
        config.environment,
        config.server_address(),
        config.backup_schema
    );

    if config.admin_secret_key.is_none() {
        tracing::warn!("ADMIN_SECRET_KEY not set, read endpoints are disabled");
    }

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;

    // Backup schema and metadata ledger
    ensure_infrastructure(&pool, &config.backup_schema).await?;
    tracing::info!("Backup infrastructure ready in schema {}", config.backup_schema);

    let addr: SocketAddr = config.server_address().parse()?;
    let state = AppState::new(pool, config);

    let app = routes::router(state).layer(TraceLayer::new_for_http());

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
