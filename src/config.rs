use std::env;

use crate::constants::{DEFAULT_BACKUP_SCHEMA, DEFAULT_SOURCE_SCHEMA};
use crate::db::validate_identifier;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Namespace holding backup tables and the metadata ledger
    pub backup_schema: String,
    /// Schema assumed when a request does not name one
    pub source_schema: String,
    pub environment: String,
    /// HMAC key for mutating admin requests
    pub app_secret_key: String,
    /// Key for read endpoints; they are disabled when unset
    pub admin_secret_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists (development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let server_host = var("SERVER_HOST", "0.0.0.0");
        let server_port = var("SERVER_PORT", "8080")
            .parse()
            .map_err(|_| "Invalid SERVER_PORT")?;

        let database_url = lookup("DATABASE_URL").ok_or("DATABASE_URL must be set")?;

        let db_max_connections = var("DB_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|_| "Invalid DB_MAX_CONNECTIONS")?;

        let backup_schema = var("BACKUP_SCHEMA", DEFAULT_BACKUP_SCHEMA);
        validate_identifier(&backup_schema).map_err(|e| format!("Invalid BACKUP_SCHEMA: {}", e))?;

        let source_schema = var("SOURCE_SCHEMA", DEFAULT_SOURCE_SCHEMA);
        validate_identifier(&source_schema).map_err(|e| format!("Invalid SOURCE_SCHEMA: {}", e))?;

        if backup_schema == source_schema {
            return Err("BACKUP_SCHEMA must differ from SOURCE_SCHEMA".to_string());
        }

        let environment = var("ENVIRONMENT", "development");

        let app_secret_key = lookup("APP_SECRET_KEY")
            .ok_or("APP_SECRET_KEY must be set for HMAC verification")?;

        let admin_secret_key = lookup("ADMIN_SECRET_KEY").filter(|k| !k.is_empty());

        Ok(Config {
            server_host,
            server_port,
            database_url,
            db_max_connections,
            backup_schema,
            source_schema,
            environment,
            app_secret_key,
            admin_secret_key,
        })
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
