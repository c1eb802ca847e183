//! Store access: pool construction, identifier handling and catalog introspection.
//!
//! Every function takes its executor explicitly. Nothing in the crate holds a
//! global connection.

pub mod ident;
pub mod pool;

pub use ident::{qualified, quote_ident, validate_identifier, IdentifierError};
pub use pool::create_pool;

use sqlx::{PgExecutor, PgPool};

/// A column as reported by `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// Whether a schema (namespace) exists
pub async fn schema_exists(pool: &PgPool, schema: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM information_schema.schemata WHERE schema_name = $1)",
    )
    .bind(schema)
    .fetch_one(pool)
    .await
}

/// Whether a base table exists in the given schema (views are not counted)
pub async fn table_exists<'e, E>(executor: E, schema: &str, table: &str) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM information_schema.tables
            WHERE table_schema = $1
              AND table_name = $2
              AND table_type = 'BASE TABLE'
        )
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_one(executor)
    .await
}

/// Names of every base table in a schema; empty if the schema is missing
pub async fn list_tables(pool: &PgPool, schema: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT table_name::text
        FROM information_schema.tables
        WHERE table_schema = $1
          AND table_type = 'BASE TABLE'
        ORDER BY table_name
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
}

/// Columns of a table in ordinal order
///
/// `data_type` is the `format_type` rendering (`character varying(20)`,
/// `integer[]`, `timestamp with time zone`), so it can be used verbatim as a
/// cast target.
pub async fn list_columns<'e, E>(
    executor: E,
    schema: &str,
    table: &str,
) -> Result<Vec<ColumnInfo>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as(
        r#"
        SELECT a.attname::text AS name,
               format_type(a.atttypid, a.atttypmod) AS data_type
        FROM pg_catalog.pg_attribute a
        JOIN pg_catalog.pg_class c ON c.oid = a.attrelid
        JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
        WHERE n.nspname = $1
          AND c.relname = $2
          AND a.attnum > 0
          AND NOT a.attisdropped
        ORDER BY a.attnum
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(executor)
    .await
}

/// Exact row count of a table
pub async fn count_rows<'e, E>(executor: E, schema: &str, table: &str) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let sql = format!("SELECT COUNT(*) FROM {}", qualified(schema, table));
    sqlx::query_scalar(&sql).fetch_one(executor).await
}

/// Round trip used by the health endpoint
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

/// SQLSTATE of a database error, if the error came from the server
pub fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}
