use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use sqlx::{PgConnection, Postgres, QueryBuilder};

use crate::constants::MAX_BIND_PARAMS;
use crate::db::{qualified, quote_ident, ColumnInfo};
use crate::error::SafeOpsError;
use crate::safe_ops::frame::{ColumnKind, Frame};

/// How a bulk load treats an existing target table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Drop and recreate the table from the frame (backed up first)
    Replace,
    /// Insert into the table, creating it if missing
    Append,
}

impl FromStr for LoadMode {
    type Err = SafeOpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(LoadMode::Replace),
            "append" => Ok(LoadMode::Append),
            _ => Err(SafeOpsError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::Replace => f.write_str("replace"),
            LoadMode::Append => f.write_str("append"),
        }
    }
}

/// `CREATE TABLE` statement for a frame's inferred columns
pub fn create_table_sql(schema: &str, table: &str, frame: &Frame, if_not_exists: bool) -> String {
    let columns: Vec<String> = frame
        .columns()
        .iter()
        .zip(frame.column_kinds())
        .map(|(name, kind)| format!("{} {}", quote_ident(name), kind.sql_type()))
        .collect();

    format!(
        "CREATE TABLE {}{} ({})",
        if if_not_exists { "IF NOT EXISTS " } else { "" },
        qualified(schema, table),
        columns.join(", ")
    )
}

/// Rows per INSERT so a statement stays under the bind-parameter cap
pub fn rows_per_statement(column_count: usize) -> usize {
    (MAX_BIND_PARAMS / column_count.max(1)).max(1)
}

/// How one frame column is bound in the INSERT
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnBinding {
    /// Native parameter of the inferred kind; the table was created from the frame
    Inferred(ColumnKind),
    /// Text parameter cast to the existing column's type, e.g. `$1::date`
    Cast(String),
}

/// Bindings for a table created from the frame's own inferred kinds
pub fn inferred_bindings(frame: &Frame) -> Vec<ColumnBinding> {
    frame
        .column_kinds()
        .into_iter()
        .map(ColumnBinding::Inferred)
        .collect()
}

/// Bindings that target an existing table's declared column types
///
/// Errs with the frame columns the table does not have.
pub fn existing_bindings(
    frame: &Frame,
    existing: &[ColumnInfo],
) -> Result<Vec<ColumnBinding>, Vec<String>> {
    let mut bindings = Vec::with_capacity(frame.columns().len());
    let mut missing = Vec::new();

    for column in frame.columns() {
        match existing.iter().find(|c| &c.name == column) {
            Some(info) => bindings.push(ColumnBinding::Cast(info.data_type.clone())),
            None => missing.push(column.clone()),
        }
    }

    if missing.is_empty() {
        Ok(bindings)
    } else {
        Err(missing)
    }
}

/// Insert every frame row into `schema.table` on an open connection
pub(crate) async fn insert_rows(
    conn: &mut PgConnection,
    schema: &str,
    table: &str,
    frame: &Frame,
    bindings: &[ColumnBinding],
) -> Result<u64, sqlx::Error> {
    if frame.is_empty() {
        return Ok(0);
    }

    let prefix = insert_prefix(schema, table, frame);

    let mut written = 0;
    for chunk in frame.rows().chunks(rows_per_statement(bindings.len())) {
        let mut builder = insert_statement(&prefix, chunk, bindings);
        written += builder.build().execute(&mut *conn).await?.rows_affected();
    }

    Ok(written)
}

fn insert_prefix(schema: &str, table: &str, frame: &Frame) -> String {
    let column_list: Vec<String> = frame.columns().iter().map(|c| quote_ident(c)).collect();
    format!(
        "INSERT INTO {} ({}) ",
        qualified(schema, table),
        column_list.join(", ")
    )
}

fn insert_statement<'args>(
    prefix: &str,
    rows: &[Vec<Value>],
    bindings: &[ColumnBinding],
) -> QueryBuilder<'args, Postgres> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(prefix);
    builder.push_values(rows, |mut b, row| {
        for (value, binding) in row.iter().zip(bindings) {
            match binding {
                ColumnBinding::Inferred(ColumnKind::Boolean) => {
                    b.push_bind(value.as_bool());
                }
                ColumnBinding::Inferred(ColumnKind::BigInt) => {
                    b.push_bind(value.as_i64());
                }
                ColumnBinding::Inferred(ColumnKind::Double) => {
                    b.push_bind(value.as_f64());
                }
                ColumnBinding::Inferred(ColumnKind::Text) => {
                    b.push_bind(text_value(value));
                }
                ColumnBinding::Inferred(ColumnKind::Json) => {
                    b.push_bind((!value.is_null()).then(|| value.clone()));
                }
                ColumnBinding::Cast(sql_type) => {
                    b.push_bind(text_value(value));
                    b.push_unseparated(format!("::{}", sql_type));
                }
            }
        }
    });
    builder
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
