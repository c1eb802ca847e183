use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::db::validate_identifier;
use crate::error::SafeOpsError;

/// SQL type inferred for a frame column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Boolean,
    BigInt,
    Double,
    Text,
    Json,
}

impl ColumnKind {
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Boolean => "BOOLEAN",
            ColumnKind::BigInt => "BIGINT",
            ColumnKind::Double => "DOUBLE PRECISION",
            ColumnKind::Text => "TEXT",
            ColumnKind::Json => "JSONB",
        }
    }

    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ColumnKind::Boolean),
            Value::Number(n) if n.is_i64() => Some(ColumnKind::BigInt),
            Value::Number(_) => Some(ColumnKind::Double),
            Value::String(_) => Some(ColumnKind::Text),
            Value::Array(_) | Value::Object(_) => Some(ColumnKind::Json),
        }
    }

    fn merge(self, other: Self) -> Self {
        use ColumnKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (BigInt, Double) | (Double, BigInt) => Double,
            _ => Text,
        }
    }
}

/// Rows to bulk-load, column-major names with row-major values
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Frame {
    /// Build a frame from explicit columns; every row must match their count
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self, SafeOpsError> {
        if columns.is_empty() {
            return Err(SafeOpsError::InvalidFrame("frame has no columns".to_string()));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            validate_identifier(column)?;
            if !seen.insert(column.as_str()) {
                return Err(SafeOpsError::InvalidFrame(format!(
                    "duplicate column {:?}",
                    column
                )));
            }
        }

        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(SafeOpsError::InvalidFrame(format!(
                "row {} has {} values, expected {}",
                index,
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    /// Build a frame from JSON objects; missing keys become NULL
    pub fn from_records(records: &[Map<String, Value>]) -> Result<Self, SafeOpsError> {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Per-column SQL type; all-NULL and mixed columns fall back to TEXT
    pub fn column_kinds(&self) -> Vec<ColumnKind> {
        (0..self.columns.len())
            .map(|i| {
                self.rows
                    .iter()
                    .filter_map(|row| ColumnKind::of(&row[i]))
                    .reduce(ColumnKind::merge)
                    .unwrap_or(ColumnKind::Text)
            })
            .collect()
    }
}
