use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Table a caller wants to protect (owned by the ETL side, read-only here)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceTableRef {
    pub schema: String,
    pub table: String,
}

impl SourceTableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for SourceTableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// Physical backup copy living in the backup namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BackupTableRef {
    pub backup_schema: String,
    pub backup_table: String,
}

impl fmt::Display for BackupTableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.backup_schema, self.backup_table)
    }
}

/// Decoded `<table>_<YYYYMMDD>_<HHMMSS>[_<mmm>][_<N>]` backup name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupName {
    pub table: String,
    /// Second-precision timestamp with the millisecond suffix folded in
    pub created_at: DateTime<Utc>,
    pub millis: Option<u32>,
    pub counter: Option<u32>,
}

impl BackupName {
    /// Base name for a table at a given instant, without any suffix
    pub fn base(table: &str, at: DateTime<Utc>) -> String {
        format!("{}_{}", table, at.format("%Y%m%d_%H%M%S"))
    }

    /// Base name with the three-digit millisecond suffix
    pub fn with_millis(table: &str, at: DateTime<Utc>) -> String {
        // subsec millis exceed 999 during a leap second
        let millis = (at.nanosecond() / 1_000_000).min(999);
        format!("{}_{:03}", Self::base(table, at), millis)
    }

    /// Decode `candidate` as a backup of `table`
    ///
    /// Returns `None` for anything that does not carry a well-formed timestamp
    /// suffix; such tables are not treated as backups even if the prefix matches.
    pub fn parse(table: &str, candidate: &str) -> Option<Self> {
        let rest = candidate.strip_prefix(table)?.strip_prefix('_')?;
        let mut parts = rest.split('_');

        let date = parts.next()?;
        let time = parts.next()?;
        if date.len() != 8 || time.len() != 6 || !all_digits(date) || !all_digits(time) {
            return None;
        }

        let date = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
        let time = NaiveTime::parse_from_str(time, "%H%M%S").ok()?;

        let extra: Vec<&str> = parts.collect();
        let (millis, counter) = match extra.as_slice() {
            [] => (None, None),
            [one] if one.len() == 3 && all_digits(one) => (Some(one.parse().ok()?), None),
            [one] => (None, Some(parse_counter(one)?)),
            [ms, n] if ms.len() == 3 && all_digits(ms) => {
                (Some(ms.parse().ok()?), Some(parse_counter(n)?))
            }
            _ => return None,
        };

        let mut created_at = date.and_time(time).and_utc();
        if let Some(ms) = millis {
            created_at += Duration::milliseconds(i64::from(ms));
        }

        Some(Self {
            table: table.to_string(),
            created_at,
            millis,
            counter,
        })
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_counter(s: &str) -> Option<u32> {
    if !all_digits(s) {
        return None;
    }
    s.parse().ok().filter(|n| *n >= 2)
}

/// A discovered backup, as returned by discovery (newest first)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupInfo {
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<u32>,
}

impl BackupInfo {
    /// Newest-first ordering; same-instant entries fall back to counter then name
    pub fn newest_first(a: &Self, b: &Self) -> Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.counter.unwrap_or(1).cmp(&a.counter.unwrap_or(1)))
            .then_with(|| b.name.cmp(&a.name))
    }
}
