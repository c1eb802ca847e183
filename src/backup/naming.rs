use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::constants::{MAX_IDENTIFIER_BYTES, MAX_NAME_ATTEMPTS};
use crate::error::BackupError;
use crate::models::BackupName;

/// Pick a backup table name for `table` that is not in `existing`
///
/// Tries `table_YYYYMMDD_HHMMSS`, then the millisecond variant, then the
/// millisecond variant with a counter starting at 2. Pure: the caller supplies
/// both the clock reading and the names currently in the backup schema.
pub fn resolve_name(
    table: &str,
    now: DateTime<Utc>,
    existing: &HashSet<String>,
) -> Result<String, BackupError> {
    let base = BackupName::base(table, now);
    if !existing.contains(&base) {
        return checked(base);
    }

    let with_millis = BackupName::with_millis(table, now);
    if !existing.contains(&with_millis) {
        tracing::debug!("Backup name {} taken, using {}", base, with_millis);
        return checked(with_millis);
    }

    for counter in 2..MAX_NAME_ATTEMPTS + 2 {
        let candidate = format!("{}_{}", with_millis, counter);
        if !existing.contains(&candidate) {
            tracing::debug!("Backup name {} taken, using {}", with_millis, candidate);
            return checked(candidate);
        }
    }

    Err(BackupError::NameExhausted {
        table: table.to_string(),
        attempts: MAX_NAME_ATTEMPTS,
    })
}

fn checked(name: String) -> Result<String, BackupError> {
    if name.len() > MAX_IDENTIFIER_BYTES {
        return Err(BackupError::NameTooLong {
            name,
            max: MAX_IDENTIFIER_BYTES,
        });
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap() + Duration::milliseconds(42)
    }

    #[test]
    fn test_base_name_when_free() {
        let name = resolve_name("orders", noon(), &HashSet::new()).unwrap();
        assert_eq!(name, "orders_20250101_120000");
    }

    #[test]
    fn test_same_second_gets_millis() {
        let existing: HashSet<String> = ["orders_20250101_120000".to_string()].into();
        let name = resolve_name("orders", noon(), &existing).unwrap();
        assert_eq!(name, "orders_20250101_120000_042");
    }

    #[test]
    fn test_same_millisecond_gets_counter() {
        let mut existing: HashSet<String> = [
            "orders_20250101_120000".to_string(),
            "orders_20250101_120000_042".to_string(),
        ]
        .into();
        let name = resolve_name("orders", noon(), &existing).unwrap();
        assert_eq!(name, "orders_20250101_120000_042_2");

        existing.insert(name);
        let name = resolve_name("orders", noon(), &existing).unwrap();
        assert_eq!(name, "orders_20250101_120000_042_3");
    }

    #[test]
    fn test_two_requests_in_one_second_are_distinct() {
        let mut existing = HashSet::new();
        let first = resolve_name("orders", noon(), &existing).unwrap();
        existing.insert(first.clone());
        let second = resolve_name("orders", noon(), &existing).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_exhaustion_is_an_error() {
        let with_millis = "orders_20250101_120000_042";
        let mut existing: HashSet<String> =
            ["orders_20250101_120000".to_string(), with_millis.to_string()].into();
        for counter in 2..MAX_NAME_ATTEMPTS + 2 {
            existing.insert(format!("{}_{}", with_millis, counter));
        }

        let result = resolve_name("orders", noon(), &existing);
        assert!(matches!(
            result,
            Err(BackupError::NameExhausted { attempts, .. }) if attempts == MAX_NAME_ATTEMPTS
        ));
    }

    #[test]
    fn test_name_too_long() {
        let table = "t".repeat(50);
        let result = resolve_name(&table, noon(), &HashSet::new());
        assert!(matches!(result, Err(BackupError::NameTooLong { .. })));
    }

    #[test]
    fn test_resolved_names_parse_back() {
        let mut existing = HashSet::new();
        for _ in 0..3 {
            let name = resolve_name("orders", noon(), &existing).unwrap();
            let parsed = BackupName::parse("orders", &name).unwrap();
            assert_eq!(parsed.created_at.timestamp(), noon().timestamp());
            existing.insert(name);
        }
    }
}
