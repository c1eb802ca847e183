/// Default namespace holding backup copies and the metadata ledger
pub const DEFAULT_BACKUP_SCHEMA: &str = "backups";

/// Default operational schema that ETL jobs rewrite
pub const DEFAULT_SOURCE_SCHEMA: &str = "masterdatabase";

/// Append-only ledger of backup creation events, lives inside the backup schema
pub const METADATA_TABLE: &str = "backup_metadata";

/// Safety limit for the naming resolver's counter loop
pub const MAX_NAME_ATTEMPTS: u32 = 1000;

/// How many times a CREATE that lost a naming race is retried with a fresh name
pub const MAX_CREATE_CONFLICTS: u32 = 5;

/// PostgreSQL truncates identifiers longer than NAMEDATALEN - 1 bytes
pub const MAX_IDENTIFIER_BYTES: usize = 63;

/// PostgreSQL caps bind parameters per statement at u16::MAX
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Maximum age of a signed admin request timestamp in seconds (5 minutes)
/// Prevents replay attacks
pub const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for timestamp validation failure
pub const ERR_INVALID_TIMESTAMP: &str = "Timestamp too old or in the future";

/// Error message when the table list of a batch request is empty
pub const ERR_EMPTY_TABLE_LIST: &str = "At least one table must be given";

/// Error message when a signed batch carries a NUL in a name
pub const ERR_NUL_IN_NAME: &str = "Table and schema names must not contain NUL";
