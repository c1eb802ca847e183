//! Backup lifecycle: naming, store infrastructure, creation, discovery,
//! retention and orchestration.
//!
//! Backups are sibling tables in a dedicated schema. The physical tables are
//! the source of truth; the metadata ledger is history only.

pub mod creator;
pub mod discovery;
pub mod history;
pub mod infra;
pub mod naming;
pub mod orchestrator;
pub mod retention;

pub use creator::{create_backup, create_backup_with_notes};
pub use discovery::{backups_of, get_existing_backups};
pub use history::list_backup_history;
pub use infra::{ensure_backup_schema, ensure_infrastructure, ensure_metadata_table};
pub use naming::resolve_name;
pub use orchestrator::BackupContext;
pub use retention::{delete_backup, prune_backups, prune_backups_keeping, select_for_pruning};
