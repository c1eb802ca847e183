pub mod backup;
pub mod metadata;
pub mod outcome;

pub use backup::{BackupInfo, BackupName, BackupTableRef, SourceTableRef};
pub use metadata::BackupMetadataRecord;
pub use outcome::{OutcomeReport, TableOutcome};
