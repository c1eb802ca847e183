use serde::Serialize;

/// Result of backing up one table inside a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "OutcomeReport")]
pub enum TableOutcome {
    BackedUp { backup: String },
    Failed { error: String },
}

impl TableOutcome {
    pub fn success(&self) -> bool {
        matches!(self, TableOutcome::BackedUp { .. })
    }

    pub fn backup(&self) -> Option<&str> {
        match self {
            TableOutcome::BackedUp { backup } => Some(backup),
            TableOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            TableOutcome::BackedUp { .. } => None,
            TableOutcome::Failed { error } => Some(error),
        }
    }
}

/// Wire shape of a [`TableOutcome`]: `{success, backup, error}`
#[derive(Debug, Serialize)]
pub struct OutcomeReport {
    pub success: bool,
    pub backup: Option<String>,
    pub error: Option<String>,
}

impl From<TableOutcome> for OutcomeReport {
    fn from(outcome: TableOutcome) -> Self {
        match outcome {
            TableOutcome::BackedUp { backup } => OutcomeReport {
                success: true,
                backup: Some(backup),
                error: None,
            },
            TableOutcome::Failed { error } => OutcomeReport {
                success: false,
                backup: None,
                error: Some(error),
            },
        }
    }
}
