use crate::types::{Issue, Level};
use serde::Serialize;
use tracing::debug;

/// Issues split by level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassifiedIssues {
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    /// Issues with an unrecognized level
    #[serde(skip)]
    pub dropped: usize,
}

impl ClassifiedIssues {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len() + self.warnings.len()
    }
}

/// Partition issues into errors and warnings, dropping unknown levels
pub fn classify(issues: Vec<Issue>) -> ClassifiedIssues {
    let mut classified = ClassifiedIssues::default();
    for issue in issues {
        match &issue.level {
            Level::Error => classified.errors.push(issue),
            Level::Warning => classified.warnings.push(issue),
            Level::Unknown(level) => {
                debug!(
                    "Dropping {}:{} with unknown level '{}'",
                    issue.file, issue.line, level
                );
                classified.dropped += 1;
            }
        }
    }
    classified
}
