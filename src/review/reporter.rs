use super::classify::ClassifiedIssues;
use super::filter::relative_path;
use super::render::format_summary;
use super::sink::{AnnotationSink, SinkError, SummarySink};
use crate::types::{Issue, Severity};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Line an inline annotation is attached to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Line 0, i.e. the file as a whole
    #[default]
    File,
    /// The line reported by the linter
    Line,
}

/// Inline reporter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub fail_on_warning: bool,
    pub anchor: Anchor,
}

/// What a report produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOutcome {
    pub annotations: usize,
    /// Annotations posted with failing severity
    pub failures: usize,
    pub summary_posted: bool,
}

impl ReportOutcome {
    pub fn failed(&self) -> bool {
        self.failures > 0
    }
}

/// Post one annotation per issue, warnings first
pub fn report_inline(
    classified: &ClassifiedIssues,
    options: ReportOptions,
    working_directory: &Path,
    sink: &mut dyn AnnotationSink,
) -> Result<ReportOutcome, SinkError> {
    let mut outcome = ReportOutcome::default();
    if classified.is_empty() {
        debug!("No issues to annotate");
        return Ok(outcome);
    }

    let warning_severity = if options.fail_on_warning {
        Severity::Fail
    } else {
        Severity::Warn
    };

    let batches = [
        (&classified.warnings, warning_severity),
        (&classified.errors, Severity::Fail),
    ];
    for (issues, severity) in batches {
        for issue in issues {
            send_annotation(issue, severity, options.anchor, working_directory, sink)?;
            outcome.annotations += 1;
            if severity == Severity::Fail {
                outcome.failures += 1;
            }
        }
    }

    info!(
        "Posted {} annotations ({} failing)",
        outcome.annotations, outcome.failures
    );
    Ok(outcome)
}

fn send_annotation(
    issue: &Issue,
    severity: Severity,
    anchor: Anchor,
    working_directory: &Path,
    sink: &mut dyn AnnotationSink,
) -> Result<(), SinkError> {
    let file = relative_path(&issue.file, working_directory);
    let line = match anchor {
        Anchor::File => 0,
        Anchor::Line => issue.line,
    };
    sink.annotate(&issue.message, &file, line, severity)
}

/// Post a single markdown summary, or nothing when there are no issues
pub fn report_summary(
    classified: &ClassifiedIssues,
    sink: &mut dyn SummarySink,
) -> Result<ReportOutcome, SinkError> {
    let Some(markdown) = format_summary(classified) else {
        debug!("No issues to summarize");
        return Ok(ReportOutcome::default());
    };

    sink.post(&markdown)?;
    info!(
        "Posted summary with {} errors and {} warnings",
        classified.errors.len(),
        classified.warnings.len()
    );
    Ok(ReportOutcome {
        summary_posted: true,
        ..ReportOutcome::default()
    })
}
