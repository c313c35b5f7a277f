use super::classify::ClassifiedIssues;
use crate::types::Issue;

const SUMMARY_HEADING: &str = "### IBLinter found issues";
const ERROR_ICON: &str = "🚨";
const WARNING_ICON: &str = "⚠️";

/// Render classified issues as a single markdown comment
///
/// Returns `None` when there is nothing to report. Error and warning tables
/// are only included when non-empty.
pub fn format_summary(classified: &ClassifiedIssues) -> Option<String> {
    if classified.is_empty() {
        return None;
    }

    let mut output = format!("{}\n\n", SUMMARY_HEADING);
    if !classified.errors.is_empty() {
        output.push_str(&format_table(&classified.errors, "Errors", ERROR_ICON));
    }
    if !classified.warnings.is_empty() {
        output.push_str(&format_table(&classified.warnings, "Warnings", WARNING_ICON));
    }
    Some(output)
}

fn format_table(issues: &[Issue], heading: &str, icon: &str) -> String {
    let mut output = format!("#### {}\n\n", heading);
    output.push_str("|   | File | Hint |\n");
    output.push_str("|---| ---- | -----|\n");
    for issue in issues {
        output.push_str(&format!(
            "| {} | {} | {} |\n",
            icon,
            escape_cell(basename(&issue.file)),
            escape_cell(&issue.message)
        ));
    }
    output.push('\n');
    output
}

fn basename(file: &str) -> &str {
    file.rsplit('/').next().unwrap_or(file)
}

/// Keep a value on one table row
fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\r', '\n'], " ")
}
