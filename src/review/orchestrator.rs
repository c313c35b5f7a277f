use super::classify::{ClassifiedIssues, classify};
use super::diff_index::DiffIndex;
use super::filter::filter_issues;
use super::reporter::{self, ReportOptions, ReportOutcome};
use super::sink::{FileSummary, SummarySink, WriterSummary};
use crate::config::Config;
use crate::linter::{self, Runner};
use crate::types::Issue;
use crate::util;
use anyhow::{Context, bail};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, trace, warn};

/// Environment variable GitHub Actions points at the job summary file
const STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

/// Inputs of a single lint-and-report pass
#[derive(Debug)]
pub struct LintRun<'a> {
    pub config: &'a Config,
    pub working_directory: &'a Path,
    /// JSON issue file to use instead of running iblinter ("-" for stdin)
    pub issues: Option<&'a str>,
    /// Unified diff file to use instead of git ("-" for stdin)
    pub diff: Option<&'a str>,
    /// Git base when no diff file is given
    pub base: &'a str,
    /// Summary destination: path ending in .md or .json, "github", or "-"
    pub output: Option<&'a str>,
    /// Only print the in-scope issues
    pub dry_run: bool,
}

/// Destination of the aggregated summary
enum SummaryTarget<'a> {
    Json(&'a str),
    Markdown(Box<dyn SummarySink>),
}

/// Lint, scope issues to the change and report them
///
/// The runner and the summary destination are resolved before anything else
/// so a missing iblinter or a bad `output` fails the run before any diff is
/// read.
pub fn orchestrate_and_run(run: &LintRun) -> anyhow::Result<ReportOutcome> {
    let config = run.config;
    let summary = if config.inline_mode {
        if let Some(output) = run.output {
            warn!("Output {} is ignored in inline mode", output);
        }
        None
    } else {
        Some(summary_target(run.output)?)
    };

    let issues = collect_issues(run)?;
    info!("IBLinter reported {} issues", issues.len());

    let index = load_diff_index(run)?.exclude(&config.exclude);
    info!(
        "Diff covers {} files, {} changed lines",
        index.file_count(),
        index.line_count()
    );

    let in_scope = filter_issues(&issues, &index, run.working_directory);
    let classified = classify(in_scope);
    info!(
        "{} errors and {} warnings on changed lines ({} with unknown level dropped)",
        classified.errors.len(),
        classified.warnings.len(),
        classified.dropped
    );

    if classified.is_empty() {
        info!("No issues on changed lines");
        return Ok(ReportOutcome::default());
    }

    if run.dry_run {
        info!("Dry run - issues that would be reported:");
        for issue in classified.errors.iter().chain(&classified.warnings) {
            info!("  [{}] {}:{} {}", issue.level, issue.file, issue.line, issue.message);
        }
        return Ok(ReportOutcome::default());
    }

    let outcome = match summary {
        None => {
            let options = ReportOptions {
                fail_on_warning: config.fail_on_warning,
                anchor: config.anchor,
            };
            let mut annotations = config.annotations.sink();
            reporter::report_inline(&classified, options, run.working_directory, annotations.as_mut())?
        }
        Some(SummaryTarget::Json(path)) => write_json(path, &classified)?,
        Some(SummaryTarget::Markdown(mut sink)) => reporter::report_summary(&classified, sink.as_mut())?,
    };
    Ok(outcome)
}

fn collect_issues(run: &LintRun) -> anyhow::Result<Vec<Issue>> {
    if let Some(source) = run.issues {
        debug!("Loading issues from {}", source);
        return linter::load_issues(source).with_context(|| format!("loading issues from {}", source));
    }

    let config = run.config;
    let runner = Runner::resolve(config.binary_path.as_deref(), config.execute_command.as_deref())?;
    let default_path = run.working_directory.to_string_lossy();
    let path = config.path.as_deref().unwrap_or(&default_path);
    let issues = runner.lint(path, &config.options).context("running iblinter")?;
    trace!("Issues: {:?}", issues);
    Ok(issues)
}

fn load_diff_index(run: &LintRun) -> anyhow::Result<DiffIndex> {
    let Some(source) = run.diff else {
        let base = util::Base::parse(run.base);
        debug!("Resolved base: {:?}", base);
        return DiffIndex::from_git(run.working_directory, &base);
    };

    let text = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading diff from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("reading diff {}", source))?
    };
    Ok(DiffIndex::from_unified_diff(&text)?)
}

fn summary_target(output: Option<&str>) -> anyhow::Result<SummaryTarget<'_>> {
    let sink: Box<dyn SummarySink> = match output {
        None | Some("-") => Box::new(WriterSummary::new(std::io::stdout())),
        Some("github") => {
            let Some(path) = std::env::var_os(STEP_SUMMARY_ENV) else {
                bail!("{} is not set", STEP_SUMMARY_ENV);
            };
            Box::new(FileSummary::append(path))
        }
        Some(path) if path.ends_with(".json") => return Ok(SummaryTarget::Json(path)),
        Some(path) if path.ends_with(".md") => Box::new(FileSummary::create(path)),
        Some(path) => bail!("Output file must end with .md or .json, got {}", path),
    };
    Ok(SummaryTarget::Markdown(sink))
}

fn write_json(path: &str, classified: &ClassifiedIssues) -> anyhow::Result<ReportOutcome> {
    let content = serde_json::to_string_pretty(classified)?;
    std::fs::write(path, content).with_context(|| format!("writing {}", path))?;
    info!("Results written to {}", path);
    Ok(ReportOutcome {
        summary_posted: true,
        ..ReportOutcome::default()
    })
}
