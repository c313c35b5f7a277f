use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Receives one inline review annotation per issue
pub trait AnnotationSink {
    fn annotate(
        &mut self,
        message: &str,
        file: &str,
        line: u32,
        severity: Severity,
    ) -> Result<(), SinkError>;
}

/// Receives one aggregated markdown comment
pub trait SummarySink {
    fn post(&mut self, markdown: &str) -> Result<(), SinkError>;
}

/// Destination for inline annotations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationTarget {
    /// GitHub Actions workflow commands on stdout
    #[default]
    Github,
    /// Log lines only
    Log,
}

impl AnnotationTarget {
    pub fn sink(self) -> Box<dyn AnnotationSink> {
        match self {
            Self::Github => Box::new(WorkflowCommands::new(std::io::stdout())),
            Self::Log => Box::new(LogAnnotations),
        }
    }
}

/// Writes `::warning`/`::error` workflow commands
pub struct WorkflowCommands<W: Write> {
    out: W,
}

impl<W: Write> WorkflowCommands<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> AnnotationSink for WorkflowCommands<W> {
    fn annotate(
        &mut self,
        message: &str,
        file: &str,
        line: u32,
        severity: Severity,
    ) -> Result<(), SinkError> {
        let command = match severity {
            Severity::Warn => "warning",
            Severity::Fail => "error",
        };
        let mut properties = format!("file={}", escape_property(file));
        // line 0 anchors the annotation to the file itself
        if line > 0 {
            properties.push_str(&format!(",line={}", line));
        }
        writeln!(self.out, "::{} {}::{}", command, properties, escape_data(message))?;
        Ok(())
    }
}

/// Reports annotations through the logger
pub struct LogAnnotations;

impl AnnotationSink for LogAnnotations {
    fn annotate(
        &mut self,
        message: &str,
        file: &str,
        line: u32,
        severity: Severity,
    ) -> Result<(), SinkError> {
        match severity {
            Severity::Warn => warn!("{}:{}: {}", file, line, message),
            Severity::Fail => tracing::error!("{}:{}: {}", file, line, message),
        }
        Ok(())
    }
}

/// Writes the summary to any writer (stdout by default)
pub struct WriterSummary<W: Write> {
    out: W,
}

impl<W: Write> WriterSummary<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> SummarySink for WriterSummary<W> {
    fn post(&mut self, markdown: &str) -> Result<(), SinkError> {
        self.out.write_all(markdown.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Writes the summary to a file, replacing or appending
pub struct FileSummary {
    path: PathBuf,
    append: bool,
}

impl FileSummary {
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append: false,
        }
    }

    /// Append, as required for `$GITHUB_STEP_SUMMARY`
    pub fn append(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append: true,
        }
    }
}

impl SummarySink for FileSummary {
    fn post(&mut self, markdown: &str) -> Result<(), SinkError> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(self.append)
            .truncate(!self.append)
            .open(&self.path)?;
        file.write_all(markdown.as_bytes())?;
        info!("Summary written to {}", self.path.display());
        Ok(())
    }
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotate_all(calls: &[(&str, &str, u32, Severity)]) -> String {
        let mut buf = Vec::new();
        let mut sink = WorkflowCommands::new(&mut buf);
        for (message, file, line, severity) in calls {
            sink.annotate(message, file, *line, *severity).unwrap();
        }
        drop(sink);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_workflow_commands() {
        let out = annotate_all(&[
            ("bad constraint", "A.storyboard", 0, Severity::Fail),
            ("unused outlet", "App/B.xib", 2, Severity::Warn),
        ]);
        assert_eq!(
            out,
            "::error file=A.storyboard::bad constraint\n\
             ::warning file=App/B.xib,line=2::unused outlet\n"
        );
    }

    #[test]
    fn test_workflow_command_escaping() {
        let out = annotate_all(&[("50%\nmore", "a,b:c.xib", 0, Severity::Warn)]);
        assert_eq!(out, "::warning file=a%2Cb%3Ac.xib::50%25%0Amore\n");
    }

    #[test]
    fn test_writer_summary() {
        let mut buf = Vec::new();
        WriterSummary::new(&mut buf).post("### hi\n").unwrap();
        assert_eq!(buf, b"### hi\n");
    }

    #[test]
    fn test_file_summary_create_and_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");

        FileSummary::create(&path).post("first\n").unwrap();
        FileSummary::create(&path).post("second\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\n");

        FileSummary::append(&path).post("third\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second\nthird\n");
    }
}
