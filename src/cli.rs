use crate::review::reporter::Anchor;
use crate::review::sink::AnnotationTarget;
use clap::{Parser, Subcommand, ValueEnum};

// Display order for log level option (placed at end of help text)
const LOG_LEVEL_DISPLAY_ORDER: usize = 100;

/// CLI arguments
#[derive(Parser)]
#[command(
    name = "ibreview",
    version,
    about = "Report IBLinter issues on the lines touched by a change",
    long_about = None
)]
pub struct Cli {
    /// Log level (see https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
    /// [env: IBREVIEW_LOG=] [default: info]
    #[arg(
        long,
        env = "IBREVIEW_LOG",
        default_value = "info",
        global = true,
        hide_default_value = true,
        hide_env = true,
        display_order = LOG_LEVEL_DISPLAY_ORDER,
        verbatim_doc_comment
    )]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a default ibreview.toml config file
    Init(InitArgs),
    /// Lint Interface Builder files and report issues on changed lines
    Lint(LintArgs),
}

/// Arguments for the init command
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Path to config file
    #[arg(long, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Override existing config file
    #[arg(long)]
    pub r#override: bool,
}

/// Reporting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// One annotation per issue
    Inline,
    /// One markdown summary for all issues
    Aggregate,
}

/// Arguments for the lint command
#[derive(Parser, Debug)]
pub struct LintArgs {
    /// Path to config file (initialize with `ibreview init`)
    #[arg(long, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Directory to lint [default: current directory]
    #[arg(long)]
    pub path: Option<String>,

    /// Report warnings with failing severity in inline mode
    /// (--fail-on-warning=false overrides the config file)
    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        verbatim_doc_comment
    )]
    pub fail_on_warning: Option<bool>,

    /// Reporting mode [default: inline]
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Where inline annotations are anchored [default: file]
    #[arg(long, value_enum)]
    pub anchor: Option<Anchor>,

    /// Where inline annotations are written [default: github]
    #[arg(long, value_enum)]
    pub annotations: Option<AnnotationTarget>,

    /// Path to the iblinter executable
    #[arg(long)]
    pub binary_path: Option<String>,

    /// Command run instead of an installed iblinter (e.g. "swift run iblinter")
    #[arg(long)]
    pub execute_command: Option<String>,

    /// Extra iblinter option as KEY=VALUE, passed as --KEY VALUE
    #[arg(long = "option", value_name = "KEY=VALUE")]
    pub options: Vec<String>,

    /// Base commit to compare against.
    /// Examples: HEAD^ or ^, HEAD~1 or ~1, commit hash, origin/main.
    /// HEAD for uncommitted changes, ROOT for all files
    /// [default: HEAD if uncommitted changes exist, otherwise ^]
    #[arg(
        long,
        default_value = "",
        hide_default_value = true,
        verbatim_doc_comment
    )]
    pub base: String,

    /// Read the change from a unified diff file ("-" for stdin) instead of git
    #[arg(long, conflicts_with = "base")]
    pub diff: Option<String>,

    /// Read issues from an iblinter JSON report ("-" for stdin) instead of running iblinter
    #[arg(long)]
    pub issues: Option<String>,

    /// Summary destination in aggregate mode (.md or .json file, "github" for
    /// the job summary, "-" for stdout) [default: stdout]
    #[arg(long, verbatim_doc_comment)]
    pub output: Option<String>,

    /// Only log the issues on changed lines without reporting them
    #[arg(long)]
    pub dry_run: bool,
}
