use anyhow::{Context, bail};
use clap::Parser;
use ibreview::cli::{Cli, Commands, InitArgs, LintArgs, Mode};
use ibreview::config::Config;
use ibreview::review::orchestrator::{LintRun, orchestrate_and_run};
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: i32 = 1;

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|e| {
        eprintln!("Invalid log level '{}': {}", cli.log_level, e);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match &cli.command {
        Commands::Init(args) => init(args),
        Commands::Lint(args) => lint(args),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_FAILURE),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(EXIT_FAILURE);
        }
    }
}

/// Write a default config file
fn init(args: &InitArgs) -> anyhow::Result<bool> {
    if Path::new(&args.config).exists() && !args.r#override {
        bail!(
            "{} already exists, use --override to replace it",
            args.config
        );
    }

    let content = Config::default().render()?;
    std::fs::write(&args.config, content).with_context(|| format!("writing {}", args.config))?;
    info!("Config written to {}", args.config);
    Ok(true)
}

/// Run the lint pipeline; returns false when failing annotations were posted
fn lint(args: &LintArgs) -> anyhow::Result<bool> {
    let config = resolve_config(args)?;
    debug!("Effective config: {:?}", config);

    let working_directory = std::env::current_dir().context("reading working directory")?;
    let outcome = orchestrate_and_run(&LintRun {
        config: &config,
        working_directory: &working_directory,
        issues: args.issues.as_deref(),
        diff: args.diff.as_deref(),
        base: &args.base,
        output: args.output.as_deref(),
        dry_run: args.dry_run,
    })?;

    if outcome.failed() {
        error!("{} issues fail the review", outcome.failures);
        return Ok(false);
    }
    Ok(true)
}

/// Layer command line flags over the config file
fn resolve_config(args: &LintArgs) -> anyhow::Result<Config> {
    let mut config = Config::load_or_default(&args.config)?;

    if let Some(path) = &args.path {
        config.path = Some(path.clone());
    }
    if let Some(fail_on_warning) = args.fail_on_warning {
        config.fail_on_warning = fail_on_warning;
    }
    if let Some(mode) = args.mode {
        config.inline_mode = mode == Mode::Inline;
    }
    if let Some(anchor) = args.anchor {
        config.anchor = anchor;
    }
    if let Some(annotations) = args.annotations {
        config.annotations = annotations;
    }
    if let Some(binary_path) = &args.binary_path {
        config.binary_path = Some(binary_path.clone());
    }
    if let Some(execute_command) = &args.execute_command {
        config.execute_command = Some(execute_command.clone());
    }
    config.apply_options(&args.options)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ibreview::review::reporter::Anchor;

    fn lint_args(extra: &[&str]) -> LintArgs {
        let mut argv = vec!["ibreview", "lint"];
        argv.extend_from_slice(extra);
        let Commands::Lint(args) = Cli::parse_from(argv).command else {
            panic!("expected lint");
        };
        args
    }

    #[test]
    fn test_resolve_config_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "fail_on_warning = false\ninline_mode = true\n").unwrap();
        let path = path.to_string_lossy().to_string();

        let args = lint_args(&[
            "--config",
            &path,
            "--fail-on-warning",
            "--mode",
            "aggregate",
            "--anchor",
            "line",
            "--execute-command",
            "swift run iblinter",
            "--option",
            "config=.iblinter.yml",
        ]);
        let config = resolve_config(&args).unwrap();
        assert!(config.fail_on_warning);
        assert!(!config.inline_mode);
        assert_eq!(config.anchor, Anchor::Line);
        assert_eq!(config.execute_command.as_deref(), Some("swift run iblinter"));
        assert!(config.options.contains_key("config"));
    }

    #[test]
    fn test_resolve_config_can_disable_fail_on_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "fail_on_warning = true\n").unwrap();
        let path = path.to_string_lossy().to_string();

        let config = resolve_config(&lint_args(&["--config", &path])).unwrap();
        assert!(config.fail_on_warning);

        let args = lint_args(&["--config", &path, "--fail-on-warning=false"]);
        let config = resolve_config(&args).unwrap();
        assert!(!config.fail_on_warning);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ibreview.toml").to_string_lossy().to_string();
        let mut args = InitArgs {
            config: path.clone(),
            r#override: false,
        };

        assert!(init(&args).unwrap());
        let written = Config::load(&path).unwrap();
        assert_eq!(written, Config::default());

        assert!(init(&args).is_err());
        args.r#override = true;
        assert!(init(&args).unwrap());
    }
}
