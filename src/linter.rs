use crate::types::Issue;
use std::collections::BTreeMap;
use std::env;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, trace, warn};

/// Executable name looked up on PATH
const BINARY_NAME: &str = "iblinter";

#[derive(Debug, thiserror::Error)]
pub enum LinterError {
    #[error("iblinter is not installed (set binary_path or execute_command)")]
    NotInstalled,
    #[error("failed to parse execute_command: {0}")]
    ParseCommand(#[from] shell_words::ParseError),
    #[error("execute_command is empty")]
    EmptyCommand,
    #[error("failed to execute {0}: {1}")]
    Spawn(String, std::io::Error),
    #[error("{0} exited with {1}: {2}")]
    Failed(String, std::process::ExitStatus, String),
    #[error("failed to decode iblinter output: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to read issues from {0}: {1}")]
    Read(String, std::io::Error),
}

/// Runs IBLinter and decodes its JSON report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Runner {
    program: String,
    prefix_args: Vec<String>,
}

impl Runner {
    /// Resolve how iblinter is invoked
    ///
    /// `execute_command` wins and skips the installation check, then an
    /// existing `binary_path`, then `iblinter` on PATH.
    pub fn resolve(
        binary_path: Option<&str>,
        execute_command: Option<&str>,
    ) -> Result<Self, LinterError> {
        Self::resolve_with_path(binary_path, execute_command, env::var_os("PATH"))
    }

    fn resolve_with_path(
        binary_path: Option<&str>,
        execute_command: Option<&str>,
        search_path: Option<std::ffi::OsString>,
    ) -> Result<Self, LinterError> {
        if let Some(command) = execute_command {
            let mut parts = shell_words::split(command)?;
            if parts.is_empty() {
                return Err(LinterError::EmptyCommand);
            }
            let program = parts.remove(0);
            debug!("Using execute_command: {} {:?}", program, parts);
            return Ok(Self {
                program,
                prefix_args: parts,
            });
        }

        if let Some(binary) = binary_path {
            if Path::new(binary).is_file() {
                debug!("Using binary_path: {}", binary);
                return Ok(Self {
                    program: binary.to_string(),
                    prefix_args: vec![],
                });
            }
            warn!("binary_path {} does not exist, looking on PATH", binary);
        }

        let found = search_path
            .as_deref()
            .and_then(|paths| find_on_path(BINARY_NAME, paths))
            .ok_or(LinterError::NotInstalled)?;
        debug!("Found {} at {}", BINARY_NAME, found.display());
        Ok(Self {
            program: found.to_string_lossy().to_string(),
            prefix_args: vec![],
        })
    }

    /// Arguments passed after the program for a lint run
    pub fn lint_args(&self, path: &str, options: &BTreeMap<String, toml::Value>) -> Vec<String> {
        let mut args = self.prefix_args.clone();
        args.extend(
            ["lint", "--reporter", "json", "--path", path]
                .into_iter()
                .map(String::from),
        );
        for (key, value) in options {
            push_option(&mut args, key, value);
        }
        args
    }

    /// Lint Interface Builder files below `path`
    pub fn lint(
        &self,
        path: &str,
        options: &BTreeMap<String, toml::Value>,
    ) -> Result<Vec<Issue>, LinterError> {
        let args = self.lint_args(path, options);
        debug!("Running {} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| LinterError::Spawn(self.program.clone(), e))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!("iblinter stdout: {}", stdout);

        // iblinter exits non-zero when it reports errors; only an empty report is a failure
        if stdout.trim().is_empty() {
            if output.status.success() {
                return Ok(vec![]);
            }
            return Err(LinterError::Failed(
                self.program.clone(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let issues = parse_issues(&stdout)?;
        debug!("iblinter reported {} issues", issues.len());
        Ok(issues)
    }
}

/// Decode a JSON issue array as written by `iblinter lint --reporter json`
pub fn parse_issues(json: &str) -> Result<Vec<Issue>, LinterError> {
    Ok(serde_json::from_str(json.trim())?)
}

/// Load issues from a JSON file, or stdin when `source` is "-"
pub fn load_issues(source: &str) -> Result<Vec<Issue>, LinterError> {
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| LinterError::Read(source.into(), e))?;
        buf
    } else {
        std::fs::read_to_string(source).map_err(|e| LinterError::Read(source.into(), e))?
    };
    parse_issues(&content)
}

fn push_option(args: &mut Vec<String>, key: &str, value: &toml::Value) {
    let flag = format!("--{}", key);
    match value {
        toml::Value::Boolean(true) => args.push(flag),
        toml::Value::Boolean(false) => {}
        toml::Value::String(s) => args.extend([flag, s.clone()]),
        toml::Value::Array(values) => {
            for value in values {
                push_option(args, key, value);
            }
        }
        other => args.extend([flag, other.to_string()]),
    }
}

fn find_on_path(name: &str, paths: &std::ffi::OsStr) -> Option<PathBuf> {
    env::split_paths(paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;

    fn options(pairs: &[(&str, toml::Value)]) -> BTreeMap<String, toml::Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_resolve_execute_command_bypasses_install_check() {
        let runner =
            Runner::resolve_with_path(None, Some("swift run iblinter"), None).unwrap();
        assert_eq!(runner.program, "swift");
        assert_eq!(runner.prefix_args, vec!["run", "iblinter"]);
    }

    #[test]
    fn test_resolve_not_installed() {
        let dir = tempfile::tempdir().unwrap();
        let err = Runner::resolve_with_path(
            Some("/definitely/missing/iblinter"),
            None,
            Some(dir.path().as_os_str().to_owned()),
        )
        .unwrap_err();
        assert!(matches!(err, LinterError::NotInstalled));
    }

    #[test]
    fn test_resolve_empty_execute_command() {
        let err = Runner::resolve_with_path(None, Some("  "), None).unwrap_err();
        assert!(matches!(err, LinterError::EmptyCommand));
    }

    #[test]
    fn test_resolve_binary_path_and_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join(BINARY_NAME);
        std::fs::write(&binary, "").unwrap();

        let explicit =
            Runner::resolve_with_path(Some(binary.to_str().unwrap()), None, None).unwrap();
        assert_eq!(explicit.program, binary.to_str().unwrap());

        let searched =
            Runner::resolve_with_path(None, None, Some(dir.path().as_os_str().to_owned()))
                .unwrap();
        assert_eq!(searched.program, binary.to_str().unwrap());
    }

    #[test]
    fn test_lint_args_with_options() {
        let runner = Runner::resolve_with_path(None, Some("iblinter"), None).unwrap();
        let args = runner.lint_args(
            "App",
            &options(&[
                ("config", toml::Value::String(".iblinter.yml".into())),
                ("quiet", toml::Value::Boolean(false)),
                ("strict", toml::Value::Boolean(true)),
            ]),
        );
        assert_eq!(
            args,
            vec![
                "lint",
                "--reporter",
                "json",
                "--path",
                "App",
                "--config",
                ".iblinter.yml",
                "--strict"
            ]
        );
    }

    #[test]
    fn test_lint_args_array_repeats_flag() {
        let runner = Runner::resolve_with_path(None, Some("iblinter"), None).unwrap();
        let args = runner.lint_args(
            ".",
            &options(&[(
                "included",
                toml::Value::Array(vec!["A".into(), "B".into()]),
            )]),
        );
        assert_eq!(&args[5..], ["--included", "A", "--included", "B"]);
    }

    #[test]
    fn test_parse_issues() {
        let issues = parse_issues(
            r#"[{"file": "A.storyboard", "line": 5, "level": "error", "message": "bad constraint"}]"#,
        )
        .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].level, Level::Error);
        assert!(parse_issues("not json").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_lint_decodes_command_output() {
        let script = r#"sh -c 'echo "[{\"file\":\"A.xib\",\"line\":3,\"level\":\"warning\",\"message\":\"m\"}]"' --"#;
        let runner = Runner::resolve_with_path(None, Some(script), None).unwrap();
        let issues = runner.lint(".", &BTreeMap::new()).unwrap();
        assert_eq!(issues, vec![Issue::new("A.xib", 3, Level::Warning, "m")]);
    }

    #[cfg(unix)]
    #[test]
    fn test_lint_failure_without_output() {
        let runner = Runner::resolve_with_path(None, Some("sh -c 'exit 3' --"), None).unwrap();
        let err = runner.lint(".", &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, LinterError::Failed(_, _, _)));
    }

    #[test]
    fn test_load_issues_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"[{"file": "B.xib", "line": 2, "level": "warning", "message": "unused outlet"}]"#,
        )
        .unwrap();
        let issues = load_issues(file.path().to_str().unwrap()).unwrap();
        assert_eq!(issues[0].message, "unused outlet");
    }
}
