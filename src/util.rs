pub mod diff;

use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

const GIT_EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

#[derive(Debug, thiserror::Error)]
pub enum GitError {
    #[error("failed to execute git {0}: {1}")]
    Spawn(&'static str, std::io::Error),
    #[error("git {0} exited with {1}: {2}")]
    Failed(&'static str, std::process::ExitStatus, String),
}

/// Represents the base reference for git operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Base {
    /// Every tracked file counts as changed
    Root,
    /// Changes against a specific commit
    Commit(String),
}

impl Base {
    /// Parse a base string into a Base enum
    ///
    /// - Empty string: auto-detect HEAD or ^ based on uncommitted changes
    /// - "ROOT": all files
    /// - "^" or "~": relative to HEAD
    /// - Otherwise: commit hash or reference
    pub fn parse(diff_base: &str) -> Self {
        let base = if diff_base.is_empty() {
            debug!("Base is empty, checking for uncommitted changes");
            let has_uncommitted = Command::new("git")
                .args(["diff", "--quiet", "HEAD"])
                .status()
                .map(|s| !s.success())
                .unwrap_or(false);
            let detected = if has_uncommitted { "HEAD" } else { "^" };
            debug!("Auto-detected base: {}", detected);
            detected
        } else {
            diff_base
        };

        Self::from_resolved(base)
    }

    fn from_resolved(base: &str) -> Self {
        if base == "ROOT" {
            Self::Root
        } else if base.starts_with('~') || base.starts_with('^') {
            Self::Commit(format!("HEAD{}", base))
        } else {
            Self::Commit(base.to_string())
        }
    }

    /// Get the base reference for git diff operations
    fn as_diff_base(&self) -> &str {
        match self {
            Self::Root => GIT_EMPTY_TREE,
            Self::Commit(s) => s,
        }
    }
}

/// Changed files under `dir`, relative to `dir`
pub fn get_changed_files(dir: &Path, base: &Base) -> Result<Vec<String>, GitError> {
    let output = match base {
        Base::Root => run_git(dir, "ls-files", &["ls-files"])?,
        Base::Commit(commit) => {
            run_git(dir, "diff", &["diff", "--name-only", "--relative", commit])?
        }
    };

    Ok(output.lines().map(|s| s.to_string()).collect())
}

/// Unified diff per changed file; files with an empty diff are skipped
///
/// Paths in `files` and in the diff headers are relative to `dir`.
pub fn get_diffs(dir: &Path, base: &Base, files: &[String]) -> HashMap<String, String> {
    let mut diffs = HashMap::new();
    let diff_base = base.as_diff_base();

    for file in files {
        let args = ["diff", "--unified=0", "--relative", diff_base, "--", file];
        match run_git(dir, "diff", &args) {
            Ok(diff) if !diff.is_empty() => {
                diffs.insert(file.clone(), diff);
            }
            Ok(_) => debug!("Empty diff for {}", file),
            Err(e) => warn!("Skipping diff for {}: {}", file, e),
        }
    }

    diffs
}

fn run_git(dir: &Path, name: &'static str, args: &[&str]) -> Result<String, GitError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| GitError::Spawn(name, e))?;

    if !output.status.success() {
        return Err(GitError::Failed(
            name,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
