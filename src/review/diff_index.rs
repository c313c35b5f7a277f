use crate::util::{self, diff::DiffParseError, diff::normalize_path};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info, trace, warn};

static EMPTY: BTreeSet<u32> = BTreeSet::new();

/// Changed line numbers per file, keyed by normalized relative path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffIndex {
    files: BTreeMap<String, BTreeSet<u32>>,
}

impl DiffIndex {
    /// Build from per-file modified line numbers
    pub fn from_modified<P, L>(modified: impl IntoIterator<Item = (P, L)>) -> Self
    where
        P: AsRef<str>,
        L: IntoIterator<Item = u32>,
    {
        let mut files: BTreeMap<String, BTreeSet<u32>> = BTreeMap::new();
        for (path, lines) in modified {
            files
                .entry(normalize_path(path.as_ref()))
                .or_default()
                .extend(lines);
        }
        Self { files }
    }

    /// Build from a git-style unified diff, recording added lines
    pub fn from_unified_diff(diff: &str) -> Result<Self, DiffParseError> {
        Ok(Self {
            files: util::diff::added_lines(diff)?,
        })
    }

    /// Build from git, diffing every changed file under `dir` against `base`
    ///
    /// Keys are relative to `dir`, which may be a subdirectory of the repository.
    pub fn from_git(dir: &Path, base: &util::Base) -> anyhow::Result<Self> {
        debug!("Getting changed files for base {:?} in {}", base, dir.display());
        let changed_files = util::get_changed_files(dir, base)?;
        info!("Found {} changed files", changed_files.len());
        trace!("Changed files: {:?}", changed_files);

        let diffs = util::get_diffs(dir, base, &changed_files);
        let mut index = Self::default();
        for diff in diffs.values() {
            index.merge(Self::from_unified_diff(diff)?);
        }
        Ok(index)
    }

    /// Drop files matching any of the glob patterns
    pub fn exclude(mut self, patterns: &[String]) -> Self {
        if patterns.is_empty() {
            return self;
        }

        let Some(globset) = build_globset(patterns) else {
            return self;
        };

        self.files.retain(|path, _| {
            let excluded = globset.is_match(path);
            if excluded {
                debug!("Excluding {} from review", path);
            }
            !excluded
        });
        self
    }

    fn merge(&mut self, other: Self) {
        for (path, lines) in other.files {
            self.files.entry(path).or_default().extend(lines);
        }
    }

    /// Changed lines of `path`, empty when the file has no modification data
    pub fn lines(&self, path: &str) -> &BTreeSet<u32> {
        self.files.get(path).unwrap_or(&EMPTY)
    }

    pub fn contains(&self, path: &str, line: u32) -> bool {
        self.lines(path).contains(&line)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn line_count(&self) -> usize {
        self.files.values().map(BTreeSet::len).sum()
    }
}

fn build_globset(patterns: &[String]) -> Option<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => builder.add(glob),
            Err(e) => {
                warn!("Invalid exclude pattern '{}': {}", pattern, e);
                continue;
            }
        };
    }

    match builder.build() {
        Ok(gs) => Some(gs),
        Err(e) => {
            warn!("Failed to build exclude globset: {}", e);
            None
        }
    }
}
