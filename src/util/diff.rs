use std::collections::{BTreeMap, BTreeSet};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DiffParseError {
    #[error("malformed hunk header: {0}")]
    MalformedHunkHeader(String),
}

/// Read a unified diff and collect the added line numbers per file.
///
/// Line numbers refer to the new side of the diff (1-indexed). Files that
/// appear in the diff without added lines map to an empty set; deleted files
/// are left out. Hunk bodies are bounded by the line counts of their header,
/// so diffs without `diff --git` separators are read correctly.
pub fn added_lines(diff_text: &str) -> Result<BTreeMap<String, BTreeSet<u32>>, DiffParseError> {
    let mut out: BTreeMap<String, BTreeSet<u32>> = BTreeMap::new();
    let mut current_path: Option<String> = None;

    let mut new_line_no: u32 = 0;
    let mut old_remaining: u32 = 0;
    let mut new_remaining: u32 = 0;

    for raw in diff_text.lines() {
        let in_hunk = old_remaining > 0 || new_remaining > 0;

        if raw.starts_with("diff --git ") {
            old_remaining = 0;
            new_remaining = 0;
            current_path = None;
            continue;
        }

        if !in_hunk {
            if let Some(rest) = raw.strip_prefix("+++ ") {
                current_path = parse_new_path(rest);
                if let Some(path) = &current_path {
                    out.entry(path.clone()).or_default();
                }
            } else if raw.starts_with("@@") {
                let hunk = parse_hunk_header(raw)?;
                new_line_no = hunk.new_start;
                old_remaining = hunk.old_count;
                new_remaining = hunk.new_count;
            }
            continue;
        }

        match raw.as_bytes().first() {
            Some(b'+') => {
                if let Some(lines) = current_path.as_deref().and_then(|p| out.get_mut(p)) {
                    lines.insert(new_line_no);
                }
                new_line_no = new_line_no.saturating_add(1);
                new_remaining = new_remaining.saturating_sub(1);
            }
            Some(b'-') => old_remaining = old_remaining.saturating_sub(1),
            // "\ No newline at end of file"
            Some(b'\\') => {}
            // context, including empty lines some tools emit for blank context
            _ => {
                new_line_no = new_line_no.saturating_add(1);
                old_remaining = old_remaining.saturating_sub(1);
                new_remaining = new_remaining.saturating_sub(1);
            }
        }
    }

    Ok(out)
}

struct HunkHeader {
    old_count: u32,
    new_start: u32,
    new_count: u32,
}

fn parse_hunk_header(line: &str) -> Result<HunkHeader, DiffParseError> {
    // @@ -1,2 +3,4 @@ or @@ -1 +3 @@
    let malformed = || DiffParseError::MalformedHunkHeader(line.to_string());
    let mut parts = line.split_whitespace().skip(1);
    let old = parts.next().and_then(|p| p.strip_prefix('-')).ok_or_else(malformed)?;
    let new = parts.next().and_then(|p| p.strip_prefix('+')).ok_or_else(malformed)?;
    let (_, old_count) = parse_range(old).ok_or_else(malformed)?;
    let (new_start, new_count) = parse_range(new).ok_or_else(malformed)?;
    Ok(HunkHeader {
        old_count,
        new_start,
        new_count,
    })
}

/// `start[,count]`, count defaulting to 1
fn parse_range(range: &str) -> Option<(u32, u32)> {
    match range.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

fn parse_new_path(rest: &str) -> Option<String> {
    let first = rest.split('\t').next().unwrap_or(rest).trim();
    if first == "/dev/null" {
        return None;
    }
    let stripped = first.strip_prefix("b/").unwrap_or(first);
    let normalized = normalize_path(stripped);
    (!normalized.is_empty()).then_some(normalized)
}

/// Normalize a relative path to forward slashes without `.` components
pub fn normalize_path(path: &str) -> String {
    Path::new(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect::<PathBuf>()
        .to_string_lossy()
        .replace('\\', "/")
}
