use super::diff_index::DiffIndex;
use crate::types::Issue;
use crate::util::diff::normalize_path;
use std::path::Path;
use tracing::{debug, trace};

/// Keep only issues located on a changed line
///
/// Issue paths are made relative to `working_directory` before the lookup.
/// Files absent from the index are out of scope, not an error. Input order is
/// preserved.
pub fn filter_issues(issues: &[Issue], index: &DiffIndex, working_directory: &Path) -> Vec<Issue> {
    let kept: Vec<Issue> = issues
        .iter()
        .filter(|issue| {
            let path = relative_path(&issue.file, working_directory);
            let in_scope = index.contains(&path, issue.line);
            if !in_scope {
                trace!("Out of scope: {}:{}", path, issue.line);
            }
            in_scope
        })
        .cloned()
        .collect();

    debug!("{} of {} issues on changed lines", kept.len(), issues.len());
    kept
}

/// Strip the working directory prefix from `file` and normalize separators
pub fn relative_path(file: &str, working_directory: &Path) -> String {
    let path = Path::new(file);
    let relative = path.strip_prefix(working_directory).unwrap_or(path);
    normalize_path(&relative.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;

    fn wd() -> &'static Path {
        Path::new("/work/repo")
    }

    #[test]
    fn test_keeps_issue_on_changed_line() {
        let issues = vec![Issue::new("A.storyboard", 5, Level::Error, "bad constraint")];
        let index = DiffIndex::from_modified([("A.storyboard", vec![5, 6, 7])]);
        assert_eq!(filter_issues(&issues, &index, wd()), issues);
    }

    #[test]
    fn test_drops_issue_on_unchanged_line() {
        let issues = vec![Issue::new("A.storyboard", 5, Level::Error, "bad constraint")];
        let index = DiffIndex::from_modified([("A.storyboard", vec![1, 2, 3])]);
        assert!(filter_issues(&issues, &index, wd()).is_empty());
    }

    #[test]
    fn test_file_absent_from_index_is_dropped() {
        let issues = vec![Issue::new("Other.xib", 1, Level::Warning, "w")];
        let index = DiffIndex::from_modified([("A.storyboard", vec![1])]);
        assert!(filter_issues(&issues, &index, wd()).is_empty());
    }

    #[test]
    fn test_absolute_paths_are_relativized() {
        let issues = vec![Issue::new("/work/repo/App/A.xib", 2, Level::Warning, "w")];
        let index = DiffIndex::from_modified([("App/A.xib", vec![2])]);
        assert_eq!(filter_issues(&issues, &index, wd()).len(), 1);
    }

    #[test]
    fn test_preserves_order_and_is_idempotent() {
        let issues = vec![
            Issue::new("A.xib", 3, Level::Warning, "third"),
            Issue::new("A.xib", 9, Level::Error, "out"),
            Issue::new("B.xib", 1, Level::Error, "first"),
            Issue::new("A.xib", 1, Level::Unknown("info".into()), "second"),
        ];
        let index = DiffIndex::from_modified([("A.xib", vec![1, 3]), ("B.xib", vec![1])]);

        let once = filter_issues(&issues, &index, wd());
        let messages: Vec<_> = once.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["third", "first", "second"]);

        let twice = filter_issues(&once, &index, wd());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_membership_matches_index() {
        let index = DiffIndex::from_modified([("A.xib", vec![2, 4]), ("B.xib", vec![1])]);
        let issues: Vec<Issue> = ["A.xib", "B.xib", "C.xib"]
            .iter()
            .flat_map(|f| (0..6).map(move |line| Issue::new(*f, line, Level::Error, "m")))
            .collect();

        let kept = filter_issues(&issues, &index, wd());
        for issue in &issues {
            assert_eq!(
                kept.contains(issue),
                index.contains(&issue.file, issue.line),
                "{}:{}",
                issue.file,
                issue.line
            );
        }
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("/work/repo/App/A.xib", wd()), "App/A.xib");
        assert_eq!(relative_path("/elsewhere/A.xib", wd()), "/elsewhere/A.xib");
        assert_eq!(relative_path("./A.xib", wd()), "A.xib");
    }
}
