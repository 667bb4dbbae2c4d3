use serde::Serialize;
use sha2::{Digest, Sha256};

use super::diff::{parse_diff, DiffLine, DiffStats};
use super::split::{split_diff, RowPair};

/// File change status in git
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "from", rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed(String), // old path
    Copied(String),  // source path
}

impl FileStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            FileStatus::Added => "+",
            FileStatus::Modified => "~",
            FileStatus::Deleted => "-",
            FileStatus::Renamed(_) => "R",
            FileStatus::Copied(_) => "C",
        }
    }
}

/// One file's slice of a multi-file diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    pub path: String,
    pub status: FileStatus,
    /// Raw diff text for this file, starting at its `diff --git` line
    pub diff: String,
}

impl FileChange {
    /// SHA-256 of the raw diff (for staleness detection)
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.diff.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// The diff from its first hunk header on, without the file-pair header
    /// (`diff --git`, mode, rename and index lines). Empty for header-only changes
    /// such as a pure rename.
    pub fn hunks_text(&self) -> &str {
        if self.diff.starts_with("@@") {
            return &self.diff;
        }
        match self.diff.find("\n@@") {
            Some(idx) => &self.diff[idx + 1..],
            None => "",
        }
    }

    pub fn lines(&self) -> Vec<DiffLine> {
        parse_diff(Some(self.hunks_text()))
    }

    pub fn rows(&self) -> Vec<RowPair> {
        split_diff(Some(self.hunks_text()))
    }

    pub fn stats(&self) -> DiffStats {
        DiffStats::from_lines(&self.lines())
    }
}

/// Split `git diff` output into per-file changes.
/// Anything before the first `diff --git` line is ignored.
pub fn split_files(raw: &str) -> Vec<FileChange> {
    let mut files: Vec<FileChange> = Vec::new();
    let mut current: Option<(String, FileStatus, Vec<&str>)> = None;

    for line in raw.split('\n') {
        if line.starts_with("diff --git") {
            if let Some((path, status, body)) = current.take() {
                files.push(finish_file(path, status, body));
            }
            current = Some((path_from_header(line), FileStatus::Modified, vec![line]));
            continue;
        }

        let Some((_, status, body)) = current.as_mut() else {
            continue;
        };

        if line.starts_with("new file") {
            *status = FileStatus::Added;
        } else if line.starts_with("deleted file") {
            *status = FileStatus::Deleted;
        } else if let Some(old_path) = line.strip_prefix("rename from ") {
            *status = FileStatus::Renamed(old_path.to_string());
        } else if let Some(src_path) = line.strip_prefix("copy from ") {
            *status = FileStatus::Copied(src_path.to_string());
        }
        body.push(line);
    }

    if let Some((path, status, body)) = current {
        files.push(finish_file(path, status, body));
    }

    log::debug!("split diff into {} file(s)", files.len());
    files
}

fn finish_file(path: String, status: FileStatus, mut body: Vec<&str>) -> FileChange {
    // The separator newline before the next file is not part of this file's diff
    if body.len() > 1 && body.last() == Some(&"") {
        body.pop();
    }
    FileChange {
        path,
        status,
        diff: body.join("\n"),
    }
}

/// Extract the new-side path from "diff --git a/path b/path"
fn path_from_header(line: &str) -> String {
    line.rsplit_once(" b/")
        .map(|(_, path)| path.to_string())
        .unwrap_or_else(|| {
            log::warn!("could not find path in diff header: {line}");
            String::new()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::LineType;

    const TWO_FILES: &str = "diff --git a/src/main.rs b/src/main.rs
index abc123..def456 100644
--- a/src/main.rs
+++ b/src/main.rs
@@ -1,3 +1,4 @@ fn main()
 fn main() {
+    println!(\"hello\");
     let x = 1;
 }
diff --git a/new.rs b/new.rs
new file mode 100644
index 0000000..abc1234
--- /dev/null
+++ b/new.rs
@@ -0,0 +1,2 @@
+fn hello() {}
+fn world() {}
";

    // ── FileStatus::symbol ──

    #[test]
    fn file_status_symbols() {
        assert_eq!(FileStatus::Added.symbol(), "+");
        assert_eq!(FileStatus::Modified.symbol(), "~");
        assert_eq!(FileStatus::Deleted.symbol(), "-");
        assert_eq!(FileStatus::Renamed("old.rs".to_string()).symbol(), "R");
        assert_eq!(FileStatus::Copied("old.rs".to_string()).symbol(), "C");
    }

    // ── split_files ──

    #[test]
    fn split_two_files() {
        let files = split_files(TWO_FILES);

        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "src/main.rs");
        assert_eq!(files[0].status, FileStatus::Modified);
        assert_eq!(files[1].path, "new.rs");
        assert_eq!(files[1].status, FileStatus::Added);
        assert!(files[0].diff.starts_with("diff --git a/src/main.rs"));
        assert!(files[0].diff.ends_with(" }"));
        assert!(files[1].diff.ends_with("+fn world() {}"));
    }

    #[test]
    fn split_file_lines_parse_cleanly() {
        let files = split_files(TWO_FILES);

        let lines = files[0].lines();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0].line_type, LineType::HunkHeader);
        assert_eq!(lines[2].new_num, Some(2));

        let stats = files[1].stats();
        assert_eq!(stats.adds, 2);
        assert_eq!(stats.dels, 0);
        assert_eq!(files[1].rows().len(), 3);
    }

    #[test]
    fn split_detects_deleted_renamed_and_copied() {
        let raw = "diff --git a/gone.rs b/gone.rs
deleted file mode 100644
diff --git a/old/name.rs b/new/name.rs
similarity index 90%
rename from old/name.rs
rename to new/name.rs
diff --git a/a.rs b/b.rs
copy from a.rs
copy to b.rs";
        let files = split_files(raw);

        assert_eq!(files.len(), 3);
        assert_eq!(files[0].status, FileStatus::Deleted);
        assert_eq!(files[1].path, "new/name.rs");
        assert_eq!(files[1].status, FileStatus::Renamed("old/name.rs".to_string()));
        assert_eq!(files[2].status, FileStatus::Copied("a.rs".to_string()));
    }

    #[test]
    fn file_pair_header_is_kept_out_of_rows() {
        let files = split_files(TWO_FILES);

        assert!(files[1].hunks_text().starts_with("@@ -0,0 +1,2 @@"));
        let lines = files[1].lines();
        assert_eq!(lines[0].line_type, LineType::HunkHeader);
        assert!(lines.iter().all(|l| !l.content.starts_with("new file mode")));
    }

    #[test]
    fn header_only_change_has_no_rows() {
        let files = split_files(
            "diff --git a/old.rs b/new.rs\nsimilarity index 100%\nrename from old.rs\nrename to new.rs",
        );

        assert_eq!(files[0].hunks_text(), "");
        assert!(files[0].rows().is_empty());
        assert_eq!(files[0].stats().adds, 0);
    }

    #[test]
    fn split_without_git_header_is_empty() {
        assert!(split_files("@@ -1 +1 @@\n-a\n+b").is_empty());
        assert!(split_files("").is_empty());
    }

    #[test]
    fn content_hash_tracks_diff_text() {
        let files = split_files(TWO_FILES);
        assert_eq!(files[0].content_hash().len(), 64);
        assert_eq!(files[0].content_hash(), files[0].clone().content_hash());
        assert_ne!(files[0].content_hash(), files[1].content_hash());
    }
}
