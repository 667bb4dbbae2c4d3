mod diff;
mod files;
mod split;

pub use diff::{parse_diff, parse_hunk_header, DiffLine, DiffStats, HunkRange, LineType};
pub use files::{split_files, FileChange, FileStatus};
pub use split::{align, split_diff, RowPair};
