use std::collections::VecDeque;

use serde::Serialize;

use super::diff::{parse_diff, DiffLine, LineType};

/// One row of a side-by-side diff: the old-file cell on the left, the new-file
/// cell on the right. Either side may be blank, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowPair {
    pub left: Option<DiffLine>,
    pub right: Option<DiffLine>,
}

impl RowPair {
    /// A context line or hunk header shown identically in both columns
    pub fn mirrored(line: DiffLine) -> Self {
        Self {
            left: Some(line.clone()),
            right: Some(line),
        }
    }

    pub fn is_mirrored(&self) -> bool {
        matches!((&self.left, &self.right), (Some(l), Some(r)) if l == r)
    }

    pub fn is_hunk_header(&self) -> bool {
        self.left
            .as_ref()
            .or(self.right.as_ref())
            .is_some_and(|l| l.line_type == LineType::HunkHeader)
    }

    /// New-file line number that a review comment on this row attaches to
    pub fn anchor_line(&self) -> Option<usize> {
        self.right.as_ref().and_then(|l| l.new_num)
    }
}

/// Pair classified lines into side-by-side rows.
///
/// Removals and additions are buffered until the next context line or hunk header,
/// then zipped in arrival order; the shorter run is padded with blank cells. This is
/// positional pairing only, no attempt is made to match similar lines.
pub fn align(lines: &[DiffLine]) -> Vec<RowPair> {
    let mut rows = Vec::with_capacity(lines.len());
    let mut pending_removals: VecDeque<DiffLine> = VecDeque::new();
    let mut pending_additions: VecDeque<DiffLine> = VecDeque::new();

    for line in lines {
        match line.line_type {
            LineType::Removed => pending_removals.push_back(line.clone()),
            LineType::Added => pending_additions.push_back(line.clone()),
            LineType::Context | LineType::HunkHeader => {
                drain_pending(&mut rows, &mut pending_removals, &mut pending_additions);
                rows.push(RowPair::mirrored(line.clone()));
            }
        }
    }

    drain_pending(&mut rows, &mut pending_removals, &mut pending_additions);
    rows
}

fn drain_pending(
    rows: &mut Vec<RowPair>,
    removals: &mut VecDeque<DiffLine>,
    additions: &mut VecDeque<DiffLine>,
) {
    while !removals.is_empty() || !additions.is_empty() {
        rows.push(RowPair {
            left: removals.pop_front(),
            right: additions.pop_front(),
        });
    }
}

/// Parse and align one file's diff in a single step
pub fn split_diff(raw: Option<&str>) -> Vec<RowPair> {
    align(&parse_diff(raw))
}
