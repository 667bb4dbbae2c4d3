use anyhow::Result;
use serde::Serialize;

use crate::config::DisplayConfig;
use crate::git::{DiffLine, DiffStats, FileChange, FileStatus, LineType, RowPair};
use crate::review::{ReviewComment, ReviewComments};

const DIVIDER: &str = " │ ";

/// Everything the JSON output carries for one file
#[derive(Debug, Serialize)]
pub struct FileReport<'a> {
    pub path: &'a str,
    pub status: &'a FileStatus,
    pub diff_hash: String,
    pub stats: DiffStats,
    pub rows: Vec<RowPair>,
    pub comments: Vec<&'a ReviewComment>,
}

impl<'a> FileReport<'a> {
    pub fn new(file: &'a FileChange, comments: &'a ReviewComments) -> Self {
        let lines = file.lines();
        Self {
            path: &file.path,
            status: &file.status,
            diff_hash: file.content_hash(),
            stats: DiffStats::from_lines(&lines),
            rows: crate::git::align(&lines),
            comments: comments.for_file(&file.path),
        }
    }
}

pub fn render_json(reports: &[FileReport<'_>]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

/// One `path +adds -dels` line per file
pub fn render_stats(reports: &[FileReport<'_>]) -> String {
    let mut out = String::new();
    for r in reports {
        out.push_str(&format!(
            "{} {}  +{} -{}\n",
            r.status.symbol(),
            r.path,
            r.stats.adds,
            r.stats.dels
        ));
    }
    out
}

/// Plain two-column dump of a file's rows, with comments under their anchor row
pub fn render_text(report: &FileReport<'_>, display: &DisplayConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}  +{} -{}\n",
        report.status.symbol(),
        report.path,
        report.stats.adds,
        report.stats.dels
    ));

    let full_width = cell_width(display) * 2 + DIVIDER.chars().count();
    let mut shown_starts = Vec::new();

    for row in &report.rows {
        if row.is_hunk_header() {
            let header = row.left.as_ref().or(row.right.as_ref());
            let text = header.map(|l| l.content.as_str()).unwrap_or("");
            out.push_str(&truncate(&expand_tabs(text, display.tab_width), full_width));
            out.push('\n');
            continue;
        }

        let left = render_cell(row.left.as_ref(), Side::Old, display);
        let right = render_cell(row.right.as_ref(), Side::New, display);
        out.push_str(format!("{left}{DIVIDER}{right}").trim_end());
        out.push('\n');

        if let Some(anchor) = row.anchor_line() {
            for c in report
                .comments
                .iter()
                .filter(|c| c.start_line == anchor)
            {
                out.push_str(&comment_line(c));
                shown_starts.push(c.start_line);
            }
        }
    }

    // Comments whose start line is not visible in any hunk
    for c in report
        .comments
        .iter()
        .filter(|c| !shown_starts.contains(&c.start_line))
    {
        out.push_str(&comment_line(c));
    }

    out
}

#[derive(Clone, Copy)]
enum Side {
    Old,
    New,
}

fn cell_width(display: &DisplayConfig) -> usize {
    let gutter = if display.line_numbers { 5 } else { 0 };
    // +1 for the marker column
    gutter + 1 + display.column_width as usize
}

fn render_cell(line: Option<&DiffLine>, side: Side, display: &DisplayConfig) -> String {
    let width = cell_width(display);
    let Some(line) = line else {
        return " ".repeat(width);
    };

    let mut cell = String::new();
    if display.line_numbers {
        let num = match side {
            Side::Old => line.old_num,
            Side::New => line.new_num,
        };
        cell.push_str(
            &num.map(|n| format!("{:>4} ", n))
                .unwrap_or_else(|| "     ".to_string()),
        );
    }

    let marker = match line.line_type {
        LineType::HunkHeader => " ",
        other => other.marker(),
    };
    cell.push_str(marker);

    let content = truncate(
        &expand_tabs(&line.content, display.tab_width),
        display.column_width as usize,
    );
    cell.push_str(&content);

    let pad = width.saturating_sub(cell.chars().count());
    cell.push_str(&" ".repeat(pad));
    cell
}

fn comment_line(c: &ReviewComment) -> String {
    match c.end_line {
        Some(end) if end != c.start_line => {
            format!("  💬 L{}-{}: {}\n", c.start_line, end, c.text)
        }
        _ => format!("  💬 L{}: {}\n", c.start_line, c.text),
    }
}

/// Replace tabs with spaces up to the next tab stop
fn expand_tabs(text: &str, tab_width: u8) -> String {
    if !text.contains('\t') {
        return text.to_string();
    }
    let tab_width = tab_width.max(1) as usize;
    let mut out = String::with_capacity(text.len());
    let mut col = 0;
    for ch in text.chars() {
        if ch == '\t' {
            let spaces = tab_width - (col % tab_width);
            out.push_str(&" ".repeat(spaces));
            col += spaces;
        } else {
            out.push(ch);
            col += 1;
        }
    }
    out
}

/// Cut to `max_len` characters, ending in `…` when shortened
fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        format!(
            "{}…",
            text.chars()
                .take(max_len.saturating_sub(1))
                .collect::<String>()
        )
    } else {
        text.to_string()
    }
}
