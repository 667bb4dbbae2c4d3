use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Matches `@@ -old_start[,old_count] +new_start[,new_count] @@`; anything after
/// the closing `@@` (function context) is ignored.
static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@\s+-(\d+)(?:,(\d+))?\s+\+(\d+)(?:,(\d+))?\s+@@")
        .expect("Invalid hunk header regex")
});

/// A single classified line of a file's diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub line_type: LineType,
    /// Text without its leading marker; for hunk headers, the whole raw line
    pub content: String,
    pub old_num: Option<usize>,
    pub new_num: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    Added,
    Removed,
    Context,
    HunkHeader,
}

impl LineType {
    /// The unified-diff marker for this line type
    pub fn marker(&self) -> &'static str {
        match self {
            LineType::Added => "+",
            LineType::Removed => "-",
            LineType::Context => " ",
            LineType::HunkHeader => "@",
        }
    }
}

impl DiffLine {
    pub fn added(content: impl Into<String>, new_num: usize) -> Self {
        Self {
            line_type: LineType::Added,
            content: content.into(),
            old_num: None,
            new_num: Some(new_num),
        }
    }

    pub fn removed(content: impl Into<String>, old_num: usize) -> Self {
        Self {
            line_type: LineType::Removed,
            content: content.into(),
            old_num: Some(old_num),
            new_num: None,
        }
    }

    pub fn context(content: impl Into<String>, old_num: usize, new_num: usize) -> Self {
        Self {
            line_type: LineType::Context,
            content: content.into(),
            old_num: Some(old_num),
            new_num: Some(new_num),
        }
    }

    pub fn hunk_header(content: impl Into<String>) -> Self {
        Self {
            line_type: LineType::HunkHeader,
            content: content.into(),
            old_num: None,
            new_num: None,
        }
    }

    /// Format this line back into unified-diff form (headers are emitted verbatim)
    pub fn to_patch_line(&self) -> String {
        match self.line_type {
            LineType::HunkHeader => self.content.clone(),
            _ => format!("{}{}", self.line_type.marker(), self.content),
        }
    }
}

/// Line ranges declared by a hunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HunkRange {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
}

/// Added/removed line totals for a parsed file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub adds: usize,
    pub dels: usize,
}

impl DiffStats {
    pub fn from_lines(lines: &[DiffLine]) -> Self {
        lines.iter().fold(Self::default(), |mut stats, line| {
            match line.line_type {
                LineType::Added => stats.adds += 1,
                LineType::Removed => stats.dels += 1,
                LineType::Context | LineType::HunkHeader => {}
            }
            stats
        })
    }
}

/// Parse the unified diff of a single file into classified lines.
///
/// Never fails: anything unrecognised inside the text is treated as context, so a
/// truncated or garbled diff still produces something displayable. `None` and the
/// empty string both yield no lines.
pub fn parse_diff(raw: Option<&str>) -> Vec<DiffLine> {
    let raw = match raw {
        Some(r) if !r.is_empty() => r,
        _ => return Vec::new(),
    };

    let mut lines = Vec::new();
    let mut old_line: usize = 1;
    let mut new_line: usize = 1;

    // Split on '\n' rather than `lines()` so trailing empty lines survive
    for line in raw.split('\n') {
        if line.starts_with("@@") {
            match HUNK_HEADER.captures(line) {
                Some(caps) => {
                    // Digits that overflow usize keep the previous counters
                    if let (Some(old_start), Some(new_start)) = (
                        caps.get(1).and_then(|m| m.as_str().parse::<usize>().ok()),
                        caps.get(3).and_then(|m| m.as_str().parse::<usize>().ok()),
                    ) {
                        old_line = old_start;
                        new_line = new_start;
                    }
                    lines.push(DiffLine::hunk_header(line));
                }
                None => log::debug!("dropping malformed hunk header: {line}"),
            }
            continue;
        }

        if let Some(content) = line.strip_prefix('+') {
            if !line.starts_with("+++") {
                lines.push(DiffLine::added(content, new_line));
                new_line = new_line.saturating_add(1);
                continue;
            }
        } else if let Some(content) = line.strip_prefix('-') {
            if !line.starts_with("---") {
                lines.push(DiffLine::removed(content, old_line));
                old_line = old_line.saturating_add(1);
                continue;
            }
        }

        if is_file_header(line) {
            continue;
        }

        let content = line.strip_prefix(' ').unwrap_or(line);
        lines.push(DiffLine::context(content, old_line, new_line));
        // Counters stick at usize::MAX rather than wrapping on absurd hunk starts
        old_line = old_line.saturating_add(1);
        new_line = new_line.saturating_add(1);
    }

    lines
}

/// File-pair header lines and the "\ No newline at end of file" marker
fn is_file_header(line: &str) -> bool {
    line.starts_with("diff --git")
        || line.starts_with("index ")
        || line.starts_with("+++")
        || line.starts_with("---")
        || line.starts_with('\\')
}

/// Parse a hunk header like "@@ -10,4 +10,15 @@ fn foo()".
/// A missing count defaults to 1.
pub fn parse_hunk_header(line: &str) -> Option<HunkRange> {
    let caps = HUNK_HEADER.captures(line)?;
    let num = |idx: usize| -> Option<usize> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(1),
        }
    };

    Some(HunkRange {
        old_start: num(1)?,
        old_count: num(2)?,
        new_start: num(3)?,
        new_count: num(4)?,
    })
}
