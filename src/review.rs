use anyhow::{Context, Result};
use serde::Serialize;

/// A reviewer's note anchored to new-file line numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewComment {
    pub file_path: String,
    pub start_line: usize,
    /// Inclusive end of a multi-line range
    pub end_line: Option<usize>,
    pub text: String,
}

impl ReviewComment {
    pub fn new(file_path: impl Into<String>, start_line: usize, text: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            start_line,
            end_line: None,
            text: text.into(),
        }
    }

    /// Parse a `LINE[-END]:TEXT` argument, e.g. "12:rename this" or "12-20:extract fn"
    pub fn parse_arg(file_path: &str, arg: &str) -> Result<Self> {
        let (range, text) = arg
            .split_once(':')
            .with_context(|| format!("comment '{arg}' is missing ':' between line and text"))?;
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("comment '{arg}' has no text");
        }

        let (start, end) = match range.split_once('-') {
            Some((s, e)) => (s, Some(e)),
            None => (range, None),
        };
        let start_line: usize = start
            .trim()
            .parse()
            .with_context(|| format!("invalid start line in comment '{arg}'"))?;
        let end_line = end
            .map(|e| e.trim().parse::<usize>())
            .transpose()
            .with_context(|| format!("invalid end line in comment '{arg}'"))?;

        if start_line == 0 {
            anyhow::bail!("line numbers start at 1 (comment '{arg}')");
        }
        if let Some(end) = end_line {
            if end < start_line {
                anyhow::bail!("comment range {start_line}-{end} ends before it starts");
            }
        }

        Ok(Self {
            file_path: file_path.to_string(),
            start_line,
            end_line,
            text: text.to_string(),
        })
    }

    /// Whether this comment covers the given new-file line
    pub fn covers(&self, new_line: usize) -> bool {
        new_line >= self.start_line && new_line <= self.end_line.unwrap_or(self.start_line)
    }
}

/// In-memory comment list for one review session
#[derive(Debug, Clone, Default)]
pub struct ReviewComments {
    comments: Vec<ReviewComment>,
}

impl ReviewComments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, comment: ReviewComment) {
        self.comments.push(comment);
    }

    /// Replace the comment with the same file and start line. Returns false if none matched.
    pub fn update(&mut self, comment: ReviewComment) -> bool {
        match self
            .comments
            .iter_mut()
            .find(|c| c.file_path == comment.file_path && c.start_line == comment.start_line)
        {
            Some(existing) => {
                *existing = comment;
                true
            }
            None => false,
        }
    }

    /// Remove every comment at this file and start line, returning how many went
    pub fn delete(&mut self, file_path: &str, start_line: usize) -> usize {
        let before = self.comments.len();
        self.comments
            .retain(|c| !(c.file_path == file_path && c.start_line == start_line));
        before - self.comments.len()
    }

    pub fn all(&self) -> &[ReviewComment] {
        &self.comments
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn for_file(&self, path: &str) -> Vec<&ReviewComment> {
        self.comments.iter().filter(|c| c.file_path == path).collect()
    }

    pub fn for_line(&self, path: &str, new_line: usize) -> Vec<&ReviewComment> {
        self.comments
            .iter()
            .filter(|c| c.file_path == path && c.covers(new_line))
            .collect()
    }
}
