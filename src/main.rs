use anyhow::{Context, Result};
use clap::Parser;
use glob::Pattern;
use std::io::{self, Read, Write};

use split_review::config::{self, OutputFormat};
use split_review::git::{self, FileChange, FileStatus};
use split_review::logging;
use split_review::output::{self, FileReport};
use split_review::review::{ReviewComment, ReviewComments};

/// Show a unified diff as side-by-side rows
#[derive(Parser)]
#[command(name = "sr", version, about)]
struct Cli {
    /// Diff file to read (stdin when omitted or "-")
    path: Option<String>,

    /// Only show files whose path matches this glob (e.g. 'src/**/*.rs')
    #[arg(long)]
    file: Option<String>,

    /// Output format (overrides config)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Attach a comment to the shown files: LINE[-END]:TEXT (repeatable)
    #[arg(long = "comment", value_name = "LINE[-END]:TEXT")]
    comments: Vec<String>,

    /// Print only per-file add/delete counts
    #[arg(long)]
    stats: bool,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut config = config::load_config(&cwd);
    if let Some(format) = cli.format {
        config.output.format = format;
    }
    log::debug!(
        "config: {:?} (global file: {:?})",
        config,
        config::global_config_path()
    );

    let raw = read_input(cli.path.as_deref())?;
    let files = select_files(&raw, cli.file.as_deref())?;
    if files.is_empty() {
        log::warn!("no files in input matched");
        return Ok(());
    }

    let comments = attach_comments(&files, &cli.comments)?;

    let reports: Vec<FileReport> = files
        .iter()
        .map(|f| FileReport::new(f, &comments))
        .collect();

    let rendered = if cli.stats {
        output::render_stats(&reports)
    } else {
        match config.output.format {
            OutputFormat::Json => output::render_json(&reports)? + "\n",
            OutputFormat::Text => reports
                .iter()
                .map(|r| output::render_text(r, &config.display))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    };

    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read diff from stdin")?;
            Ok(buf)
        }
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("Failed to read '{}'", p)),
    }
}

/// Split the input into files, keeping those that match `filter`.
/// Input without any `diff --git` line is one anonymous file.
fn select_files(raw: &str, filter: Option<&str>) -> Result<Vec<FileChange>> {
    let mut files = git::split_files(raw);
    if files.is_empty() && !raw.is_empty() {
        files.push(FileChange {
            path: "-".to_string(),
            status: FileStatus::Modified,
            diff: raw.strip_suffix('\n').unwrap_or(raw).to_string(),
        });
    }

    if let Some(expr) = filter {
        let pattern =
            Pattern::new(expr).with_context(|| format!("Invalid --file glob '{}'", expr))?;
        files.retain(|f| pattern.matches(&f.path));
    }

    Ok(files)
}

/// Build a comment from every `--comment` argument for each selected file.
fn attach_comments(files: &[FileChange], args: &[String]) -> Result<ReviewComments> {
    if files.len() > 1 && !args.is_empty() {
        log::warn!(
            "attaching {} comment(s) to each of {} files; use --file to pick one",
            args.len(),
            files.len()
        );
    }

    let mut comments = ReviewComments::new();
    for file in files {
        for arg in args {
            comments.add(ReviewComment::parse_arg(&file.path, arg)?);
        }
    }
    Ok(comments)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "diff --git a/src/a.rs b/src/a.rs
@@ -1 +1 @@
-a
+b
diff --git a/README.md b/README.md
@@ -1 +1 @@
-x
+y
";

    #[test]
    fn select_all_files() {
        let files = select_files(RAW, None).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn select_by_glob() {
        let files = select_files(RAW, Some("src/*.rs")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/a.rs");
    }

    #[test]
    fn invalid_glob_is_an_error() {
        assert!(select_files(RAW, Some("[")).is_err());
    }

    #[test]
    fn bare_hunks_become_one_file() {
        let files = select_files("@@ -1 +1 @@\n-a\n+b\n", None).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "-");
        assert_eq!(files[0].rows().len(), 2);
    }

    #[test]
    fn empty_input_has_no_files() {
        assert!(select_files("", None).unwrap().is_empty());
    }

    #[test]
    fn comments_attach_to_every_selected_file() {
        let files = select_files(RAW, None).unwrap();
        let args = vec!["1:check this".to_string()];
        let comments = attach_comments(&files, &args).unwrap();

        assert_eq!(comments.all().len(), 2);
        assert_eq!(comments.for_file("src/a.rs").len(), 1);
        assert_eq!(comments.for_file("README.md").len(), 1);
    }

    #[test]
    fn comments_narrowed_by_glob_attach_once() {
        let files = select_files(RAW, Some("README.md")).unwrap();
        let args = vec!["1-2:range".to_string()];
        let comments = attach_comments(&files, &args).unwrap();

        assert_eq!(comments.all().len(), 1);
        assert_eq!(comments.all()[0].end_line, Some(2));
    }

    #[test]
    fn malformed_comment_is_an_error() {
        let files = select_files(RAW, None).unwrap();
        assert!(attach_comments(&files, &["no colon".to_string()]).is_err());
    }
}
