//! Side-by-side unified diff parsing for code review.
//!
//! Raw diff text goes through [`git::parse_diff`] to become classified lines, and
//! [`git::align`] pairs those lines into two-column rows. [`git::split_files`]
//! cuts a multi-file `git diff` into per-file pieces first.

pub mod config;
pub mod git;
pub mod logging;
pub mod output;
pub mod review;
