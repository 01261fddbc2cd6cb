//! Shared parsing utilities for scheduler output.
//!
//! Holds the [`WallTime`] duration type used for job time limits and
//! elapsed times, plus the small helpers the queue parser and the live
//! scheduler backend build on.

pub mod command;
pub mod time;

pub use command::{CommandError, run_command, run_command_allow_failure};
pub use time::{TimeError, WallTime, parse_wall_time_field};

/// Filter helper for optional string fields.
/// Returns None if the string is empty or a placeholder value.
pub fn non_empty_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty()
        || trimmed == "-"
        || trimmed == "N/A"
        || trimmed == "(null)"
        || trimmed == "Unknown"
    {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a line of column output on runs of whitespace.
///
/// Empty columns collapse away, so a value that is blank or contains
/// spaces shifts every column after it.
pub fn split_columns(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}
