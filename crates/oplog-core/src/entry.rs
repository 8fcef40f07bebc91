//! Timelog line parsing.
//!
//! One line of a daily status file looks like:
//!
//! ```text
//! 123 4.50 Meeting with Carrie, Kathy & John
//! ```
//!
//! i.e. a work-package ID, a duration, and a free-text description. The
//! duration is deliberately kept as text: `4.00` must reach the API as
//! `PT4.00H`, not `PT4H`.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors from parsing a single timelog line.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The line did not split into work package, duration, and description.
    #[error("cannot split {line:?} into 3 fields")]
    MalformedLine { line: String },

    /// The first field was not a base-10 integer.
    #[error("converting {token:?} to a work-package ID: {source}")]
    NotAnInteger {
        token: String,
        #[source]
        source: ParseIntError,
    },
}

/// One parsed timelog line.
///
/// All fields are non-empty; a `TimeEntry` only ever comes out of a
/// successful [`parse_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    /// Work-package ID the time is logged against.
    pub work_package: i64,
    /// Duration in hours, verbatim from the input line.
    pub duration: String,
    /// Free-text comment; may itself contain whitespace.
    pub description: String,
}

/// Parses one raw line into a [`TimeEntry`].
///
/// The line is split into exactly three whitespace-separated segments: the
/// work-package token, the duration token, and the remainder. The remainder
/// is not re-split, so the description keeps its internal spacing.
///
/// # Errors
///
/// [`ParseError::MalformedLine`] when fewer than three non-empty segments are
/// present (empty line, single word, missing description), and
/// [`ParseError::NotAnInteger`] when the first segment is not a base-10
/// integer.
pub fn parse_line(line: &str) -> Result<TimeEntry, ParseError> {
    let malformed = || ParseError::MalformedLine {
        line: line.to_string(),
    };

    let mut segments = line.splitn(3, char::is_whitespace);
    let wp_token = segments.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
    let duration = segments.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
    let description = segments
        .next()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(malformed)?;

    let work_package = wp_token
        .parse::<i64>()
        .map_err(|source| ParseError::NotAnInteger {
            token: wp_token.to_string(),
            source,
        })?;

    Ok(TimeEntry {
        work_package,
        duration: duration.to_string(),
        description: description.to_string(),
    })
}
