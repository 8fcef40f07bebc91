//! Spent-on date handling.
//!
//! OpenProject entries carry a `spentOn` date; the timelog convention encodes
//! it in the filename as `status_YYYYMMDD.dailystatus`. Filenames outside the
//! convention simply yield no date, they are never an error.

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

/// The date format used both in filenames and on the wire.
const DATE_FORMAT: &str = "%Y%m%d";

const FILE_PREFIX: &str = "status_";
const FILE_EXTENSION: &str = "dailystatus";

/// Error for a date string that is not a valid `YYYYMMDD` calendar date.
#[derive(Debug, Error)]
#[error("invalid date {value:?}, expected YYYYMMDD (e.g. 20210921)")]
pub struct InvalidDate {
    value: String,
}

/// The date a file's entries are logged against, rendered as `YYYYMMDD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpentDate(NaiveDate);

impl SpentDate {
    /// Parses a `YYYYMMDD` string, validating it as a calendar date.
    pub fn parse(value: &str) -> Result<Self, InvalidDate> {
        NaiveDate::parse_from_str(value, DATE_FORMAT)
            .map(Self)
            .map_err(|_| InvalidDate {
                value: value.to_string(),
            })
    }

    /// Today's date in local time.
    #[must_use]
    pub fn today() -> Self {
        Self(chrono::Local::now().date_naive())
    }

    /// Extracts the date from a `status_YYYYMMDD.dailystatus` filename.
    ///
    /// Returns `None` for any name outside the convention, including names
    /// too short to slice or with an implausible date.
    #[must_use]
    pub fn from_file_name(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let stem = name.strip_suffix(&format!(".{FILE_EXTENSION}"))?;
        let date = stem.strip_prefix(FILE_PREFIX)?;
        Self::parse(date).ok()
    }
}

impl fmt::Display for SpentDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}
