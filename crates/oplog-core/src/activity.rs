//! Activity classification rules.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Maps a work package to the activity code submitted with its time entry.
///
/// Doubles as the `[activity]` section of the configuration file, so the
/// field names here are the config keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRules {
    /// Activity code used for ordinary work.
    pub default: i64,
    /// Activity code used for meetings.
    pub meeting: i64,
    /// Work packages whose entries are always meetings.
    #[serde(default)]
    pub meeting_wps: HashSet<i64>,
}

impl ActivityRules {
    /// Returns the activity code for a work package.
    ///
    /// Total and deterministic: the meeting code when the work package is in
    /// `meeting_wps`, the default code otherwise.
    #[must_use]
    pub fn classify(&self, work_package: i64) -> i64 {
        if self.meeting_wps.contains(&work_package) {
            self.meeting
        } else {
            self.default
        }
    }
}
