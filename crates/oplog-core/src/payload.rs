//! The OpenProject time-entry document.
//!
//! The API expects a fixed shape: hyperlink references to the activity and
//! the work package, the duration as an ISO-8601 string, and the spent-on
//! date. Example:
//!
//! ```json
//! {"_links":{"activity":{"href":"/api/v3/time_entries/activities/6"},
//!            "workPackage":{"href":"/api/v3/work_packages/123"}},
//!  "hours":"PT4.50H",
//!  "comment":{"raw":"Meeting with Carrie"},
//!  "spentOn":"20210921"}
//! ```

use serde::{Deserialize, Serialize};

use crate::date::SpentDate;
use crate::entry::TimeEntry;

const ACTIVITY_HREF_PREFIX: &str = "/api/v3/time_entries/activities/";
const WORK_PACKAGE_HREF_PREFIX: &str = "/api/v3/work_packages/";

/// Request body for `POST /api/v3/time_entries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntryPayload {
    #[serde(rename = "_links")]
    links: Links,
    hours: String,
    comment: Comment,
    #[serde(rename = "spentOn")]
    spent_on: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Links {
    activity: Href,
    #[serde(rename = "workPackage")]
    work_package: Href,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Href {
    href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Comment {
    raw: String,
}

impl TimeEntryPayload {
    /// Builds the document for one entry.
    ///
    /// The duration text goes into `hours` verbatim, wrapped as `PT{dur}H`.
    #[must_use]
    pub fn new(entry: &TimeEntry, activity_code: i64, spent_on: &SpentDate) -> Self {
        Self {
            links: Links {
                activity: Href {
                    href: format!("{ACTIVITY_HREF_PREFIX}{activity_code}"),
                },
                work_package: Href {
                    href: format!("{WORK_PACKAGE_HREF_PREFIX}{}", entry.work_package),
                },
            },
            hours: format!("PT{}H", entry.duration),
            comment: Comment {
                raw: entry.description.clone(),
            },
            spent_on: spent_on.to_string(),
        }
    }
}
