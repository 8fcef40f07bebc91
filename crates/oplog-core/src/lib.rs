//! Core domain logic for the OpenProject timelog pusher.
//!
//! This crate contains the pure pieces of the pipeline:
//! - Line parsing: turning one timelog line into a [`TimeEntry`]
//! - Activity classification: picking the activity code for a work package
//! - Payload construction: the fixed OpenProject time-entry JSON document
//! - Spent-on date handling, including the `status_YYYYMMDD.dailystatus`
//!   filename convention

pub mod activity;
pub mod date;
pub mod entry;
pub mod payload;

pub use activity::ActivityRules;
pub use date::SpentDate;
pub use entry::{ParseError, TimeEntry, parse_line};
pub use payload::TimeEntryPayload;
