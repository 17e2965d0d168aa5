//! The calendar display capability.
//!
//! A calendar view only receives ready-made entries; how it draws them is
//! up to the implementation (terminal agenda, web widget, ...).

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One event as handed to a calendar view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEntry {
    pub id: String,
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub background_color: String,
    pub border_color: String,

    // Extended properties shown in the event details
    pub lecturer: String,
    pub room: String,
    pub kind: Option<String>,
    pub subject: String,
    pub source: Option<String>,
}

pub trait CalendarView {
    /// Replace everything currently shown with `entries`.
    fn show(&mut self, entries: &[CalendarEntry]);

    fn clear(&mut self);
}

/// Keeps the last shown entries in memory. Useful as a headless view.
#[derive(Debug, Default)]
pub struct MemoryCalendar {
    pub entries: Vec<CalendarEntry>,
}

impl CalendarView for MemoryCalendar {
    fn show(&mut self, entries: &[CalendarEntry]) {
        self.entries = entries.to_vec();
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}
