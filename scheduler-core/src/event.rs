//! Canonical lecture events and the result set built from them.
//!
//! Every encoder and the calendar view work exclusively with these types,
//! regardless of whether the events came from the API or from a file.
//! Field names on the wire match the API's German vocabulary so that an
//! exported JSON file can be imported again.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::calendar::CalendarEntry;

/// One scheduled class session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LectureEvent {
    pub id: String,

    /// Set when `id` was generated because the source had none
    #[serde(rename = "platzhalter_id", default, skip_serializing_if = "is_false")]
    pub placeholder_id: bool,

    /// `"{subject} - {title}"`
    #[serde(rename = "bezeichnung")]
    pub summary: String,

    pub start: DateTime<FixedOffset>,

    #[serde(rename = "ende")]
    pub end: DateTime<FixedOffset>,

    #[serde(rename = "fach")]
    pub subject: String,

    #[serde(rename = "titel")]
    pub title: String,

    #[serde(rename = "dozent", default)]
    pub lecturer: String,

    #[serde(rename = "raum", default)]
    pub room: String,

    #[serde(rename = "typ", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(rename = "quelle", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(rename = "hinweis", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(rename = "farbe")]
    pub color: String,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// All events of one day, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDay {
    #[serde(rename = "wochentag")]
    pub weekday: String,

    #[serde(rename = "vorlesungen")]
    pub events: Vec<LectureEvent>,
}

/// The events of one completed fetch or import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(rename = "tage")]
    pub days: Vec<ScheduleDay>,
}

impl LectureEvent {
    pub fn compose_summary(subject: &str, title: &str) -> String {
        format!("{} - {}", subject, title)
    }

    pub fn to_calendar_entry(&self) -> CalendarEntry {
        CalendarEntry {
            id: self.id.clone(),
            title: self.summary.clone(),
            start: self.start,
            end: self.end,
            background_color: self.color.clone(),
            border_color: self.color.clone(),
            lecturer: self.lecturer.clone(),
            room: self.room.clone(),
            kind: self.kind.clone(),
            subject: self.subject.clone(),
            source: self.source.clone(),
        }
    }
}

impl ResultSet {
    pub fn new(days: Vec<ScheduleDay>) -> Self {
        ResultSet { days }
    }

    pub fn events(&self) -> impl Iterator<Item = &LectureEvent> {
        self.days.iter().flat_map(|d| d.events.iter())
    }

    /// Events paired with the weekday label of their enclosing day.
    pub fn events_with_weekday(&self) -> impl Iterator<Item = (&str, &LectureEvent)> {
        self.days
            .iter()
            .flat_map(|d| d.events.iter().map(move |e| (d.weekday.as_str(), e)))
    }

    pub fn event_count(&self) -> usize {
        self.days.iter().map(|d| d.events.len()).sum()
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Number of distinct subject codes.
    pub fn subject_count(&self) -> usize {
        self.events()
            .map(|e| e.subject.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_count() == 0
    }

    pub fn calendar_entries(&self) -> Vec<CalendarEntry> {
        self.events().map(LectureEvent::to_calendar_entry).collect()
    }
}
