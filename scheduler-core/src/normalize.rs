//! Raw records → canonical [`LectureEvent`]s.
//!
//! Both input variants (API JSON and uploaded rows) go through one
//! [`Normalizer`], which owns the color assignment and id bookkeeping for a
//! single rendering pass.

use std::collections::HashSet;

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::api::{RawLecture, RawSchedule};
use crate::color::ColorAssigner;
use crate::error::{ScheduleError, ScheduleResult};
use crate::event::{LectureEvent, ResultSet, ScheduleDay};
use crate::tabular::TabularRow;
use crate::time::{combine_date_time, parse_timestamp};

/// Normalizes records for one result set.
#[derive(Debug)]
pub struct Normalizer {
    tz: Tz,
    colors: ColorAssigner,
    seen_ids: HashSet<String>,
    placeholders: usize,
}

/// Fields shared by both input variants once required values are present.
struct Parts<'a> {
    id: Option<&'a str>,
    /// `id` came from an earlier run's generated placeholder
    generated: bool,
    placeholder: String,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
    subject: &'a str,
    title: &'a str,
    lecturer: Option<&'a str>,
    room: Option<&'a str>,
    kind: Option<&'a str>,
    source: Option<&'a str>,
    note: Option<&'a str>,
}

impl Normalizer {
    pub fn new(tz: Tz) -> Self {
        Normalizer {
            tz,
            colors: ColorAssigner::new(),
            seen_ids: HashSet::new(),
            placeholders: 0,
        }
    }

    /// Number of distinct subjects normalized so far.
    pub fn subject_count(&self) -> usize {
        self.colors.len()
    }

    /// Normalize one lecture entry from the API.
    pub fn normalize_remote(&mut self, lecture: &RawLecture) -> ScheduleResult<LectureEvent> {
        if let Some(reason) = &lecture.invalid {
            return Err(ScheduleError::MalformedRecord(reason.clone()));
        }

        let start_raw = required(lecture.start.as_deref(), "start")?;
        let end_raw = required(lecture.ende.as_deref(), "ende")?;
        let subject = required(lecture.fach.as_deref(), "fach")?;
        let title = required(lecture.titel.as_deref(), "titel")?;

        let start = parse_timestamp(start_raw, self.tz).ok_or_else(|| {
            ScheduleError::MalformedRecord(format!("invalid start timestamp '{}'", start_raw))
        })?;
        let end = parse_timestamp(end_raw, self.tz).ok_or_else(|| {
            ScheduleError::MalformedRecord(format!("invalid end timestamp '{}'", end_raw))
        })?;

        let placeholder = format!("event-{}", self.placeholders + 1);

        self.finish(Parts {
            id: lecture.id.as_deref(),
            generated: lecture.platzhalter_id,
            placeholder,
            start,
            end,
            subject,
            title,
            lecturer: lecture.dozent.as_deref(),
            room: lecture.raum.as_deref(),
            kind: lecture.typ.as_deref(),
            source: lecture.quelle.as_deref(),
            note: lecture.hinweis.as_deref(),
        })
    }

    /// Normalize one uploaded row.
    pub fn normalize_row(&mut self, row: &TabularRow) -> ScheduleResult<LectureEvent> {
        let missing = row.missing_required();
        if !missing.is_empty() {
            return Err(ScheduleError::MalformedRecord(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )));
        }

        // Presence was checked above
        let date = row.get("Datum").unwrap_or_default();
        let start_time = row.get("Start").unwrap_or_default();
        let end_time = row.get("Ende").unwrap_or_default();

        let (Some(start), Some(end)) = (
            combine_date_time(date, start_time, self.tz),
            combine_date_time(date, end_time, self.tz),
        ) else {
            return Err(ScheduleError::MalformedRecord(format!(
                "invalid date or time '{} {}-{}'",
                date, start_time, end_time
            )));
        };

        self.finish(Parts {
            id: None,
            generated: false,
            placeholder: format!("csv-event-{}", row.number),
            start,
            end,
            subject: row.get("Fach").unwrap_or_default(),
            title: row.get("Titel").unwrap_or_default(),
            lecturer: row.get("Dozent"),
            room: row.get("Raum"),
            kind: row.get("Typ"),
            source: row.get("Quelle"),
            note: row.get("Hinweis"),
        })
    }

    fn finish(&mut self, parts: Parts<'_>) -> ScheduleResult<LectureEvent> {
        if parts.end < parts.start {
            return Err(ScheduleError::MalformedRecord(format!(
                "end {} is before start {}",
                parts.end, parts.start
            )));
        }

        let placeholder_id = parts.id.is_none() || parts.generated;
        let base_id = match parts.id {
            Some(id) => id.to_string(),
            None => {
                self.placeholders += 1;
                parts.placeholder
            }
        };
        let id = self.unique_id(base_id);

        Ok(LectureEvent {
            id,
            placeholder_id,
            summary: LectureEvent::compose_summary(parts.subject, parts.title),
            start: parts.start,
            end: parts.end,
            subject: parts.subject.to_string(),
            title: parts.title.to_string(),
            lecturer: parts.lecturer.unwrap_or_default().to_string(),
            room: parts.room.unwrap_or_default().to_string(),
            kind: parts.kind.map(str::to_string),
            source: parts.source.map(str::to_string),
            note: parts.note.map(str::to_string),
            color: self.colors.color_for(parts.subject).to_string(),
        })
    }

    fn unique_id(&mut self, base: String) -> String {
        let mut id = base.clone();
        let mut n = 2;
        while self.seen_ids.contains(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }
        self.seen_ids.insert(id.clone());
        id
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> ScheduleResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ScheduleError::MalformedRecord(format!("missing required field '{}'", field)))
}

/// Build a result set from an API response.
///
/// Malformed entries are logged and skipped. Days left without events are
/// dropped. Fails with [`ScheduleError::NoEventsFound`] if nothing remains.
pub fn build_result_set(raw: &RawSchedule, tz: Tz) -> ScheduleResult<ResultSet> {
    let mut normalizer = Normalizer::new(tz);
    let mut days = Vec::with_capacity(raw.tage.len());
    let mut skipped = 0;

    for day in &raw.tage {
        let mut events = Vec::with_capacity(day.vorlesungen.len());

        for (i, lecture) in day.vorlesungen.iter().enumerate() {
            match normalizer.normalize_remote(lecture) {
                Ok(event) => events.push(event),
                Err(e) => {
                    skipped += 1;
                    warn!(weekday = %day.wochentag, entry = i + 1, error = %e, "skipping lecture");
                }
            }
        }

        if !events.is_empty() {
            days.push(ScheduleDay {
                weekday: day.wochentag.clone(),
                events,
            });
        }
    }

    let result = ResultSet::new(days);
    debug!(
        events = result.event_count(),
        days = result.day_count(),
        skipped,
        "normalized schedule"
    );

    if result.is_empty() {
        return Err(ScheduleError::NoEventsFound);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RawDay;
    use crate::color::PALETTE;
    use chrono::Timelike;

    fn make_raw_lecture(subject: &str, start: &str, end: &str) -> RawLecture {
        RawLecture {
            start: Some(start.to_string()),
            ende: Some(end.to_string()),
            fach: Some(subject.to_string()),
            titel: Some("Vorlesung".to_string()),
            dozent: Some("Prof. Dr. Muster".to_string()),
            raum: Some("H.1.1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_remote_record_becomes_event() {
        let mut normalizer = Normalizer::new(Tz::Europe__Berlin);
        let mut lecture = make_raw_lecture("PROG2", "2025-04-07T08:15:00", "2025-04-07T09:45:00");
        lecture.id = Some("abc".to_string());
        lecture.hinweis = Some("Raumänderung".to_string());

        let event = normalizer.normalize_remote(&lecture).unwrap();

        assert_eq!(event.summary, "PROG2 - Vorlesung");
        assert_eq!(event.id, "abc");
        assert!(!event.placeholder_id);
        assert!(event.start <= event.end);
        assert_eq!(event.start.hour(), 8);
        assert_eq!(event.note.as_deref(), Some("Raumänderung"));
        assert_eq!(event.kind, None);
        assert_eq!(event.color, PALETTE[0]);
    }

    #[test]
    fn test_missing_required_field_is_malformed() {
        let mut normalizer = Normalizer::new(Tz::Europe__Berlin);
        let mut lecture = make_raw_lecture("PROG2", "2025-04-07T08:15:00", "2025-04-07T09:45:00");
        lecture.titel = None;

        let err = normalizer.normalize_remote(&lecture).unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedRecord(_)), "{err}");
    }

    #[test]
    fn test_unparseable_or_reversed_times_are_malformed() {
        let mut normalizer = Normalizer::new(Tz::Europe__Berlin);

        let bad = make_raw_lecture("PROG2", "gestern", "2025-04-07T09:45:00");
        assert!(normalizer.normalize_remote(&bad).is_err());

        let reversed = make_raw_lecture("PROG2", "2025-04-07T10:00:00", "2025-04-07T09:00:00");
        assert!(normalizer.normalize_remote(&reversed).is_err());
    }

    #[test]
    fn test_placeholder_ids_are_unique() {
        let mut normalizer = Normalizer::new(Tz::Europe__Berlin);
        let lecture = make_raw_lecture("PROG2", "2025-04-07T08:15:00", "2025-04-07T09:45:00");
        let mut with_id = lecture.clone();
        with_id.id = Some("event-2".to_string());

        let first = normalizer.normalize_remote(&lecture).unwrap();
        let second = normalizer.normalize_remote(&with_id).unwrap();
        let third = normalizer.normalize_remote(&lecture).unwrap();

        assert_eq!(first.id, "event-1");
        assert!(first.placeholder_id);
        assert_eq!(second.id, "event-2");
        assert_eq!(third.id, "event-2-2", "collision with a source id gets a suffix");
        assert!(third.placeholder_id);
    }

    #[test]
    fn test_undecodable_entry_is_malformed() {
        let mut normalizer = Normalizer::new(Tz::Europe__Berlin);
        let lecture = RawLecture {
            invalid: Some("invalid type: boolean `true`".to_string()),
            ..make_raw_lecture("PROG2", "2025-04-07T08:15:00", "2025-04-07T09:45:00")
        };

        let err = normalizer.normalize_remote(&lecture).unwrap_err();
        assert!(matches!(err, ScheduleError::MalformedRecord(_)), "{err}");
    }

    #[test]
    fn test_generated_id_stays_a_placeholder() {
        let mut normalizer = Normalizer::new(Tz::Europe__Berlin);
        let mut lecture = make_raw_lecture("PROG2", "2025-04-07T08:15:00", "2025-04-07T09:45:00");
        lecture.id = Some("event-1".to_string());
        lecture.platzhalter_id = true;

        let event = normalizer.normalize_remote(&lecture).unwrap();

        assert_eq!(event.id, "event-1");
        assert!(event.placeholder_id);
    }

    #[test]
    fn test_colors_follow_subject_order() {
        let mut normalizer = Normalizer::new(Tz::Europe__Berlin);
        let colors: Vec<String> = ["A", "B", "A", "C"]
            .iter()
            .map(|s| {
                let lecture = make_raw_lecture(s, "2025-04-07T08:15:00", "2025-04-07T09:45:00");
                normalizer.normalize_remote(&lecture).unwrap().color
            })
            .collect();

        assert_eq!(colors[0], colors[2]);
        assert_eq!(colors[0], PALETTE[0]);
        assert_eq!(colors[1], PALETTE[1]);
        assert_eq!(colors[3], PALETTE[2]);
        assert_eq!(normalizer.subject_count(), 3);
    }

    #[test]
    fn test_tabular_row_variant() {
        let rows = crate::tabular::parse_rows(
            "Datum,Start,Ende,Fach,Titel,Dozent,Raum,Typ,Quelle\n\
             2025-04-07,08:15,09:45,PROG2,Programmieren 2,Muster,H.1.1,V,INF 2\n",
        );
        let mut normalizer = Normalizer::new(Tz::Europe__Berlin);

        let event = normalizer.normalize_row(&rows[0]).unwrap();

        assert_eq!(event.id, "csv-event-1");
        assert!(event.placeholder_id);
        assert_eq!(event.summary, "PROG2 - Programmieren 2");
        assert_eq!(event.start.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(event.end.hour(), 9);
        assert_eq!(event.kind.as_deref(), Some("V"));
        assert_eq!(event.source.as_deref(), Some("INF 2"));
    }

    #[test]
    fn test_build_result_set_skips_bad_records_and_empty_days() {
        let raw = RawSchedule {
            tage: vec![
                RawDay {
                    wochentag: "Montag".to_string(),
                    vorlesungen: vec![
                        make_raw_lecture("PROG2", "2025-04-07T08:15:00", "2025-04-07T09:45:00"),
                        RawLecture::default(),
                        make_raw_lecture("MA2", "2025-04-07T10:00:00", "2025-04-07T11:30:00"),
                    ],
                },
                RawDay {
                    wochentag: "Dienstag".to_string(),
                    vorlesungen: vec![RawLecture::default()],
                },
            ],
        };

        let result = build_result_set(&raw, Tz::Europe__Berlin).unwrap();

        assert_eq!(result.day_count(), 1);
        assert_eq!(result.event_count(), 2);
        assert_eq!(result.subject_count(), 2);
        assert_eq!(result.days[0].weekday, "Montag");
    }

    #[test]
    fn test_one_entry_with_unexpected_types_keeps_the_rest() {
        let body = r#"{"tage":[{"wochentag":"Montag","vorlesungen":[
            {"start":"2025-04-07T08:15:00","ende":"2025-04-07T09:45:00","fach":"PROG2","titel":"Programmieren 2"},
            {"start":"2025-04-07T10:00:00","ende":"2025-04-07T11:30:00","fach":"MA2","titel":"Mathe 2","raum":101},
            {"start":"2025-04-07T12:00:00","ende":"2025-04-07T13:30:00","fach":"DB","titel":{"de":"Datenbanken"}}
        ]}]}"#;
        let raw = RawSchedule::from_response(200, Some("application/json"), body.as_bytes()).unwrap();

        let result = build_result_set(&raw, Tz::Europe__Berlin).unwrap();

        let subjects: Vec<&str> = result.events().map(|e| e.subject.as_str()).collect();
        assert_eq!(subjects, ["PROG2", "MA2"]);
        assert_eq!(result.days[0].events[1].room, "101");
    }

    #[test]
    fn test_build_result_set_without_events() {
        let raw = RawSchedule {
            tage: vec![RawDay {
                wochentag: "Montag".to_string(),
                vorlesungen: vec![RawLecture::default()],
            }],
        };

        assert!(matches!(
            build_result_set(&raw, Tz::Europe__Berlin),
            Err(ScheduleError::NoEventsFound)
        ));
        assert!(matches!(
            build_result_set(&RawSchedule::default(), Tz::Europe__Berlin),
            Err(ScheduleError::NoEventsFound)
        ));
    }
}
