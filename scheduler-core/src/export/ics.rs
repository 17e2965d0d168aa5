//! iCalendar output.
//!
//! Written by hand rather than through a calendar builder so the property set
//! stays exactly what calendar apps importing a lecture plan need.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::constants::{ICS_PRODUCT_ID, ICS_UID_DOMAIN};
use crate::event::{LectureEvent, ResultSet};

const MAX_LINE_OCTETS: usize = 75;

pub fn encode_ics(result: &ResultSet) -> String {
    encode_ics_at(result, Utc::now())
}

/// Encode with `now` as the DTSTAMP of every event.
pub fn encode_ics_at(result: &ResultSet, now: DateTime<Utc>) -> String {
    let stamp = format_utc(&now);
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", ICS_PRODUCT_ID),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
    ];

    let mut seen_uids = HashSet::new();
    for event in result.events() {
        let uid = unique_uid(&mut seen_uids, event);
        push_event(&mut lines, event, &uid, &stamp);
    }

    lines.push("END:VCALENDAR".to_string());

    let mut out = String::new();
    for line in &lines {
        out.push_str(&fold_line(line));
        out.push_str("\r\n");
    }
    out
}

/// `{id}-{start millis}@domain`, with `event` in place of generated ids.
/// Placeholder events starting together would share a UID and be merged by
/// calendar apps, so repeats get a `-2`, `-3`, ... suffix before the domain.
fn unique_uid(seen: &mut HashSet<String>, event: &LectureEvent) -> String {
    let prefix = if event.placeholder_id {
        "event"
    } else {
        event.id.as_str()
    };
    let base = format!("{}-{}", prefix, event.start.timestamp_millis());

    let mut local = base.clone();
    let mut n = 2;
    while seen.contains(&local) {
        local = format!("{}-{}", base, n);
        n += 1;
    }
    seen.insert(local.clone());

    format!("{}@{}", local, ICS_UID_DOMAIN)
}

fn push_event(lines: &mut Vec<String>, event: &LectureEvent, uid: &str, stamp: &str) {
    lines.push("BEGIN:VEVENT".to_string());
    lines.push(format!("UID:{}", uid));
    lines.push(format!("DTSTAMP:{}", stamp));
    lines.push(format!("DTSTART:{}", format_utc(&event.start.with_timezone(&Utc))));
    lines.push(format!("DTEND:{}", format_utc(&event.end.with_timezone(&Utc))));
    lines.push(format!("SUMMARY:{}", escape_text(&event.summary)));
    lines.push(format!("DESCRIPTION:{}", escape_text(&description(event))));
    lines.push(format!("LOCATION:{}", escape_text(&event.room)));
    lines.push("END:VEVENT".to_string());
}

/// Detail lines shown in the calendar app. Joined with real newlines, which
/// `escape_text` turns into the `\n` escape.
fn description(event: &LectureEvent) -> String {
    let mut text = [
        format!("Fach: {}", event.subject),
        format!("Titel: {}", event.title),
        format!("Dozent: {}", event.lecturer),
        format!("Typ: {}", event.kind.as_deref().unwrap_or_default()),
        format!("Quelle: {}", event.source.as_deref().unwrap_or_default()),
    ]
    .join("\n");

    if let Some(note) = &event.note {
        text.push_str("\n\nHinweis: ");
        text.push_str(note);
    }

    text
}

fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape a TEXT value (RFC 5545 §3.3.11).
pub(crate) fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }

    out
}

/// Split a content line into chunks of at most 75 octets, continuation
/// lines starting with a single space. Never splits inside a UTF-8 sequence.
pub(crate) fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + line.len() / MAX_LINE_OCTETS * 3);
    let mut used = 0;
    // The leading space of a continuation line counts toward its length
    let mut limit = MAX_LINE_OCTETS;

    for c in line.chars() {
        let width = c.len_utf8();
        if used + width > limit {
            out.push_str("\r\n ");
            used = 0;
            limit = MAX_LINE_OCTETS - 1;
        }
        out.push(c);
        used += width;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::tests::{make_test_event, make_test_result_set};
    use crate::event::ScheduleDay;
    use chrono::TimeZone;
    use icalendar::parser::{read_calendar, unfold};

    fn make_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap()
    }

    fn single(event: LectureEvent) -> ResultSet {
        ResultSet::new(vec![ScheduleDay {
            weekday: "Montag".to_string(),
            events: vec![event],
        }])
    }

    #[test]
    fn test_event_properties() {
        let event = make_test_event("42", "PROG2", 8);
        let millis = event.start.timestamp_millis();
        let ics = encode_ics_at(&single(event), make_now());

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n"), "got:\n{ics}");
        assert!(ics.contains("PRODID:-//THWS Scheduler//DE\r\n"));
        assert!(ics.contains(&format!("UID:42-{}@thws-scheduler\r\n", millis)), "got:\n{ics}");
        assert!(ics.contains("DTSTAMP:20250401T120000Z\r\n"));
        // 08:15 CEST is 06:15 UTC
        assert!(ics.contains("DTSTART:20250407T061500Z\r\n"), "got:\n{ics}");
        assert!(ics.contains("DTEND:20250407T074500Z\r\n"), "got:\n{ics}");
        assert!(ics.contains("SUMMARY:PROG2 - Vorlesung\r\n"));
        assert!(ics.contains("LOCATION:H.1.1\r\n"));
        assert!(ics.ends_with("END:VEVENT\r\nEND:VCALENDAR\r\n"), "got:\n{ics}");
    }

    #[test]
    fn test_placeholder_id_uses_generic_uid_prefix() {
        let mut event = make_test_event("csv-event-3", "PROG2", 8);
        event.placeholder_id = true;
        let millis = event.start.timestamp_millis();

        let ics = encode_ics_at(&single(event), make_now());

        assert!(ics.contains(&format!("UID:event-{}@thws-scheduler", millis)), "got:\n{ics}");
        assert!(!ics.contains("csv-event-3"));
    }

    #[test]
    fn test_parallel_placeholder_events_get_distinct_uids() {
        let mut first = make_test_event("event-1", "PROG2", 8);
        first.placeholder_id = true;
        let mut second = make_test_event("event-2", "PROG2", 8);
        second.placeholder_id = true;
        second.room = "H.1.2".to_string();
        let millis = first.start.timestamp_millis();

        let result = ResultSet::new(vec![ScheduleDay {
            weekday: "Montag".to_string(),
            events: vec![first, second],
        }]);
        let ics = encode_ics_at(&result, make_now());

        assert!(ics.contains(&format!("UID:event-{}@thws-scheduler\r\n", millis)), "got:\n{ics}");
        assert!(ics.contains(&format!("UID:event-{}-2@thws-scheduler\r\n", millis)), "got:\n{ics}");
    }

    #[test]
    fn test_description_lines_and_note() {
        let mut event = make_test_event("1", "PROG2", 8);
        let ics = encode_ics_at(&single(event.clone()), make_now()).replace("\r\n ", "");

        assert!(
            ics.contains(
                "DESCRIPTION:Fach: PROG2\\nTitel: Vorlesung\\nDozent: Prof. Dr. Muster\\nTyp: V\\nQuelle: Informatik 2. Semester\r\n"
            ),
            "got:\n{ics}"
        );
        assert!(!ics.contains("Hinweis"));

        event.note = Some("Raum H.2.1".to_string());
        let ics = encode_ics_at(&single(event), make_now()).replace("\r\n ", "");
        assert!(ics.contains("Quelle: Informatik 2. Semester\\n\\nHinweis: Raum H.2.1\r\n"), "got:\n{ics}");
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a,b;c\\d"), "a\\,b\\;c\\\\d");
        assert_eq!(escape_text("eins\nzwei\r\ndrei"), "eins\\nzwei\\ndrei");
        assert_eq!(escape_text("Übung"), "Übung");
    }

    #[test]
    fn test_fold_line() {
        let short = "SUMMARY:kurz";
        assert_eq!(fold_line(short), short);

        let long = format!("DESCRIPTION:{}", "ä".repeat(60));
        let folded = fold_line(&long);
        let parts: Vec<&str> = folded.split("\r\n").collect();

        assert!(parts.len() > 1);
        for part in &parts {
            assert!(part.len() <= MAX_LINE_OCTETS, "line has {} octets: {part}", part.len());
        }
        assert!(parts[1..].iter().all(|p| p.starts_with(' ')));
        assert_eq!(folded.replace("\r\n ", ""), long);
    }

    #[test]
    fn test_output_parses_as_calendar() {
        let mut result = make_test_result_set();
        result.days[0].events[0].title = "Sehr langer Titel; mit Sonderzeichen, die escaped werden müssen und noch mehr Text".to_string();
        result.days[0].events[0].summary = LectureEvent::compose_summary("PROG2", &result.days[0].events[0].title);

        let ics = encode_ics_at(&result, make_now());
        for line in ics.split("\r\n") {
            assert!(line.len() <= MAX_LINE_OCTETS, "line too long: {line}");
        }

        let unfolded = unfold(&ics);
        let calendar = read_calendar(&unfolded).unwrap();
        let events: Vec<_> = calendar
            .components
            .iter()
            .filter(|c| c.name == "VEVENT")
            .collect();

        assert_eq!(events.len(), 3);
        let summary = events[0].find_prop("SUMMARY").unwrap().val.to_string();
        assert!(summary.starts_with("PROG2 - Sehr langer Titel"), "got: {summary}");
        assert!(summary.contains("Sonderzeichen"), "folded text is rejoined: {summary}");
    }
}
