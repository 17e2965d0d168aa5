//! Terminal rendering for schedule types.
//!
//! Extension traits that add colored output to core types using owo_colors.

use chrono::{Datelike, NaiveDate};
use owo_colors::OwoColorize;
use thws_scheduler_core::calendar::{CalendarEntry, CalendarView};
use thws_scheduler_core::color::hex_to_rgb;
use thws_scheduler_core::event::{LectureEvent, ResultSet};
use thws_scheduler_core::metadata::{MetadataSnapshot, Program};
use thws_scheduler_core::time::german_weekday;

pub trait Render {
    fn render(&self) -> String;
}

/// A block in the event's color, plain when the color is not a hex value.
fn swatch(color: &str) -> String {
    match hex_to_rgb(color) {
        Some((r, g, b)) => "●".truecolor(r, g, b).to_string(),
        None => "●".to_string(),
    }
}

fn time_range(event: &LectureEvent) -> String {
    format!("{}-{}", event.start.format("%H:%M"), event.end.format("%H:%M"))
}

impl Render for LectureEvent {
    fn render(&self) -> String {
        let mut line = format!(
            "   {} {} {} {}",
            swatch(&self.color),
            time_range(self).dimmed(),
            self.subject.bold(),
            self.title
        );

        let details: Vec<&str> = [self.kind.as_deref(), Some(self.lecturer.as_str()), Some(self.room.as_str())]
            .into_iter()
            .flatten()
            .filter(|d| !d.is_empty())
            .collect();
        if !details.is_empty() {
            line.push_str(&format!("  {}", details.join(" · ").dimmed()));
        }

        if let Some(note) = &self.note {
            line.push_str(&format!("\n      {} {}", "Hinweis:".yellow(), note));
        }

        line
    }
}

impl Render for ResultSet {
    fn render(&self) -> String {
        if self.is_empty() {
            return "   No lectures".dimmed().to_string();
        }

        let mut lines = Vec::new();
        for (i, day) in self.days.iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.push(day.weekday.bold().to_string());
            lines.extend(day.events.iter().map(Render::render));
        }
        lines.join("\n")
    }
}

fn pluralize<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

/// `"3 lectures, 2 days, 2 subjects"`
pub fn render_summary(result: &ResultSet) -> String {
    let events = result.event_count();
    let days = result.day_count();
    let subjects = result.subject_count();

    format!(
        "{} {}, {} {}, {} {}",
        events,
        pluralize(events, "lecture", "lectures"),
        days,
        pluralize(days, "day", "days"),
        subjects,
        pluralize(subjects, "subject", "subjects"),
    )
}

impl Render for Program {
    fn render(&self) -> String {
        let mut lines = vec![format!("🎓 {} {}", self.label().bold(), format!("({})", self.name).dimmed())];

        for semester in &self.semesters {
            lines.push(format!("   {} {}", semester.index.to_string().cyan(), semester.name));

            let groups = semester.groups();
            if !groups.is_empty() {
                lines.push(format!("      {} {}", "Groups:".dimmed(), groups.join(", ")));
            }

            for module in &semester.modules {
                lines.push(format!("      {} {}", module.abbreviation.green(), module.name));
            }
        }

        lines.join("\n")
    }
}

impl Render for MetadataSnapshot {
    fn render(&self) -> String {
        let mut lines = Vec::new();

        if let Some(current) = &self.semester_info.current_semester {
            let period = self
                .semester_info
                .period
                .as_deref()
                .map(|p| format!(" ({})", p))
                .unwrap_or_default();
            lines.push(format!("{} {}{}", "Semester:".bold(), current, period));
        }
        if let Some(fetched_at) = &self.fetched_at {
            lines.push(format!("{} {}", "Updated:".dimmed(), fetched_at.dimmed()));
        }

        for program in &self.programs {
            lines.push(String::new());
            lines.push(program.render());
        }

        lines.join("\n")
    }
}

/// Agenda view of calendar entries, one block per date.
pub fn render_agenda(entries: &[CalendarEntry]) -> String {
    let mut sorted: Vec<&CalendarEntry> = entries.iter().collect();
    sorted.sort_by_key(|e| e.start);

    let mut lines = Vec::new();
    let mut current: Option<NaiveDate> = None;

    for entry in sorted {
        let date = entry.start.date_naive();
        if current != Some(date) {
            if current.is_some() {
                lines.push(String::new());
            }
            let header = format!("{} {}", german_weekday(date.weekday()), date.format("%d.%m.%Y"));
            lines.push(header.bold().underline().to_string());
            current = Some(date);
        }

        let room = if entry.room.is_empty() {
            String::new()
        } else {
            format!(" @ {}", entry.room)
        };
        lines.push(format!(
            "   {} {}-{} {}{}",
            swatch(&entry.background_color),
            entry.start.format("%H:%M"),
            entry.end.format("%H:%M"),
            entry.title,
            room.dimmed()
        ));
    }

    lines.join("\n")
}

/// Calendar view that prints an agenda to stdout.
#[derive(Debug, Default)]
pub struct TerminalCalendar {
    shown: usize,
}

impl TerminalCalendar {
    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl CalendarView for TerminalCalendar {
    fn show(&mut self, entries: &[CalendarEntry]) {
        self.shown = entries.len();
        if entries.is_empty() {
            println!("{}", "Calendar is empty".dimmed());
        } else {
            println!("{}", render_agenda(entries));
        }
    }

    fn clear(&mut self) {
        self.shown = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;
    use thws_scheduler_core::import::import_tabular;

    fn make_test_result_set() -> ResultSet {
        let csv = "Datum,Start,Ende,Fach,Titel,Dozent,Raum,Typ\n\
                   2025-04-08,10:00,11:30,MA2,Mathematik 2,Beispiel,H.1.2,V\n\
                   2025-04-07,08:15,09:45,PROG2,Programmieren 2,Muster,H.1.1,V\n";
        import_tabular(csv, Tz::Europe__Berlin).unwrap().result
    }

    #[test]
    fn test_summary_counts() {
        let result = make_test_result_set();
        assert_eq!(render_summary(&result), "2 lectures, 2 days, 2 subjects");
    }

    #[test]
    fn test_agenda_is_sorted_by_start() {
        let mut entries = make_test_result_set().calendar_entries();
        entries.reverse();

        let agenda = render_agenda(&entries);
        let prog = agenda.find("PROG2").unwrap();
        let math = agenda.find("MA2").unwrap();

        assert!(prog < math, "got:\n{agenda}");
        assert!(agenda.contains("07.04.2025"), "got:\n{agenda}");
        assert!(agenda.contains("H.1.1"));
    }

    #[test]
    fn test_table_lists_every_event() {
        let table = make_test_result_set().render();

        assert!(table.contains("Montag"), "got:\n{table}");
        assert!(table.contains("Programmieren 2"));
        assert!(table.contains("Mathematik 2"));
    }

    #[test]
    fn test_terminal_calendar_tracks_shown_entries() {
        let entries = make_test_result_set().calendar_entries();
        let mut view = TerminalCalendar::default();

        view.show(&entries);
        assert_eq!(view.shown(), 2);
        view.clear();
        assert_eq!(view.shown(), 0);
    }
}
