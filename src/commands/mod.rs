pub mod fetch;
pub mod import;
pub mod info;
pub mod login;
pub mod logout;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use thws_scheduler_core::ResultSet;
use thws_scheduler_core::calendar::CalendarView;
use thws_scheduler_core::export::{ExportFormat, export};

use crate::render::{Render, TerminalCalendar, render_summary};

/// Print the result as a table, optionally followed by the calendar agenda.
pub fn show_result(result: &ResultSet, calendar: bool) {
    println!("{}", result.render());
    println!("\n{}", render_summary(result).dimmed());

    if calendar {
        println!();
        let mut view = TerminalCalendar::default();
        view.show(&result.calendar_entries());
    }
}

/// Write one file per requested format into `dir`. Duplicate formats are
/// written once.
pub fn write_exports(result: &ResultSet, formats: &[ExportFormat], dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    if formats.is_empty() {
        return Ok(written);
    }

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut seen = Vec::new();
    for &format in formats {
        if seen.contains(&format) {
            continue;
        }
        seen.push(format);

        let payload = export(result, format)?;
        let path = dir.join(payload.file_name());
        std::fs::write(&path, &payload.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        println!("{} {} ({})", "Wrote".green(), path.display(), format.media_type().dimmed());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Tz;
    use tempfile::TempDir;
    use thws_scheduler_core::import::import_tabular;

    fn make_test_result_set() -> ResultSet {
        let csv = "Datum,Start,Ende,Fach,Titel\n2025-04-07,08:15,09:45,PROG2,Programmieren 2\n";
        import_tabular(csv, Tz::Europe__Berlin).unwrap().result
    }

    #[test]
    fn test_write_exports() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("plans");
        let result = make_test_result_set();

        let written = write_exports(
            &result,
            &[ExportFormat::Csv, ExportFormat::Ics, ExportFormat::Csv],
            &out,
        )
        .unwrap();

        assert_eq!(written.len(), 2, "duplicates are written once");
        assert!(out.join("vorlesungsplan.csv").exists());

        let ics = std::fs::read_to_string(out.join("vorlesungsplan.ics")).unwrap();
        assert!(ics.contains("SUMMARY:PROG2 - Programmieren 2"), "got:\n{ics}");
    }

    #[test]
    fn test_write_exports_without_formats() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("untouched");

        let written = write_exports(&make_test_result_set(), &[], &out).unwrap();

        assert!(written.is_empty());
        assert!(!out.exists());
    }
}
