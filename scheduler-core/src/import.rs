//! Uploaded files → result set.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{Datelike, NaiveDate};
use chrono_tz::Tz;
use tracing::{info, warn};

use crate::api::RawSchedule;
use crate::error::{ScheduleError, ScheduleResult};
use crate::event::{LectureEvent, ResultSet, ScheduleDay};
use crate::normalize::{Normalizer, build_result_set};
use crate::tabular::parse_rows;
use crate::time::german_weekday;

/// File formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    /// Schedule JSON as served by the API (or as written by the JSON export)
    Json,
}

impl ImportFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_path(path: &Path) -> ScheduleResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv") => Ok(ImportFormat::Csv),
            Some("json") => Ok(ImportFormat::Json),
            _ => Err(ScheduleError::UnsupportedFileType(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            )),
        }
    }
}

/// A row that did not make it into the result set.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ImportReport {
    pub result: ResultSet,
    pub skipped: Vec<SkippedRow>,
}

/// Read and import a file. The type is checked before the file is read.
pub fn import_file(path: &Path, tz: Tz) -> ScheduleResult<ImportReport> {
    let format = ImportFormat::from_path(path)?;
    let bytes = std::fs::read(path)?;
    info!(path = %path.display(), ?format, "importing file");
    import_bytes(format, &bytes, tz)
}

pub fn import_bytes(format: ImportFormat, bytes: &[u8], tz: Tz) -> ScheduleResult<ImportReport> {
    let text = String::from_utf8_lossy(bytes);

    match format {
        ImportFormat::Csv => import_tabular(&text, tz),
        ImportFormat::Json => {
            let raw: RawSchedule =
                serde_json::from_str(text.strip_prefix('\u{feff}').unwrap_or(&text))?;
            Ok(ImportReport {
                result: build_result_set(&raw, tz)?,
                skipped: Vec::new(),
            })
        }
    }
}

/// Import comma-separated rows with the German column headers.
///
/// Rows lacking a required column or carrying an invalid date/time are
/// skipped and reported. Events are grouped into days by their local start
/// date. Fails with [`ScheduleError::NoEventsFound`] when no row is usable.
pub fn import_tabular(text: &str, tz: Tz) -> ScheduleResult<ImportReport> {
    let rows = parse_rows(text);
    let mut normalizer = Normalizer::new(tz);
    let mut by_date: BTreeMap<NaiveDate, Vec<LectureEvent>> = BTreeMap::new();
    let mut skipped = Vec::new();

    for row in &rows {
        match normalizer.normalize_row(row) {
            Ok(event) => by_date.entry(event.start.date_naive()).or_default().push(event),
            Err(e) => {
                let reason = match e {
                    ScheduleError::MalformedRecord(reason) => reason,
                    other => other.to_string(),
                };
                warn!(row = row.number, reason = %reason, "skipping row");
                skipped.push(SkippedRow {
                    row: row.number,
                    reason,
                });
            }
        }
    }

    let days: Vec<ScheduleDay> = by_date
        .into_iter()
        .map(|(date, events)| ScheduleDay {
            weekday: german_weekday(date.weekday()).to_string(),
            events,
        })
        .collect();

    let result = ResultSet::new(days);
    if result.is_empty() {
        return Err(ScheduleError::NoEventsFound);
    }

    info!(
        events = result.event_count(),
        skipped = skipped.len(),
        "imported rows"
    );

    Ok(ImportReport { result, skipped })
}
