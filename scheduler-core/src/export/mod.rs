//! Result set → downloadable payloads.

mod csv;
mod ics;
mod json;

use std::fmt;
use std::str::FromStr;

use crate::error::{ScheduleError, ScheduleResult};
use crate::event::ResultSet;

pub use csv::{encode_csv, escape_csv_field};
pub use ics::{encode_ics, encode_ics_at};
pub use json::{decode_json, encode_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Json,
    Csv,
    Ics,
}

impl ExportFormat {
    pub fn all() -> [ExportFormat; 3] {
        [ExportFormat::Json, ExportFormat::Csv, ExportFormat::Ics]
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "vorlesungsplan.json",
            ExportFormat::Csv => "vorlesungsplan.csv",
            ExportFormat::Ics => "vorlesungsplan.ics",
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Ics => "text/calendar",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Ics => "ics",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "ics" | "ical" => Ok(ExportFormat::Ics),
            other => Err(format!(
                "unknown export format '{}' (expected json, csv or ics)",
                other
            )),
        }
    }
}

/// Encoded bytes ready to be written under `format.file_name()`.
#[derive(Debug, Clone)]
pub struct ExportPayload {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportPayload {
    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }
}

/// Encode `result` as `format`. An empty result set has nothing to export.
pub fn export(result: &ResultSet, format: ExportFormat) -> ScheduleResult<ExportPayload> {
    if result.is_empty() {
        return Err(ScheduleError::NoEventsFound);
    }

    let text = match format {
        ExportFormat::Json => encode_json(result)?,
        ExportFormat::Csv => encode_csv(result),
        ExportFormat::Ics => encode_ics(result),
    };

    Ok(ExportPayload {
        format,
        bytes: text.into_bytes(),
    })
}
