//! Comma-separated text → header-keyed row records.
//!
//! Handles the subset of RFC 4180 that spreadsheet exports produce: quoted
//! fields with doubled quotes, embedded commas and line breaks, CRLF or LF
//! line endings and an optional UTF-8 byte-order mark.

use std::collections::HashMap;

/// Columns every imported row needs.
pub const REQUIRED_COLUMNS: [&str; 5] = ["Datum", "Start", "Ende", "Fach", "Titel"];

/// One data row, keyed by header name.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularRow {
    /// 1-based position among the non-empty data rows
    pub number: usize,
    values: HashMap<String, String>,
}

impl TabularRow {
    pub fn new(number: usize, values: HashMap<String, String>) -> Self {
        TabularRow { number, values }
    }

    /// Trimmed value of `column`; blank values count as missing.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Required columns this row has no value for.
    pub fn missing_required(&self) -> Vec<&'static str> {
        REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| self.get(c).is_none())
            .collect()
    }
}

/// Parse text with a header line into row records. Blank lines are skipped.
pub fn parse_rows(text: &str) -> Vec<TabularRow> {
    let mut records = parse_records(text).into_iter();

    let Some(header) = records.next() else {
        return Vec::new();
    };
    let header: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();

    records
        .enumerate()
        .map(|(i, fields)| {
            let values = header
                .iter()
                .cloned()
                .zip(fields)
                .collect::<HashMap<String, String>>();
            TabularRow::new(i + 1, values)
        })
        .collect()
}

/// Split text into records of fields, dropping blank lines.
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }

    records
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.iter().all(|f| f.trim().is_empty());
    if !blank {
        records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_fields() {
        let records = parse_records("a,\"b, c\",\"say \"\"hi\"\"\"\n\"multi\nline\",x,\n");

        assert_eq!(
            records,
            vec![
                vec!["a".to_string(), "b, c".to_string(), "say \"hi\"".to_string()],
                vec!["multi\nline".to_string(), "x".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn test_crlf_bom_and_blank_lines() {
        let records = parse_records("\u{feff}Datum,Fach\r\n\r\n2025-04-07,PROG2\r\n,\r\n");

        assert_eq!(records.len(), 2, "got {:?}", records);
        assert_eq!(records[0], vec!["Datum", "Fach"]);
        assert_eq!(records[1], vec!["2025-04-07", "PROG2"]);
    }

    #[test]
    fn test_last_line_without_newline() {
        let records = parse_records("a,b\nc,d");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], vec!["c", "d"]);
    }

    #[test]
    fn test_rows_are_keyed_by_header() {
        let rows = parse_rows("Datum, Start ,Ende,Fach,Titel\n2025-04-07,08:15,09:45,PROG2,Programmieren\n");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].number, 1);
        assert_eq!(rows[0].get("Start"), Some("08:15"), "header names are trimmed");
        assert!(rows[0].missing_required().is_empty());
    }

    #[test]
    fn test_short_row_is_missing_trailing_columns() {
        let rows = parse_rows("Datum,Start,Ende,Fach,Titel\n2025-04-07,08:15\n");

        assert_eq!(rows[0].missing_required(), vec!["Ende", "Fach", "Titel"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_rows("").is_empty());
        assert!(parse_rows("Datum,Start\n").is_empty());
    }
}
