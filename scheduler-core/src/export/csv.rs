use crate::event::ResultSet;

const HEADER: [&str; 10] = [
    "Datum",
    "Wochentag",
    "Start",
    "Ende",
    "Fach",
    "Titel",
    "Typ",
    "Dozent",
    "Raum",
    "Quelle",
];

/// One row per event, prefixed with a UTF-8 byte-order mark so spreadsheet
/// programs pick the right encoding.
pub fn encode_csv(result: &ResultSet) -> String {
    let mut out = String::from("\u{feff}");
    out.push_str(&HEADER.join(","));
    out.push('\n');

    for (weekday, event) in result.events_with_weekday() {
        let date = event.start.format("%Y-%m-%d").to_string();
        let start = event.start.format("%H:%M").to_string();
        let end = event.end.format("%H:%M").to_string();

        let fields = [
            date.as_str(),
            weekday,
            start.as_str(),
            end.as_str(),
            event.subject.as_str(),
            event.title.as_str(),
            event.kind.as_deref().unwrap_or_default(),
            event.lecturer.as_str(),
            event.room.as_str(),
            event.source.as_deref().unwrap_or_default(),
        ];

        let row: Vec<String> = fields.iter().map(|f| escape_csv_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Quote `value` if it contains a comma, a line break or a double quote.
pub fn escape_csv_field(value: &str) -> String {
    if value.contains([',', '\n', '\r', '"']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
