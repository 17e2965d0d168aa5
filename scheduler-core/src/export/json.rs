use crate::error::ScheduleResult;
use crate::event::ResultSet;

/// Pretty-printed JSON with the German field names of the API.
pub fn encode_json(result: &ResultSet) -> ScheduleResult<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn decode_json(text: &str) -> ScheduleResult<ResultSet> {
    Ok(serde_json::from_str(text)?)
}
