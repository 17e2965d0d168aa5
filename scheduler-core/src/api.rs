//! Wire types of the remote schedule service.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::de;
use crate::error::{ScheduleError, ScheduleResult};
use crate::request::PlanRequest;

/// Body of `POST {base}/auth`.
#[derive(Debug, Serialize)]
pub struct AuthRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Body of a successful `POST {base}/auth`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST {base}/schedule_scraper`.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleQuery<'a> {
    pub plans: &'a [PlanRequest],
}

/// Schedule as returned by the API, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSchedule {
    #[serde(default)]
    pub tage: Vec<RawDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDay {
    #[serde(default)]
    pub wochentag: String,

    #[serde(default, deserialize_with = "lectures_each")]
    pub vorlesungen: Vec<RawLecture>,
}

/// A lecture entry exactly as sent. Every field is optional here so that one
/// incomplete entry fails on its own during normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLecture {
    /// Why the entry could not be decoded, if it could not
    #[serde(skip)]
    pub invalid: Option<String>,

    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub ende: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub fach: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub titel: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub dozent: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub raum: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub typ: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub quelle: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub hinweis: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub id: Option<String>,

    /// `id` was generated by an earlier run (set in our own JSON exports)
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub platzhalter_id: bool,
}

/// Decode every lecture entry on its own. An entry that does not decode is
/// kept as an invalid record so normalization skips just that entry.
fn lectures_each<'de, D>(deserializer: D) -> Result<Vec<RawLecture>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;

    Ok(values
        .unwrap_or_default()
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).unwrap_or_else(|e| RawLecture {
                invalid: Some(e.to_string()),
                ..Default::default()
            })
        })
        .collect())
}

impl AuthResponse {
    /// Token and display name of a successful login.
    pub fn into_session_parts(self, succeeded: bool) -> ScheduleResult<(String, Option<String>)> {
        match self.token.filter(|t| !t.is_empty()) {
            Some(token) if succeeded => Ok((token, self.username)),
            _ => Err(ScheduleError::Auth(
                self.error
                    .unwrap_or_else(|| "Fehler bei der Anmeldung.".to_string()),
            )),
        }
    }
}

impl RawSchedule {
    /// Interpret a schedule response.
    ///
    /// `204 No Content` and bodies that are not declared as JSON count as an
    /// empty schedule. Any other non-2xx status is a network error.
    pub fn from_response(
        status: u16,
        content_type: Option<&str>,
        body: &[u8],
    ) -> ScheduleResult<Self> {
        if status == 204 {
            warn!("schedule request returned 204 No Content, using empty schedule");
            return Ok(RawSchedule::default());
        }

        if !(200..300).contains(&status) {
            return Err(ScheduleError::Network(format!("HTTP error! Status: {}", status)));
        }

        let is_json = content_type.is_some_and(|ct| ct.contains("application/json"));
        if !is_json || body.iter().all(u8::is_ascii_whitespace) {
            warn!(content_type = ?content_type, "schedule response is not JSON, using empty schedule");
            return Ok(RawSchedule::default());
        }

        serde_json::from_slice(body)
            .map_err(|e| ScheduleError::Network(format!("Invalid schedule response: {}", e)))
    }
}
