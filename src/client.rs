//! HTTP client for the schedule API.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use thws_scheduler_core::api::{AuthRequest, AuthResponse, RawSchedule, ScheduleQuery};
use thws_scheduler_core::config::Session;
use thws_scheduler_core::constants::{AUTH_PATH, METADATA_PATH, SCHEDULE_PATH};
use thws_scheduler_core::metadata::MetadataSnapshot;
use thws_scheduler_core::request::PlanRequest;
use thws_scheduler_core::{ScheduleError, ScheduleResult};
use tracing::{debug, info};

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

fn network(err: reqwest::Error) -> ScheduleError {
    if err.is_timeout() {
        ScheduleError::Network("Request timed out".to_string())
    } else {
        ScheduleError::Network(err.to_string())
    }
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ScheduleResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(network)?;

        Ok(ApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn token(&self) -> ScheduleResult<&str> {
        self.token.as_deref().ok_or(ScheduleError::NotAuthenticated)
    }

    /// POST /auth
    pub async fn authenticate(&self, username: &str, password: &str) -> ScheduleResult<Session> {
        let resp = self
            .http
            .post(self.url(AUTH_PATH))
            .json(&AuthRequest { username, password })
            .send()
            .await
            .map_err(network)?;

        let status = resp.status();
        debug!(%status, "auth response");

        let body: AuthResponse = match resp.json().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                return Err(ScheduleError::Auth(format!("HTTP error! Status: {}", status.as_u16())));
            }
            Err(e) => return Err(network(e)),
        };

        let (token, name) = body.into_session_parts(status.is_success())?;
        info!("authenticated");
        Ok(Session::new(token, name.or_else(|| Some(username.to_string()))))
    }

    /// GET /course_scraper
    pub async fn metadata(&self) -> ScheduleResult<MetadataSnapshot> {
        let resp = self
            .http
            .get(self.url(METADATA_PATH))
            .bearer_auth(self.token()?)
            .send()
            .await
            .map_err(network)?;

        check_status(resp.status())?;

        let snapshot: MetadataSnapshot = resp.json().await.map_err(network)?;
        debug!(programs = snapshot.programs.len(), "loaded metadata");
        Ok(snapshot)
    }

    /// POST /schedule_scraper
    pub async fn schedule(&self, plans: &[PlanRequest]) -> ScheduleResult<RawSchedule> {
        info!(plans = plans.len(), "requesting schedule");

        let resp = self
            .http
            .post(self.url(SCHEDULE_PATH))
            .bearer_auth(self.token()?)
            .json(&ScheduleQuery { plans })
            .send()
            .await
            .map_err(network)?;

        let status = resp.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(ScheduleError::NotAuthenticated);
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await.map_err(network)?;

        RawSchedule::from_response(status.as_u16(), content_type.as_deref(), &body)
    }
}

fn check_status(status: StatusCode) -> ScheduleResult<()> {
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(ScheduleError::NotAuthenticated);
    }
    if !status.is_success() {
        return Err(ScheduleError::Network(format!(
            "HTTP error! Status: {}",
            status.as_u16()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_ignore_trailing_slash() {
        let client = ApiClient::new("https://example.org/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.url(SCHEDULE_PATH), "https://example.org/api/schedule_scraper");
    }

    #[test]
    fn test_token_required() {
        let client = ApiClient::new("https://example.org/api", Duration::from_secs(5)).unwrap();
        assert!(matches!(client.token(), Err(ScheduleError::NotAuthenticated)));
        assert_eq!(client.with_token("abc").token().unwrap(), "abc");
    }

    #[test]
    fn test_check_status() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED),
            Err(ScheduleError::NotAuthenticated)
        ));
        let err = check_status(StatusCode::BAD_GATEWAY).unwrap_err();
        assert_eq!(err.to_string(), "Network error: HTTP error! Status: 502");
    }
}
