//! Application state for one session.
//!
//! Holds the metadata snapshot, the login session and the current result
//! set. Only [`AppState::complete_fetch`], [`AppState::replace_result`] and
//! [`AppState::clear_result`] change the result set.

use tracing::{debug, warn};

use crate::config::Session;
use crate::error::{ScheduleError, ScheduleResult};
use crate::event::ResultSet;
use crate::metadata::MetadataSnapshot;

/// What happens to the current result set when a fetch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Keep showing the previous result set.
    #[default]
    Retain,
    /// Drop it, leaving an empty view.
    Clear,
}

/// Issued by [`AppState::begin_fetch`]; identifies one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Default)]
pub struct AppState {
    metadata: Option<MetadataSnapshot>,
    session: Option<Session>,
    result: ResultSet,
    generation: u64,
    policy: FailurePolicy,
}

impl AppState {
    pub fn new(session: Option<Session>, policy: FailurePolicy) -> Self {
        AppState {
            session,
            policy,
            ..Default::default()
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn set_session(&mut self, session: Option<Session>) {
        self.session = session;
    }

    /// The session, or [`ScheduleError::NotAuthenticated`].
    pub fn require_session(&self) -> ScheduleResult<&Session> {
        self.session.as_ref().ok_or(ScheduleError::NotAuthenticated)
    }

    pub fn metadata(&self) -> Option<&MetadataSnapshot> {
        self.metadata.as_ref()
    }

    pub fn set_metadata(&mut self, metadata: MetadataSnapshot) {
        self.metadata = Some(metadata);
    }

    pub fn result(&self) -> &ResultSet {
        &self.result
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Start a fetch. Any fetch started earlier becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket(self.generation)
    }

    /// Apply the outcome of the fetch identified by `ticket`.
    ///
    /// Returns `Ok(true)` if the result set was replaced and `Ok(false)` if
    /// the fetch was superseded and its outcome ignored. A failed fetch is
    /// handed back after the failure policy was applied.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: ScheduleResult<ResultSet>,
    ) -> ScheduleResult<bool> {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                latest = self.generation,
                "ignoring stale fetch"
            );
            return Ok(false);
        }

        match outcome {
            Ok(result) => {
                self.replace_result(result);
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, policy = ?self.policy, "fetch failed");
                if self.policy == FailurePolicy::Clear {
                    self.clear_result();
                }
                Err(e)
            }
        }
    }

    /// Install a result set that did not come from a fetch (an import).
    /// Supersedes any fetch in flight.
    pub fn replace_result(&mut self, result: ResultSet) {
        self.generation += 1;
        self.result = result;
    }

    pub fn clear_result(&mut self) {
        self.result = ResultSet::default();
    }

    /// Forget the session and everything fetched with it.
    pub fn logout(&mut self) {
        self.session = None;
        self.metadata = None;
        self.clear_result();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::tests::make_test_result_set;
    use crate::event::ScheduleDay;

    fn make_other_result_set() -> ResultSet {
        let mut result = make_test_result_set();
        result.days.truncate(1);
        result
    }

    #[test]
    fn test_successful_fetch_replaces_result() {
        let mut state = AppState::default();
        let ticket = state.begin_fetch();

        assert!(state.complete_fetch(ticket, Ok(make_test_result_set())).unwrap());
        assert_eq!(state.result().event_count(), 3);
    }

    #[test]
    fn test_stale_fetch_is_ignored() {
        let mut state = AppState::default();
        let first = state.begin_fetch();
        let second = state.begin_fetch();

        assert!(state.complete_fetch(second, Ok(make_other_result_set())).unwrap());
        assert!(!state.complete_fetch(first, Ok(make_test_result_set())).unwrap());
        assert_eq!(state.result().day_count(), 1, "newer result must survive");

        let third = state.begin_fetch();
        let ignored = state.complete_fetch(first, Err(ScheduleError::NoEventsFound));
        assert!(matches!(ignored, Ok(false)), "stale errors are ignored too");
        assert!(state.complete_fetch(third, Ok(make_test_result_set())).unwrap());
    }

    #[test]
    fn test_failure_retains_previous_result() {
        let mut state = AppState::new(None, FailurePolicy::Retain);
        let ticket = state.begin_fetch();
        state.complete_fetch(ticket, Ok(make_test_result_set())).unwrap();

        let ticket = state.begin_fetch();
        let err = state
            .complete_fetch(ticket, Err(ScheduleError::Network("HTTP error! Status: 502".into())))
            .unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(state.result().event_count(), 3);
    }

    #[test]
    fn test_failure_clears_result_when_configured() {
        let mut state = AppState::new(None, FailurePolicy::Clear);
        state.replace_result(make_test_result_set());

        let ticket = state.begin_fetch();
        assert!(state.complete_fetch(ticket, Err(ScheduleError::NoEventsFound)).is_err());
        assert!(state.result().is_empty());
    }

    #[test]
    fn test_session_and_logout() {
        let mut state = AppState::default();
        assert!(matches!(state.require_session(), Err(ScheduleError::NotAuthenticated)));

        state.set_session(Some(Session::new("tok", None)));
        state.set_metadata(MetadataSnapshot::default());
        state.replace_result(ResultSet::new(vec![ScheduleDay {
            weekday: "Montag".to_string(),
            events: make_test_result_set().days[0].events.clone(),
        }]));
        assert_eq!(state.require_session().unwrap().token, "tok");

        state.logout();
        assert!(state.session().is_none());
        assert!(state.metadata().is_none());
        assert!(state.result().is_empty());
    }
}
