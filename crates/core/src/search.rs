//! Remote name search bookkeeping
//!
//! The shell debounces keystrokes and performs the fetch; this module decides
//! when a query is long enough to search, tracks which request is current and
//! drops results that arrive for a query the user has already replaced.

use serde::Serialize;

use crate::error::FetchError;
use crate::record::CanonicalRecord;

/// Queries shorter than this (after trimming) show the paged list instead.
pub const MIN_QUERY_LEN: usize = 2;

/// Quiet period after the last keystroke before a search is issued.
pub const DEBOUNCE_MS: u64 = 300;

/// Trimmed query if it is long enough to trigger a remote search.
pub fn active_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    (trimmed.chars().count() >= MIN_QUERY_LEN).then_some(trimmed)
}

/// Receipt for an issued name search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    query: String,
    generation: u64,
    results: Option<Vec<CanonicalRecord>>,
    loading: bool,
    error: Option<FetchError>,
}

impl SearchState {
    /// Record a new raw query.
    ///
    /// Returns a ticket when a search should be issued. Shrinking the query
    /// below the minimum length clears the results and invalidates any pending
    /// search. Previous results stay visible while a new search is loading.
    /// Re-sending the query of a failed search issues it again.
    pub fn update_query(mut self, query: &str) -> (Self, Option<SearchTicket>) {
        let previous = active_query(&self.query).map(str::to_string);
        self.query = query.to_string();

        match active_query(query) {
            None => {
                self.generation += 1;
                self.results = None;
                self.loading = false;
                self.error = None;
                (self, None)
            }
            Some(active) if previous.as_deref() == Some(active) && self.error.is_none() => {
                (self, None)
            }
            Some(_) => self.issue(),
        }
    }

    /// Re-issue the current query after a failed search.
    pub fn retry(self) -> (Self, Option<SearchTicket>) {
        if self.error.is_some() && self.is_active() {
            self.issue()
        } else {
            (self, None)
        }
    }

    fn issue(mut self) -> (Self, Option<SearchTicket>) {
        let Some(query) = active_query(&self.query).map(str::to_string) else {
            return (self, None);
        };
        self.generation += 1;
        self.loading = true;
        self.error = None;
        let ticket = SearchTicket {
            generation: self.generation,
            query,
        };
        (self, Some(ticket))
    }

    /// Apply a search outcome; stale tickets are ignored.
    pub fn complete(
        mut self,
        ticket: &SearchTicket,
        outcome: Result<Vec<CanonicalRecord>, FetchError>,
    ) -> Self {
        if ticket.generation != self.generation {
            return self;
        }

        self.loading = false;
        match outcome {
            Ok(records) => {
                self.results = Some(records);
                self.error = None;
            }
            Err(error) => self.error = Some(error),
        }
        self
    }

    /// A query of sufficient length is in effect; paging is suspended.
    pub fn is_active(&self) -> bool {
        active_query(&self.query).is_some()
    }

    /// Generation of the latest issued or invalidated search.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> Option<&[CanonicalRecord]> {
        self.results.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_query_threshold() {
        assert_eq!(active_query(""), None);
        assert_eq!(active_query(" a "), None);
        assert_eq!(active_query(" ar "), Some("ar"));
        assert_eq!(active_query("あい"), Some("あい"));
    }

    #[test]
    fn test_short_query_issues_nothing() {
        let (state, ticket) = SearchState::default().update_query("a");

        assert!(ticket.is_none());
        assert!(!state.is_active());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_long_query_issues_ticket() {
        let (state, ticket) = SearchState::default().update_query("  aru ");
        let ticket = ticket.unwrap();

        assert_eq!(ticket.query, "aru");
        assert!(state.is_active());
        assert!(state.is_loading());
    }

    #[test]
    fn test_results_applied_for_current_ticket() {
        let (state, ticket) = SearchState::default().update_query("aru");
        let state = state.complete(&ticket.unwrap(), Ok(vec![CanonicalRecord::named("Aru")]));

        assert!(!state.is_loading());
        assert_eq!(state.results().map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_stale_results_are_dropped() {
        let (state, first) = SearchState::default().update_query("ar");
        let (state, second) = state.update_query("aru");

        let state = state.complete(&first.unwrap(), Ok(vec![CanonicalRecord::named("Arona")]));
        assert!(state.results().is_none());
        assert!(state.is_loading());

        let state = state.complete(&second.unwrap(), Ok(vec![CanonicalRecord::named("Aru")]));
        assert_eq!(state.results().unwrap()[0].name, "Aru");
    }

    #[test]
    fn test_clearing_query_drops_results_and_pending_search() {
        let (state, ticket) = SearchState::default().update_query("aru");
        let state = state.complete(&ticket.unwrap(), Ok(vec![CanonicalRecord::named("Aru")]));

        let (state, pending) = state.update_query("hina");
        let (state, none) = state.update_query("h");
        assert!(none.is_none());
        assert!(state.results().is_none());
        assert!(!state.is_active());

        let state = state.complete(&pending.unwrap(), Ok(vec![CanonicalRecord::named("Hina")]));
        assert!(state.results().is_none());
    }

    #[test]
    fn test_same_effective_query_is_not_reissued() {
        let (state, first) = SearchState::default().update_query("aru");
        assert!(first.is_some());
        let (_, again) = state.update_query("aru ");
        assert!(again.is_none());
    }

    #[test]
    fn test_error_is_recorded() {
        let (state, ticket) = SearchState::default().update_query("aru");
        let state = state.complete(&ticket.unwrap(), Err(FetchError::Transport("reset".into())));

        assert!(!state.is_loading());
        assert!(state.error().is_some());
        assert!(state.results().is_none());
    }

    #[test]
    fn test_failed_search_is_reissued_for_same_query() {
        let (state, ticket) = SearchState::default().update_query("hina");
        let reset = FetchError::Transport("reset".into());
        let state = state.complete(&ticket.unwrap(), Err(reset));

        let (state, again) = state.update_query("hina");
        let again = again.unwrap();
        assert_eq!(again.query, "hina");
        assert!(state.is_loading());

        let state = state.complete(&again, Ok(vec![CanonicalRecord::named("Hina")]));
        assert!(state.error().is_none());
        assert_eq!(state.results().map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_retry_only_after_failure() {
        let (state, ticket) = SearchState::default().update_query("aru");
        let (state, none) = state.retry();
        assert!(none.is_none());

        let reset = FetchError::Transport("reset".into());
        let state = state.complete(&ticket.unwrap(), Err(reset));
        let (state, retried) = state.retry();
        assert_eq!(retried.unwrap().query, "aru");

        let (cleared, _) = state.update_query("");
        assert!(cleared.retry().1.is_none());
    }
}
