//! Incremental pagination state machine
//!
//! [`ReconciliationState`] accumulates pages for one [`FilterContext`],
//! deduplicates records by identity key and decides whether another page may be
//! requested. Every transition consumes the state and returns the next one, and
//! every fetch is described by a [`FetchTicket`] that has to be handed back on
//! completion. Tickets carry a generation number: when the context changes the
//! generation moves on, so a late response for an abandoned context is ignored
//! instead of corrupting the new list.

use serde::Serialize;
use std::collections::HashSet;

use crate::error::FetchError;
use crate::page::{FilterContext, PageRequest, PageResult};
use crate::record::CanonicalRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    LoadingInitial,
    Ready,
    LoadingMore,
    Exhausted,
    Errored,
}

/// Receipt for an issued page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchTicket {
    pub generation: u64,
    pub request: PageRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationState {
    context: FilterContext,
    per_page: u32,
    generation: u64,
    phase: Phase,
    accumulated: Vec<CanonicalRecord>,
    /// Last successfully fetched page, 0 before the first success.
    current_page: u32,
    total: Option<u64>,
    has_more: bool,
    error: Option<FetchError>,
}

/// Append the records of `incoming` whose identity key is not already present.
///
/// Order preserving and first-seen-wins, also within `incoming` itself.
pub fn merge_unique(
    mut accumulated: Vec<CanonicalRecord>,
    incoming: Vec<CanonicalRecord>,
) -> Vec<CanonicalRecord> {
    let mut seen: HashSet<String> = accumulated
        .iter()
        .map(|record| record.identity_key().to_string())
        .collect();

    for record in incoming {
        if seen.insert(record.identity_key().to_string()) {
            accumulated.push(record);
        }
    }

    accumulated
}

impl ReconciliationState {
    /// Fresh state for `context`, nothing requested yet.
    pub fn idle(context: FilterContext, per_page: u32, generation: u64) -> Self {
        Self {
            context,
            per_page: per_page.max(1),
            generation,
            phase: Phase::Idle,
            accumulated: Vec::new(),
            current_page: 0,
            total: None,
            has_more: true,
            error: None,
        }
    }

    /// Create a state for `context` and issue its first page fetch.
    pub fn activate(context: FilterContext, per_page: u32, generation: u64) -> (Self, FetchTicket) {
        Self::idle(context, per_page, generation).start()
    }

    /// `Idle -> LoadingInitial`.
    fn start(mut self) -> (Self, FetchTicket) {
        self.phase = Phase::LoadingInitial;
        let ticket = self.ticket(1);
        (self, ticket)
    }

    fn ticket(&self, page: u32) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            request: PageRequest {
                context: self.context.clone(),
                page,
                per_page: self.per_page,
            },
        }
    }

    /// Replace this state wholesale when the filter context changes.
    ///
    /// Selecting the context that is already active is a no-op.
    pub fn switch_context(self, context: FilterContext) -> (Self, Option<FetchTicket>) {
        if context == self.context && self.phase != Phase::Idle {
            return (self, None);
        }
        let (next, ticket) = Self::activate(context, self.per_page, self.generation + 1);
        (next, Some(ticket))
    }

    /// Discard everything and reload page 1 of the same context.
    pub fn restart(self) -> (Self, FetchTicket) {
        Self::activate(self.context, self.per_page, self.generation + 1)
    }

    /// Whether a scroll-to-bottom trigger may request the next page.
    pub fn can_load_more(&self) -> bool {
        self.phase == Phase::Ready && self.has_more
    }

    /// `Ready -> LoadingMore`, guarded so that at most one next-page fetch is in flight.
    pub fn request_more(mut self) -> (Self, Option<FetchTicket>) {
        if !self.can_load_more() {
            return (self, None);
        }
        self.phase = Phase::LoadingMore;
        let ticket = self.ticket(self.current_page + 1);
        (self, Some(ticket))
    }

    /// Manual retry after a failure.
    ///
    /// A failed initial load reloads the context from scratch; a transient
    /// next-page failure re-requests the same page.
    pub fn retry(self) -> (Self, Option<FetchTicket>) {
        match self.phase {
            Phase::Errored => {
                let (next, ticket) = self.restart();
                (next, Some(ticket))
            }
            Phase::Ready if self.error.is_some() => self.request_more(),
            _ => (self, None),
        }
    }

    /// Whether a completion for `ticket` would still be applied.
    pub fn accepts(&self, ticket: &FetchTicket) -> bool {
        let expected_page = match self.phase {
            Phase::LoadingInitial => 1,
            Phase::LoadingMore => self.current_page + 1,
            _ => return false,
        };
        ticket.generation == self.generation
            && ticket.request.context == self.context
            && ticket.request.page == expected_page
    }

    /// Apply the outcome of the fetch described by `ticket`.
    ///
    /// Stale tickets leave the state untouched. A failure never discards
    /// previously accumulated records.
    pub fn complete(
        mut self,
        ticket: &FetchTicket,
        outcome: Result<PageResult, FetchError>,
    ) -> Self {
        if !self.accepts(ticket) {
            return self;
        }

        match (self.phase, outcome) {
            (Phase::LoadingInitial, Ok(result)) => {
                self.accumulated = merge_unique(Vec::new(), result.items);
                self.current_page = ticket.request.page;
                self.total = result.total;
                self.has_more = result.has_more;
                self.error = None;
                self.phase = self.settled_phase();
            }
            (Phase::LoadingInitial, Err(error)) => {
                self.has_more = false;
                self.error = Some(error);
                self.phase = Phase::Errored;
            }
            (Phase::LoadingMore, Ok(result)) => {
                let accumulated = std::mem::take(&mut self.accumulated);
                self.accumulated = merge_unique(accumulated, result.items);
                self.current_page = ticket.request.page;
                if result.total.is_some() {
                    self.total = result.total;
                }
                self.has_more = result.has_more;
                self.error = None;
                self.phase = self.settled_phase();
            }
            (Phase::LoadingMore, Err(error)) => {
                if error.is_terminal() {
                    self.has_more = false;
                    self.phase = Phase::Exhausted;
                } else {
                    self.phase = Phase::Ready;
                }
                self.error = Some(error);
            }
            // `accepts` only lets the loading phases through.
            _ => {}
        }

        self
    }

    fn settled_phase(&self) -> Phase {
        if self.has_more {
            Phase::Ready
        } else {
            Phase::Exhausted
        }
    }

    pub fn context(&self) -> &FilterContext {
        &self.context
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn accumulated(&self) -> &[CanonicalRecord] {
        &self.accumulated
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::LoadingInitial | Phase::LoadingMore)
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}
