//! Browse session
//!
//! Owns the reconciliation state for the active filter context plus the search
//! state, and turns user triggers (context change, scroll to bottom, keystroke)
//! into spawned fetches. Fetch completions come back over a channel tagged with
//! the ticket they were issued for, so a response for an abandoned context or a
//! superseded query is dropped by the core instead of mutating current state.

use crate::api::RecordSource;
use crate::debounce::Debouncer;
use rosterdex_core::error::FetchError;
use rosterdex_core::listing::{build_listing, ListingOptions, ListingOutput};
use rosterdex_core::page::{FilterContext, PageResult};
use rosterdex_core::reconciler::{FetchTicket, ReconciliationState};
use rosterdex_core::record::CanonicalRecord;
use rosterdex_core::search::{SearchState, SearchTicket, DEBOUNCE_MS};
use rosterdex_core::sort::{SortDirection, SortKey};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug)]
pub enum SessionEvent {
    PageLoaded {
        ticket: FetchTicket,
        outcome: Result<PageResult, FetchError>,
    },
    SearchLoaded {
        ticket: SearchTicket,
        outcome: Result<Vec<CanonicalRecord>, FetchError>,
    },
}

pub struct BrowseSession<S: RecordSource + 'static> {
    source: Arc<S>,
    state: ReconciliationState,
    search: SearchState,
    options: ListingOptions,
    debouncer: Debouncer,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl<S: RecordSource + 'static> BrowseSession<S> {
    /// Start a session on `context` and issue its first page fetch.
    pub fn start(source: Arc<S>, context: FilterContext, per_page: u32) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (state, ticket) = ReconciliationState::activate(context, per_page, 1);

        let session = Self {
            source,
            state,
            search: SearchState::default(),
            options: ListingOptions::default(),
            debouncer: Debouncer::new(Duration::from_millis(DEBOUNCE_MS)),
            events_tx,
            events_rx,
        };
        session.spawn_page_fetch(ticket);
        session
    }

    fn spawn_page_fetch(&self, ticket: FetchTicket) {
        log::debug!(
            "fetching page {} of {} (generation {})",
            ticket.request.page,
            ticket.request.context,
            ticket.generation
        );
        let source = self.source.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = source.fetch(&ticket.request).await;
            // The receiver only goes away with the session.
            let _ = tx.send(SessionEvent::PageLoaded { ticket, outcome });
        });
    }

    fn schedule_search(&mut self, ticket: SearchTicket) {
        let source = self.source.clone();
        let tx = self.events_tx.clone();
        self.debouncer.schedule(async move {
            log::debug!("searching for {:?}", ticket.query);
            let outcome = source.fetch_by_name(&ticket.query).await;
            let _ = tx.send(SessionEvent::SearchLoaded { ticket, outcome });
        });
    }

    /// Move the state out for a by-value transition; the caller puts the next one back.
    fn take_state(&mut self) -> ReconciliationState {
        std::mem::replace(
            &mut self.state,
            ReconciliationState::idle(FilterContext::All, 1, 0),
        )
    }

    /// Switch the filter context. All state of the previous context is discarded.
    pub fn select_context(&mut self, context: FilterContext) {
        let current = self.take_state();
        let (next, ticket) = current.switch_context(context);
        self.state = next;
        if let Some(ticket) = ticket {
            self.spawn_page_fetch(ticket);
        }
    }

    /// Scroll-to-bottom trigger. Returns whether a next-page fetch was issued.
    ///
    /// Ignored while a remote search is active, while a page is already loading
    /// and once pagination has ended.
    pub fn load_more(&mut self) -> bool {
        if self.search.is_active() {
            return false;
        }
        self.transition(ReconciliationState::request_more)
    }

    /// Manual retry after a failed load. Returns whether a fetch was issued.
    ///
    /// A failed remote search is retried first; otherwise the paged list.
    pub fn retry(&mut self) -> bool {
        let (search, ticket) = std::mem::take(&mut self.search).retry();
        self.search = search;
        if let Some(ticket) = ticket {
            self.schedule_search(ticket);
            return true;
        }
        self.transition(ReconciliationState::retry)
    }

    fn transition(
        &mut self,
        step: fn(ReconciliationState) -> (ReconciliationState, Option<FetchTicket>),
    ) -> bool {
        let current = self.take_state();
        let (next, ticket) = step(current);
        self.state = next;
        match ticket {
            Some(ticket) => {
                self.spawn_page_fetch(ticket);
                true
            }
            None => false,
        }
    }

    /// Keystroke in the search box.
    pub fn set_query(&mut self, query: &str) {
        let (search, ticket) = std::mem::take(&mut self.search).update_query(query);
        self.search = search;
        match ticket {
            Some(ticket) => self.schedule_search(ticket),
            None if !self.search.is_loading() => self.debouncer.cancel(),
            None => {}
        }
    }

    pub fn set_sort(&mut self, sort: SortKey, direction: SortDirection) {
        self.options.sort = sort;
        self.options.direction = direction;
    }

    pub fn set_filter(&mut self, filter: Option<String>) {
        self.options.filter = filter;
    }

    /// Apply one completion. Returns false when it was stale and got dropped.
    fn apply(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::PageLoaded { ticket, outcome } => {
                if !self.state.accepts(&ticket) {
                    log::debug!(
                        "ignoring stale page {} of {} (generation {})",
                        ticket.request.page,
                        ticket.request.context,
                        ticket.generation
                    );
                    return false;
                }
                if let Err(err) = &outcome {
                    log::warn!(
                        "page {} of {} failed: {err}",
                        ticket.request.page,
                        ticket.request.context
                    );
                }
                let current = self.take_state();
                self.state = current.complete(&ticket, outcome);
                true
            }
            SessionEvent::SearchLoaded { ticket, outcome } => {
                if ticket.generation != self.search.generation() {
                    log::debug!("ignoring stale search for {:?}", ticket.query);
                    return false;
                }
                if let Err(err) = &outcome {
                    log::warn!("search for {:?} failed: {err}", ticket.query);
                }
                self.search = std::mem::take(&mut self.search).complete(&ticket, outcome);
                true
            }
        }
    }

    /// Whether a fetch for the current context or query is still outstanding.
    pub fn is_busy(&self) -> bool {
        self.state.is_loading() || self.search.is_loading()
    }

    /// Wait for and apply the next completion. Returns whether it changed
    /// the current state.
    pub async fn next_event(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => self.apply(event),
            None => false,
        }
    }

    /// Apply completions until nothing current is outstanding.
    pub async fn settle(&mut self) {
        while self.is_busy() {
            self.next_event().await;
        }
    }

    /// Apply every completion that has already arrived, without waiting.
    #[cfg(test)]
    pub fn drain(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
        }
    }

    pub fn state(&self) -> &ReconciliationState {
        &self.state
    }

    #[cfg(test)]
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn listing(&self) -> ListingOutput {
        build_listing(&self.state, &self.search, &self.options)
    }
}
