//! Listing output shaping
//!
//! Combines the reconciler state, the search state and the user's sort/filter
//! choices into the list the presentation layer renders. The remote search
//! result, when present, replaces the paged list; both go through the same sort.

use serde::Serialize;

use crate::reconciler::{Phase, ReconciliationState};
use crate::record::CanonicalRecord;
use crate::search::SearchState;
use crate::sort::{filter_by_query, sort_records, SortDirection, SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingMode {
    Paged,
    Search,
}

/// User choices applied on top of the fetched data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingOptions {
    pub sort: SortKey,
    pub direction: SortDirection,
    /// Client-side substring filter over the displayed list.
    pub filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingStatus {
    pub phase: Phase,
    pub loaded: usize,
    pub shown: usize,
    pub total: Option<u64>,
    pub current_page: u32,
    pub has_more: bool,
    pub loading: bool,
    pub searching: bool,
    pub error: Option<String>,
    /// Another load may succeed: pagination has not ended for this context.
    pub can_retry: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingOutput {
    pub mode: ListingMode,
    pub context: String,
    pub sort: SortKey,
    pub direction: SortDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub items: Vec<CanonicalRecord>,
    pub status: ListingStatus,
}

/// Build the renderable listing from the current states.
pub fn build_listing(
    state: &ReconciliationState,
    search: &SearchState,
    options: &ListingOptions,
) -> ListingOutput {
    let (mode, base) = match search.results() {
        Some(results) => (ListingMode::Search, results),
        None => (ListingMode::Paged, state.accumulated()),
    };

    let filtered = match options.filter.as_deref() {
        Some(query) => filter_by_query(base, query),
        None => base.to_vec(),
    };
    let items: Vec<CanonicalRecord> = sort_records(&filtered, options.sort, options.direction);

    // A failed search keeps the paged list on screen; its error still has to show.
    let error = if search.is_active() {
        search.error().or(state.error())
    } else {
        state.error()
    }
    .map(ToString::to_string);

    ListingOutput {
        mode,
        context: state.context().to_string(),
        sort: options.sort,
        direction: options.direction,
        query: search.is_active().then(|| search.query().trim().to_string()),
        status: ListingStatus {
            phase: state.phase(),
            loaded: state.accumulated().len(),
            shown: items.len(),
            total: state.total(),
            current_page: state.current_page(),
            has_more: state.has_more(),
            loading: state.is_loading(),
            searching: search.is_loading(),
            error,
            can_retry: state.has_more(),
        },
        items,
    }
}

/// One-line summary shown above the list.
pub fn status_line(output: &ListingOutput) -> String {
    let status = &output.status;
    let mut line = match output.mode {
        ListingMode::Search => format!("{} results", status.shown),
        ListingMode::Paged => match status.total {
            Some(total) => format!("{} / {}", status.loaded, total),
            None => status.loaded.to_string(),
        },
    };

    if status.searching {
        if let Some(query) = &output.query {
            line.push_str(&format!(" · searching \"{query}\"…"));
        }
    }
    if status.loading {
        line.push_str(" · loading…");
    }
    line
}

/// Footer shown under the paged list once pagination has ended without error.
pub fn end_marker(output: &ListingOutput) -> Option<&'static str> {
    let status = &output.status;
    let ended = output.mode == ListingMode::Paged
        && !status.loading
        && !status.has_more
        && status.error.is_none();
    ended.then_some("No more.")
}
