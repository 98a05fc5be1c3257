use serde::{Deserialize, Serialize};
use std::fmt;

use crate::envelope::Envelope;
use crate::record::CanonicalRecord;

/// Page size used by the search view.
pub const SEARCH_PER_PAGE: u32 = 20;

/// Page size used by the gallery view.
pub const GALLERY_PER_PAGE: u32 = 24;

/// Label the gallery uses for the unfiltered context.
pub const ALL_LABEL: &str = "All";

/// The active category selection scoping one reconciliation state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterContext {
    #[default]
    All,
    Category(String),
}

impl FilterContext {
    /// Parse a user supplied label. `All` (any case) or blank selects the unfiltered context.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        if label.is_empty() || label.eq_ignore_ascii_case(ALL_LABEL) {
            FilterContext::All
        } else {
            FilterContext::Category(label.to_string())
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            FilterContext::All => None,
            FilterContext::Category(category) => Some(category),
        }
    }
}

impl fmt::Display for FilterContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterContext::All => write!(f, "{ALL_LABEL}"),
            FilterContext::Category(category) => write!(f, "{category}"),
        }
    }
}

/// Parameters of one page fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    pub context: FilterContext,
    /// 1-indexed.
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Query string pairs understood by the directory endpoint.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Some(category) = self.context.category() {
            params.push(("school", category.to_string()));
        }
        params.push(("page", self.page.to_string()));
        params.push(("perPage", self.per_page.to_string()));
        params
    }
}

/// One fetched page, with the continuation signal already derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    pub items: Vec<CanonicalRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: Option<u64>,
    pub has_more: bool,
}

/// Continuation rule for the unfiltered query: more pages while `page * per_page < total`.
pub fn unfiltered_has_more(page: u32, per_page: u32, total: u64) -> bool {
    u64::from(page) * u64::from(per_page) < total
}

/// Continuation rule for category queries: a full page may continue, a short page is final.
pub fn category_has_more(item_count: usize, per_page: u32) -> bool {
    item_count == per_page as usize
}

impl PageResult {
    /// Unfiltered page. A missing count defaults to the number of items
    /// returned, which makes `has_more` false.
    pub fn unfiltered(
        items: Vec<CanonicalRecord>,
        page: u32,
        per_page: u32,
        total: Option<u64>,
    ) -> Self {
        let total = total.unwrap_or(items.len() as u64);
        Self {
            has_more: unfiltered_has_more(page, per_page, total),
            items,
            page,
            per_page,
            total: Some(total),
        }
    }

    /// Category page. The count is passed through untouched and never
    /// consulted for continuation.
    pub fn category(
        items: Vec<CanonicalRecord>,
        page: u32,
        per_page: u32,
        total: Option<u64>,
    ) -> Self {
        Self {
            has_more: category_has_more(items.len(), per_page),
            items,
            page,
            per_page,
            total,
        }
    }

    /// Build the result for `request` from a decoded response body.
    pub fn from_envelope(request: &PageRequest, envelope: &Envelope) -> Self {
        let items = envelope.records();
        match request.context {
            FilterContext::All => {
                Self::unfiltered(items, request.page, request.per_page, envelope.total())
            }
            FilterContext::Category(_) => {
                Self::category(items, request.page, request.per_page, envelope.total())
            }
        }
    }
}
