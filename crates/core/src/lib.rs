//! Core library for rosterdex
//!
//! This crate implements the **Functional Core** of the rosterdex application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The rosterdex project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`rosterdex_core`** (this crate): Pure transformations and state machines, no I/O
//! - **`rosterdex`**: HTTP, timers, terminal output and orchestration (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! - **Pure functions**: Same input always produces the same output
//! - **No side effects**: No I/O operations, no clocks, no globals
//! - **Explicit state**: Pagination state is a value that transitions return, never ambient
//!
//! # Module Organization
//!
//! - [`record`]: Normalization of raw API records into [`record::CanonicalRecord`]
//! - [`envelope`]: Decoding of the two response envelope shapes
//! - [`page`]: Page results and the two `has_more` derivations
//! - [`error`]: Fetch error taxonomy and terminal/transient classification
//! - [`reconciler`]: The incremental pagination state machine
//! - [`sort`]: Rank tables, comparator-based sort and substring filter
//! - [`search`]: Remote search activation rules and result bookkeeping
//! - [`detail`]: Detail record selection and sibling navigation
//! - [`listing`]: Shaping of reconciler/search state into renderable output
//!
//! # Example Usage
//!
//! ```rust
//! use rosterdex_core::page::{FilterContext, PageResult};
//! use rosterdex_core::reconciler::{Phase, ReconciliationState};
//! use rosterdex_core::record::CanonicalRecord;
//!
//! let (state, ticket) = ReconciliationState::activate(FilterContext::All, 20, 1);
//! assert_eq!(state.phase(), Phase::LoadingInitial);
//!
//! let items = vec![CanonicalRecord::named("Aru")];
//! let page = PageResult::unfiltered(items, 1, 20, Some(1));
//! let state = state.complete(&ticket, Ok(page));
//!
//! assert_eq!(state.accumulated().len(), 1);
//! assert_eq!(state.phase(), Phase::Exhausted);
//! ```

pub mod detail;
pub mod envelope;
pub mod error;
pub mod listing;
pub mod page;
pub mod reconciler;
pub mod record;
pub mod search;
pub mod sort;
