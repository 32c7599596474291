//! Debounced product search.
//!
//! `SearchBox` is a pure state machine driven by an explicit clock: input
//! restarts the single debounce deadline, `due_query` emits at most one
//! query ticket once the input has settled, and completions are matched by
//! generation so a stale response can never overwrite fresher state.

use std::time::{Duration, Instant};

use crate::domain::catalog::Product;
use crate::query::{CatalogQueries, SearchHits};

pub const DEBOUNCE: Duration = Duration::from_millis(300);
pub const MIN_TERM_LEN: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    /// Non-empty input, trimmed length below the query threshold.
    BelowThreshold,
    /// Waiting out the debounce window.
    Debouncing,
    Querying,
    Results,
    NoResults,
    /// Backend search unavailable; showing the local fallback.
    Fallback,
}

/// Handed out by [`SearchBox::due_query`]; results are only applied if the
/// ticket's generation still matches (no later input or reset).
#[derive(Clone, Debug)]
pub struct QueryTicket {
    pub term: String,
    generation: u64,
}

#[derive(Debug)]
pub struct SearchBox {
    input: String,
    phase: SearchPhase,
    deadline: Option<Instant>,
    generation: u64,
    dropdown_open: bool,
    results: Vec<Product>,
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBox {
    pub fn new() -> Self {
        Self {
            input: String::new(),
            phase: SearchPhase::Idle,
            deadline: None,
            generation: 0,
            dropdown_open: false,
            results: Vec::new(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn results(&self) -> &[Product] {
        &self.results
    }

    /// The dropdown shows whenever the trimmed term is long enough,
    /// regardless of result count.
    pub fn dropdown_open(&self) -> bool {
        self.dropdown_open && self.input.trim().len() >= MIN_TERM_LEN
    }

    /// Text changed: restart the debounce window. A short term cancels any
    /// pending or in-flight query and closes the dropdown.
    pub fn type_input(&mut self, text: &str, now: Instant) {
        self.input = text.to_string();
        self.generation += 1;
        let trimmed = self.input.trim();
        if trimmed.len() >= MIN_TERM_LEN {
            self.deadline = Some(now + DEBOUNCE);
            self.phase = SearchPhase::Debouncing;
            self.dropdown_open = true;
        } else {
            self.deadline = None;
            self.dropdown_open = false;
            self.results.clear();
            self.phase = if trimmed.is_empty() {
                SearchPhase::Idle
            } else {
                SearchPhase::BelowThreshold
            };
        }
    }

    /// Emit the query ticket once the debounce deadline has passed.
    pub fn due_query(&mut self, now: Instant) -> Option<QueryTicket> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.phase = SearchPhase::Querying;
                Some(QueryTicket {
                    term: self.input.trim().to_string(),
                    generation: self.generation,
                })
            }
            _ => None,
        }
    }

    /// Time left until the pending query fires, if one is pending.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Apply a completed query. Stale tickets (input changed or the box was
    /// reset since the query fired) are dropped.
    pub fn apply(&mut self, ticket: &QueryTicket, hits: SearchHits) {
        if ticket.generation != self.generation {
            return;
        }
        self.phase = if hits.degraded() {
            SearchPhase::Fallback
        } else if hits.products.is_empty() {
            SearchPhase::NoResults
        } else {
            SearchPhase::Results
        };
        self.results = hits.products;
    }

    /// Escape closes the dropdown and clears the input.
    pub fn escape(&mut self) {
        self.input.clear();
        self.generation += 1;
        self.deadline = None;
        self.dropdown_open = false;
        self.results.clear();
        self.phase = SearchPhase::Idle;
    }

    /// Clicking outside closes the dropdown without clearing results state.
    pub fn click_outside(&mut self) {
        self.dropdown_open = false;
    }

    /// Refocusing reopens the dropdown if the term is still long enough.
    pub fn focus(&mut self) {
        if self.input.trim().len() >= MIN_TERM_LEN {
            self.dropdown_open = true;
        }
    }

    /// Selecting a result clears the input and closes the dropdown; the
    /// returned product id is for navigation, nothing is added to the cart.
    pub fn select(&mut self, index: usize) -> Option<String> {
        let id = self.results.get(index).map(|p| p.id.clone())?;
        self.escape();
        Some(id)
    }
}

/// Drive one debounce cycle against the query layer: wait out the pending
/// deadline, run the query, apply the outcome. Returns false when no query
/// was pending.
pub async fn run_due_query(search: &mut SearchBox, queries: &CatalogQueries) -> bool {
    let now = Instant::now();
    let Some(wait) = search.time_until_due(now) else {
        return false;
    };
    tokio::time::sleep(wait).await;
    let Some(ticket) = search.due_query(now + wait) else {
        return false;
    };
    let hits = queries.search(&ticket.term).await;
    search.apply(&ticket, hits);
    true
}
