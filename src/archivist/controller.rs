//! # View State Controller
//!
//! One controller per browsing view holds the single source of truth for that
//! view: the current [`Query`] (text, filters, sort, page) and the load state.
//!
//! ```text
//!            dispatch(trigger)               resolve(latest ticket, Ok/Err)
//!   Idle ───────────────────────▶ Loading ─────────────────────────────▶ Success | Empty | Error
//!    ▲                                                                          │
//!    └──────────────────────── acknowledge() / next dispatch ───────────────────┘
//! ```
//!
//! ## Request generations
//!
//! Every dispatch issues a fresh [`Ticket`]. Fetches may complete in any order;
//! a completion is only applied if it carries the most recently issued ticket.
//! Anything older is reported as [`Resolution::Stale`] and dropped, so a slow
//! response to an earlier keystroke can never overwrite the result of a later
//! filter change.
//!
//! The controller does no I/O itself. Callers run the fetch however they like
//! (inline via [`ViewController::refresh`], on a worker thread, ...) and hand
//! the outcome back with [`ViewController::resolve`].

use crate::error::Result;
use crate::filter::parse_flag;
use crate::query::{PageRequest, Paginated, Pagination, Query, SortBy};
use std::fmt;

/// Request generation token. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading { ticket: Ticket },
    Success(Paginated<T>),
    /// The request succeeded and nothing matched.
    Empty(Pagination),
    /// The request failed. Distinct from an empty result.
    Error(String),
}

impl<T> ViewState<T> {
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            ViewState::Success(_) | ViewState::Empty(_) | ViewState::Error(_)
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Loading { .. } => "loading",
            ViewState::Success(_) => "success",
            ViewState::Empty(_) => "empty",
            ViewState::Error(_) => "error",
        }
    }
}

/// A user action that changes what the view shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    SubmitQuery(String),
    /// `None` or "all" removes the constraint.
    ChangeFilter { field: String, value: Option<String> },
    ChangeFlag { field: String, value: Option<bool> },
    ChangePage(usize),
    ChangeLimit(usize),
    ChangeSort(SortBy),
}

impl Trigger {
    /// Builds a flag trigger from the `all | true | false` form used by dropdowns.
    pub fn flag(field: impl Into<String>, raw: &str) -> Result<Self> {
        Ok(Trigger::ChangeFlag {
            field: field.into(),
            value: parse_flag(raw)?,
        })
    }

    pub fn filter(field: impl Into<String>, value: impl Into<String>) -> Self {
        Trigger::ChangeFilter {
            field: field.into(),
            value: Some(value.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// The response belonged to a superseded request and was discarded.
    Stale { ticket: Ticket, latest: Option<Ticket> },
}

#[derive(Debug)]
pub struct ViewController<T> {
    query: Query,
    state: ViewState<T>,
    generation: u64,
    latest: Option<Ticket>,
}

impl<T> ViewController<T> {
    pub fn new(page: PageRequest) -> Self {
        Self::with_query(Query::new(page))
    }

    pub fn with_query(query: Query) -> Self {
        Self {
            query,
            state: ViewState::Idle,
            generation: 0,
            latest: None,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn state(&self) -> &ViewState<T> {
        &self.state
    }

    pub fn latest_ticket(&self) -> Option<Ticket> {
        self.latest
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, ViewState::Loading { .. })
    }

    fn issue(&mut self) -> Ticket {
        self.generation += 1;
        let ticket = Ticket(self.generation);
        self.latest = Some(ticket);
        self.state = ViewState::Loading { ticket };
        ticket
    }

    /// Applies a user action to the query and starts a new request generation.
    ///
    /// Every trigger except a page change returns to page 1. Invalid input
    /// leaves both the query and the state untouched.
    pub fn dispatch(&mut self, trigger: Trigger) -> Result<Ticket> {
        let mut next = self.query.clone();
        match trigger {
            Trigger::SubmitQuery(text) => {
                next.set_text(Some(text));
                next.page = next.page.with_page(1);
            }
            Trigger::ChangeFilter { field, value } => {
                next.filters.set_text(field, value.as_deref());
                next.page = next.page.with_page(1);
            }
            Trigger::ChangeFlag { field, value } => {
                next.filters.set_flag(field, value);
                next.page = next.page.with_page(1);
            }
            Trigger::ChangePage(page) => {
                next.page = next.page.with_page(page);
            }
            Trigger::ChangeLimit(limit) => {
                next.page = PageRequest::first(limit)?;
            }
            Trigger::ChangeSort(sort) => {
                next.sort = sort;
                next.page = next.page.with_page(1);
            }
        }
        self.query = next;
        Ok(self.issue())
    }

    /// Re-requests the current query under a new ticket.
    pub fn reload(&mut self) -> Ticket {
        self.issue()
    }

    /// Hands a fetch outcome back to the controller.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<Paginated<T>>) -> Resolution {
        let current = matches!(self.state, ViewState::Loading { ticket: t } if t == ticket);
        if !current {
            tracing::debug!(%ticket, latest = ?self.latest, "discarding stale response");
            return Resolution::Stale {
                ticket,
                latest: self.latest,
            };
        }

        self.state = match outcome {
            Ok(page) => {
                // The pipeline may have clamped the page; keep the query in step.
                self.query.page = self.query.page.with_page(page.pagination.page);
                if page.is_empty() {
                    ViewState::Empty(page.pagination)
                } else {
                    ViewState::Success(page)
                }
            }
            Err(e) => {
                tracing::warn!(%ticket, error = %e, "view request failed");
                ViewState::Error(e.to_string())
            }
        };
        Resolution::Applied
    }

    /// Runs `fetch` inline for a fresh ticket and resolves it.
    pub fn refresh<F>(&mut self, fetch: F) -> Resolution
    where
        F: FnOnce(&Query) -> Result<Paginated<T>>,
    {
        let ticket = self.issue();
        let outcome = fetch(&self.query);
        self.resolve(ticket, outcome)
    }

    /// `dispatch` followed by an inline fetch.
    pub fn apply<F>(&mut self, trigger: Trigger, fetch: F) -> Result<Resolution>
    where
        F: FnOnce(&Query) -> Result<Paginated<T>>,
    {
        let ticket = self.dispatch(trigger)?;
        let outcome = fetch(&self.query);
        Ok(self.resolve(ticket, outcome))
    }

    /// Returns a settled view to idle. Loading views are left alone.
    pub fn acknowledge(&mut self) {
        if self.state.is_settled() {
            self.state = ViewState::Idle;
        }
    }
}
