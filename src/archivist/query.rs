//! # Query Pipeline
//!
//! Every browsing view (search results, a collection's documents, the audit log)
//! runs the same client-side chain:
//!
//! ```text
//! records ──filter──▶ matching ──search──▶ scored ──sort──▶ ordered ──paginate──▶ page
//! ```
//!
//! - **filter**: [`FilterState::apply`], exact constraints ANDed together.
//! - **search**: optional free-text term over title and body; assigns a score.
//! - **sort**: by the requested [`SortBy`] key. Every sort is stable.
//! - **paginate**: slices out one page and reports `{page, limit, total, totalPages}`.
//!
//! Pagination clamps: a page past the end yields the last page, so narrowing a
//! filter while on page 5 never produces a silently empty page.

use crate::error::{ArchiveError, Result};
use crate::filter::{FilterState, Filterable};
use crate::model::{AuditEntry, Collection, Document};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PAGE_LIMIT: usize = 20;
pub const MAX_PAGE_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Text score when a term is given, insertion order otherwise.
    #[default]
    Relevance,
    /// Newest first.
    Date,
    Title,
    /// Most viewed and downloaded first.
    Popularity,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Relevance => "relevance",
            SortBy::Date => "date",
            SortBy::Title => "title",
            SortBy::Popularity => "popularity",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortBy {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "relevance" => Ok(SortBy::Relevance),
            "date" => Ok(SortBy::Date),
            "title" => Ok(SortBy::Title),
            "popularity" => Ok(SortBy::Popularity),
            other => Err(ArchiveError::InvalidQuery(format!(
                "unknown sort key '{}' (expected relevance, date, title or popularity)",
                other
            ))),
        }
    }
}

/// What the sort and search stages need from a record.
pub trait Sortable {
    fn title(&self) -> &str;
    /// Free text searched after the title.
    fn body(&self) -> &str;
    fn sort_date(&self) -> Option<DateTime<Utc>>;
    fn popularity(&self) -> u64;
}

impl Sortable for Document {
    fn title(&self) -> &str {
        &self.title
    }

    fn body(&self) -> &str {
        &self.description
    }

    fn sort_date(&self) -> Option<DateTime<Utc>> {
        self.timestamp()
    }

    fn popularity(&self) -> u64 {
        self.views.saturating_add(self.downloads)
    }
}

impl Sortable for Collection {
    fn title(&self) -> &str {
        &self.name
    }

    fn body(&self) -> &str {
        &self.description
    }

    fn sort_date(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }

    fn popularity(&self) -> u64 {
        u64::from(self.document_count)
    }
}

impl Sortable for AuditEntry {
    fn title(&self) -> &str {
        &self.action
    }

    fn body(&self) -> &str {
        self.details.as_deref().unwrap_or(&self.user)
    }

    fn sort_date(&self) -> Option<DateTime<Utc>> {
        Some(self.timestamp)
    }

    fn popularity(&self) -> u64 {
        0
    }
}

/// A requested page. Construct through [`PageRequest::new`] to validate the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    /// Page 0 is read as page 1. The limit must be within `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: usize, limit: usize) -> Result<Self> {
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(ArchiveError::InvalidQuery(format!(
                "limit must be between 1 and {}, got {}",
                MAX_PAGE_LIMIT, limit
            )));
        }
        Ok(Self {
            page: page.max(1),
            limit,
        })
    }

    pub fn first(limit: usize) -> Result<Self> {
        Self::new(1, limit)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn with_page(self, page: usize) -> Self {
        Self {
            page: page.max(1),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl Pagination {
    /// Computes the pagination for `total` items, clamping the requested page.
    pub fn compute(request: PageRequest, total: usize) -> Self {
        let total_pages = total.div_ceil(request.limit);
        let page = request.page.clamp(1, total_pages.max(1));
        Self {
            page,
            limit: request.limit,
            total,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub text: Option<String>,
    pub filters: FilterState,
    pub sort: SortBy,
    pub page: PageRequest,
}

impl Query {
    pub fn new(page: PageRequest) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(Some(text.into()));
        self
    }

    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort(mut self, sort: SortBy) -> Self {
        self.sort = sort;
        self
    }

    /// Blank terms are stored as no term.
    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
    }

    pub fn term(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// Scores a record against a search term: 1 exact title, 2 title contains,
/// 3 body contains. `None` when the record does not match.
pub fn score<T: Sortable>(record: &T, term_lower: &str) -> Option<u8> {
    let title = record.title().to_lowercase();
    if title == term_lower {
        Some(1)
    } else if title.contains(term_lower) {
        Some(2)
    } else if record.body().to_lowercase().contains(term_lower) {
        Some(3)
    } else {
        None
    }
}

/// Keeps records matching the term, each paired with its score.
/// Without a term every record is kept with score 0.
pub fn search<T: Sortable>(records: Vec<T>, term: Option<&str>) -> Vec<(T, u8)> {
    match term {
        None => records.into_iter().map(|r| (r, 0)).collect(),
        Some(term) => {
            let term_lower = term.to_lowercase();
            records
                .into_iter()
                .filter_map(|r| score(&r, &term_lower).map(|s| (r, s)))
                .collect()
        }
    }
}

/// Orders scored records. `sort_by` is stable, so ties keep insertion order.
pub fn sort<T: Sortable>(scored: &mut [(T, u8)], by: SortBy) {
    match by {
        SortBy::Relevance => scored.sort_by(|(a, sa), (b, sb)| match sa.cmp(sb) {
            Ordering::Equal => a.title().len().cmp(&b.title().len()),
            ord => ord,
        }),
        SortBy::Date => scored.sort_by(|(a, _), (b, _)| match (a.sort_date(), b.sort_date()) {
            (Some(da), Some(db)) => db.cmp(&da),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        SortBy::Title => {
            scored.sort_by_cached_key(|(r, _)| r.title().to_lowercase());
        }
        SortBy::Popularity => scored.sort_by(|(a, _), (b, _)| b.popularity().cmp(&a.popularity())),
    }
}

/// Slices one page out of `items`, clamping out-of-range pages to the last one.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Paginated<T> {
    let pagination = Pagination::compute(request, items.len());
    let start = (pagination.page - 1) * pagination.limit;
    let items = items
        .into_iter()
        .skip(start)
        .take(pagination.limit)
        .collect();
    Paginated { items, pagination }
}

/// filter → search → sort, without paginating.
pub fn select<T: Filterable + Sortable>(records: Vec<T>, query: &Query) -> Vec<T> {
    let filtered = query.filters.apply(records);
    let mut scored = search(filtered, query.term());
    // Relevance without a term is insertion order; skip the no-op sort.
    if query.sort != SortBy::Relevance || query.term().is_some() {
        sort(&mut scored, query.sort);
    }
    scored.into_iter().map(|(r, _)| r).collect()
}

/// filter → search → sort → paginate.
pub fn run<T: Filterable + Sortable>(records: Vec<T>, query: &Query) -> Paginated<T> {
    paginate(select(records, query), query.page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Format;
    use crate::store::seed;

    fn numbers(n: usize) -> Vec<usize> {
        (1..=n).collect()
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page = paginate(Vec::<usize>::new(), PageRequest::new(1, 20).unwrap());
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.total, 0);
        assert_eq!(page.pagination.total_pages, 0);
        assert_eq!(page.pagination.page, 1);
    }

    #[test]
    fn total_pages_is_ceiling() {
        let p = Pagination::compute(PageRequest::new(1, 20).unwrap(), 41);
        assert_eq!(p.total_pages, 3);
        let p = Pagination::compute(PageRequest::new(1, 20).unwrap(), 40);
        assert_eq!(p.total_pages, 2);
    }

    #[test]
    fn page_past_end_clamps_to_last_page() {
        let page = paginate(numbers(25), PageRequest::new(9, 10).unwrap());
        assert_eq!(page.pagination.page, 3);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
    }

    #[test]
    fn page_zero_reads_as_first() {
        let request = PageRequest::new(0, 5).unwrap();
        assert_eq!(request.page(), 1);
    }

    #[test]
    fn invalid_limits_are_rejected() {
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_LIMIT + 1).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_LIMIT).is_ok());
    }

    #[test]
    fn pages_never_exceed_limit_and_sum_to_total() {
        for total in [0, 1, 7, 20, 21, 99] {
            for limit in [1, 3, 20] {
                let first = paginate(numbers(total), PageRequest::new(1, limit).unwrap());
                let pages = first.pagination.total_pages;
                let mut seen = Vec::new();
                for p in 1..=pages {
                    let page = paginate(numbers(total), PageRequest::new(p, limit).unwrap());
                    assert!(page.items.len() <= limit);
                    seen.extend(page.items);
                }
                assert_eq!(seen, numbers(total));
            }
        }
    }

    #[test]
    fn relevance_without_term_keeps_insertion_order() {
        let docs = seed::documents();
        let expected: Vec<String> = docs.iter().map(|d| d.id.clone()).collect();
        let query = Query::new(PageRequest::new(1, 100).unwrap());
        let result = run(docs, &query);
        let got: Vec<String> = result.items.iter().map(|d| d.id.clone()).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn relevance_ranks_title_matches_before_body_matches() {
        let mut exact = Document::new("a", "Harbour", Format::Text);
        exact.description = "plain".into();
        let mut partial = Document::new("b", "Old Harbour Wall", Format::Text);
        partial.description = "plain".into();
        let mut body = Document::new("c", "Quay", Format::Text);
        body.description = "about the harbour".into();
        let unrelated = Document::new("d", "Census", Format::Text);

        let query = Query::new(PageRequest::default()).with_text("harbour");
        let result = run(vec![body, unrelated, partial, exact], &query);
        let ids: Vec<&str> = result.items.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn sort_by_date_puts_newest_first_and_undated_last() {
        let query = Query::new(PageRequest::new(1, 100).unwrap()).with_sort(SortBy::Date);
        let result = run(seed::documents(), &query);
        let first = &result.items[0];
        assert_eq!(first.id, "doc-14");
        assert_eq!(result.items.last().unwrap().id, "doc-20");
    }

    #[test]
    fn sort_by_title_is_case_insensitive() {
        let docs = vec![
            Document::new("1", "beta", Format::Text),
            Document::new("2", "Alpha", Format::Text),
            Document::new("3", "gamma", Format::Text),
        ];
        let query = Query::new(PageRequest::default()).with_sort(SortBy::Title);
        let titles: Vec<String> = run(docs, &query)
            .items
            .into_iter()
            .map(|d| d.title)
            .collect();
        assert_eq!(titles, vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn sort_by_popularity_descends() {
        let query = Query::new(PageRequest::new(1, 3).unwrap()).with_sort(SortBy::Popularity);
        let result = run(seed::documents(), &query);
        assert_eq!(result.items[0].id, "doc-12");
        let pops: Vec<u64> = result.items.iter().map(|d| d.popularity()).collect();
        assert!(pops.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn popularity_saturates_on_huge_counts() {
        let mut huge = Document::new("huge", "Huge", Format::Text);
        huge.views = u64::MAX;
        huge.downloads = 1;
        let mut small = Document::new("small", "Small", Format::Text);
        small.views = 10;

        assert_eq!(huge.popularity(), u64::MAX);
        let query = Query::new(PageRequest::default()).with_sort(SortBy::Popularity);
        let ids: Vec<String> = run(vec![small, huge], &query)
            .items
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec!["huge", "small"]);
    }

    #[test]
    fn filter_then_paginate_reports_filtered_total() {
        let filters = FilterState::new().with_text("format", "image");
        let query = Query::new(PageRequest::new(1, 2).unwrap()).with_filters(filters);
        let result = run(seed::documents(), &query);
        assert_eq!(result.pagination.total, 4);
        assert_eq!(result.pagination.total_pages, 2);
        assert_eq!(result.items.len(), 2);
    }

    #[test]
    fn blank_text_is_no_term() {
        let query = Query::default().with_text("   ");
        assert_eq!(query.term(), None);
    }

    #[test]
    fn sort_key_parsing() {
        assert_eq!("Popularity".parse::<SortBy>().unwrap(), SortBy::Popularity);
        assert!("random".parse::<SortBy>().is_err());
        assert_eq!(SortBy::Date.to_string(), "date");
    }
}
