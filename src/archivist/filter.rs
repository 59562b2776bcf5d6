//! Filter predicate evaluation.
//!
//! A [`FilterState`] is the set of constraints a view currently applies. Each
//! constraint names a record field and a [`Criterion`]; a record passes when it
//! satisfies all of them. A field with no constraint is unconstrained, which is
//! how the "all" choice of a filter dropdown is represented: selecting "all"
//! removes the entry instead of storing a sentinel string.
//!
//! Boolean filters are tri-state at the edges (`Option<bool>`, `None` = all)
//! and become [`Criterion::Flag`] internally, so they are never compared as
//! strings.

use crate::error::{ArchiveError, Result};
use crate::model::{AuditEntry, Collection, Document};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// The value of a single record field, as seen by the filter evaluator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Number(u64),
}

/// A record that can be inspected field by field.
pub trait Filterable {
    /// Look up a field by its filter name. `None` means the record has no such field.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// The timestamp date-range filters are evaluated against.
    fn timestamp(&self) -> Option<DateTime<Utc>>;
}

/// A single equality constraint on a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Case-insensitive exact match on a text (or numeric) field.
    Equals(String),
    /// Exact match on a boolean field.
    Flag(bool),
}

impl Criterion {
    pub fn matches(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (Criterion::Equals(want), FieldValue::Text(have)) => {
                want.to_lowercase() == have.to_lowercase()
            }
            (Criterion::Equals(want), FieldValue::Number(have)) => {
                want.trim().parse::<u64>().ok() == Some(*have)
            }
            (Criterion::Flag(want), FieldValue::Flag(have)) => want == have,
            _ => false,
        }
    }

    /// The string form used on the wire and in messages.
    pub fn value_str(&self) -> String {
        match self {
            Criterion::Equals(v) => v.clone(),
            Criterion::Flag(b) => b.to_string(),
        }
    }
}

/// Parses the legacy `'all' | 'true' | 'false'` filter form.
pub fn parse_flag(value: &str) -> Result<Option<bool>> {
    match value.trim().to_lowercase().as_str() {
        "" | "all" => Ok(None),
        "true" | "yes" => Ok(Some(true)),
        "false" | "no" => Ok(Some(false)),
        other => Err(ArchiveError::InvalidFilter(format!(
            "expected all, true or false, got '{}'",
            other
        ))),
    }
}

/// Inclusive timestamp bounds; either end may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<Self> {
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(ArchiveError::InvalidFilter(format!(
                    "date range starts after it ends ({} > {})",
                    f, t
                )));
            }
        }
        Ok(Self { from, to })
    }

    pub fn is_open(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.map_or(true, |f| ts >= f) && self.to.map_or(true, |t| ts <= t)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    criteria: BTreeMap<String, Criterion>,
    date_range: Option<DateRange>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, criterion: Criterion) {
        self.criteria.insert(field.into(), criterion);
    }

    /// Sets a text constraint. Empty values and "all" clear the field instead.
    pub fn set_text(&mut self, field: impl Into<String>, value: Option<&str>) {
        let field = field.into();
        match value.map(str::trim) {
            None | Some("") => self.clear(&field),
            Some(v) if v.eq_ignore_ascii_case("all") => self.clear(&field),
            Some(v) => self.set(field, Criterion::Equals(v.to_string())),
        }
    }

    pub fn set_flag(&mut self, field: impl Into<String>, value: Option<bool>) {
        let field = field.into();
        match value {
            Some(b) => self.set(field, Criterion::Flag(b)),
            None => self.clear(&field),
        }
    }

    pub fn clear(&mut self, field: &str) {
        self.criteria.remove(field);
    }

    pub fn with_text(mut self, field: impl Into<String>, value: &str) -> Self {
        self.set_text(field, Some(value));
        self
    }

    pub fn with_flag(mut self, field: impl Into<String>, value: Option<bool>) -> Self {
        self.set_flag(field, value);
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.set_date_range(range);
        self
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        self.date_range = if range.is_open() { None } else { Some(range) };
    }

    pub fn get(&self, field: &str) -> Option<&Criterion> {
        self.criteria.get(field)
    }

    pub fn criteria(&self) -> impl Iterator<Item = (&str, &Criterion)> {
        self.criteria.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn date_range(&self) -> Option<&DateRange> {
        self.date_range.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty() && self.date_range.is_none()
    }

    /// True iff the record satisfies every constraint.
    pub fn matches<T: Filterable>(&self, record: &T) -> bool {
        let fields_ok = self.criteria.iter().all(|(name, criterion)| {
            record
                .field(name)
                .is_some_and(|value| criterion.matches(&value))
        });
        if !fields_ok {
            return false;
        }

        match &self.date_range {
            None => true,
            Some(range) => record.timestamp().is_some_and(|ts| range.contains(ts)),
        }
    }

    /// Keeps the matching records, preserving their order.
    pub fn apply<T: Filterable>(&self, records: Vec<T>) -> Vec<T> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn text(value: &str) -> Option<FieldValue> {
    Some(FieldValue::Text(value.to_string()))
}

impl Filterable for Document {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => text(&self.id),
            "title" => text(&self.title),
            "format" => text(self.format.as_str()),
            "resource_type" | "type" => text(&self.resource_type),
            "status" => text(self.status.as_str()),
            "collection" => self.collection_id.as_deref().and_then(text),
            "creator" => self.creator.as_deref().and_then(text),
            "views" => Some(FieldValue::Number(self.views)),
            "downloads" => Some(FieldValue::Number(self.downloads)),
            _ => None,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }
}

impl Filterable for Collection {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => text(&self.id),
            "name" => text(&self.name),
            "category" => text(&self.category),
            "parent" => self.parent_id.as_deref().and_then(text),
            "featured" => Some(FieldValue::Flag(self.featured)),
            "root" => Some(FieldValue::Flag(self.is_root())),
            _ => None,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.created_at)
    }
}

impl Filterable for AuditEntry {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => text(&self.id),
            "user" => text(&self.user),
            "action" => text(&self.action),
            "resource" => text(&self.resource),
            "ip_address" => text(&self.ip_address),
            "success" => Some(FieldValue::Flag(self.success)),
            "suspicious" => Some(FieldValue::Flag(self.suspicious)),
            _ => None,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::seed;
    use chrono::TimeZone;

    fn ids<T: Filterable>(records: &[T]) -> Vec<String> {
        records
            .iter()
            .filter_map(|r| match r.field("id") {
                Some(FieldValue::Text(id)) => Some(id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn audit_login_filter_matches_three_entries() {
        let mut state = FilterState::new();
        state.set_text("action", Some("login"));
        state.set_text("resource", Some("all"));
        state.set_flag("success", parse_flag("all").unwrap());
        state.set_flag("suspicious", parse_flag("all").unwrap());

        let result = state.apply(seed::audit_log());
        assert_eq!(ids(&result), vec!["1", "2", "6"]);
    }

    #[test]
    fn featured_collections_filter() {
        let state = FilterState::new().with_flag("featured", Some(true));
        let all = seed::collections();
        assert_eq!(all.len(), 12);
        let featured = state.apply(all);
        assert_eq!(featured.len(), 6);
        assert!(featured.iter().all(|c| c.featured));
    }

    #[test]
    fn all_sentinel_clears_constraint() {
        let mut state = FilterState::new().with_text("action", "login");
        assert!(!state.is_empty());
        state.set_text("action", Some("ALL"));
        assert!(state.is_empty());
    }

    #[test]
    fn flags_only_match_boolean_fields() {
        let state = FilterState::new().with_text("success", "true");
        // "success" is a boolean field; a text criterion never matches it
        assert!(state.apply(seed::audit_log()).is_empty());

        let state = FilterState::new().with_flag("success", Some(false));
        assert!(state.apply(seed::audit_log()).iter().all(|e| !e.success));
    }

    #[test]
    fn unknown_field_matches_nothing() {
        let state = FilterState::new().with_text("colour", "red");
        assert!(state.apply(seed::documents()).is_empty());
    }

    #[test]
    fn combined_constraints_are_anded() {
        let state = FilterState::new()
            .with_text("action", "login")
            .with_flag("success", Some(false));
        let result = state.apply(seed::audit_log());
        assert!(!result.is_empty());
        assert!(result.iter().all(|e| e.action == "login" && !e.success));
    }

    #[test]
    fn filter_is_subset_and_idempotent() {
        let records = seed::documents();
        let states = vec![
            FilterState::new(),
            FilterState::new().with_text("format", "pdf"),
            FilterState::new().with_text("status", "published"),
            FilterState::new()
                .with_text("format", "image")
                .with_text("collection", "col-2"),
            FilterState::new().with_text("format", "nonexistent"),
        ];

        for state in states {
            let once = state.apply(records.clone());
            let original_ids = ids(&records);
            let once_ids = ids(&once);
            assert!(once_ids.iter().all(|id| original_ids.contains(id)));
            let mut dedup = once_ids.clone();
            dedup.sort();
            dedup.dedup();
            assert_eq!(dedup.len(), once_ids.len());

            let twice = state.apply(once.clone());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn date_range_is_inclusive() {
        let from = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 59).unwrap();
        let range = DateRange::new(Some(from), Some(to)).unwrap();
        assert!(range.contains(from));
        assert!(range.contains(to));
        assert!(!range.contains(to + chrono::Duration::seconds(1)));
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let a = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            DateRange::new(Some(a), Some(b)),
            Err(ArchiveError::InvalidFilter(_))
        ));
    }

    #[test]
    fn records_without_timestamp_fail_date_range() {
        let mut doc = Document::new("x", "Undated", crate::model::Format::Text);
        doc.date = None;
        let from = Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap();
        let state =
            FilterState::new().with_date_range(DateRange::new(Some(from), None).unwrap());
        assert!(!state.matches(&doc));
    }

    #[test]
    fn parse_flag_rejects_garbage() {
        assert_eq!(parse_flag("All").unwrap(), None);
        assert_eq!(parse_flag("true").unwrap(), Some(true));
        assert_eq!(parse_flag("false").unwrap(), Some(false));
        assert!(parse_flag("maybe").is_err());
    }
}
