use crate::commands::helpers::pagination_messages;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::filter::{DateRange, FilterState};
use crate::query::{self, PageRequest, Query, SortBy};
use crate::store::CatalogStore;

/// Audit log constraints. Every `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub action: Option<String>,
    pub resource: Option<String>,
    pub user: Option<String>,
    pub success: Option<bool>,
    pub suspicious: Option<bool>,
    pub range: Option<DateRange>,
}

impl AuditFilter {
    pub fn to_filter_state(&self) -> FilterState {
        let mut state = FilterState::new()
            .with_flag("success", self.success)
            .with_flag("suspicious", self.suspicious);
        state.set_text("action", self.action.as_deref());
        state.set_text("resource", self.resource.as_deref());
        state.set_text("user", self.user.as_deref());
        if let Some(range) = self.range {
            state.set_date_range(range);
        }
        state
    }
}

/// Lists audit entries matching `filter`, newest first.
pub fn run<S: CatalogStore + ?Sized>(
    store: &S,
    filter: &AuditFilter,
    page: PageRequest,
) -> Result<CmdResult> {
    let entries = store.list_audit_entries()?;
    let q = Query::new(page)
        .with_filters(filter.to_filter_state())
        .with_sort(SortBy::Date);
    let result = query::run(entries, &q);

    tracing::debug!(total = result.pagination.total, "audit log filtered");

    let mut out = CmdResult::default().with_pagination(result.pagination);
    for m in pagination_messages(page, &result.pagination, "entries") {
        out.add_message(m);
    }
    Ok(out.with_audit_entries(result.items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use chrono::{TimeZone, Utc};

    fn ids(result: &CmdResult) -> Vec<&str> {
        result.audit_entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn unfiltered_is_newest_first() {
        let store = InMemoryStore::seeded();
        let result = run(&store, &AuditFilter::default(), PageRequest::default()).unwrap();
        assert_eq!(ids(&result), vec!["8", "7", "6", "5", "4", "3", "2", "1"]);
    }

    #[test]
    fn action_filter() {
        let store = InMemoryStore::seeded();
        let filter = AuditFilter {
            action: Some("login".into()),
            ..Default::default()
        };
        let result = run(&store, &filter, PageRequest::default()).unwrap();
        assert_eq!(ids(&result), vec!["6", "2", "1"]);
    }

    #[test]
    fn all_is_no_constraint() {
        let store = InMemoryStore::seeded();
        let filter = AuditFilter {
            action: Some("all".into()),
            resource: Some("".into()),
            ..Default::default()
        };
        let result = run(&store, &filter, PageRequest::default()).unwrap();
        assert_eq!(result.audit_entries.len(), 8);
    }

    #[test]
    fn suspicious_failures() {
        let store = InMemoryStore::seeded();
        let filter = AuditFilter {
            success: Some(false),
            suspicious: Some(true),
            ..Default::default()
        };
        let result = run(&store, &filter, PageRequest::default()).unwrap();
        assert_eq!(ids(&result), vec!["7", "2"]);
    }

    #[test]
    fn date_range_selects_one_day() {
        let store = InMemoryStore::seeded();
        let from = Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).single();
        let to = Utc.with_ymd_and_hms(2024, 1, 16, 23, 59, 59).single();
        let filter = AuditFilter {
            range: Some(DateRange::new(from, to).unwrap()),
            ..Default::default()
        };
        let result = run(&store, &filter, PageRequest::default()).unwrap();
        assert_eq!(ids(&result), vec!["8", "7", "6"]);
    }

    #[test]
    fn pagination_over_entries() {
        let store = InMemoryStore::seeded();
        let result = run(
            &store,
            &AuditFilter::default(),
            PageRequest::new(2, 3).unwrap(),
        )
        .unwrap();
        assert_eq!(ids(&result), vec!["5", "4", "3"]);
        assert_eq!(result.messages.last().unwrap().content, "Page 2 of 3 (8 entries)");
    }
}
