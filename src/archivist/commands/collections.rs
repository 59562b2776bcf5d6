use crate::commands::helpers::pagination_messages;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::filter::FilterState;
use crate::query::{self, PageRequest, Query};
use crate::store::CatalogStore;

#[derive(Debug, Clone, Default)]
pub struct CollectionFilter {
    pub featured: Option<bool>,
    pub roots_only: bool,
    pub text: Option<String>,
    /// `None` returns every match unpaginated.
    pub page: Option<PageRequest>,
}

pub fn run<S: CatalogStore + ?Sized>(store: &S, filter: &CollectionFilter) -> Result<CmdResult> {
    let collections = store.list_collections()?;

    let mut filters = FilterState::new().with_flag("featured", filter.featured);
    if filter.roots_only {
        filters.set_flag("root", Some(true));
    }

    let mut q = Query::default().with_filters(filters);
    q.set_text(filter.text.clone());

    match filter.page {
        Some(page) => {
            q.page = page;
            let result = query::run(collections, &q);
            let mut out = CmdResult::default().with_pagination(result.pagination);
            for m in pagination_messages(page, &result.pagination, "collections") {
                out.add_message(m);
            }
            Ok(out.with_collections(result.items))
        }
        None => {
            let all = query::select(collections, &q);
            let mut out = CmdResult::default();
            if all.is_empty() {
                out.add_message(CmdMessage::info("No collections found."));
            }
            Ok(out.with_collections(all))
        }
    }
}
