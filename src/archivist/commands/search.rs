use crate::commands::helpers::pagination_messages;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::Document;
use crate::query::{self, Paginated, Query};
use crate::store::CatalogStore;

/// One page of documents matching `query`.
pub fn page<S: CatalogStore + ?Sized>(store: &S, query: &Query) -> Result<Paginated<Document>> {
    Ok(query::run(store.list_documents()?, query))
}

pub fn run<S: CatalogStore + ?Sized>(store: &S, query: &Query) -> Result<CmdResult> {
    let page = page(store, query)?;

    let mut result = CmdResult::default().with_pagination(page.pagination);
    for m in pagination_messages(query.page, &page.pagination, "documents") {
        result.add_message(m);
    }
    Ok(result.with_documents(page.items))
}
