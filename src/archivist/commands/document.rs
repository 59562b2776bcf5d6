use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::DocumentDetail;
use crate::query::{self, PageRequest, Query, SortBy};
use crate::store::CatalogStore;

pub const RELATED_LIMIT: usize = 4;

/// Loads a document with its collection and up to four related documents
/// (the most popular others from the same collection).
pub fn detail<S: CatalogStore + ?Sized>(store: &S, id: &str) -> Result<DocumentDetail> {
    let document = store.get_document(id)?;

    let (collection, related) = match document.collection_id.as_deref() {
        Some(cid) => {
            let collection = store.get_collection(cid)?.summary();
            let siblings: Vec<_> = store
                .documents_in(cid)?
                .into_iter()
                .filter(|d| d.id != document.id)
                .collect();
            let q = Query::new(PageRequest::first(RELATED_LIMIT)?).with_sort(SortBy::Popularity);
            (Some(collection), query::run(siblings, &q).items)
        }
        None => (None, Vec::new()),
    };

    Ok(DocumentDetail {
        document,
        collection,
        related,
    })
}

pub fn run<S: CatalogStore + ?Sized>(store: &S, id: &str) -> Result<CmdResult> {
    let detail = detail(store, id)?;
    Ok(CmdResult::default().with_detail(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArchiveError;
    use crate::model::{Document, Format};
    use crate::store::memory::InMemoryStore;

    #[test]
    fn detail_includes_collection_and_related() {
        let store = InMemoryStore::seeded();
        let detail = detail(&store, "doc-5").unwrap();
        assert_eq!(detail.document.title, "Market Day on King Street");
        assert_eq!(detail.collection.unwrap().id, "col-8");
        let related: Vec<&str> = detail.related.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(related, vec!["doc-6", "doc-7"]);
    }

    #[test]
    fn orphan_document_has_no_related() {
        let mut store = InMemoryStore::seeded();
        store.insert_document(Document::new("loose", "Loose Leaf", Format::Text));
        let detail = detail(&store, "loose").unwrap();
        assert!(detail.collection.is_none());
        assert!(detail.related.is_empty());
    }

    #[test]
    fn missing_document() {
        let store = InMemoryStore::seeded();
        assert!(matches!(
            run(&store, "doc-999"),
            Err(ArchiveError::DocumentNotFound(_))
        ));
    }
}
