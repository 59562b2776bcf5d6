use crate::commands::helpers::pagination_messages;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::filter::FilterState;
use crate::model::Format;
use crate::navigator::CollectionNavigator;
use crate::query::PageRequest;
use crate::store::CatalogStore;

/// Shows one collection: its breadcrumb, sub-collections and a page of its
/// documents, optionally narrowed to a format.
///
/// `path` selects the collection. Empty shows the roots. A single id is a deep
/// link resolved through its ancestors. Several ids are walked from the roots
/// one level at a time, each required to be a child of the previous one.
pub fn run<S: CatalogStore + ?Sized>(
    store: &S,
    path: &[&str],
    page: PageRequest,
    format: Option<Format>,
) -> Result<CmdResult> {
    let mut navigator = CollectionNavigator::new(page);
    if let Some(format) = format {
        navigator.set_filters(FilterState::new().with_text("format", format.as_str()));
    }

    let node = match path {
        [] => navigator.home(store)?,
        [id] => navigator.open(store, id)?,
        ids => {
            navigator.home(store)?;
            for id in ids {
                navigator.enter(store, id)?;
            }
            navigator.load(store)?
        }
    };

    let mut result = CmdResult::default()
        .with_collections(node.children.clone())
        .with_documents(node.documents.items.clone())
        .with_pagination(node.documents.pagination);

    if node.collection.is_some() {
        for m in pagination_messages(page, &node.documents.pagination, "documents") {
            result.add_message(m);
        }
    }

    Ok(result.with_node(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ArchiveError;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn browsing_home_lists_roots_without_documents() {
        let store = InMemoryStore::seeded();
        let result = run(&store, &[], PageRequest::default(), None).unwrap();
        assert_eq!(result.collections.len(), 5);
        assert!(result.documents.is_empty());
        assert!(result.messages.is_empty());
    }

    #[test]
    fn browsing_a_collection_includes_breadcrumb() {
        let store = InMemoryStore::seeded();
        let result = run(&store, &["col-8"], PageRequest::default(), None).unwrap();
        let node = result.node.unwrap();
        let crumbs: Vec<&str> = node.breadcrumb.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(crumbs, vec!["Photographic Archive", "Street Photography 1950s"]);
        assert_eq!(result.documents.len(), 3);
    }

    #[test]
    fn format_filter_narrows_documents() {
        let store = InMemoryStore::seeded();
        let result = run(
            &store,
            &["col-8"],
            PageRequest::default(),
            Some(Format::Pdf),
        )
        .unwrap();
        assert!(result.documents.is_empty());
        assert_eq!(result.messages[0].content, "No documents found.");
    }

    #[test]
    fn unknown_collection_is_not_found() {
        let store = InMemoryStore::seeded();
        let err = run(&store, &["col-0"], PageRequest::default(), None).unwrap_err();
        assert!(matches!(err, ArchiveError::CollectionNotFound(_)));
    }

    #[test]
    fn walking_a_path_checks_each_step() {
        let store = InMemoryStore::seeded();
        let result = run(
            &store,
            &["col-3", "col-9", "col-10"],
            PageRequest::default(),
            None,
        )
        .unwrap();
        assert_eq!(result.node.unwrap().breadcrumb.len(), 3);
        assert_eq!(result.documents[0].id, "doc-11");

        let err = run(&store, &["col-3", "col-10"], PageRequest::default(), None).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidNavigation(_)));
    }
}
