//! # Storage Layer
//!
//! The [`CatalogStore`] trait is the repository interface the rest of the
//! crate reads the archive through. Nothing above this layer knows whether
//! records come from mock data, a JSON file or (later) a real backend.
//!
//! ## Implementations
//!
//! - [`memory::InMemoryStore`]: serves the built-in mock catalog ([`seed`]).
//!   Can simulate latency and failures so callers can exercise their loading
//!   and error states.
//! - [`fs::FileStore`]: reads a `catalog.json` from a data directory.
//!
//! ## Storage Format
//!
//! ```text
//! <data-dir>/
//! ├── catalog.json        # {collections, documents, auditLog}
//! ├── config.json         # page size, default sort
//! └── submissions.jsonl   # confirmed workflow submissions, one per line
//! ```

use crate::error::{ArchiveError, Result};
use crate::model::{AuditEntry, Collection, CollectionSummary, Document};
use std::collections::HashSet;

pub mod fs;
pub mod memory;
pub mod seed;

/// Collection hierarchies deeper than this are treated as corrupt.
pub const MAX_DEPTH: usize = 64;

/// Read access to an archive catalog.
pub trait CatalogStore {
    /// All collections, roots and descendants alike.
    fn list_collections(&self) -> Result<Vec<Collection>>;

    /// A collection by id.
    fn get_collection(&self, id: &str) -> Result<Collection>;

    /// All documents in catalog order.
    fn list_documents(&self) -> Result<Vec<Document>>;

    /// A document by id.
    fn get_document(&self, id: &str) -> Result<Document>;

    /// The audit log in chronological order.
    fn list_audit_entries(&self) -> Result<Vec<AuditEntry>>;

    /// Direct children of a collection, or the roots when `parent` is `None`.
    fn child_collections(&self, parent: Option<&str>) -> Result<Vec<Collection>> {
        Ok(self
            .list_collections()?
            .into_iter()
            .filter(|c| c.parent_id.as_deref() == parent)
            .collect())
    }

    /// Documents filed directly in a collection.
    fn documents_in(&self, collection_id: &str) -> Result<Vec<Document>> {
        Ok(self
            .list_documents()?
            .into_iter()
            .filter(|d| d.collection_id.as_deref() == Some(collection_id))
            .collect())
    }
}

/// Lets a caller pick the backend at runtime (`Box<dyn CatalogStore>`).
impl<T: CatalogStore + ?Sized> CatalogStore for Box<T> {
    fn list_collections(&self) -> Result<Vec<Collection>> {
        (**self).list_collections()
    }

    fn get_collection(&self, id: &str) -> Result<Collection> {
        (**self).get_collection(id)
    }

    fn list_documents(&self) -> Result<Vec<Document>> {
        (**self).list_documents()
    }

    fn get_document(&self, id: &str) -> Result<Document> {
        (**self).get_document(id)
    }

    fn list_audit_entries(&self) -> Result<Vec<AuditEntry>> {
        (**self).list_audit_entries()
    }

    fn child_collections(&self, parent: Option<&str>) -> Result<Vec<Collection>> {
        (**self).child_collections(parent)
    }

    fn documents_in(&self, collection_id: &str) -> Result<Vec<Document>> {
        (**self).documents_in(collection_id)
    }
}

/// Resolves the chain of collections from the root down to `id` (inclusive).
///
/// Walks `parent_id` links upward. Revisiting a collection or exceeding
/// [`MAX_DEPTH`] is reported as a store error rather than looping.
pub fn ancestors<S: CatalogStore + ?Sized>(store: &S, id: &str) -> Result<Vec<CollectionSummary>> {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut next = Some(id.to_string());

    while let Some(current) = next {
        if !seen.insert(current.clone()) {
            return Err(ArchiveError::Store(format!(
                "collection hierarchy cycle at {}",
                current
            )));
        }
        if chain.len() >= MAX_DEPTH {
            return Err(ArchiveError::Store(format!(
                "collection hierarchy deeper than {} below {}",
                MAX_DEPTH, id
            )));
        }
        let collection = store.get_collection(&current)?;
        next = collection.parent_id.clone();
        chain.push(collection.summary());
    }

    chain.reverse();
    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Catalog;
    use memory::InMemoryStore;

    #[test]
    fn ancestors_are_root_first() {
        let store = InMemoryStore::seeded();
        let chain = ancestors(&store, "col-10").unwrap();
        let ids: Vec<&str> = chain.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["col-3", "col-9", "col-10"]);
    }

    #[test]
    fn ancestors_of_root_is_itself() {
        let store = InMemoryStore::seeded();
        let chain = ancestors(&store, "col-2").unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name, "Photographic Archive");
    }

    #[test]
    fn ancestors_detects_cycles() {
        let mut a = Collection::new("a", "A");
        a.parent_id = Some("b".into());
        let mut b = Collection::new("b", "B");
        b.parent_id = Some("a".into());
        let store = InMemoryStore::new(Catalog {
            collections: vec![a, b],
            ..Catalog::default()
        });

        let err = ancestors(&store, "a").unwrap_err();
        assert!(matches!(err, ArchiveError::Store(msg) if msg.contains("cycle")));
    }

    #[test]
    fn ancestors_of_unknown_collection_is_not_found() {
        let store = InMemoryStore::seeded();
        assert!(matches!(
            ancestors(&store, "col-99"),
            Err(ArchiveError::CollectionNotFound(_))
        ));
    }

    #[test]
    fn child_collections_of_root() {
        let store = InMemoryStore::seeded();
        let roots = store.child_collections(None).unwrap();
        assert_eq!(roots.len(), 5);
        let children = store.child_collections(Some("col-1")).unwrap();
        let ids: Vec<&str> = children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["col-6", "col-7"]);
    }
}
