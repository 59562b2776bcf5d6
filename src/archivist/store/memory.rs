use super::{seed, CatalogStore};
use crate::error::{ArchiveError, Result};
use crate::model::{AuditEntry, Catalog, Collection, Document};
use std::time::Duration;

/// In-memory catalog for the mock portal and for tests.
/// Does NOT persist data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    catalog: Catalog,
    latency: Option<Duration>,
    failure: Option<String>,
}

impl InMemoryStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            latency: None,
            failure: None,
        }
    }

    /// A store serving the built-in mock catalog.
    pub fn seeded() -> Self {
        Self::new(seed::catalog())
    }

    /// Sleep this long before every read, like a slow network round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail every read with a store error carrying `message`.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn set_failure(&mut self, message: Option<String>) {
        self.failure = message;
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn insert_document(&mut self, document: Document) {
        self.catalog.documents.retain(|d| d.id != document.id);
        self.catalog.documents.push(document);
        seed::recount(&mut self.catalog);
    }

    pub fn insert_collection(&mut self, collection: Collection) {
        self.catalog.collections.retain(|c| c.id != collection.id);
        self.catalog.collections.push(collection);
        seed::recount(&mut self.catalog);
    }

    fn simulate(&self) -> Result<()> {
        if let Some(latency) = self.latency {
            tracing::trace!(?latency, "simulating catalog round trip");
            std::thread::sleep(latency);
        }
        match &self.failure {
            Some(message) => Err(ArchiveError::Store(message.clone())),
            None => Ok(()),
        }
    }
}

impl CatalogStore for InMemoryStore {
    fn list_collections(&self) -> Result<Vec<Collection>> {
        self.simulate()?;
        Ok(self.catalog.collections.clone())
    }

    fn get_collection(&self, id: &str) -> Result<Collection> {
        self.simulate()?;
        self.catalog
            .collections
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ArchiveError::CollectionNotFound(id.to_string()))
    }

    fn list_documents(&self) -> Result<Vec<Document>> {
        self.simulate()?;
        Ok(self.catalog.documents.clone())
    }

    fn get_document(&self, id: &str) -> Result<Document> {
        self.simulate()?;
        self.catalog
            .documents
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| ArchiveError::DocumentNotFound(id.to_string()))
    }

    fn list_audit_entries(&self) -> Result<Vec<AuditEntry>> {
        self.simulate()?;
        Ok(self.catalog.audit_log.clone())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::Format;

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::default(),
            }
        }

        pub fn with_collection(mut self, id: &str, parent: Option<&str>) -> Self {
            let mut collection = Collection::new(id, format!("Collection {}", id));
            collection.parent_id = parent.map(str::to_string);
            self.store.insert_collection(collection);
            self
        }

        pub fn with_documents(mut self, collection: &str, count: usize, format: Format) -> Self {
            for i in 0..count {
                let id = format!("{}-doc-{}", collection, i + 1);
                let mut doc = Document::new(id, format!("Document {} of {}", i + 1, collection), format);
                doc.collection_id = Some(collection.to_string());
                self.store.insert_document(doc);
            }
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;
    use crate::model::Format;

    #[test]
    fn lookups_report_not_found() {
        let store = InMemoryStore::seeded();
        assert!(matches!(
            store.get_document("nope"),
            Err(ArchiveError::DocumentNotFound(id)) if id == "nope"
        ));
        assert!(matches!(
            store.get_collection("nope"),
            Err(ArchiveError::CollectionNotFound(_))
        ));
    }

    #[test]
    fn injected_failure_fails_every_read() {
        let store = InMemoryStore::seeded().with_failure("backend down");
        assert!(matches!(store.list_documents(), Err(ArchiveError::Store(m)) if m == "backend down"));
        assert!(store.list_collections().is_err());
        assert!(store.list_audit_entries().is_err());
    }

    #[test]
    fn latency_delays_reads() {
        let store = InMemoryStore::seeded().with_latency(Duration::from_millis(20));
        let started = std::time::Instant::now();
        store.list_collections().unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn inserts_keep_counts_current() {
        let fixture = StoreFixture::new()
            .with_collection("root", None)
            .with_collection("child", Some("root"))
            .with_documents("root", 3, Format::Pdf);

        let root = fixture.store.get_collection("root").unwrap();
        assert_eq!(root.document_count, 3);
        assert_eq!(root.subcollection_count, 1);
        assert_eq!(fixture.store.documents_in("child").unwrap().len(), 0);
    }
}
