use super::CatalogStore;
use crate::error::{ArchiveError, Result};
use crate::model::{AuditEntry, Catalog, Collection, Document};
use std::fs;
use std::path::{Path, PathBuf};

pub const CATALOG_FILENAME: &str = "catalog.json";

/// Catalog backed by a `catalog.json` file in a data directory.
///
/// The file is re-read on every call, so edits made while the process runs
/// are picked up without a restart.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILENAME)
    }

    pub fn exists(&self) -> bool {
        self.catalog_path().exists()
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(ArchiveError::Io)?;
        }
        Ok(())
    }

    pub fn load(&self) -> Result<Catalog> {
        let path = self.catalog_path();
        if !path.exists() {
            return Err(ArchiveError::Store(format!(
                "No catalog at {} (run `archivist init` or pass --mock)",
                path.display()
            )));
        }
        let content = fs::read_to_string(&path).map_err(ArchiveError::Io)?;
        let catalog: Catalog =
            serde_json::from_str(&content).map_err(ArchiveError::Serialization)?;
        tracing::debug!(
            path = %path.display(),
            collections = catalog.collections.len(),
            documents = catalog.documents.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    /// Writes the catalog, replacing any existing file.
    ///
    /// Goes through a temp file and a rename so readers never see a partial file.
    pub fn save(&self, catalog: &Catalog) -> Result<()> {
        self.ensure_dir()?;
        let path = self.catalog_path();
        let tmp = self.root.join(format!("{}.tmp", CATALOG_FILENAME));
        let content = serde_json::to_string_pretty(catalog).map_err(ArchiveError::Serialization)?;
        fs::write(&tmp, content).map_err(ArchiveError::Io)?;
        fs::rename(&tmp, &path).map_err(ArchiveError::Io)?;
        Ok(())
    }
}

impl CatalogStore for FileStore {
    fn list_collections(&self) -> Result<Vec<Collection>> {
        Ok(self.load()?.collections)
    }

    fn get_collection(&self, id: &str) -> Result<Collection> {
        self.load()?
            .collections
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ArchiveError::CollectionNotFound(id.to_string()))
    }

    fn list_documents(&self) -> Result<Vec<Document>> {
        Ok(self.load()?.documents)
    }

    fn get_document(&self, id: &str) -> Result<Document> {
        self.load()?
            .documents
            .into_iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ArchiveError::DocumentNotFound(id.to_string()))
    }

    fn list_audit_entries(&self) -> Result<Vec<AuditEntry>> {
        Ok(self.load()?.audit_log)
    }
}
