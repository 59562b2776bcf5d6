use crate::commands::{ArchivePaths, CmdMessage, CmdResult};
use crate::error::Result;
use crate::store::fs::FileStore;
use crate::store::seed;

/// Writes the built-in catalog to `<data-dir>/catalog.json`.
/// An existing catalog is left alone unless `force` is set.
pub fn run(paths: &ArchivePaths, force: bool) -> Result<CmdResult> {
    let store = FileStore::new(paths.data_dir.clone());
    let mut result = CmdResult::default();

    if store.exists() && !force {
        result.add_message(CmdMessage::warning(format!(
            "Catalog already exists at {} (use --force to overwrite)",
            store.catalog_path().display()
        )));
        return Ok(result);
    }

    let catalog = seed::catalog();
    store.save(&catalog)?;
    tracing::info!(path = %store.catalog_path().display(), "catalog written");

    result.add_message(CmdMessage::success(format!(
        "Initialized catalog at {} ({} collections, {} documents)",
        store.catalog_path().display(),
        catalog.collections.len(),
        catalog.documents.len()
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::store::CatalogStore;
    use tempfile::tempdir;

    #[test]
    fn init_writes_a_loadable_catalog() {
        let dir = tempdir().unwrap();
        let paths = ArchivePaths::new(dir.path().join("nested"));
        let result = run(&paths, false).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Success);

        let store = FileStore::new(paths.data_dir.clone());
        assert_eq!(store.list_collections().unwrap().len(), 12);
        assert_eq!(store.list_documents().unwrap().len(), 20);
    }

    #[test]
    fn init_does_not_overwrite_without_force() {
        let dir = tempdir().unwrap();
        let paths = ArchivePaths::new(dir.path().to_path_buf());
        let store = FileStore::new(paths.data_dir.clone());
        store.save(&Default::default()).unwrap();

        let result = run(&paths, false).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Warning);
        assert!(store.list_collections().unwrap().is_empty());

        run(&paths, true).unwrap();
        assert_eq!(store.list_collections().unwrap().len(), 12);
    }
}
