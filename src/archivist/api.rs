//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for archive operations, whichever client is driving it: the
//! bundled CLI, the REST-shaped router in [`crate::routes`], or a test.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (raw page/limit numbers become a validated
//!   [`PageRequest`], with the configured page size as the default limit)
//! - **Returns structured types** (`Result<CmdResult>`, or a [`Response`] for routes)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: That belongs in `commands/*.rs`
//! - **I/O to the terminal**: No stdout or stderr
//! - **Presentation concerns**: Returns data structures, not strings
//!
//! ## Generic Over CatalogStore
//!
//! `ArchiveApi<S: CatalogStore>` is generic over the storage backend:
//! - Production: `ArchiveApi<FileStore>`
//! - Mock portal and tests: `ArchiveApi<InMemoryStore>`

use crate::commands::{self, workflow};
use crate::config::ArchiveConfig;
use crate::controller::{Resolution, ViewController};
use crate::error::Result;
use crate::model::{Document, DocumentDetail, Format};
use crate::query::{PageRequest, Paginated, Query};
use crate::routes::{self, Response};
use crate::store::CatalogStore;
use chrono::NaiveDate;

/// The main API facade for archive operations.
pub struct ArchiveApi<S: CatalogStore> {
    store: S,
    paths: commands::ArchivePaths,
    config: ArchiveConfig,
}

impl<S: CatalogStore> ArchiveApi<S> {
    /// Loads `config.json` from the data dir, falling back to defaults.
    pub fn new(store: S, paths: commands::ArchivePaths) -> Result<Self> {
        let config = ArchiveConfig::load(&paths.data_dir)?;
        Ok(Self::with_config(store, paths, config))
    }

    pub fn with_config(store: S, paths: commands::ArchivePaths, config: ArchiveConfig) -> Self {
        Self {
            store,
            paths,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn paths(&self) -> &commands::ArchivePaths {
        &self.paths
    }

    pub fn settings(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Builds a page request, using the configured page size when no limit is given.
    pub fn page_request(&self, page: Option<usize>, limit: Option<usize>) -> Result<PageRequest> {
        PageRequest::new(page.unwrap_or(1), limit.unwrap_or(self.config.page_size))
    }

    /// A query with the configured default sort.
    pub fn query(&self, page: PageRequest) -> Query {
        Query::new(page).with_sort(self.config.default_sort)
    }

    pub fn collections(&self, filter: &CollectionFilter) -> Result<commands::CmdResult> {
        commands::collections::run(&self.store, filter)
    }

    pub fn browse(
        &self,
        path: &[&str],
        page: PageRequest,
        format: Option<Format>,
    ) -> Result<commands::CmdResult> {
        commands::browse::run(&self.store, path, page, format)
    }

    pub fn document(&self, id: &str) -> Result<commands::CmdResult> {
        commands::document::run(&self.store, id)
    }

    pub fn document_detail(&self, id: &str) -> Result<DocumentDetail> {
        commands::document::detail(&self.store, id)
    }

    pub fn search(&self, query: &Query) -> Result<commands::CmdResult> {
        commands::search::run(&self.store, query)
    }

    /// Fetch used by a [`ViewController`] driving the search view.
    pub fn search_page(&self, query: &Query) -> Result<Paginated<Document>> {
        commands::search::page(&self.store, query)
    }

    /// Runs the search view's current query through its controller.
    pub fn refresh_search(&self, view: &mut ViewController<Document>) -> Resolution {
        view.refresh(|q| self.search_page(q))
    }

    pub fn audit(&self, filter: &AuditFilter, page: PageRequest) -> Result<commands::CmdResult> {
        commands::audit::run(&self.store, filter, page)
    }

    pub fn prepare_visit(
        &self,
        name: &str,
        date: NaiveDate,
        visitors: u8,
        purpose: Option<&str>,
        today: NaiveDate,
    ) -> Result<Pending<VisitBooking>> {
        workflow::prepare_visit(name, date, visitors, purpose, today)
    }

    pub fn prepare_record_request(
        &self,
        document_id: &str,
        name: &str,
        reason: &str,
    ) -> Result<Pending<RecordRequest>> {
        workflow::prepare_record_request(&self.store, document_id, name, reason)
    }

    pub fn submit<T: Submittable>(
        &self,
        confirmed: Confirmed<T>,
        sink: &mut dyn SubmissionSink,
    ) -> Result<commands::CmdResult> {
        workflow::run(confirmed, sink)
    }

    /// The sink used by the CLI: `<data-dir>/submissions.jsonl`.
    pub fn file_sink(&self) -> FileSink {
        FileSink::new(self.paths.submissions_file())
    }

    pub fn config(&mut self, action: ConfigAction) -> Result<commands::CmdResult> {
        let result = commands::config::run(&self.paths, action)?;
        if let Some(config) = &result.config {
            self.config = config.clone();
        }
        Ok(result)
    }

    pub fn init(&self, force: bool) -> Result<commands::CmdResult> {
        commands::init::run(&self.paths, force)
    }

    /// Serves one REST request against the store.
    pub fn handle(&self, method: &str, target: &str) -> Response {
        routes::handle(&self.store, &self.config, method, target)
    }
}

pub use crate::commands::audit::AuditFilter;
pub use crate::commands::collections::CollectionFilter;
pub use crate::commands::config::ConfigAction;
pub use crate::commands::workflow::{
    Confirmed, FileSink, MemorySink, Pending, RecordRequest, Submission, SubmissionSink,
    Submittable, VisitBooking,
};
pub use commands::{ArchivePaths, CmdMessage, CmdResult, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortBy;
    use crate::store::memory::InMemoryStore;
    use tempfile::tempdir;

    fn api(dir: &std::path::Path) -> ArchiveApi<InMemoryStore> {
        ArchiveApi::new(
            InMemoryStore::seeded(),
            ArchivePaths::new(dir.to_path_buf()),
        )
        .unwrap()
    }

    #[test]
    fn page_request_uses_configured_size() {
        let dir = tempdir().unwrap();
        let mut api = api(dir.path());
        assert_eq!(api.page_request(None, None).unwrap().limit(), 20);

        api.config(ConfigAction::Set("page-size".into(), "7".into()))
            .unwrap();
        let page = api.page_request(Some(2), None).unwrap();
        assert_eq!((page.page(), page.limit()), (2, 7));
        assert!(api.page_request(None, Some(0)).is_err());
    }

    #[test]
    fn query_uses_default_sort() {
        let dir = tempdir().unwrap();
        let mut api = api(dir.path());
        api.config(ConfigAction::Set("default-sort".into(), "title".into()))
            .unwrap();
        let q = api.query(PageRequest::default());
        assert_eq!(q.sort, SortBy::Title);
    }

    #[test]
    fn search_view_settles_through_controller() {
        use crate::controller::{Trigger, ViewState};

        let dir = tempdir().unwrap();
        let api = api(dir.path());
        let mut view = ViewController::new(PageRequest::default());
        view.dispatch(Trigger::SubmitQuery("interview".into()))
            .unwrap();
        assert_eq!(api.refresh_search(&mut view), Resolution::Applied);
        match view.state() {
            ViewState::Success(page) => assert_eq!(page.pagination.total, 2),
            other => panic!("unexpected state {}", other.label()),
        }

        view.dispatch(Trigger::SubmitQuery("zeppelin".into()))
            .unwrap();
        api.refresh_search(&mut view);
        assert!(matches!(view.state(), ViewState::Empty(_)));
    }

    #[test]
    fn handle_dispatches_to_routes() {
        let dir = tempdir().unwrap();
        let api = api(dir.path());
        let res = api.handle("GET", "/api/documents/doc-1");
        assert!(res.is_success());
        assert_eq!(res.body["data"]["id"], "doc-1");
    }

    #[test]
    fn record_request_round_trip_through_memory_sink() {
        let dir = tempdir().unwrap();
        let api = api(dir.path());
        let pending = api
            .prepare_record_request("doc-12", "Ada", "restoration study")
            .unwrap();
        let mut sink = MemorySink::new();
        let result = api.submit(pending.confirm(), &mut sink).unwrap();
        assert!(result.submission.is_some());
        assert_eq!(sink.submissions().len(), 1);
    }
}
