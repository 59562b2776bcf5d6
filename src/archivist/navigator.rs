//! Collection tree navigation.
//!
//! The navigator keeps a breadcrumb from a root collection down to the one
//! being viewed. Moving down is only possible one level at a time, into a
//! child of the current node, so the breadcrumb is always a real path in the
//! tree. Deep links ([`CollectionNavigator::open`]) rebuild the breadcrumb from
//! the collection's ancestor chain instead.

use crate::error::{ArchiveError, Result};
use crate::filter::FilterState;
use crate::model::{Collection, CollectionSummary, Document};
use crate::query::{self, PageRequest, Paginated, Query};
use crate::store::{ancestors, CatalogStore};
use serde::Serialize;

/// What the browser shows for the current position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    /// `None` at home, where the root collections are listed.
    pub collection: Option<Collection>,
    pub breadcrumb: Vec<CollectionSummary>,
    pub children: Vec<Collection>,
    pub documents: Paginated<Document>,
}

#[derive(Debug, Clone)]
pub struct CollectionNavigator {
    breadcrumb: Vec<CollectionSummary>,
    page: PageRequest,
    filters: FilterState,
}

impl Default for CollectionNavigator {
    fn default() -> Self {
        Self::new(PageRequest::default())
    }
}

impl CollectionNavigator {
    pub fn new(page: PageRequest) -> Self {
        Self {
            breadcrumb: Vec::new(),
            page,
            filters: FilterState::new(),
        }
    }

    pub fn breadcrumb(&self) -> &[CollectionSummary] {
        &self.breadcrumb
    }

    pub fn current(&self) -> Option<&CollectionSummary> {
        self.breadcrumb.last()
    }

    pub fn depth(&self) -> usize {
        self.breadcrumb.len()
    }

    pub fn set_page(&mut self, page: PageRequest) {
        self.page = page;
    }

    /// Constraints applied to the documents of every node shown.
    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    /// Clears the breadcrumb and shows the root collections.
    pub fn home<S: CatalogStore + ?Sized>(&mut self, store: &S) -> Result<NodeView> {
        self.commit(store, Vec::new())
    }

    /// Descends into a child of the current collection.
    pub fn enter<S: CatalogStore + ?Sized>(&mut self, store: &S, id: &str) -> Result<NodeView> {
        let parent = self.current().map(|c| c.id.clone());
        let children = store.child_collections(parent.as_deref())?;

        let Some(child) = children.into_iter().find(|c| c.id == id) else {
            // Distinguish a bad id from a real collection elsewhere in the tree.
            store.get_collection(id)?;
            let here = parent.unwrap_or_else(|| "home".to_string());
            return Err(ArchiveError::InvalidNavigation(format!(
                "{} is not a child of {}",
                id, here
            )));
        };

        let mut trail = self.breadcrumb.clone();
        trail.push(child.summary());
        self.commit(store, trail)
    }

    /// Truncates the breadcrumb so that entry `index` becomes current.
    pub fn jump_to<S: CatalogStore + ?Sized>(&mut self, store: &S, index: usize) -> Result<NodeView> {
        if index >= self.breadcrumb.len() {
            return Err(ArchiveError::InvalidNavigation(format!(
                "breadcrumb has {} entries, cannot jump to {}",
                self.breadcrumb.len(),
                index
            )));
        }
        let trail = self.breadcrumb[..=index].to_vec();
        self.commit(store, trail)
    }

    /// Jumps straight to any collection, rebuilding the breadcrumb from its ancestors.
    pub fn open<S: CatalogStore + ?Sized>(&mut self, store: &S, id: &str) -> Result<NodeView> {
        let trail = ancestors(store, id)?;
        self.commit(store, trail)
    }

    /// Reloads the current position.
    pub fn load<S: CatalogStore + ?Sized>(&self, store: &S) -> Result<NodeView> {
        self.view(store, &self.breadcrumb)
    }

    // The breadcrumb only moves once its view has loaded.
    fn commit<S: CatalogStore + ?Sized>(
        &mut self,
        store: &S,
        trail: Vec<CollectionSummary>,
    ) -> Result<NodeView> {
        let view = self.view(store, &trail)?;
        self.breadcrumb = trail;
        Ok(view)
    }

    fn view<S: CatalogStore + ?Sized>(
        &self,
        store: &S,
        trail: &[CollectionSummary],
    ) -> Result<NodeView> {
        let Some(current) = trail.last() else {
            return Ok(NodeView {
                collection: None,
                breadcrumb: Vec::new(),
                children: store.child_collections(None)?,
                documents: query::paginate(Vec::new(), self.page),
            });
        };

        let collection = store.get_collection(&current.id)?;
        let children = store.child_collections(Some(current.id.as_str()))?;
        let documents = query::run(
            store.documents_in(&current.id)?,
            &Query::new(self.page).with_filters(self.filters.clone()),
        );

        Ok(NodeView {
            collection: Some(collection),
            breadcrumb: trail.to_vec(),
            children,
            documents,
        })
    }
}
