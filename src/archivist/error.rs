use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid navigation: {0}")]
    InvalidNavigation(String),

    #[error("Workflow error: {0}")]
    Workflow(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl ArchiveError {
    /// True for errors caused by bad caller input rather than a failing backend.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ArchiveError::InvalidFilter(_)
                | ArchiveError::InvalidQuery(_)
                | ArchiveError::InvalidNavigation(_)
                | ArchiveError::Workflow(_)
                | ArchiveError::Api(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ArchiveError::DocumentNotFound(_) | ArchiveError::CollectionNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ArchiveError>;
