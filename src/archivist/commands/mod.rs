use crate::config::ArchiveConfig;
use crate::model::{AuditEntry, Collection, Document, DocumentDetail};
use crate::navigator::NodeView;
use crate::query::Pagination;
use std::path::PathBuf;

pub mod audit;
pub mod browse;
pub mod collections;
pub mod config;
pub mod document;
pub mod helpers;
pub mod init;
pub mod search;
pub mod workflow;

#[derive(Debug, Clone)]
pub struct ArchivePaths {
    pub data_dir: PathBuf,
}

impl ArchivePaths {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn submissions_file(&self) -> PathBuf {
        self.data_dir.join(workflow::SUBMISSIONS_FILENAME)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub collections: Vec<Collection>,
    pub documents: Vec<Document>,
    pub audit_entries: Vec<AuditEntry>,
    pub pagination: Option<Pagination>,
    pub node: Option<NodeView>,
    pub detail: Option<DocumentDetail>,
    pub submission: Option<workflow::Submission>,
    pub config: Option<ArchiveConfig>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_collections(mut self, collections: Vec<Collection>) -> Self {
        self.collections = collections;
        self
    }

    pub fn with_documents(mut self, documents: Vec<Document>) -> Self {
        self.documents = documents;
        self
    }

    pub fn with_audit_entries(mut self, entries: Vec<AuditEntry>) -> Self {
        self.audit_entries = entries;
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    pub fn with_node(mut self, node: NodeView) -> Self {
        self.node = Some(node);
        self
    }

    pub fn with_detail(mut self, detail: DocumentDetail) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn with_submission(mut self, submission: workflow::Submission) -> Self {
        self.submission = Some(submission);
        self
    }

    pub fn with_config(mut self, config: ArchiveConfig) -> Self {
        self.config = Some(config);
        self
    }
}
