use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Physical or digital format of an archival document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Pdf,
    Image,
    Audio,
    Video,
    Text,
    Map,
}

impl Format {
    pub const ALL: [Format; 6] = [
        Format::Pdf,
        Format::Image,
        Format::Audio,
        Format::Video,
        Format::Text,
        Format::Map,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Image => "image",
            Format::Audio => "audio",
            Format::Video => "video",
            Format::Text => "text",
            Format::Map => "map",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Format::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == lower)
            .ok_or_else(|| format!("Unknown format: {}", s))
    }
}

/// Publication status of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Published,
    Restricted,
    Draft,
    Archived,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Published => "published",
            RecordStatus::Restricted => "restricted",
            RecordStatus::Draft => "draft",
            RecordStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub description: String,
    pub format: Format,
    pub resource_type: String,
    pub status: RecordStatus,
    #[serde(default)]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    // Date of the original item, not of cataloguing
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Document {
    pub fn new(id: impl Into<String>, title: impl Into<String>, format: Format) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            format,
            resource_type: "document".to_string(),
            status: RecordStatus::Published,
            collection_id: None,
            creator: None,
            date: None,
            created_at: now,
            updated_at: now,
            views: 0,
            downloads: 0,
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub document_count: u32,
    #[serde(default)]
    pub subcollection_count: u32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Collection {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            parent_id: None,
            document_count: 0,
            subcollection_count: 0,
            featured: false,
            category: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn summary(&self) -> CollectionSummary {
        CollectionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Breadcrumb projection of a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    pub collection: Option<CollectionSummary>,
    pub related: Vec<Document>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub user: String,
    pub action: String,
    pub resource: String,
    pub success: bool,
    pub suspicious: bool,
    pub ip_address: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: Option<String>,
}

/// Everything a catalog backend serves, in the on-disk `catalog.json` shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub audit_log: Vec<AuditEntry>,
}
