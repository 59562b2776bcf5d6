//! The portal's built-in mock catalog.
//!
//! Twelve collections (six featured, nested up to three levels), twenty documents
//! spread across them, and an eight-entry audit log. `InMemoryStore::seeded()`
//! serves this data and `archivist init` writes it out as `catalog.json`.

use crate::model::{AuditEntry, Catalog, Collection, Document, Format, RecordStatus};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;

static SEED: Lazy<Catalog> = Lazy::new(build);

pub fn catalog() -> Catalog {
    SEED.clone()
}

pub fn collections() -> Vec<Collection> {
    SEED.collections.clone()
}

pub fn documents() -> Vec<Document> {
    SEED.documents.clone()
}

pub fn audit_log() -> Vec<AuditEntry> {
    SEED.audit_log.clone()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_default()
}

fn build() -> Catalog {
    let mut catalog = Catalog {
        collections: seed_collections(),
        documents: seed_documents(),
        audit_log: seed_audit_log(),
    };
    recount(&mut catalog);
    catalog
}

/// Recomputes the denormalized document and sub-collection counts.
pub fn recount(catalog: &mut Catalog) {
    let counts: Vec<(u32, u32)> = catalog
        .collections
        .iter()
        .map(|c| {
            let docs = catalog
                .documents
                .iter()
                .filter(|d| d.collection_id.as_deref() == Some(c.id.as_str()))
                .count() as u32;
            let subs = catalog
                .collections
                .iter()
                .filter(|child| child.parent_id.as_deref() == Some(c.id.as_str()))
                .count() as u32;
            (docs, subs)
        })
        .collect();

    for (collection, (docs, subs)) in catalog.collections.iter_mut().zip(counts) {
        collection.document_count = docs;
        collection.subcollection_count = subs;
    }
}

fn collection(
    id: &str,
    name: &str,
    description: &str,
    parent: Option<&str>,
    featured: bool,
    category: &str,
    created_at: DateTime<Utc>,
) -> Collection {
    Collection {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        parent_id: parent.map(str::to_string),
        document_count: 0,
        subcollection_count: 0,
        featured,
        category: category.to_string(),
        created_at,
    }
}

fn seed_collections() -> Vec<Collection> {
    vec![
        collection(
            "col-1",
            "National Records",
            "Government papers, registers and correspondence of the colonial and early national periods.",
            None,
            true,
            "government",
            at(2023, 3, 1, 9, 0),
        ),
        collection(
            "col-2",
            "Photographic Archive",
            "Prints, negatives and glass plates documenting daily life.",
            None,
            true,
            "photography",
            at(2023, 3, 8, 9, 0),
        ),
        collection(
            "col-3",
            "Maps & Plans",
            "Survey sheets, town plans and engineering drawings.",
            None,
            true,
            "cartography",
            at(2023, 4, 2, 9, 0),
        ),
        collection(
            "col-4",
            "Oral Histories",
            "Recorded interviews and community footage.",
            None,
            false,
            "audiovisual",
            at(2023, 5, 20, 9, 0),
        ),
        collection(
            "col-5",
            "Legislative Papers",
            "Acts, bills and records of parliamentary proceedings.",
            None,
            true,
            "government",
            at(2023, 6, 11, 9, 0),
        ),
        collection(
            "col-6",
            "Colonial Correspondence",
            "Despatches between the governor and the Colonial Office.",
            Some("col-1"),
            true,
            "government",
            at(2023, 7, 3, 9, 0),
        ),
        collection(
            "col-7",
            "Census Returns",
            "Enumerators' returns by parish.",
            Some("col-1"),
            false,
            "government",
            at(2023, 7, 17, 9, 0),
        ),
        collection(
            "col-8",
            "Street Photography 1950s",
            "Street scenes from the post-war decade.",
            Some("col-2"),
            true,
            "photography",
            at(2023, 8, 9, 9, 0),
        ),
        collection(
            "col-9",
            "Aerial Surveys",
            "Photogrammetric survey sheets.",
            Some("col-3"),
            false,
            "cartography",
            at(2023, 9, 1, 9, 0),
        ),
        collection(
            "col-10",
            "Harbour Plans",
            "Plans and elevations for harbour works.",
            Some("col-9"),
            false,
            "cartography",
            at(2023, 9, 14, 9, 0),
        ),
        collection(
            "col-11",
            "Parliamentary Debates",
            "Transcribed debates of the legislature.",
            Some("col-5"),
            false,
            "government",
            at(2023, 10, 5, 9, 0),
        ),
        collection(
            "col-12",
            "Veterans' Interviews",
            "Recollections of service personnel.",
            Some("col-4"),
            false,
            "audiovisual",
            at(2023, 11, 22, 9, 0),
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn document(
    id: &str,
    title: &str,
    format: Format,
    resource_type: &str,
    status: RecordStatus,
    collection: &str,
    date: Option<(i32, u32, u32)>,
    stats: (u64, u64),
    created_at: DateTime<Utc>,
) -> Document {
    Document {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{} ({}).", title, resource_type),
        format,
        resource_type: resource_type.to_string(),
        status,
        collection_id: Some(collection.to_string()),
        creator: None,
        date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        created_at,
        updated_at: created_at,
        views: stats.0,
        downloads: stats.1,
        tags: Vec::new(),
    }
}

fn seed_documents() -> Vec<Document> {
    use Format::*;
    use RecordStatus::*;

    let mut docs = vec![
        document(
            "doc-1",
            "Letter from the Governor to the Colonial Office, 1843",
            Pdf,
            "letter",
            Published,
            "col-6",
            Some((1843, 5, 12)),
            (1520, 230),
            at(2024, 1, 2, 10, 0),
        ),
        document(
            "doc-2",
            "Despatch on Harbour Defences",
            Pdf,
            "letter",
            Published,
            "col-6",
            Some((1851, 9, 3)),
            (880, 95),
            at(2024, 1, 3, 10, 0),
        ),
        document(
            "doc-3",
            "Census Return: Parish of St. Mary, 1871",
            Pdf,
            "register",
            Published,
            "col-7",
            Some((1871, 4, 2)),
            (2310, 640),
            at(2024, 1, 4, 10, 0),
        ),
        document(
            "doc-4",
            "Census Return: Parish of St. Paul, 1881",
            Pdf,
            "register",
            Restricted,
            "col-7",
            Some((1881, 4, 3)),
            (410, 12),
            at(2024, 1, 5, 10, 0),
        ),
        document(
            "doc-5",
            "Market Day on King Street",
            Image,
            "photograph",
            Published,
            "col-8",
            Some((1954, 6, 19)),
            (3120, 410),
            at(2024, 1, 6, 10, 0),
        ),
        document(
            "doc-6",
            "Children at the Quay",
            Image,
            "photograph",
            Published,
            "col-8",
            Some((1957, 8, 2)),
            (2780, 380),
            at(2024, 1, 7, 10, 0),
        ),
        document(
            "doc-7",
            "Tram Depot at Dusk",
            Image,
            "photograph",
            Published,
            "col-8",
            Some((1952, 11, 21)),
            (990, 70),
            at(2024, 1, 8, 10, 0),
        ),
        document(
            "doc-8",
            "Studio Portrait Collection",
            Image,
            "photograph",
            Archived,
            "col-2",
            Some((1938, 1, 1)),
            (150, 4),
            at(2024, 1, 9, 10, 0),
        ),
        document(
            "doc-9",
            "Aerial Survey Sheet 14",
            Map,
            "map",
            Published,
            "col-9",
            Some((1962, 3, 15)),
            (640, 210),
            at(2024, 1, 10, 10, 0),
        ),
        document(
            "doc-10",
            "Aerial Survey Sheet 15",
            Map,
            "map",
            Published,
            "col-9",
            Some((1962, 3, 16)),
            (520, 190),
            at(2024, 1, 11, 10, 0),
        ),
        document(
            "doc-11",
            "Harbour Extension Plan",
            Map,
            "plan",
            Published,
            "col-10",
            Some((1968, 7, 30)),
            (870, 305),
            at(2024, 1, 12, 10, 0),
        ),
        document(
            "doc-12",
            "Town Plan of 1790",
            Map,
            "plan",
            Published,
            "col-3",
            Some((1790, 1, 1)),
            (4100, 1200),
            at(2024, 1, 13, 10, 0),
        ),
        document(
            "doc-13",
            "Interview with a Dock Worker",
            Audio,
            "interview",
            Published,
            "col-12",
            Some((1985, 10, 11)),
            (300, 40),
            at(2024, 1, 14, 10, 0),
        ),
        document(
            "doc-14",
            "Interview with a Wartime Nurse",
            Audio,
            "interview",
            Published,
            "col-12",
            Some((1987, 2, 20)),
            (760, 88),
            at(2024, 1, 15, 10, 0),
        ),
        document(
            "doc-15",
            "Festival Procession Footage",
            Video,
            "film",
            Published,
            "col-4",
            Some((1971, 5, 1)),
            (1210, 150),
            at(2024, 1, 16, 10, 0),
        ),
        document(
            "doc-16",
            "Debate on the Education Bill",
            Text,
            "transcript",
            Published,
            "col-11",
            Some((1902, 11, 4)),
            (430, 60),
            at(2024, 1, 17, 10, 0),
        ),
        document(
            "doc-17",
            "Debate on the Harbour Act",
            Text,
            "transcript",
            Draft,
            "col-11",
            Some((1911, 3, 9)),
            (20, 0),
            at(2024, 1, 18, 10, 0),
        ),
        document(
            "doc-18",
            "Act for the Improvement of Roads",
            Pdf,
            "act",
            Published,
            "col-5",
            Some((1820, 6, 30)),
            (1880, 520),
            at(2024, 1, 19, 10, 0),
        ),
        document(
            "doc-19",
            "Register of Land Grants",
            Pdf,
            "register",
            Published,
            "col-1",
            Some((1799, 12, 31)),
            (2650, 730),
            at(2024, 1, 20, 10, 0),
        ),
        document(
            "doc-20",
            "Governor's Diary, Volume II",
            Text,
            "diary",
            Published,
            "col-1",
            None,
            (1330, 260),
            at(2024, 1, 21, 10, 0),
        ),
    ];

    for doc in docs.iter_mut() {
        match doc.id.as_str() {
            "doc-1" | "doc-2" | "doc-20" => doc.creator = Some("Office of the Governor".into()),
            "doc-5" | "doc-6" | "doc-7" => doc.creator = Some("E. Marsh".into()),
            "doc-9" | "doc-10" => doc.creator = Some("Survey Department".into()),
            _ => {}
        }
        if doc.title.to_lowercase().contains("harbour") {
            doc.tags.push("harbour".into());
        }
    }
    docs
}

#[allow(clippy::too_many_arguments)]
fn audit(
    id: &str,
    user: &str,
    action: &str,
    resource: &str,
    success: bool,
    suspicious: bool,
    ip_address: &str,
    timestamp: DateTime<Utc>,
    details: Option<&str>,
) -> AuditEntry {
    AuditEntry {
        id: id.to_string(),
        user: user.to_string(),
        action: action.to_string(),
        resource: resource.to_string(),
        success,
        suspicious,
        ip_address: ip_address.to_string(),
        timestamp,
        details: details.map(str::to_string),
    }
}

fn seed_audit_log() -> Vec<AuditEntry> {
    vec![
        audit(
            "1",
            "admin@archives.gov",
            "login",
            "session",
            true,
            false,
            "192.168.1.10",
            at(2024, 1, 15, 8, 30),
            None,
        ),
        audit(
            "2",
            "j.smith@archives.gov",
            "login",
            "session",
            false,
            true,
            "203.0.113.45",
            at(2024, 1, 15, 9, 12),
            Some("Five failed attempts from an unrecognised address"),
        ),
        audit(
            "3",
            "m.jones@archives.gov",
            "view",
            "document",
            true,
            false,
            "192.168.1.22",
            at(2024, 1, 15, 10, 5),
            Some("doc-3"),
        ),
        audit(
            "4",
            "m.jones@archives.gov",
            "download",
            "document",
            true,
            false,
            "192.168.1.22",
            at(2024, 1, 15, 10, 7),
            Some("doc-3"),
        ),
        audit(
            "5",
            "admin@archives.gov",
            "update",
            "collection",
            true,
            false,
            "192.168.1.10",
            at(2024, 1, 15, 11, 40),
            Some("col-8"),
        ),
        audit(
            "6",
            "m.jones@archives.gov",
            "login",
            "session",
            true,
            false,
            "192.168.1.22",
            at(2024, 1, 16, 8, 55),
            None,
        ),
        audit(
            "7",
            "j.smith@archives.gov",
            "delete",
            "document",
            false,
            true,
            "203.0.113.45",
            at(2024, 1, 16, 13, 20),
            Some("Permission denied for doc-4"),
        ),
        audit(
            "8",
            "admin@archives.gov",
            "logout",
            "session",
            true,
            false,
            "192.168.1.10",
            at(2024, 1, 16, 17, 45),
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_counts_are_consistent() {
        let catalog = catalog();
        assert_eq!(catalog.collections.len(), 12);
        assert_eq!(catalog.audit_log.len(), 8);

        let col1 = catalog.collections.iter().find(|c| c.id == "col-1").unwrap();
        assert_eq!(col1.subcollection_count, 2);
        assert_eq!(col1.document_count, 2);
    }

    #[test]
    fn every_parent_and_collection_reference_exists() {
        let catalog = catalog();
        let ids: HashSet<_> = catalog.collections.iter().map(|c| c.id.as_str()).collect();
        for c in &catalog.collections {
            if let Some(parent) = &c.parent_id {
                assert!(ids.contains(parent.as_str()), "dangling parent {}", parent);
            }
        }
        for d in &catalog.documents {
            let cid = d.collection_id.as_deref().unwrap();
            assert!(ids.contains(cid), "dangling collection {}", cid);
        }
    }
}
