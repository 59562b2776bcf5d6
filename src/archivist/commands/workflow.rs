//! Confirmation-then-submit workflows.
//!
//! A request moves through three stages:
//!
//! ```text
//! prepare_*  ──▶ Pending<T> ──confirm()──▶ Confirmed<T> ──submit(sink)──▶ Submission
//! (validate)     (summary shown)           (user said yes)                (side effect)
//! ```
//!
//! Only a [`Confirmed`] value can be submitted, and `Confirmed` can only be
//! built from a `Pending` one, so a request cannot reach a sink without both
//! passing validation and being confirmed. The sink decides what submitting
//! means: [`MemorySink`] records in memory, [`FileSink`] appends JSON lines.

use crate::commands::{CmdMessage, CmdResult};
use crate::error::{ArchiveError, Result};
use crate::store::CatalogStore;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const SUBMISSIONS_FILENAME: &str = "submissions.jsonl";
pub const MAX_VISITORS: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitBooking {
    pub name: String,
    pub date: NaiveDate,
    pub visitors: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRequest {
    pub document_id: String,
    pub document_title: String,
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details", rename_all = "camelCase")]
pub enum Request {
    VisitBooking(VisitBooking),
    RecordRequest(RecordRequest),
}

/// Something that can be confirmed and submitted.
pub trait Submittable {
    /// One line describing what will happen on confirmation.
    fn summary(&self) -> String;
    fn into_request(self) -> Request;
}

impl Submittable for VisitBooking {
    fn summary(&self) -> String {
        let mut s = format!(
            "Reading-room visit for {} on {} ({} visitor{})",
            self.name,
            self.date.format("%Y-%m-%d"),
            self.visitors,
            if self.visitors == 1 { "" } else { "s" }
        );
        if let Some(purpose) = &self.purpose {
            s.push_str(&format!(": {}", purpose));
        }
        s
    }

    fn into_request(self) -> Request {
        Request::VisitBooking(self)
    }
}

impl Submittable for RecordRequest {
    fn summary(&self) -> String {
        format!(
            "Request by {} for \"{}\" ({}): {}",
            self.name, self.document_title, self.document_id, self.reason
        )
    }

    fn into_request(self) -> Request {
        Request::RecordRequest(self)
    }
}

/// A recorded, submitted request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    #[serde(flatten)]
    pub request: Request,
}

/// A validated request waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending<T> {
    request: T,
}

impl<T: Submittable> Pending<T> {
    pub fn summary(&self) -> String {
        self.request.summary()
    }

    pub fn request(&self) -> &T {
        &self.request
    }

    pub fn confirm(self) -> Confirmed<T> {
        Confirmed {
            request: self.request,
        }
    }
}

/// A request the user has confirmed. Only obtainable via [`Pending::confirm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed<T> {
    request: T,
}

impl<T: Submittable> Confirmed<T> {
    pub fn summary(&self) -> String {
        self.request.summary()
    }

    pub fn submit(self, sink: &mut dyn SubmissionSink) -> Result<Submission> {
        let submission = Submission {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            request: self.request.into_request(),
        };
        sink.submit(&submission)?;
        tracing::info!(id = %submission.id, kind = submission.kind(), "submission recorded");
        Ok(submission)
    }
}

impl Submission {
    pub fn kind(&self) -> &'static str {
        match self.request {
            Request::VisitBooking(_) => "visitBooking",
            Request::RecordRequest(_) => "recordRequest",
        }
    }
}

pub trait SubmissionSink {
    fn submit(&mut self, submission: &Submission) -> Result<()>;
}

/// Keeps submissions in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    submissions: Vec<Submission>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }
}

impl SubmissionSink for MemorySink {
    fn submit(&mut self, submission: &Submission) -> Result<()> {
        self.submissions.push(submission.clone());
        Ok(())
    }
}

/// Appends each submission as one JSON line.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads back every submission in the file. A missing file has none.
    pub fn read_all(&self) -> Result<Vec<Submission>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(ArchiveError::Serialization))
            .collect()
    }
}

impl SubmissionSink for FileSink {
    fn submit(&mut self, submission: &Submission) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(submission)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ArchiveError::Workflow(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

/// Validates a reading-room booking. `today` is passed in so the
/// "not in the past" rule does not depend on the clock.
pub fn prepare_visit(
    name: &str,
    date: NaiveDate,
    visitors: u8,
    purpose: Option<&str>,
    today: NaiveDate,
) -> Result<Pending<VisitBooking>> {
    let name = required("name", name)?;
    if visitors == 0 || visitors > MAX_VISITORS {
        return Err(ArchiveError::Workflow(format!(
            "visitors must be between 1 and {}, got {}",
            MAX_VISITORS, visitors
        )));
    }
    if date < today {
        return Err(ArchiveError::Workflow(format!(
            "cannot book a visit in the past ({})",
            date
        )));
    }
    let purpose = purpose
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    Ok(Pending {
        request: VisitBooking {
            name,
            date,
            visitors,
            purpose,
        },
    })
}

/// Validates a request for a copy of (or access to) a document.
pub fn prepare_record_request<S: CatalogStore + ?Sized>(
    store: &S,
    document_id: &str,
    name: &str,
    reason: &str,
) -> Result<Pending<RecordRequest>> {
    let name = required("name", name)?;
    let reason = required("reason", reason)?;
    let document = store.get_document(document_id)?;

    Ok(Pending {
        request: RecordRequest {
            document_id: document.id,
            document_title: document.title,
            name,
            reason,
        },
    })
}

/// Submits a confirmed request and reports the reference number.
pub fn run<T: Submittable>(confirmed: Confirmed<T>, sink: &mut dyn SubmissionSink) -> Result<CmdResult> {
    let summary = confirmed.summary();
    let submission = confirmed.submit(sink)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Submitted: {}", summary)));
    result.add_message(CmdMessage::info(format!("Reference: {}", submission.id)));
    Ok(result.with_submission(submission))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;
    use tempfile::tempdir;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn visit_validation() {
        let today = day(2024, 3, 1);
        assert!(prepare_visit("Ada", day(2024, 3, 1), 2, None, today).is_ok());
        assert!(prepare_visit("  ", day(2024, 3, 2), 2, None, today).is_err());
        assert!(prepare_visit("Ada", day(2024, 3, 2), 0, None, today).is_err());
        assert!(prepare_visit("Ada", day(2024, 3, 2), 11, None, today).is_err());

        let err = prepare_visit("Ada", day(2024, 2, 29), 1, None, today).unwrap_err();
        assert!(matches!(err, ArchiveError::Workflow(_)));
    }

    #[test]
    fn pending_summary_then_confirm_and_submit() {
        let pending = prepare_visit(
            "Ada Byron",
            day(2024, 5, 4),
            3,
            Some("family history"),
            day(2024, 5, 1),
        )
        .unwrap();
        assert_eq!(
            pending.summary(),
            "Reading-room visit for Ada Byron on 2024-05-04 (3 visitors): family history"
        );

        let mut sink = MemorySink::new();
        let submission = pending.confirm().submit(&mut sink).unwrap();
        assert_eq!(sink.submissions().len(), 1);
        assert_eq!(sink.submissions()[0].id, submission.id);
        assert_eq!(submission.kind(), "visitBooking");
    }

    #[test]
    fn record_request_needs_an_existing_document() {
        let store = InMemoryStore::seeded();
        let err = prepare_record_request(&store, "doc-404", "Ada", "research").unwrap_err();
        assert!(matches!(err, ArchiveError::DocumentNotFound(_)));

        let err = prepare_record_request(&store, "doc-4", "Ada", "").unwrap_err();
        assert!(matches!(err, ArchiveError::Workflow(_)));

        let pending = prepare_record_request(&store, "doc-4", "Ada", "research").unwrap();
        assert_eq!(
            pending.request().document_title,
            "Census Return: Parish of St. Paul, 1881"
        );
    }

    #[test]
    fn file_sink_appends_json_lines() {
        let dir = tempdir().unwrap();
        let mut sink = FileSink::new(dir.path().join("data").join(SUBMISSIONS_FILENAME));
        let store = InMemoryStore::seeded();

        let first = prepare_record_request(&store, "doc-1", "Ada", "thesis")
            .unwrap()
            .confirm();
        let second = prepare_visit("Ada", day(2030, 1, 2), 1, None, day(2030, 1, 1))
            .unwrap()
            .confirm();
        run(first, &mut sink).unwrap();
        let result = run(second, &mut sink).unwrap();

        let stored = sink.read_all().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].kind(), "recordRequest");
        assert_eq!(Some(&stored[1]), result.submission.as_ref());

        let raw = fs::read_to_string(sink.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert!(raw.lines().next().unwrap().contains("\"type\":\"recordRequest\""));
    }

    #[test]
    fn run_reports_reference() {
        let mut sink = MemorySink::new();
        let confirmed = prepare_visit("Ada", day(2030, 1, 2), 1, None, day(2030, 1, 1))
            .unwrap()
            .confirm();
        let result = run(confirmed, &mut sink).unwrap();
        let id = result.submission.as_ref().unwrap().id;
        assert_eq!(result.messages[1].content, format!("Reference: {}", id));
        assert!(result.messages[0].content.contains("1 visitor)"));
    }
}
