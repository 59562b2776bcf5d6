//! # REST Routes
//!
//! The portal's backend contract, served without a listener: a request is a
//! method plus a target (`/api/search?q=harbour&page=2`) and the answer is a
//! status code with a JSON body.
//!
//! Every body uses the same envelope:
//!
//! ```text
//! 200  {"success": true,  "data": ...}              (+ "pagination" on paged collection lists)
//! 4xx  {"success": false, "error": "<message>"}
//! ```
//!
//! | Route                                   | Query parameters                                   |
//! |-----------------------------------------|----------------------------------------------------|
//! | `GET /api/collections`                  | `featured`, `root`, `q`, `page`, `limit`           |
//! | `GET /api/collections/:id`              | `page`, `limit`, `format`                          |
//! | `GET /api/documents/:id`                |                                                    |
//! | `GET /api/search`                       | `q`, `format`, `sortBy`, `page`, `limit`           |
//! | `GET /api/audit-logs`                   | `action`, `resource`, `user`, `success`, `suspicious`, `from`, `to`, `page`, `limit` |
//!
//! Status codes: 404 for unknown ids and routes, 400 for bad parameters,
//! 405 for anything but `GET`, 500 when the store fails.

use crate::commands::{self, audit::AuditFilter, collections::CollectionFilter};
use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, Result};
use crate::filter::{parse_flag, DateRange, FilterState};
use crate::model::Format;
use crate::query::{PageRequest, Query, SortBy};
use crate::store::CatalogStore;
use chrono::{DateTime, NaiveDate, Utc};
use percent_encoding::percent_decode_str;
use serde_json::{json, Value};
use std::collections::HashMap;
use url::Url;

const BASE: &str = "http://archivist.local/";

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn ok(data: Value) -> Self {
        Self {
            status: 200,
            body: json!({ "success": true, "data": data }),
        }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({ "success": false, "error": message.into() }),
        }
    }

    pub fn from_error(err: &ArchiveError) -> Self {
        let status = if err.is_not_found() {
            404
        } else if err.is_client_error() {
            400
        } else {
            500
        };
        Self::error(status, err.to_string())
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Decoded query string. Repeated keys keep the last value.
struct Params(HashMap<String, String>);

impl Params {
    fn from_url(url: &Url) -> Self {
        Self(url.query_pairs().into_owned().collect())
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    fn number(&self, name: &str) -> Result<Option<usize>> {
        self.text(name)
            .map(|v| {
                v.parse::<usize>().map_err(|_| {
                    ArchiveError::InvalidQuery(format!("{} must be a number, got '{}'", name, v))
                })
            })
            .transpose()
    }

    fn flag(&self, name: &str) -> Result<Option<bool>> {
        match self.text(name) {
            Some(v) => parse_flag(v),
            None => Ok(None),
        }
    }

    fn page(&self, config: &ArchiveConfig) -> Result<PageRequest> {
        let page = self.number("page")?.unwrap_or(1);
        let limit = self.number("limit")?.unwrap_or(config.page_size);
        PageRequest::new(page, limit)
    }

    /// `format=all` (or absent) means no format constraint.
    fn format(&self) -> Result<Option<Format>> {
        match self.text("format") {
            None => Ok(None),
            Some(v) if v.eq_ignore_ascii_case("all") => Ok(None),
            Some(v) => v.parse::<Format>().map(Some).map_err(ArchiveError::InvalidFilter),
        }
    }

    fn date(&self, name: &str) -> Result<Option<NaiveDate>> {
        self.text(name)
            .map(|v| {
                NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| {
                    ArchiveError::InvalidFilter(format!("{} must be YYYY-MM-DD, got '{}'", name, v))
                })
            })
            .transpose()
    }
}

/// Inclusive whole-day range from optional `from`/`to` dates.
pub fn day_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<DateRange> {
    let start = from
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc());
    let end: Option<DateTime<Utc>> = to
        .and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_999_999))
        .map(|dt| dt.and_utc());
    DateRange::new(start, end)
}

fn decode_segment(segment: &str) -> Result<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|_| ArchiveError::Api(format!("Invalid path segment '{}'", segment)))
}

pub fn handle<S: CatalogStore + ?Sized>(
    store: &S,
    config: &ArchiveConfig,
    method: &str,
    target: &str,
) -> Response {
    let response = if !method.eq_ignore_ascii_case("GET") {
        Response::error(405, format!("Method not allowed: {}", method))
    } else {
        match route(store, config, target) {
            Ok(response) => response,
            Err(err) => Response::from_error(&err),
        }
    };

    if response.status >= 500 {
        tracing::warn!(method, target, status = response.status, "request failed");
    } else {
        tracing::debug!(method, target, status = response.status, "request handled");
    }
    response
}

fn route<S: CatalogStore + ?Sized>(store: &S, config: &ArchiveConfig, target: &str) -> Result<Response> {
    let url = Url::parse(BASE)
        .and_then(|base| base.join(target))
        .map_err(|e| ArchiveError::Api(format!("Invalid request target '{}': {}", target, e)))?;
    let params = Params::from_url(&url);
    let segments: Vec<String> = url
        .path_segments()
        .map(|s| {
            s.filter(|seg| !seg.is_empty())
                .map(decode_segment)
                .collect::<Result<Vec<_>>>()
        })
        .transpose()?
        .unwrap_or_default();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();

    match segments.as_slice() {
        ["api", "collections"] => list_collections(store, config, &params),
        ["api", "collections", id] => collection(store, config, &params, id),
        ["api", "documents", id] => document(store, id),
        ["api", "search"] => search(store, config, &params),
        ["api", "audit-logs"] => audit_logs(store, config, &params),
        _ => Ok(Response::error(
            404,
            format!("Route not found: GET {}", url.path()),
        )),
    }
}

fn list_collections<S: CatalogStore + ?Sized>(
    store: &S,
    config: &ArchiveConfig,
    params: &Params,
) -> Result<Response> {
    let paged = params.has("page") || params.has("limit");
    let filter = CollectionFilter {
        featured: params.flag("featured")?,
        roots_only: params.flag("root")?.unwrap_or(false),
        text: params.text("q").map(str::to_string),
        page: if paged { Some(params.page(config)?) } else { None },
    };
    let result = commands::collections::run(store, &filter)?;

    let mut response = Response::ok(json!(result.collections));
    if let (Some(pagination), Value::Object(body)) = (result.pagination, &mut response.body) {
        body.insert("pagination".to_string(), json!(pagination));
    }
    Ok(response)
}

fn collection<S: CatalogStore + ?Sized>(
    store: &S,
    config: &ArchiveConfig,
    params: &Params,
    id: &str,
) -> Result<Response> {
    let result = commands::browse::run(store, &[id], params.page(config)?, params.format()?)?;
    let node = result
        .node
        .ok_or_else(|| ArchiveError::CollectionNotFound(id.to_string()))?;

    Ok(Response::ok(json!({
        "collection": node.collection,
        "breadcrumb": node.breadcrumb,
        "subcollections": node.children,
        "documents": node.documents.items,
        "pagination": node.documents.pagination,
    })))
}

fn document<S: CatalogStore + ?Sized>(store: &S, id: &str) -> Result<Response> {
    let detail = commands::document::detail(store, id)?;
    Ok(Response::ok(json!(detail)))
}

fn search<S: CatalogStore + ?Sized>(
    store: &S,
    config: &ArchiveConfig,
    params: &Params,
) -> Result<Response> {
    let mut filters = FilterState::new();
    if let Some(format) = params.format()? {
        filters.set_text("format", Some(format.as_str()));
    }
    let sort = match params.text("sortBy") {
        Some(key) => key.parse::<SortBy>()?,
        None => config.default_sort,
    };

    let mut query = Query::new(params.page(config)?)
        .with_filters(filters)
        .with_sort(sort);
    query.set_text(params.text("q").map(str::to_string));

    let result = commands::search::run(store, &query)?;
    Ok(Response::ok(json!({
        "documents": result.documents,
        "pagination": result.pagination,
    })))
}

fn audit_logs<S: CatalogStore + ?Sized>(
    store: &S,
    config: &ArchiveConfig,
    params: &Params,
) -> Result<Response> {
    let range = day_range(params.date("from")?, params.date("to")?)?;
    let filter = AuditFilter {
        action: params.text("action").map(str::to_string),
        resource: params.text("resource").map(str::to_string),
        user: params.text("user").map(str::to_string),
        success: params.flag("success")?,
        suspicious: params.flag("suspicious")?,
        range: Some(range),
    };
    let result = commands::audit::run(store, &filter, params.page(config)?)?;
    Ok(Response::ok(json!({
        "entries": result.audit_entries,
        "pagination": result.pagination,
    })))
}
