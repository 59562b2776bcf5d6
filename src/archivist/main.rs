use archivist::api::{
    ArchiveApi, ArchivePaths, AuditFilter, CmdMessage, CollectionFilter, ConfigAction,
    MessageLevel, Pending, Submittable,
};
use archivist::commands::helpers::pagination_messages;
use archivist::controller::{ViewController, ViewState};
use archivist::error::{ArchiveError, Result};
use archivist::filter::parse_flag;
use archivist::model::{AuditEntry, Collection, Document, DocumentDetail, Format};
use archivist::navigator::NodeView;
use archivist::routes::{day_range, Response};
use archivist::store::fs::FileStore;
use archivist::store::memory::InMemoryStore;
use archivist::store::CatalogStore;
use chrono::{DateTime, Local, Utc};
use clap::Parser;
use colored::*;
use directories::ProjectDirs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;

mod args;
use args::{Cli, Commands, PageArgs};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

struct AppContext {
    api: ArchiveApi<Box<dyn CatalogStore>>,
    json: bool,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut ctx = init_context(&cli)?;

    match cli.command {
        Some(Commands::Collections {
            featured,
            roots,
            query,
            page,
        }) => handle_collections(&ctx, featured, roots, query, page),
        Some(Commands::Browse { ids, format, page }) => handle_browse(&ctx, ids, format, page),
        Some(Commands::Show { id }) => handle_show(&ctx, &id),
        Some(Commands::Search {
            terms,
            format,
            sort,
            page,
        }) => handle_search(&ctx, terms, format, sort, page),
        Some(Commands::Audit {
            action,
            resource,
            user,
            success,
            suspicious,
            from,
            to,
            page,
        }) => {
            let filter = AuditFilter {
                action,
                resource,
                user,
                success: parse_flag(&success)?,
                suspicious: parse_flag(&suspicious)?,
                range: Some(day_range(from, to)?),
            };
            handle_audit(&ctx, filter, page)
        }
        Some(Commands::Get { target, method }) => {
            print_response(&ctx.api.handle(&method, &target))
        }
        Some(Commands::Book {
            date,
            visitors,
            name,
            purpose,
            yes,
        }) => {
            let today = Local::now().date_naive();
            let pending = ctx
                .api
                .prepare_visit(&name, date, visitors, purpose.as_deref(), today)?;
            handle_submit(&ctx, pending, yes)
        }
        Some(Commands::Request {
            id,
            reason,
            name,
            yes,
        }) => {
            let pending = ctx.api.prepare_record_request(&id, &name, &reason)?;
            handle_submit(&ctx, pending, yes)
        }
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
        Some(Commands::Init { force }) => handle_init(&ctx, force),
        None => handle_browse(&ctx, Vec::new(), None, PageArgs::default()),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("ARCHIVIST_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(filter)
        .init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => default_data_dir()?,
    };

    let store: Box<dyn CatalogStore> = if cli.mock {
        Box::new(InMemoryStore::seeded())
    } else {
        Box::new(FileStore::new(data_dir.clone()))
    };
    tracing::debug!(data_dir = %data_dir.display(), mock = cli.mock, "starting");

    let api = ArchiveApi::new(store, ArchivePaths::new(data_dir))?;
    Ok(AppContext {
        api,
        json: cli.json,
    })
}

fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("org", "archivist", "archivist")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| {
            ArchiveError::Api("Could not determine a data directory, pass --data-dir".into())
        })
}

/// Builds a request target such as `/api/search?q=harbour&page=2`.
fn target(path: &str, params: &[(&str, Option<String>)]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if let Some(value) = value {
            query.append_pair(key, value);
        }
    }
    let query = query.finish();
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

fn parse_format(format: Option<String>) -> Result<Option<Format>> {
    match format.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(f) if f.eq_ignore_ascii_case("all") => Ok(None),
        Some(f) => f.parse().map(Some).map_err(ArchiveError::InvalidFilter),
    }
}

fn handle_collections(
    ctx: &AppContext,
    featured: bool,
    roots: bool,
    query: Option<String>,
    page: PageArgs,
) -> Result<()> {
    let paged = page.page.is_some() || page.limit.is_some();
    let page_request = if paged {
        Some(ctx.api.page_request(page.page, page.limit)?)
    } else {
        None
    };

    if ctx.json {
        return print_response(&ctx.api.handle(
            "GET",
            &target(
                "/api/collections",
                &[
                    ("featured", featured.then(|| "true".to_string())),
                    ("root", roots.then(|| "true".to_string())),
                    ("q", query),
                    ("page", page_request.map(|p| p.page().to_string())),
                    ("limit", page_request.map(|p| p.limit().to_string())),
                ],
            ),
        ));
    }

    let filter = CollectionFilter {
        featured: featured.then_some(true),
        roots_only: roots,
        text: query,
        page: page_request,
    };
    let result = ctx.api.collections(&filter)?;
    print_collections(&result.collections);
    print_messages(&result.messages);
    Ok(())
}

fn handle_browse(
    ctx: &AppContext,
    ids: Vec<String>,
    format: Option<String>,
    page: PageArgs,
) -> Result<()> {
    let path: Vec<&str> = ids.iter().map(String::as_str).collect();

    if ctx.json {
        return print_response(&browse_response(ctx, &path, format, page));
    }

    let request = ctx.api.page_request(page.page, page.limit)?;
    let format = parse_format(format)?;
    let result = ctx.api.browse(&path, request, format)?;
    if let Some(node) = &result.node {
        print_node(node);
    }
    print_messages(&result.messages);
    Ok(())
}

/// The route only takes the final id, so a longer path is walked first and a
/// broken step answers with the error envelope.
fn browse_response(
    ctx: &AppContext,
    path: &[&str],
    format: Option<String>,
    page: PageArgs,
) -> Response {
    let Some(id) = path.last() else {
        return ctx.api.handle("GET", "/api/collections?root=true");
    };
    if path.len() > 1 {
        let walk = ctx
            .api
            .page_request(page.page, page.limit)
            .and_then(|request| ctx.api.browse(path, request, None));
        if let Err(err) = walk {
            return Response::from_error(&err);
        }
    }
    ctx.api.handle(
        "GET",
        &target(
            &format!("/api/collections/{}", id),
            &[
                ("format", format),
                ("page", page.page.map(|p| p.to_string())),
                ("limit", page.limit.map(|l| l.to_string())),
            ],
        ),
    )
}

fn handle_show(ctx: &AppContext, id: &str) -> Result<()> {
    if ctx.json {
        return print_response(&ctx.api.handle("GET", &format!("/api/documents/{}", id)));
    }
    let result = ctx.api.document(id)?;
    if let Some(detail) = &result.detail {
        print_detail(detail);
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_search(
    ctx: &AppContext,
    terms: Vec<String>,
    format: Option<String>,
    sort: Option<String>,
    page: PageArgs,
) -> Result<()> {
    let request = ctx.api.page_request(page.page, page.limit)?;
    let format = parse_format(format)?;
    let mut query = ctx.api.query(request);
    if let Some(sort) = sort {
        query.sort = sort.parse()?;
    }
    if let Some(format) = format {
        query.filters.set_text("format", Some(format.as_str()));
    }
    query.set_text(Some(terms.join(" ")));

    if ctx.json {
        return print_response(&ctx.api.handle(
            "GET",
            &target(
                "/api/search",
                &[
                    ("q", query.term().map(str::to_string)),
                    ("format", format.map(|f| f.to_string())),
                    ("sortBy", Some(query.sort.to_string())),
                    ("page", Some(request.page().to_string())),
                    ("limit", Some(request.limit().to_string())),
                ],
            ),
        ));
    }

    let mut view = ViewController::with_query(query);
    ctx.api.refresh_search(&mut view);
    match view.state() {
        ViewState::Success(page) => {
            print_documents(&page.items);
            print_messages(&pagination_messages(request, &page.pagination, "documents"));
        }
        ViewState::Empty(_) => println!("No documents found."),
        ViewState::Error(message) => return Err(ArchiveError::Api(message.clone())),
        ViewState::Idle | ViewState::Loading { .. } => {}
    }
    Ok(())
}

fn handle_audit(ctx: &AppContext, filter: AuditFilter, page: PageArgs) -> Result<()> {
    let request = ctx.api.page_request(page.page, page.limit)?;

    if ctx.json {
        let flag = |v: Option<bool>| Some(v.map_or("all".to_string(), |b| b.to_string()));
        let day = |ts: Option<DateTime<Utc>>| ts.map(|t| t.format("%Y-%m-%d").to_string());
        let range = filter.range.unwrap_or_default();
        return print_response(&ctx.api.handle(
            "GET",
            &target(
                "/api/audit-logs",
                &[
                    ("action", filter.action.clone()),
                    ("resource", filter.resource.clone()),
                    ("user", filter.user.clone()),
                    ("success", flag(filter.success)),
                    ("suspicious", flag(filter.suspicious)),
                    ("from", day(range.from)),
                    ("to", day(range.to)),
                    ("page", Some(request.page().to_string())),
                    ("limit", Some(request.limit().to_string())),
                ],
            ),
        ));
    }

    let result = ctx.api.audit(&filter, request)?;
    print_audit(&result.audit_entries);
    print_messages(&result.messages);
    Ok(())
}

fn handle_submit<T: Submittable>(ctx: &AppContext, pending: Pending<T>, yes: bool) -> Result<()> {
    if !yes {
        println!("{}", pending.summary().bold());
        if !confirm("Submit this request?")? {
            println!("{}", "Cancelled.".dimmed());
            return Ok(());
        }
    }

    let mut sink = ctx.api.file_sink();
    let result = ctx.api.submit(pending.confirm(), &mut sink)?;
    if ctx.json {
        if let Some(submission) = &result.submission {
            println!("{}", serde_json::to_string_pretty(submission)?);
        }
        return Ok(());
    }
    print_messages(&result.messages);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = ctx.api.config(action)?;
    if let (true, Some(config)) = (show_all, &result.config) {
        if ctx.json {
            println!("{}", serde_json::to_string_pretty(config)?);
            return Ok(());
        }
        for key in archivist::config::ArchiveConfig::KEYS {
            println!("{} = {}", key, config.get(key).unwrap_or_default());
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_init(ctx: &AppContext, force: bool) -> Result<()> {
    let result = ctx.api.init(force)?;
    print_messages(&result.messages);
    Ok(())
}

fn print_response(response: &Response) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&response.body)?);
    if response.is_success() {
        Ok(())
    } else {
        Err(ArchiveError::Api(format!(
            "request failed with status {}",
            response.status
        )))
    }
}

fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

const LINE_WIDTH: usize = 100;
const ID_WIDTH: usize = 8;
const TIME_WIDTH: usize = 14;
const FEATURED_MARKER: &str = "★";

fn print_collections(collections: &[Collection]) {
    for c in collections {
        let marker = if c.featured { FEATURED_MARKER } else { " " };
        let counts = format!(
            "{} docs, {} sub",
            c.document_count, c.subcollection_count
        );
        let available = LINE_WIDTH.saturating_sub(ID_WIDTH + 4 + counts.width());
        let name = truncate_to_width(&c.name, available);
        let padding = available.saturating_sub(name.width());
        println!(
            " {} {:<width$} {}{}{}",
            marker.yellow(),
            c.id.yellow(),
            name,
            " ".repeat(padding),
            counts.dimmed(),
            width = ID_WIDTH
        );
    }
}

fn print_node(node: &NodeView) {
    let mut crumbs = vec!["Home".to_string()];
    crumbs.extend(node.breadcrumb.iter().map(|c| c.name.clone()));
    println!("{}", crumbs.join(" › ").dimmed());

    match &node.collection {
        Some(collection) => {
            println!("{}", collection.name.bold());
            if !collection.description.is_empty() {
                println!("{}", collection.description);
            }
        }
        None => println!("{}", "Collections".bold()),
    }

    if !node.children.is_empty() {
        println!();
        print_collections(&node.children);
    }

    if node.collection.is_some() && !node.documents.is_empty() {
        println!();
        print_documents(&node.documents.items);
    }
}

fn print_documents(documents: &[Document]) {
    for d in documents {
        let date = d
            .date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "undated".to_string());
        let right = format!("{:>6} {:>10}", d.format.as_str(), date);
        let available = LINE_WIDTH.saturating_sub(ID_WIDTH + 2 + right.width());
        let title = truncate_to_width(&d.title, available);
        let padding = available.saturating_sub(title.width());
        println!(
            "  {:<width$}{}{}{}",
            d.id.yellow(),
            title,
            " ".repeat(padding),
            right.dimmed(),
            width = ID_WIDTH
        );
    }
}

fn print_detail(detail: &DocumentDetail) {
    let d = &detail.document;
    println!("{} {}", d.id.yellow(), d.title.bold());
    println!("--------------------------------");
    let field = |label: &str, value: String| println!("{:>12}: {}", label.dimmed(), value);
    field("Format", d.format.to_string());
    field("Type", d.resource_type.clone());
    field("Status", d.status.to_string());
    if let Some(collection) = &detail.collection {
        field("Collection", format!("{} ({})", collection.name, collection.id));
    }
    if let Some(creator) = &d.creator {
        field("Creator", creator.clone());
    }
    if let Some(date) = d.date {
        field("Date", date.format("%-d %B %Y").to_string());
    }
    field("Views", format!("{} ({} downloads)", d.views, d.downloads));
    if !d.tags.is_empty() {
        field("Tags", d.tags.join(", "));
    }
    field("Updated", format_time_ago(d.updated_at).trim().to_string());
    println!();
    println!("{}", d.description);

    if !detail.related.is_empty() {
        println!();
        println!("{}", "Related".bold());
        print_documents(&detail.related);
    }
}

fn print_audit(entries: &[AuditEntry]) {
    for e in entries {
        let outcome = if e.success { "ok".green() } else { "failed".red() };
        let flag = if e.suspicious { "!".red().bold() } else { " ".normal() };
        let action = format!("{} {}", e.action, e.resource);
        println!(
            " {} {:<4} {} {:<26} {:<20} {:<6} {}",
            flag,
            e.id.yellow(),
            e.timestamp.format("%Y-%m-%d %H:%M"),
            truncate_to_width(&e.user, 26),
            action,
            outcome,
            format_time_ago(e.timestamp).dimmed()
        );
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    use unicode_width::UnicodeWidthChar;

    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
