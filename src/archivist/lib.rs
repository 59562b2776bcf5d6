//! # Archivist Architecture
//!
//! Archivist is the **data layer of a public records portal**: collections,
//! documents and an audit log, with the search, filter and pagination logic
//! every portal page shares. It is a library that happens to have a CLI
//! client, not the other way around.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (main.rs, args.rs)                               │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs, routes.rs)                              │
//! │  - Thin facade over commands                                │
//! │  - REST-shaped router answering with JSON envelopes         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One module per operation, returns CmdResult              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Core (filter, query, controller, navigator)                │
//! │  - filter → search → sort → paginate                        │
//! │  - request generations, collection tree breadcrumbs         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - Abstract CatalogStore trait                              │
//! │  - FileStore (catalog.json), InMemoryStore (mock portal)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code takes Rust arguments, returns Rust types and
//! never writes to stdout/stderr. Diagnostics go through `tracing`; the binary
//! decides where they end up.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade, entry point for all operations
//! - [`routes`]: `GET /api/...` request routing and the `{success, data}` envelope
//! - [`commands`]: Business logic for each operation, plus the submit workflows
//! - [`filter`]: Filter predicates and the tri-state `FilterState`
//! - [`query`]: Search scoring, sorting and pagination
//! - [`controller`]: View state with request-generation tickets
//! - [`navigator`]: Collection tree navigation and breadcrumbs
//! - [`store`]: Storage abstraction, implementations and the seed catalog
//! - [`model`]: Core data types (`Document`, `Collection`, `AuditEntry`)
//! - [`config`]: Configuration management
//! - [`error`]: Error types

pub mod api;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod model;
pub mod navigator;
pub mod query;
pub mod routes;
pub mod store;
