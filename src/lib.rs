//! # Coverage Lens
//!
//! **Pre/post release analysis of media coverage archives.**
//!
//! Coverage Lens loads a per-article coverage archive for one media event
//! (a film release, say), classifies each article as published before or
//! after the event's reference date, and exposes filtered, chronological
//! views with protest/institution score summaries via a CLI and a JSON
//! HTTP server.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌─────────────┐
//! │  RowSource  │──▶│  Classifier   │──▶│ RecordStore │
//! │  file/HTTP  │   │ date + phase │   │  snapshot   │
//! └─────────────┘   └──────────────┘   └──────┬──────┘
//!                                             │ ViewState
//!                      ┌──────────────────────┤
//!                      ▼                      ▼
//!                 ┌──────────┐          ┌──────────┐
//!                 │   CLI    │          │   HTTP   │
//!                 │(covlens) │          │  (JSON)  │
//!                 └──────────┘          └──────────┘
//! ```
//!
//! The classification, filter, and aggregation logic lives in the
//! `coverage-lens-core` crate; this crate supplies ingestion, configuration,
//! and presentation.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration: data root, dataset reference dates, server |
//! | [`ingest`] | `RowSource` trait, filesystem and HTTP CSV sources |
//! | [`loader`] | Dataset → rows → classified snapshot → store |
//! | [`datasets`] | Dataset listing and availability |
//! | [`view`] | Table and timeline text rendering |
//! | [`export`] | JSON export of a view |
//! | [`server`] | JSON HTTP server (Axum) with CORS |

pub mod config;
pub mod datasets;
pub mod export;
pub mod ingest;
pub mod loader;
pub mod server;
pub mod view;

pub use ingest::RowSource;
