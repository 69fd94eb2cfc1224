//! # Coverage Lens Core
//!
//! Pure pipeline logic for Coverage Lens: date resolution, Pre/Post phase
//! classification, filtering, aggregation, and the snapshot store.
//!
//! This crate contains no tokio, filesystem, or network dependencies.
//! Ingestion and presentation live in the `coverage-lens` application crate.
//!
//! ## Pipeline
//!
//! ```text
//! raw rows ──▶ date + classify ──▶ RecordStore (Snapshot)
//!                                        │
//!                     ViewState ──▶ filter ──▶ aggregate ──▶ ArchiveView
//! ```
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`date`] | `DD-MM-YYYY` and ISO date parsing |
//! | [`classify`] | Pre/Post classification and row → record building |
//! | [`store`] | Generation-keyed snapshot store |
//! | [`filter`] | Phase and free-text filtering |
//! | [`aggregate`] | Chronological view, divider, totals, time series |
//! | [`models`] | Records, phases, and view state |
//! | [`error`] | Typed errors |

pub mod aggregate;
pub mod classify;
pub mod date;
pub mod error;
pub mod filter;
pub mod models;
pub mod store;

pub use aggregate::{build_view, ArchiveView, PhaseCounts, ScoreTotals, TimeSeries};
pub use classify::{classify, classify_rows, Classified, UnclassifiedRecord};
pub use error::{CoreError, DateParseError};
pub use filter::{filter_records, filter_view};
pub use models::{ArchiveRecord, DisplayMode, Phase, PhaseFilter, RawRow, ViewState};
pub use store::{LoadTicket, RecordStore, Snapshot};
