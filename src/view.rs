//! Text presentation of an [`ArchiveView`] for the `covlens view` command.
//!
//! Both display modes print the same header and score summary; they differ
//! only in how the chronological records are laid out:
//!
//! - **table**: one row per record (date, phase, title, source, URL)
//! - **timeline**: one card per record, with a release divider placed
//!   before the first `Post` record
//!
//! Rendering is a pure function of the view; nothing is retained between
//! calls.

use anyhow::Result;
use coverage_lens_core::{build_view, ArchiveRecord, ArchiveView, DisplayMode, ViewState};
use std::fmt::Write;

use crate::config::{display_title, Config};
use crate::loader::load_snapshot;

pub const RELEASE_DIVIDER: &str = "------------ THEATRICAL RELEASE ------------";

const TITLE_WIDTH: usize = 48;
const SOURCE_WIDTH: usize = 24;

/// Load `dataset`, apply `view`, and print the result to stdout.
pub async fn run_view(config: &Config, dataset: &str, view: &ViewState, json: bool) -> Result<()> {
    let snapshot = load_snapshot(config, dataset).await?;
    let archive = build_view(&snapshot, view);

    if json {
        println!("{}", serde_json::to_string_pretty(&archive)?);
    } else {
        print!("{}", render_text(&archive));
    }
    Ok(())
}

pub fn render_text(view: &ArchiveView<'_>) -> String {
    let mut out = String::new();
    render_header(&mut out, view);

    if view.records.is_empty() {
        out.push_str("No records.\n");
    } else {
        match view.view.mode {
            DisplayMode::Table => render_table(&mut out, view),
            DisplayMode::Timeline => render_timeline(&mut out, view),
        }
    }

    render_summary(&mut out, view);
    out
}

fn render_header(out: &mut String, view: &ArchiveView<'_>) {
    let _ = writeln!(out, "{}", display_title(view.dataset));
    let _ = writeln!(
        out,
        "{} archival records (reference date {})",
        view.total_records, view.reference_date
    );
    let _ = writeln!(
        out,
        "showing {} (pre: {}, post: {})  phase: {:?}  search: {:?}",
        view.records.len(),
        view.counts.pre,
        view.counts.post,
        view.view.phase,
        view.view.query
    );
    out.push('\n');
}

fn render_table(out: &mut String, view: &ArchiveView<'_>) {
    let _ = writeln!(
        out,
        "{:<12} {:<6} {:<tw$} {:<sw$} URL",
        "DATE",
        "PHASE",
        "TITLE",
        "SOURCE",
        tw = TITLE_WIDTH,
        sw = SOURCE_WIDTH
    );
    for r in &view.records {
        let _ = writeln!(
            out,
            "{:<12} {:<6} {:<tw$} {:<sw$} {}",
            r.published_date_raw,
            r.phase.to_string(),
            truncate(&r.title, TITLE_WIDTH),
            truncate(&r.source, SOURCE_WIDTH),
            r.url,
            tw = TITLE_WIDTH,
            sw = SOURCE_WIDTH
        );
    }
}

fn render_timeline(out: &mut String, view: &ArchiveView<'_>) {
    for (i, r) in view.records.iter().enumerate() {
        if view.divider == Some(i) {
            let _ = writeln!(out, "{}\n", RELEASE_DIVIDER);
        }
        render_card(out, r);
    }
}

fn render_card(out: &mut String, r: &ArchiveRecord) {
    let _ = writeln!(out, "{} ({})", r.published_date_raw, r.phase);
    let _ = writeln!(out, "  {}", r.title);
    let _ = writeln!(out, "  {}", r.source);
    out.push('\n');
}

fn render_summary(out: &mut String, view: &ArchiveView<'_>) {
    out.push('\n');
    let _ = writeln!(
        out,
        "Protest: {}  Institution: {}",
        view.totals.protest, view.totals.institution
    );
    if view.unclassified > 0 {
        let _ = writeln!(
            out,
            "Unclassified (unresolvable date): {}",
            view.unclassified
        );
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(width.saturating_sub(3)).collect();
        t.push_str("...");
        t
    }
}
