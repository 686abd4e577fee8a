use crate::commands::{gate, RunStatus};
use crate::context::AppContext;
use crate::history::HistoryRegistry;
use crate::models::SnapshotDocument;
use crate::output::MARKET_DATA_FILE;
use crate::quotes::{QuoteAdapter, QuoteSource};
use crate::snapshot::SnapshotAssembler;
use anyhow::{Context, Result};
use log::info;

pub fn run(app: &AppContext) -> Result<RunStatus> {
    if let RunStatus::Skipped(day) = gate(app) {
        return Ok(RunStatus::Skipped(day));
    }

    let quotes = app.quotes()?;
    write_snapshot(app, &quotes)?;
    Ok(RunStatus::Completed)
}

/// Assembles the snapshot for the run date and persists it to every output root.
pub fn write_snapshot<S: QuoteSource>(
    app: &AppContext,
    quotes: &QuoteAdapter<S>,
) -> Result<SnapshotDocument> {
    info!(
        "Fetching market snapshot for {} into {}",
        app.run_date(),
        app.project_root().display()
    );

    let mut registry = HistoryRegistry::new();
    let snapshot = SnapshotAssembler::new(quotes, app.sink(), app.run_date())
        .assemble(&mut registry)
        .context("Failed to assemble market snapshot")?;

    app.sink()
        .write_json(MARKET_DATA_FILE, &snapshot)
        .context("Failed to persist market snapshot")?;
    info!(
        "Market snapshot written to {} ({} history series updated)",
        app.sink().primary_path(MARKET_DATA_FILE).display(),
        registry.len()
    );

    Ok(snapshot)
}
