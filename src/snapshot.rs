use crate::catalog::{
    CategorySpec, HighlightPick, RateSeries, CATEGORIES, FUND_PROXIES, HIGHLIGHTS, RATE_SERIES,
    SCALED_YIELD_SYMBOLS, SENTIMENT_SYMBOLS,
};
use crate::history::{HistoryRegistry, HistoryStore};
use crate::models::{
    DailyRecord, Fetched, FundFlow, HighlightEntry, InstrumentRecord, InstrumentSpec,
    SnapshotDocument,
};
use crate::output::OutputSink;
use crate::performance::period_labels;
use crate::quotes::{QuoteAdapter, QuoteSource};
use anyhow::Result;
use chrono::NaiveDate;
use log::{info, warn};
use std::collections::BTreeMap;

pub struct SnapshotAssembler<'a, S> {
    quotes: &'a QuoteAdapter<S>,
    history: HistoryStore<'a>,
    run_date: NaiveDate,
}

impl<'a, S: QuoteSource> SnapshotAssembler<'a, S> {
    pub fn new(quotes: &'a QuoteAdapter<S>, sink: &'a OutputSink, run_date: NaiveDate) -> Self {
        Self {
            quotes,
            history: HistoryStore::new(sink),
            run_date,
        }
    }

    /// Builds the full snapshot. Upstream failures only blank out the affected
    /// fields; local I/O failures abort the run.
    pub fn assemble(&self, registry: &mut HistoryRegistry) -> Result<SnapshotDocument> {
        let mut snapshot = SnapshotDocument::empty(self.run_date);

        for spec in CATEGORIES.iter() {
            let records = self.fetch_category(spec, registry)?;
            *snapshot.section_mut(spec.category) = records;
            self.history.write_rollup(spec.category, registry)?;
        }

        snapshot.highlights = build_highlights(&snapshot, &HIGHLIGHTS);
        snapshot.rates = self.fetch_rates();
        snapshot.sentiment = self.fetch_sentiment();
        snapshot.funds = self.fetch_funds();
        snapshot.performance_periods = period_labels();

        Ok(snapshot)
    }

    pub fn fetch_category(
        &self,
        spec: &CategorySpec,
        registry: &mut HistoryRegistry,
    ) -> Result<Vec<InstrumentRecord>> {
        info!(
            "Fetching {} ({} instruments)",
            spec.category,
            spec.instruments.len()
        );

        let mut records = Vec::with_capacity(spec.instruments.len());
        for instrument in spec.instruments {
            records.push(self.fetch_instrument(spec, instrument, registry)?);
        }

        let available = records.iter().filter(|r| r.close.is_some()).count();
        if available < records.len() {
            warn!(
                "{}: {}/{} instruments returned a close",
                spec.category,
                available,
                records.len()
            );
        }
        Ok(records)
    }

    fn fetch_instrument(
        &self,
        spec: &CategorySpec,
        instrument: &InstrumentSpec,
        registry: &mut HistoryRegistry,
    ) -> Result<InstrumentRecord> {
        let quote = self.quotes.recent(instrument.symbol);
        let close = quote.close.into_option();
        let change_pct = quote.change_pct.into_option();

        let performance = spec
            .with_performance
            .then(|| self.quotes.performance(instrument.symbol));
        let volume = if spec.with_volume {
            quote.volume.into_option()
        } else {
            None
        };

        self.history.update_history(
            instrument.category,
            &instrument.slug(),
            DailyRecord {
                date: self.run_date,
                close,
                change_pct,
            },
            registry,
        )?;

        Ok(InstrumentRecord {
            symbol: instrument.symbol.to_string(),
            name: instrument.name.to_string(),
            close,
            daily_change_pct: change_pct,
            volume,
            performance,
            region: instrument.region.map(str::to_string),
        })
    }

    pub fn fetch_rates(&self) -> BTreeMap<String, Option<f64>> {
        RATE_SERIES
            .iter()
            .map(|series| (series.label.to_string(), self.fetch_rate(series)))
            .collect()
    }

    fn fetch_rate(&self, series: &RateSeries) -> Option<f64> {
        match first_available_close(self.quotes, series.candidates) {
            Fetched::Present((value, symbol)) => Some(normalize_yield(symbol, value)),
            Fetched::Absent { reason } => {
                warn!("No rate available for {}: {}", series.label, reason);
                None
            }
        }
    }

    pub fn fetch_sentiment(&self) -> BTreeMap<String, Option<f64>> {
        SENTIMENT_SYMBOLS
            .iter()
            .map(|(label, symbol)| {
                (
                    label.to_string(),
                    self.quotes.latest_close(symbol).into_option(),
                )
            })
            .collect()
    }

    pub fn fetch_funds(&self) -> BTreeMap<String, FundFlow> {
        FUND_PROXIES
            .iter()
            .map(|(symbol, name)| {
                let volume = self.quotes.latest_volume(symbol).into_option();
                let net_flow_estimate = self.quotes.net_assets(symbol).into_option();
                (
                    symbol.to_string(),
                    FundFlow {
                        name: name.to_string(),
                        volume,
                        net_flow_estimate,
                    },
                )
            })
            .collect()
    }
}

/// First candidate with a close wins; the winning symbol decides unit handling.
pub fn first_available_close<'c, S: QuoteSource>(
    quotes: &QuoteAdapter<S>,
    candidates: &[&'c str],
) -> Fetched<(f64, &'c str)> {
    let mut reasons = Vec::new();
    for &candidate in candidates {
        match quotes.latest_close(candidate).map(|value| (value, candidate)) {
            found @ Fetched::Present(_) => return found,
            Fetched::Absent { reason } => reasons.push(format!("{}: {}", candidate, reason)),
        }
    }
    Fetched::absent(if reasons.is_empty() {
        "no candidates configured".to_string()
    } else {
        reasons.join("; ")
    })
}

pub fn normalize_yield(symbol: &str, value: f64) -> f64 {
    if SCALED_YIELD_SYMBOLS.contains(&symbol) {
        round_to(value / 10.0, 4)
    } else {
        value
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Looks every pick up in its already-built category list. Missing symbols are skipped.
pub fn build_highlights(snapshot: &SnapshotDocument, picks: &[HighlightPick]) -> Vec<HighlightEntry> {
    picks
        .iter()
        .filter_map(|pick| {
            snapshot
                .find(pick.category, pick.symbol)
                .map(|record| HighlightEntry {
                    category: pick.category,
                    label: pick.label.to_string(),
                    record: record.clone(),
                })
        })
        .collect()
}
