use crate::errors::FetchResult;
use crate::models::{Fetched, PriceBar};
use crate::performance::{percent_change, PerformanceCalculator, PerformanceMap};
use log::warn;

pub const RECENT_PERIOD: &str = "5d";
pub const LONG_PERIOD: &str = "5y";
pub const DAILY_INTERVAL: &str = "1d";

/// Raw access to an upstream quote provider. Implementations may fail freely;
/// [`QuoteAdapter`] turns every failure into an absent value.
pub trait QuoteSource {
    fn history(&self, symbol: &str, period: &str, interval: &str) -> FetchResult<Vec<PriceBar>>;

    fn net_assets(&self, symbol: &str) -> FetchResult<Option<f64>>;
}

/// Latest close, daily change and volume derived from one 5-day window.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentQuote {
    pub close: Fetched<f64>,
    pub change_pct: Fetched<f64>,
    pub volume: Fetched<f64>,
}

impl RecentQuote {
    fn from_bars(bars: &[PriceBar]) -> Self {
        Self {
            close: Fetched::from_option(latest_close_of(bars), "no close in 5-day window"),
            change_pct: Fetched::from_option(
                daily_change_of(bars),
                "fewer than two usable closes in 5-day window",
            ),
            volume: Fetched::from_option(latest_volume_of(bars), "no volume in 5-day window"),
        }
    }

    fn unavailable(reason: &str) -> Self {
        Self {
            close: Fetched::absent(reason),
            change_pct: Fetched::absent(reason),
            volume: Fetched::absent(reason),
        }
    }
}

pub struct QuoteAdapter<S> {
    source: S,
}

impl<S: QuoteSource> QuoteAdapter<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Bars for the requested span, or `Absent` on any upstream failure.
    pub fn history(&self, symbol: &str, period: &str, interval: &str) -> Fetched<Vec<PriceBar>> {
        match self.source.history(symbol, period, interval) {
            Ok(bars) => Fetched::Present(bars),
            Err(err) => {
                warn!(
                    "Unable to fetch {} history ({}/{}): {}",
                    symbol, period, interval, err
                );
                Fetched::absent(err.to_string())
            }
        }
    }

    pub fn recent(&self, symbol: &str) -> RecentQuote {
        match self.history(symbol, RECENT_PERIOD, DAILY_INTERVAL) {
            Fetched::Present(bars) => {
                let quote = RecentQuote::from_bars(&bars);
                if let Some(reason) = quote.close.reason() {
                    warn!("No latest close for {}: {}", symbol, reason);
                }
                quote
            }
            Fetched::Absent { reason } => RecentQuote::unavailable(&reason),
        }
    }

    pub fn latest_close(&self, symbol: &str) -> Fetched<f64> {
        self.recent(symbol).close
    }

    pub fn daily_change_percent(&self, symbol: &str) -> Fetched<f64> {
        self.recent(symbol).change_pct
    }

    pub fn latest_volume(&self, symbol: &str) -> Fetched<f64> {
        self.recent(symbol).volume
    }

    pub fn performance(&self, symbol: &str) -> PerformanceMap {
        match self.history(symbol, LONG_PERIOD, DAILY_INTERVAL) {
            Fetched::Present(bars) => PerformanceCalculator::calculate(&bars),
            Fetched::Absent { .. } => PerformanceMap::unavailable(),
        }
    }

    pub fn net_assets(&self, symbol: &str) -> Fetched<f64> {
        match self.source.net_assets(symbol) {
            Ok(Some(value)) => Fetched::Present(value),
            Ok(None) => Fetched::absent("provider reported no total assets"),
            Err(err) => {
                warn!("Unable to fetch fund statistics for {}: {}", symbol, err);
                Fetched::absent(err.to_string())
            }
        }
    }
}

pub fn latest_close_of(bars: &[PriceBar]) -> Option<f64> {
    bars.iter().rev().find_map(|bar| bar.close)
}

pub fn daily_change_of(bars: &[PriceBar]) -> Option<f64> {
    let mut closes = bars.iter().rev().filter_map(|bar| bar.close);
    let latest = closes.next()?;
    let previous = closes.next()?;
    percent_change(latest, previous)
}

pub fn latest_volume_of(bars: &[PriceBar]) -> Option<f64> {
    bars.iter().rev().find_map(|bar| bar.volume)
}
