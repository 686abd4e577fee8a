use crate::performance::PerformanceMap;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Markets,
    Forex,
    Commodities,
    Macro,
    UsTech,
    Crypto,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Markets,
        Category::Forex,
        Category::Commodities,
        Category::Macro,
        Category::UsTech,
        Category::Crypto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Markets => "markets",
            Category::Forex => "forex",
            Category::Commodities => "commodities",
            Category::Macro => "macro",
            Category::UsTech => "us_tech",
            Category::Crypto => "crypto",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one tracked instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstrumentSpec {
    pub symbol: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub slug: Option<&'static str>,
    pub region: Option<&'static str>,
}

impl InstrumentSpec {
    pub const fn new(symbol: &'static str, name: &'static str, category: Category) -> Self {
        Self {
            symbol,
            name,
            category,
            slug: None,
            region: None,
        }
    }

    pub const fn with_region(self, region: &'static str) -> Self {
        Self {
            region: Some(region),
            ..self
        }
    }

    pub const fn with_slug(self, slug: &'static str) -> Self {
        Self {
            slug: Some(slug),
            ..self
        }
    }

    /// Filesystem-safe identifier used for the history file name.
    pub fn slug(&self) -> String {
        match self.slug {
            Some(slug) => slug.to_string(),
            None => slugify(self.symbol),
        }
    }
}

/// Lowercases the symbol and collapses every run of non-alphanumeric characters into `_`.
pub fn slugify(symbol: &str) -> String {
    let mut slug = String::with_capacity(symbol.len());
    let mut pending_separator = false;
    for ch in symbol.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// One upstream price bar. Holes in the provider series stay `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub change_pct: Option<f64>,
}

/// Outcome of a single upstream lookup. `Absent` carries the reason for logs.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Present(T),
    Absent { reason: String },
}

impl<T> Fetched<T> {
    pub fn absent<S: Into<String>>(reason: S) -> Self {
        Fetched::Absent {
            reason: reason.into(),
        }
    }

    pub fn from_option<S: Into<String>>(value: Option<T>, reason: S) -> Self {
        match value {
            Some(value) => Fetched::Present(value),
            None => Fetched::absent(reason),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Fetched::Present(value) => Some(value),
            Fetched::Absent { .. } => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Fetched<U> {
        match self {
            Fetched::Present(value) => Fetched::Present(f(value)),
            Fetched::Absent { reason } => Fetched::Absent { reason },
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Fetched::Present(_) => None,
            Fetched::Absent { reason } => Some(reason.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRecord {
    pub symbol: String,
    pub name: String,
    pub close: Option<f64>,
    pub daily_change_pct: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
    #[serde(default)]
    pub performance: Option<PerformanceMap>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightEntry {
    pub category: Category,
    pub label: String,
    #[serde(flatten)]
    pub record: InstrumentRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundFlow {
    pub name: String,
    pub volume: Option<f64>,
    pub net_flow_estimate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub date: NaiveDate,
    pub markets: Vec<InstrumentRecord>,
    pub forex: Vec<InstrumentRecord>,
    pub commodities: Vec<InstrumentRecord>,
    #[serde(rename = "macro")]
    pub macro_indicators: Vec<InstrumentRecord>,
    #[serde(default)]
    pub us_tech: Vec<InstrumentRecord>,
    #[serde(default)]
    pub crypto: Vec<InstrumentRecord>,
    pub highlights: Vec<HighlightEntry>,
    pub rates: BTreeMap<String, Option<f64>>,
    pub sentiment: BTreeMap<String, Option<f64>>,
    pub funds: BTreeMap<String, FundFlow>,
    pub performance_periods: BTreeMap<String, String>,
}

impl SnapshotDocument {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            markets: Vec::new(),
            forex: Vec::new(),
            commodities: Vec::new(),
            macro_indicators: Vec::new(),
            us_tech: Vec::new(),
            crypto: Vec::new(),
            highlights: Vec::new(),
            rates: BTreeMap::new(),
            sentiment: BTreeMap::new(),
            funds: BTreeMap::new(),
            performance_periods: BTreeMap::new(),
        }
    }

    pub fn section(&self, category: Category) -> &[InstrumentRecord] {
        match category {
            Category::Markets => &self.markets,
            Category::Forex => &self.forex,
            Category::Commodities => &self.commodities,
            Category::Macro => &self.macro_indicators,
            Category::UsTech => &self.us_tech,
            Category::Crypto => &self.crypto,
        }
    }

    pub fn section_mut(&mut self, category: Category) -> &mut Vec<InstrumentRecord> {
        match category {
            Category::Markets => &mut self.markets,
            Category::Forex => &mut self.forex,
            Category::Commodities => &mut self.commodities,
            Category::Macro => &mut self.macro_indicators,
            Category::UsTech => &mut self.us_tech,
            Category::Crypto => &mut self.crypto,
        }
    }

    pub fn find(&self, category: Category, symbol: &str) -> Option<&InstrumentRecord> {
        self.section(category)
            .iter()
            .find(|record| record.symbol == symbol)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub daily_summary: String,
    pub regional_trends: String,
    pub fund_flow: String,
}
