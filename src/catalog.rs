use crate::models::{Category, InstrumentSpec};

/// Per-category fetch options.
#[derive(Debug, Clone, Copy)]
pub struct CategorySpec {
    pub category: Category,
    pub instruments: &'static [InstrumentSpec],
    pub with_volume: bool,
    pub with_performance: bool,
}

const MARKETS: &[InstrumentSpec] = &[
    InstrumentSpec::new("^TWII", "TWSE Weighted Index", Category::Markets).with_region("Asia"),
    InstrumentSpec::new("^GSPC", "S&P 500", Category::Markets).with_region("US"),
    InstrumentSpec::new("^IXIC", "NASDAQ Composite", Category::Markets).with_region("US"),
    InstrumentSpec::new("^DJI", "Dow Jones Industrial", Category::Markets).with_region("US"),
    InstrumentSpec::new("^SOX", "PHLX Semiconductor", Category::Markets).with_region("US"),
    InstrumentSpec::new("^HSI", "Hang Seng Index", Category::Markets).with_region("Asia"),
    InstrumentSpec::new("^N225", "Nikkei 225", Category::Markets).with_region("Asia"),
    InstrumentSpec::new("^KS11", "KOSPI Composite", Category::Markets).with_region("Asia"),
    InstrumentSpec::new("^STOXX", "STOXX Europe 600", Category::Markets).with_region("Europe"),
    InstrumentSpec::new("^FTSE", "FTSE 100", Category::Markets).with_region("Europe"),
    InstrumentSpec::new("^GDAXI", "DAX", Category::Markets).with_region("Europe"),
];

const FOREX: &[InstrumentSpec] = &[
    InstrumentSpec::new("TWD=X", "USD/TWD", Category::Forex),
    InstrumentSpec::new("EURUSD=X", "EUR/USD", Category::Forex),
    InstrumentSpec::new("JPY=X", "USD/JPY", Category::Forex),
    InstrumentSpec::new("CNY=X", "USD/CNY", Category::Forex),
];

const COMMODITIES: &[InstrumentSpec] = &[
    InstrumentSpec::new("GC=F", "Gold", Category::Commodities),
    InstrumentSpec::new("CL=F", "Crude Oil", Category::Commodities),
    InstrumentSpec::new("HG=F", "Copper", Category::Commodities),
];

const MACRO: &[InstrumentSpec] = &[
    InstrumentSpec::new("DX-Y.NYB", "US Dollar Index", Category::Macro).with_slug("dxy"),
    InstrumentSpec::new("^IRX", "13 Week Treasury Bill", Category::Macro),
];

const US_TECH: &[InstrumentSpec] = &[
    InstrumentSpec::new("AAPL", "Apple", Category::UsTech).with_region("US"),
    InstrumentSpec::new("MSFT", "Microsoft", Category::UsTech).with_region("US"),
    InstrumentSpec::new("NVDA", "NVIDIA", Category::UsTech).with_region("US"),
    InstrumentSpec::new("GOOGL", "Alphabet", Category::UsTech).with_region("US"),
    InstrumentSpec::new("AMZN", "Amazon", Category::UsTech).with_region("US"),
    InstrumentSpec::new("META", "Meta Platforms", Category::UsTech).with_region("US"),
    InstrumentSpec::new("TSM", "TSMC ADR", Category::UsTech).with_region("US"),
];

const CRYPTO: &[InstrumentSpec] = &[
    InstrumentSpec::new("BTC-USD", "Bitcoin", Category::Crypto),
    InstrumentSpec::new("ETH-USD", "Ethereum", Category::Crypto),
];

pub const CATEGORIES: [CategorySpec; 6] = [
    CategorySpec {
        category: Category::Markets,
        instruments: MARKETS,
        with_volume: true,
        with_performance: true,
    },
    CategorySpec {
        category: Category::Forex,
        instruments: FOREX,
        with_volume: false,
        with_performance: true,
    },
    CategorySpec {
        category: Category::Commodities,
        instruments: COMMODITIES,
        with_volume: false,
        with_performance: true,
    },
    CategorySpec {
        category: Category::Macro,
        instruments: MACRO,
        with_volume: false,
        with_performance: false,
    },
    CategorySpec {
        category: Category::UsTech,
        instruments: US_TECH,
        with_volume: true,
        with_performance: true,
    },
    CategorySpec {
        category: Category::Crypto,
        instruments: CRYPTO,
        with_volume: true,
        with_performance: true,
    },
];

/// Hand-picked (category, symbol, label) entries for the front page, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightPick {
    pub category: Category,
    pub symbol: &'static str,
    pub label: &'static str,
}

pub const HIGHLIGHTS: [HighlightPick; 8] = [
    HighlightPick {
        category: Category::Markets,
        symbol: "^TWII",
        label: "台股加權",
    },
    HighlightPick {
        category: Category::Markets,
        symbol: "^GSPC",
        label: "S&P 500",
    },
    HighlightPick {
        category: Category::Markets,
        symbol: "^IXIC",
        label: "NASDAQ",
    },
    HighlightPick {
        category: Category::Markets,
        symbol: "^SOX",
        label: "費城半導體",
    },
    HighlightPick {
        category: Category::UsTech,
        symbol: "NVDA",
        label: "NVIDIA",
    },
    HighlightPick {
        category: Category::Forex,
        symbol: "TWD=X",
        label: "美元/台幣",
    },
    HighlightPick {
        category: Category::Commodities,
        symbol: "GC=F",
        label: "黃金",
    },
    HighlightPick {
        category: Category::Crypto,
        symbol: "BTC-USD",
        label: "比特幣",
    },
];

/// Candidate tickers for one logical yield series, tried in order.
#[derive(Debug, Clone, Copy)]
pub struct RateSeries {
    pub label: &'static str,
    pub candidates: &'static [&'static str],
}

pub const RATE_SERIES: [RateSeries; 2] = [
    RateSeries {
        label: "2Y",
        candidates: &["^UST2Y", "^US2Y"],
    },
    RateSeries {
        label: "10Y",
        candidates: &["^TNX", "^US10Y"],
    },
];

/// Yahoo quotes these yields multiplied by ten.
pub const SCALED_YIELD_SYMBOLS: [&str; 1] = ["^TNX"];

pub const SENTIMENT_SYMBOLS: [(&str, &str); 1] = [("VIX", "^VIX")];

pub const FUND_PROXIES: [(&str, &str); 4] = [
    ("QQQ", "Invesco QQQ"),
    ("SPY", "SPDR S&P 500"),
    ("EWT", "iShares MSCI Taiwan"),
    ("EFA", "iShares MSCI EAFE"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_category_is_configured_once() {
        let configured: HashSet<Category> = CATEGORIES.iter().map(|spec| spec.category).collect();
        assert_eq!(configured.len(), Category::ALL.len());
        for category in Category::ALL {
            assert!(configured.contains(&category));
        }
    }

    #[test]
    fn slugs_are_unique_within_a_category() {
        for spec in CATEGORIES {
            let slugs: HashSet<String> = spec.instruments.iter().map(|i| i.slug()).collect();
            assert_eq!(slugs.len(), spec.instruments.len(), "{}", spec.category);
            assert!(spec
                .instruments
                .iter()
                .all(|instrument| instrument.category == spec.category));
        }
    }

    #[test]
    fn highlights_point_at_configured_instruments() {
        for pick in HIGHLIGHTS {
            let spec = CATEGORIES
                .iter()
                .find(|spec| spec.category == pick.category)
                .unwrap();
            assert!(
                spec.instruments.iter().any(|i| i.symbol == pick.symbol),
                "{} missing from {}",
                pick.symbol,
                pick.category
            );
        }
    }
}
