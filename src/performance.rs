use crate::models::PriceBar;
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named calendar lookback used for multi-period performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackPeriod {
    pub label: &'static str,
    pub display: &'static str,
    pub months: u32,
}

pub const LOOKBACK_PERIODS: [LookbackPeriod; 6] = [
    LookbackPeriod {
        label: "1m",
        display: "近一個月",
        months: 1,
    },
    LookbackPeriod {
        label: "3m",
        display: "近三個月",
        months: 3,
    },
    LookbackPeriod {
        label: "6m",
        display: "近六個月",
        months: 6,
    },
    LookbackPeriod {
        label: "1y",
        display: "近一年",
        months: 12,
    },
    LookbackPeriod {
        label: "3y",
        display: "近三年",
        months: 36,
    },
    LookbackPeriod {
        label: "5y",
        display: "近五年",
        months: 60,
    },
];

/// Label → display text map published with every snapshot.
pub fn period_labels() -> BTreeMap<String, String> {
    LOOKBACK_PERIODS
        .iter()
        .map(|period| (period.label.to_string(), period.display.to_string()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerformanceMap(BTreeMap<String, Option<f64>>);

impl PerformanceMap {
    /// Every configured period present and absent. Used when history is missing.
    pub fn unavailable() -> Self {
        Self(
            LOOKBACK_PERIODS
                .iter()
                .map(|period| (period.label.to_string(), None))
                .collect(),
        )
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied().flatten()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_unavailable(&self) -> bool {
        self.0.values().all(Option::is_none)
    }
}

pub struct PerformanceCalculator;

impl PerformanceCalculator {
    pub fn calculate(bars: &[PriceBar]) -> PerformanceMap {
        Self::calculate_for_periods(bars, &LOOKBACK_PERIODS)
    }

    pub fn calculate_for_periods(bars: &[PriceBar], periods: &[LookbackPeriod]) -> PerformanceMap {
        let Some((reference_time, latest_close)) = Self::reference_point(bars) else {
            return PerformanceMap::unavailable();
        };

        let values = periods
            .iter()
            .map(|period| {
                let value = Self::threshold(reference_time, period.months)
                    .and_then(|threshold| Self::first_close_on_or_after(bars, threshold))
                    .and_then(|matched| percent_change(latest_close, matched));
                (period.label.to_string(), value)
            })
            .collect();

        PerformanceMap(values)
    }

    fn reference_point(bars: &[PriceBar]) -> Option<(DateTime<Utc>, f64)> {
        bars.iter()
            .filter_map(|bar| bar.close.map(|close| (bar.timestamp, close)))
            .max_by_key(|(timestamp, _)| *timestamp)
    }

    fn threshold(reference: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
        reference.checked_sub_months(Months::new(months))
    }

    // Earliest bar on or after the threshold, not the nearest one.
    fn first_close_on_or_after(bars: &[PriceBar], threshold: DateTime<Utc>) -> Option<f64> {
        bars.iter()
            .filter(|bar| bar.timestamp >= threshold)
            .filter_map(|bar| bar.close.map(|close| (bar.timestamp, close)))
            .min_by_key(|(timestamp, _)| *timestamp)
            .map(|(_, close)| close)
    }
}

/// `(latest - base) / base * 100`, absent when the base is zero.
pub fn percent_change(latest: f64, base: f64) -> Option<f64> {
    if base == 0.0 || !base.is_finite() || !latest.is_finite() {
        return None;
    }
    Some((latest - base) / base * 100.0)
}
