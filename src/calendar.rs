use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;
use std::fmt;

/// Process exit status for a scheduled run that was skipped on purpose.
pub const NEUTRAL_EXIT_CODE: u8 = 78;

/// Month/day pairs closed every year.
const FIXED_HOLIDAYS: [(u32, u32); 2] = [(1, 1), (12, 25)];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradingDay {
    Open,
    Weekend(Weekday),
    Holiday,
}

impl TradingDay {
    pub fn is_open(self) -> bool {
        matches!(self, TradingDay::Open)
    }
}

impl fmt::Display for TradingDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradingDay::Open => write!(f, "trading day"),
            TradingDay::Weekend(day) => write!(f, "weekend ({})", day),
            TradingDay::Holiday => write!(f, "market holiday"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TradingCalendar {
    extra_holidays: BTreeSet<NaiveDate>,
}

impl TradingCalendar {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(extra_holidays: I) -> Self {
        Self {
            extra_holidays: extra_holidays.into_iter().collect(),
        }
    }

    pub fn classify(&self, date: NaiveDate) -> TradingDay {
        let weekday = date.weekday();
        if matches!(weekday, Weekday::Sat | Weekday::Sun) {
            return TradingDay::Weekend(weekday);
        }
        let fixed = FIXED_HOLIDAYS
            .iter()
            .any(|&(month, day)| date.month() == month && date.day() == day);
        if fixed || self.extra_holidays.contains(&date) {
            return TradingDay::Holiday;
        }
        TradingDay::Open
    }

    pub fn is_trading_day(&self, date: NaiveDate) -> bool {
        self.classify(date).is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn weekends_are_skipped() {
        let calendar = TradingCalendar::default();
        assert_eq!(
            calendar.classify(date("2024-06-29")),
            TradingDay::Weekend(Weekday::Sat)
        );
        assert_eq!(
            calendar.classify(date("2024-06-30")),
            TradingDay::Weekend(Weekday::Sun)
        );
        assert!(calendar.is_trading_day(date("2024-06-28")));
    }

    #[test]
    fn fixed_and_configured_holidays_are_skipped() {
        let calendar = TradingCalendar::new([date("2024-07-04")]);
        assert_eq!(calendar.classify(date("2024-12-25")), TradingDay::Holiday);
        assert_eq!(calendar.classify(date("2025-01-01")), TradingDay::Holiday);
        assert_eq!(calendar.classify(date("2024-07-04")), TradingDay::Holiday);
        assert!(calendar.is_trading_day(date("2024-07-05")));
    }
}
