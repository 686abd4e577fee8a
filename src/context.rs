use crate::calendar::TradingCalendar;
use crate::config::Settings;
use crate::http_client::DEFAULT_REQUEST_TIMEOUT;
use crate::output::OutputSink;
use crate::quotes::QuoteAdapter;
use crate::yahoo::YahooClient;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use std::path::{Path, PathBuf};

/// Everything a command needs for one run.
#[derive(Debug, Clone)]
pub struct AppContext {
    settings: Settings,
    project_root: PathBuf,
    sink: OutputSink,
    run_date: NaiveDate,
}

impl AppContext {
    /// `run_date` defaults to today in UTC.
    pub fn initialize<P: AsRef<Path>>(
        settings: Settings,
        project_root: P,
        run_date: Option<NaiveDate>,
    ) -> Self {
        let project_root = project_root.as_ref().to_path_buf();
        Self {
            sink: OutputSink::for_project(&project_root),
            settings,
            project_root,
            run_date: run_date.unwrap_or_else(|| Utc::now().date_naive()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    pub fn run_date(&self) -> NaiveDate {
        self.run_date
    }

    pub fn calendar(&self) -> TradingCalendar {
        TradingCalendar::new(self.settings.extra_holidays.iter().copied())
    }

    pub fn quotes(&self) -> Result<QuoteAdapter<YahooClient>> {
        let client = YahooClient::new(&self.settings.quote_base_url, DEFAULT_REQUEST_TIMEOUT)?;
        Ok(QuoteAdapter::new(client))
    }
}
